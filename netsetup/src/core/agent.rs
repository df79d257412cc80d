//! Credentials agent.
//!
//! ConnMan calls back into a registered agent when a service it is
//! connecting needs secrets. The gateway keeps exactly one agent for its
//! lifetime; the connect flow loads the credentials for the network it is
//! about to join, and the agent answers ConnMan's next request with them.

use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::api::models::Credentials;
use crate::types::constants::agent_field;

/// Answers ConnMan credential requests with the most recently configured
/// network name and passphrase.
///
/// Clones share the same credential slot, so the copy served on the bus and
/// the copy held by the connect flow always agree.
#[derive(Debug, Clone, Default)]
pub struct Agent {
    credentials: Arc<Mutex<Option<Credentials>>>,
}

impl Agent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the credentials answered on the next request.
    pub fn set_credentials(&self, credentials: Credentials) {
        debug!("Agent credentials set for {}", credentials.name);
        *self.slot() = Some(credentials);
    }

    /// Returns the currently configured credentials, if any.
    pub fn credentials(&self) -> Option<Credentials> {
        self.slot().clone()
    }

    /// ConnMan no longer needs the agent.
    pub fn release(&self) {
        info!("Agent released");
    }

    /// ConnMan aborted the pending request.
    pub fn cancel(&self) {
        info!("Agent request canceled");
    }

    /// ConnMan reports a connection error for `service`.
    pub fn report_error(&self, service: &str, error: &str) {
        warn!("Connection error reported for {service}: {error}");
    }

    /// Answers a `RequestInput` call.
    ///
    /// Only `Passphrase` is answered. Any other requested field is left out
    /// of the result, telling ConnMan this agent cannot provide it.
    pub fn request_input(&self, service: &str, fields: &[&str]) -> HashMap<String, String> {
        let mut answers = HashMap::new();

        if !fields.contains(&agent_field::PASSPHRASE) {
            debug!("No answerable field requested for {service}: {fields:?}");
            return answers;
        }

        match self.slot().as_ref() {
            Some(creds) => {
                debug!("Supplying passphrase for {} to {service}", creds.name);
                answers.insert(
                    agent_field::PASSPHRASE.to_string(),
                    creds.passphrase.clone(),
                );
            }
            None => warn!("Passphrase requested for {service} but no credentials are set"),
        }

        answers
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Credentials>> {
        // the slot holds plain data, a poisoned lock is still consistent
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
