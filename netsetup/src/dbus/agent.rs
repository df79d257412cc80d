//! The `net.connman.Agent` object served to ConnMan.

use log::debug;
use std::collections::HashMap;
use zbus::{fdo, interface};
use zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::core::agent::Agent;

/// Bus-facing wrapper that forwards ConnMan's agent calls to [`Agent`].
pub(crate) struct AgentInterface {
    agent: Agent,
}

impl AgentInterface {
    pub(crate) fn new(agent: Agent) -> Self {
        Self { agent }
    }
}

#[interface(name = "net.connman.Agent")]
impl AgentInterface {
    fn release(&self) {
        self.agent.release();
    }

    fn cancel(&self) {
        self.agent.cancel();
    }

    fn report_error(&self, service: OwnedObjectPath, error: String) {
        self.agent.report_error(service.as_str(), &error);
    }

    fn request_input(
        &self,
        service: OwnedObjectPath,
        fields: HashMap<String, OwnedValue>,
    ) -> fdo::Result<HashMap<String, OwnedValue>> {
        let requested: Vec<&str> = fields.keys().map(String::as_str).collect();
        debug!("RequestInput for {service}: {requested:?}");

        self.agent
            .request_input(service.as_str(), &requested)
            .into_iter()
            .map(|(field, answer)| {
                Value::from(answer)
                    .try_into_owned()
                    .map(|value| (field, value))
                    .map_err(|e| fdo::Error::Failed(e.to_string()))
            })
            .collect()
    }
}
