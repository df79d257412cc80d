//! [`Bus`] implementation backed by ConnMan on the system bus.

use async_trait::async_trait;
use futures::StreamExt;
use futures::future::ready;
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use zbus::Connection;
use zvariant::{ObjectPath, OwnedObjectPath, Value};

use super::{Bus, ServiceChanges};
use crate::Result;
use crate::api::models::{
    ConnectionError, MediumType, Service, ServiceState, Technology, TechnologyProperty,
};
use crate::core::agent::Agent;
use crate::dbus::{
    AgentInterface, ConnmanManagerProxy, ConnmanServiceProxy, ConnmanTechnologyProxy,
};
use crate::monitoring::owner::{name_has_owner, watch_name_owner};
use crate::types::constants::{connman, connman_errors, property};
use crate::util::utils::{Properties, prop_bool, prop_dict, prop_str, prop_str_array, prop_u8};

/// ConnMan over D-Bus.
///
/// The manager proxy (the handle every enumeration goes through) is
/// resolved on first use and kept until [`Bus::monitor_owner`] sees
/// `net.connman` change owner, after which the next call resolves it again.
/// Technology and service state is always fetched fresh.
///
/// `ConnmanBus` is `Clone`; clones share the connection and the cached handle.
#[derive(Debug, Clone)]
pub struct ConnmanBus {
    conn: Connection,
    manager: HandleSlot<ConnmanManagerProxy<'static>>,
}

/// A cached handle shared between clones.
#[derive(Debug)]
pub(crate) struct HandleSlot<T>(Arc<Mutex<Option<T>>>);

impl<T> Clone for HandleSlot<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for HandleSlot<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(None)))
    }
}

impl<T: Clone> HandleSlot<T> {
    pub(crate) fn get(&self) -> Option<T> {
        self.lock().clone()
    }

    pub(crate) fn store(&self, handle: T) {
        *self.lock() = Some(handle);
    }

    pub(crate) fn take(&self) -> Option<T> {
        self.lock().take()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<T>> {
        // the slot holds a plain handle, a poisoned lock is still consistent
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reacts to ConnMan gaining or losing its bus name.
///
/// Either way the process behind the name is not the one the cached manager
/// handle was resolved against, so the handle is dropped and the next call
/// resolves a fresh one.
pub(crate) fn owner_changed<T: Clone>(manager: &HandleSlot<T>, running: bool) {
    if running {
        info!("ConnMan is up");
    } else {
        warn!("ConnMan is down");
    }

    if manager.take().is_some() {
        debug!("Dropped cached ConnMan manager handle");
    }
}

impl ConnmanBus {
    /// Connects to the system bus.
    pub async fn system() -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self::new(conn))
    }

    /// Wraps an existing connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            manager: HandleSlot::default(),
        }
    }

    async fn manager(&self) -> Result<ConnmanManagerProxy<'static>> {
        if let Some(manager) = self.manager.get() {
            return Ok(manager);
        }

        if !name_has_owner(&self.conn, connman::SERVICE).await? {
            error!("{} has no owner, ConnMan is probably not running", connman::SERVICE);
            return Err(ConnectionError::ServiceUnavailable);
        }

        let manager = ConnmanManagerProxy::new(&self.conn).await?;
        debug!("Resolved ConnMan manager handle");
        self.manager.store(manager.clone());
        Ok(manager)
    }

    async fn technology(&self, path: &OwnedObjectPath) -> Result<ConnmanTechnologyProxy<'static>> {
        Ok(ConnmanTechnologyProxy::builder(&self.conn)
            .path(path.clone())?
            .build()
            .await?)
    }
}

#[async_trait]
impl Bus for ConnmanBus {
    async fn technologies(&self) -> Result<Vec<Technology>> {
        let manager = self.manager().await?;
        let technologies = manager.get_technologies().await?;
        Ok(technologies
            .into_iter()
            .map(|(path, props)| technology_from_properties(path, &props))
            .collect())
    }

    async fn services(&self) -> Result<Vec<Service>> {
        let manager = self.manager().await?;
        let services = manager.get_services().await?;
        Ok(services
            .into_iter()
            .map(|(path, props)| service_from_properties(path, &props))
            .collect())
    }

    async fn technology_properties(&self, path: &OwnedObjectPath) -> Result<Technology> {
        let tech = self.technology(path).await?;
        let props = tech.get_properties().await?;
        Ok(technology_from_properties(path.clone(), &props))
    }

    async fn set_technology_property(
        &self,
        path: &OwnedObjectPath,
        value: TechnologyProperty,
    ) -> Result<()> {
        let tech = self.technology(path).await?;
        let variant = match &value {
            TechnologyProperty::Powered(v) | TechnologyProperty::Tethering(v) => Value::from(*v),
            TechnologyProperty::TetheringIdentifier(v)
            | TechnologyProperty::TetheringPassphrase(v) => Value::from(v.as_str()),
        };

        match tech.write_property(value.key(), &variant).await {
            Ok(()) => Ok(()),
            Err(e) if is_method_error(&e, connman_errors::ALREADY_ENABLED)
                || is_method_error(&e, connman_errors::ALREADY_DISABLED) =>
            {
                debug!("{value} already applied on {path}");
                Ok(())
            }
            Err(e) => Err(ConnectionError::PropertySetFailed {
                property: value.key(),
                reason: describe(&e),
            }),
        }
    }

    async fn subscribe_services_changed(&self) -> Result<ServiceChanges> {
        let manager = self.manager().await?;
        let stream = manager.receive_services_changed().await?;
        debug!("Subscribed to ServicesChanged");

        let changes = stream.filter_map(|signal| {
            ready(match signal.args() {
                Ok(args) => Some(
                    args.changed
                        .iter()
                        .map(|(path, props)| service_from_properties(path.clone(), props))
                        .collect(),
                ),
                Err(e) => {
                    warn!("Failed to parse ServicesChanged args: {e}");
                    None
                }
            })
        });

        Ok(Box::pin(changes))
    }

    async fn scan(&self, path: &OwnedObjectPath) -> Result<()> {
        let tech = self.technology(path).await?;
        tech.scan()
            .await
            .map_err(|e| ConnectionError::ScanFailed(describe(&e)))
    }

    async fn connect_service(&self, path: &OwnedObjectPath) -> Result<()> {
        let service = ConnmanServiceProxy::builder(&self.conn)
            .path(path.clone())?
            .build()
            .await?;

        match service.connect().await {
            Ok(()) => Ok(()),
            Err(e) if is_method_error(&e, connman_errors::ALREADY_CONNECTED) => {
                debug!("{path} already connected");
                Ok(())
            }
            Err(e) => Err(ConnectionError::ConnectFailed(describe(&e))),
        }
    }

    async fn register_agent(&self, path: &str, agent: Agent) -> Result<()> {
        let manager = self.manager().await?;
        let object_path = ObjectPath::try_from(path).map_err(zbus::Error::from)?;

        self.conn
            .object_server()
            .at(object_path.clone(), AgentInterface::new(agent))
            .await?;
        manager.register_agent(&object_path).await?;

        info!("Agent registered at {path}");
        Ok(())
    }

    async fn monitor_owner(&self, shutdown: watch::Receiver<()>) -> Result<()> {
        watch_name_owner(&self.conn, connman::SERVICE, shutdown, |running| {
            owner_changed(&self.manager, running)
        })
        .await
    }
}

fn is_method_error(err: &zbus::Error, name: &str) -> bool {
    matches!(err, zbus::Error::MethodError(err_name, _, _) if err_name.as_str() == name)
}

fn describe(err: &zbus::Error) -> String {
    match err {
        zbus::Error::MethodError(name, Some(msg), _) => format!("{name}: {msg}"),
        zbus::Error::MethodError(name, None, _) => name.to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn technology_from_properties(path: OwnedObjectPath, props: &Properties) -> Technology {
    Technology {
        path,
        name: prop_str(props, property::NAME).unwrap_or_default(),
        kind: medium(props),
        powered: prop_bool(props, property::POWERED).unwrap_or(false),
        connected: prop_bool(props, property::CONNECTED).unwrap_or(false),
        tethering: prop_bool(props, property::TETHERING).unwrap_or(false),
        tethering_identifier: prop_str(props, property::TETHERING_IDENTIFIER),
    }
}

pub(crate) fn service_from_properties(path: OwnedObjectPath, props: &Properties) -> Service {
    Service {
        path,
        name: prop_str(props, property::NAME).unwrap_or_default(),
        kind: medium(props),
        state: prop_str(props, property::STATE)
            .as_deref()
            .map(ServiceState::from)
            .unwrap_or(ServiceState::Idle),
        strength: prop_u8(props, property::STRENGTH),
        security: prop_str_array(props, property::SECURITY),
        ethernet_address: prop_dict(props, property::ETHERNET)
            .and_then(|eth| prop_str(&eth, property::ADDRESS))
            .filter(|addr| !addr.is_empty()),
    }
}

fn medium(props: &Properties) -> MediumType {
    MediumType::from(prop_str(props, property::TYPE).unwrap_or_default().as_str())
}
