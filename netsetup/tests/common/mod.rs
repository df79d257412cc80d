//! In-memory `Bus` used by the integration tests.
//!
//! Records every call in order, applies technology property writes to its
//! own state, and delivers `ServicesChanged` payloads through channels so
//! tests can observe live subscriptions.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::mpsc::{UnboundedSender, unbounded};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use zvariant::OwnedObjectPath;

use netsetup::bus::{Bus, ServiceChanges};
use netsetup::{
    Agent, ConnectionError, Gateway, GatewayConfig, MediumType, Result, Service, ServiceState,
    Technology, TechnologyProperty,
};

pub const WIFI_TECH: &str = "/net/connman/technology/wifi";
pub const ETHERNET_TECH: &str = "/net/connman/technology/ethernet";
pub const ETHERNET_SERVICE: &str = "/net/connman/service/ethernet_aabbccddeeff_cable";
pub const ETHERNET_ADDRESS: &str = "AA:BB:CC:DD:EE:FF";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Technologies,
    Services,
    TechnologyProperties(String),
    SetProperty(String, TechnologyProperty),
    Subscribe,
    Scan(String),
    Connect(String),
    RegisterAgent(String),
}

/// What the fake does when a scan is requested.
#[derive(Debug, Clone)]
pub enum ScanBehavior {
    /// Acknowledge the scan, emit nothing.
    Silent,
    /// Add `discovered` to the directory, then emit `payload` as the
    /// `ServicesChanged` argument.
    Emit {
        payload: Vec<Service>,
        discovered: Vec<Service>,
    },
    /// Reject the scan request.
    Fail,
}

struct State {
    available: bool,
    technologies: Vec<Technology>,
    services: Vec<Service>,
    calls: Vec<Call>,
    subscribers: Vec<UnboundedSender<Vec<Service>>>,
    on_scan: ScanBehavior,
    rejected_properties: Vec<&'static str>,
    connect_error: Option<String>,
    agent: Option<Agent>,
    agent_answers: Vec<HashMap<String, String>>,
}

pub struct FakeBus {
    state: Mutex<State>,
}

pub fn path(p: &str) -> OwnedObjectPath {
    OwnedObjectPath::try_from(p).unwrap()
}

pub fn technology(p: &str, kind: MediumType, powered: bool) -> Technology {
    Technology {
        path: path(p),
        name: kind.to_string(),
        kind,
        powered,
        connected: false,
        tethering: false,
        tethering_identifier: None,
    }
}

pub fn wifi_service(name: &str, id: &str) -> Service {
    Service {
        path: path(&format!("/net/connman/service/wifi_{id}_managed_psk")),
        name: name.to_string(),
        kind: MediumType::Wifi,
        state: ServiceState::Idle,
        strength: Some(60),
        security: vec!["psk".into()],
        ethernet_address: None,
    }
}

pub fn ethernet_service(address: Option<&str>) -> Service {
    Service {
        path: path(ETHERNET_SERVICE),
        name: "Wired".into(),
        kind: MediumType::Ethernet,
        state: ServiceState::Online,
        strength: None,
        security: Vec::new(),
        ethernet_address: address.map(str::to_string),
    }
}

pub fn names(services: &[Service]) -> Vec<&str> {
    services.iter().map(|s| s.name.as_str()).collect()
}

impl FakeBus {
    /// A gateway with an unpowered Wi-Fi radio, a wired link and no
    /// visible access points.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                available: true,
                technologies: vec![
                    technology(WIFI_TECH, MediumType::Wifi, false),
                    technology(ETHERNET_TECH, MediumType::Ethernet, true),
                ],
                services: vec![ethernet_service(Some(ETHERNET_ADDRESS))],
                calls: Vec::new(),
                subscribers: Vec::new(),
                on_scan: ScanBehavior::Silent,
                rejected_properties: Vec::new(),
                connect_error: None,
                agent: None,
                agent_answers: Vec::new(),
            }),
        })
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn set_available(&self, available: bool) {
        self.state().available = available;
    }

    pub fn set_technologies(&self, technologies: Vec<Technology>) {
        self.state().technologies = technologies;
    }

    pub fn set_services(&self, services: Vec<Service>) {
        self.state().services = services;
    }

    pub fn add_services(&self, services: Vec<Service>) {
        self.state().services.extend(services);
    }

    pub fn on_scan(&self, behavior: ScanBehavior) {
        self.state().on_scan = behavior;
    }

    pub fn reject_property(&self, key: &'static str) {
        self.state().rejected_properties.push(key);
    }

    pub fn fail_connect(&self, error: &str) {
        self.state().connect_error = Some(error.to_string());
    }

    pub fn update_wifi(&self, f: impl FnOnce(&mut Technology)) {
        let mut state = self.state();
        let wifi = state
            .technologies
            .iter_mut()
            .find(|t| t.kind == MediumType::Wifi)
            .expect("no wifi technology");
        f(wifi);
    }

    pub fn wifi(&self) -> Technology {
        self.state()
            .technologies
            .iter()
            .find(|t| t.kind == MediumType::Wifi)
            .cloned()
            .expect("no wifi technology")
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.state().calls.iter().position(|c| pred(c))
    }

    pub fn property_writes(&self) -> Vec<TechnologyProperty> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::SetProperty(_, value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn agent_answers(&self) -> Vec<HashMap<String, String>> {
        self.state().agent_answers.clone()
    }

    /// Subscriptions whose receiving side is still alive.
    pub fn live_subscriptions(&self) -> usize {
        let mut state = self.state();
        state.subscribers.retain(|tx| !tx.is_closed());
        state.subscribers.len()
    }

    /// Emits `ServicesChanged` to every live subscriber and returns how
    /// many received it.
    pub fn emit(&self, payload: Vec<Service>) -> usize {
        let mut state = self.state();
        state.subscribers.retain(|tx| !tx.is_closed());
        state
            .subscribers
            .iter()
            .filter(|tx| tx.unbounded_send(payload.clone()).is_ok())
            .count()
    }

    fn record(&self, call: Call) -> Result<()> {
        let mut state = self.state();
        state.calls.push(call);
        if state.available {
            Ok(())
        } else {
            Err(ConnectionError::ServiceUnavailable)
        }
    }
}

#[async_trait]
impl Bus for FakeBus {
    async fn technologies(&self) -> Result<Vec<Technology>> {
        self.record(Call::Technologies)?;
        Ok(self.state().technologies.clone())
    }

    async fn services(&self) -> Result<Vec<Service>> {
        self.record(Call::Services)?;
        Ok(self.state().services.clone())
    }

    async fn technology_properties(&self, path: &OwnedObjectPath) -> Result<Technology> {
        self.record(Call::TechnologyProperties(path.to_string()))?;
        self.state()
            .technologies
            .iter()
            .find(|t| &t.path == path)
            .cloned()
            .ok_or(ConnectionError::TechnologyNotFound(MediumType::Other(
                path.to_string(),
            )))
    }

    async fn set_technology_property(
        &self,
        path: &OwnedObjectPath,
        value: TechnologyProperty,
    ) -> Result<()> {
        self.record(Call::SetProperty(path.to_string(), value.clone()))?;

        let mut state = self.state();
        if state.rejected_properties.contains(&value.key()) {
            return Err(ConnectionError::PropertySetFailed {
                property: value.key(),
                reason: "net.connman.Error.InvalidArguments".into(),
            });
        }

        let Some(tech) = state.technologies.iter_mut().find(|t| &t.path == path) else {
            return Err(ConnectionError::PropertySetFailed {
                property: value.key(),
                reason: "no such object".into(),
            });
        };

        match value {
            TechnologyProperty::Powered(v) => tech.powered = v,
            TechnologyProperty::Tethering(v) => tech.tethering = v,
            TechnologyProperty::TetheringIdentifier(v) => tech.tethering_identifier = Some(v),
            TechnologyProperty::TetheringPassphrase(_) => {}
        }
        Ok(())
    }

    async fn subscribe_services_changed(&self) -> Result<ServiceChanges> {
        self.record(Call::Subscribe)?;
        let (tx, rx) = unbounded();
        self.state().subscribers.push(tx);
        Ok(Box::pin(rx))
    }

    async fn scan(&self, path: &OwnedObjectPath) -> Result<()> {
        self.record(Call::Scan(path.to_string()))?;

        let behavior = self.state().on_scan.clone();
        match behavior {
            ScanBehavior::Silent => Ok(()),
            ScanBehavior::Emit {
                payload,
                discovered,
            } => {
                self.add_services(discovered);
                self.emit(payload);
                Ok(())
            }
            ScanBehavior::Fail => Err(ConnectionError::ScanFailed(
                "net.connman.Error.NotSupported".into(),
            )),
        }
    }

    async fn connect_service(&self, path: &OwnedObjectPath) -> Result<()> {
        self.record(Call::Connect(path.to_string()))?;

        // ConnMan challenges the agent before answering Connect
        let agent = self.state().agent.clone();
        if let Some(agent) = agent {
            let answers = agent.request_input(path.as_str(), &["Passphrase"]);
            self.state().agent_answers.push(answers);
        }

        match self.state().connect_error.clone() {
            Some(error) => Err(ConnectionError::ConnectFailed(error)),
            None => Ok(()),
        }
    }

    async fn register_agent(&self, path: &str, agent: Agent) -> Result<()> {
        self.record(Call::RegisterAgent(path.to_string()))?;
        self.state().agent = Some(agent);
        Ok(())
    }

    async fn monitor_owner(&self, mut shutdown: watch::Receiver<()>) -> Result<()> {
        let _ = shutdown.changed().await;
        Ok(())
    }
}

/// Builds a gateway over `bus` with the given scan timeout.
pub async fn gateway(bus: &Arc<FakeBus>, scan_timeout: Duration) -> Gateway {
    let config = GatewayConfig::new().with_scan_timeout(scan_timeout);
    Gateway::with_bus(bus.clone(), config).await
}
