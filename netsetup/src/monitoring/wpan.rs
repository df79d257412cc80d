//! Thread (WPAN) status mirror.
//!
//! Keeps a local copy of wpantund's view of the mesh radio: whether the NCP
//! is associated, and if so the network parameters and master key. The copy
//! is refreshed whenever wpantund reports a property change and cleared when
//! wpantund leaves the bus.

use async_trait::async_trait;
use futures::future::pending;
use futures::stream::{Stream, StreamExt};
use futures::{FutureExt, select};
use log::{debug, info, warn};
use std::fmt::{Debug, Formatter};
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use zbus::Connection;

use crate::Result;
use crate::api::models::{ConnectionError, WpanStatus};
use crate::dbus::WpanProxy;
use crate::monitoring::owner::{OwnerChanges, name_has_owner, owner_changes};
use crate::try_log;
use crate::types::constants::wpantund;
use crate::util::utils::{Properties, hex_colon, prop_str, prop_u8, prop_u16, value_bytes};

type ChangeStream = Pin<Box<dyn Stream<Item = ()> + Send>>;

/// What the mirror needs from wpantund.
#[async_trait]
pub(crate) trait WpanSource: Send + Sync {
    /// Subscribes to wpantund gaining or losing its bus name.
    async fn owner_changes(&self) -> Result<OwnerChanges>;

    async fn is_running(&self) -> Result<bool>;

    /// Subscribes to NCP property changes.
    async fn property_changes(&self) -> Result<ChangeStream>;

    async fn read_status(&self) -> Result<WpanStatus>;
}

/// wpantund on the system bus.
struct Wpantund {
    conn: Connection,
}

#[async_trait]
impl WpanSource for Wpantund {
    async fn owner_changes(&self) -> Result<OwnerChanges> {
        owner_changes(&self.conn, wpantund::SERVICE).await
    }

    async fn is_running(&self) -> Result<bool> {
        name_has_owner(&self.conn, wpantund::SERVICE).await
    }

    async fn property_changes(&self) -> Result<ChangeStream> {
        let wpan = WpanProxy::new(&self.conn).await?;
        let stream = wpan.receive_prop_changed().await?;
        Ok(Box::pin(stream.map(|_| ())))
    }

    async fn read_status(&self) -> Result<WpanStatus> {
        let wpan = WpanProxy::new(&self.conn).await?;
        read_status(&wpan).await
    }
}

enum Event {
    Shutdown,
    OwnerChanged(bool),
    OwnerStreamEnded,
    PropertyChanged,
    ChangesEnded,
}

/// Mirrors wpantund's status for the `wpan0` interface.
///
/// `WpanMonitor` is `Clone`; clones share the same snapshot, so one clone can
/// run [`WpanMonitor::run`] in a background task while others read
/// [`WpanMonitor::status`].
#[derive(Clone)]
pub struct WpanMonitor {
    source: Arc<dyn WpanSource>,
    status: Arc<RwLock<WpanStatus>>,
}

impl Debug for WpanMonitor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WpanMonitor")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl WpanMonitor {
    /// Connects to the system bus.
    pub async fn system() -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self::new(conn))
    }

    pub fn new(conn: Connection) -> Self {
        Self::with_source(Arc::new(Wpantund { conn }))
    }

    pub(crate) fn with_source(source: Arc<dyn WpanSource>) -> Self {
        Self {
            source,
            status: Arc::new(RwLock::new(WpanStatus::default())),
        }
    }

    /// Returns the last mirrored status.
    pub fn status(&self) -> WpanStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_associated(&self) -> bool {
        self.status().is_associated()
    }

    /// Reads the current status from wpantund and stores it.
    pub async fn refresh(&self) -> Result<WpanStatus> {
        let status = self.source.read_status().await?;
        self.store(status.clone());
        Ok(status)
    }

    /// Follows wpantund until `shutdown` fires.
    ///
    /// While wpantund owns its bus name the status is refreshed on every
    /// `PropChanged` signal; when it goes away the snapshot is cleared.
    pub async fn run(&self, shutdown: watch::Receiver<()>) -> Result<()> {
        // Subscribe FIRST to avoid race condition
        let owners = self.source.owner_changes().await?;
        let running = self.source.is_running().await?;

        self.follow(owners, running, shutdown).await
    }

    /// Drives the mirror from owner events, starting from `running`.
    pub(crate) async fn follow(
        &self,
        owners: OwnerChanges,
        running: bool,
        mut shutdown: watch::Receiver<()>,
    ) -> Result<()> {
        let mut owners = owners.fuse();
        let mut changes = if running {
            info!("wpantund is up");
            self.start().await
        } else {
            info!("wpantund is not running");
            None
        };

        loop {
            let event = select! {
                _ = shutdown.changed().fuse() => Event::Shutdown,
                owner = owners.next() => match owner {
                    Some(up) => Event::OwnerChanged(up),
                    None => Event::OwnerStreamEnded,
                },
                change = next_change(&mut changes).fuse() => match change {
                    Some(()) => Event::PropertyChanged,
                    None => Event::ChangesEnded,
                },
            };

            match event {
                Event::Shutdown => {
                    debug!("WPAN monitor shutting down");
                    return Ok(());
                }
                Event::OwnerChanged(true) => {
                    info!("wpantund is up");
                    changes = self.start().await;
                }
                Event::OwnerChanged(false) => {
                    info!("wpantund is down");
                    changes = None;
                    self.store(WpanStatus::default());
                }
                Event::OwnerStreamEnded => {
                    warn!("NameOwnerChanged stream for wpantund ended unexpectedly");
                    return Err(ConnectionError::MonitorStopped("WPAN owner watch".into()));
                }
                Event::PropertyChanged => {
                    if let Err(e) = self.refresh().await {
                        warn!("Failed to refresh WPAN status: {e}");
                    }
                }
                Event::ChangesEnded => {
                    debug!("PropChanged subscription ended");
                    changes = None;
                }
            }
        }
    }

    /// Subscribes to property changes, then takes an initial snapshot.
    async fn start(&self) -> Option<ChangeStream> {
        let stream = try_log!(
            self.source.property_changes().await,
            "Failed to subscribe to wpantund PropChanged"
        );

        match self.source.read_status().await {
            Ok(status) => self.store(status),
            // wpan0 may not exist yet right after wpantund starts
            Err(e) => warn!("Initial WPAN status unavailable: {e}"),
        }

        Some(stream)
    }

    fn store(&self, status: WpanStatus) {
        debug!("WPAN state: {:?}", status.state);
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

async fn next_change(changes: &mut Option<ChangeStream>) -> Option<()> {
    match changes {
        Some(stream) => stream.next().await,
        None => pending().await,
    }
}

async fn read_status(wpan: &WpanProxy<'_>) -> Result<WpanStatus> {
    let props = wpan.status().await?;
    let mut status = status_from_properties(&props);

    if status.is_associated() {
        let (code, key) = wpan.prop_get(wpantund::NETWORK_KEY).await?;
        if code == 0 {
            status.master_key = value_bytes(&key).map(|b| hex_colon(&b)).unwrap_or_default();
        } else {
            warn!("PropGet {} returned status {code}", wpantund::NETWORK_KEY);
        }
    }

    Ok(status)
}

/// Builds a status snapshot from a wpantund `Status()` dictionary.
///
/// Network details are only copied when the NCP is associated.
pub(crate) fn status_from_properties(props: &Properties) -> WpanStatus {
    let state = prop_str(props, wpantund::NCP_STATE).unwrap_or_default();
    if state != wpantund::STATE_ASSOCIATED {
        return WpanStatus {
            state,
            ..WpanStatus::default()
        };
    }

    WpanStatus {
        state,
        node_type: prop_str(props, wpantund::NODE_TYPE).unwrap_or_default(),
        network_name: prop_str(props, wpantund::NETWORK_NAME).unwrap_or_default(),
        pan_id: prop_u16(props, wpantund::PAN_ID).unwrap_or_default(),
        channel: prop_u8(props, wpantund::NCP_CHANNEL).unwrap_or_default(),
        xpan_id: prop_str(props, wpantund::XPAN_ID).unwrap_or_default(),
        mesh_ipv6: prop_str(props, wpantund::MESH_LOCAL_ADDRESS).unwrap_or_default(),
        master_key: String::new(),
    }
}
