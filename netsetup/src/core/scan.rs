//! Wi-Fi scan sessions.
//!
//! A scan session takes the radio out of tethering, makes sure it is
//! powered, requests a scan and then waits for ConnMan to publish a changed
//! service list. The session settles on whichever comes first: the first
//! `ServicesChanged` signal or the settle timeout. Either way the caller gets
//! the Wi-Fi list as ConnMan reports it at that moment, never the raw signal
//! payload, which may only be a delta.
//!
//! # Ordering
//!
//! The `ServicesChanged` subscription is established before the scan is
//! requested. A signal emitted between the request and a late subscription
//! would otherwise be lost and the session would always run into the
//! timeout.
//!
//! # Exactly-once settling
//!
//! The signal and the timer are raced in one `select!`. The losing side is
//! dropped with the session: a signal arriving after the timeout has no
//! subscription left to land in, and a timer outliving a delivered signal
//! no longer exists.

use futures::{FutureExt, StreamExt, select};
use futures_timer::Delay;
use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::Result;
use crate::api::models::{ConnectionError, MediumType, Service};
use crate::bus::Bus;
use crate::core::{directory, technology};
use crate::util::one_shot::OneShot;

/// Phases of a scan session, used for logging transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanPhase {
    Preparing,
    Scanning,
    Settling,
    Done,
}

impl Display for ScanPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preparing => write!(f, "preparing"),
            Self::Scanning => write!(f, "scanning"),
            Self::Settling => write!(f, "settling"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// What ended the wait for the service list.
enum Settled {
    Signal(Vec<Service>),
    TimedOut,
    Closed,
}

/// Marks a session as running; released on drop.
#[derive(Debug)]
pub(crate) struct Session {
    busy: Arc<AtomicBool>,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Runs scan sessions, one at a time.
///
/// Clones share the in-progress flag, so every handle to the same gateway
/// sees the same session.
#[derive(Debug, Clone)]
pub(crate) struct Scanner {
    busy: Arc<AtomicBool>,
    timeout: Duration,
}

impl Scanner {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            timeout,
        }
    }

    /// Claims the session slot.
    ///
    /// Fails with `AlreadyInProgress` while another scan or connect holds it.
    pub(crate) fn begin(&self) -> Result<Session> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                warn!("Scan requested while another session is running");
                ConnectionError::AlreadyInProgress
            })?;

        Ok(Session {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Runs one complete scan session and returns the Wi-Fi service list.
    pub(crate) async fn scan(&self, bus: &dyn Bus) -> Result<Vec<Service>> {
        let session = self.begin()?;
        self.scan_in(bus, &session).await
    }

    /// Runs a scan inside a session the caller already holds.
    pub(crate) async fn scan_in(&self, bus: &dyn Bus, _session: &Session) -> Result<Vec<Service>> {
        debug!("Scan session: {}", ScanPhase::Preparing);
        let wifi = technology::locate(bus, MediumType::Wifi).await?;
        technology::disable_tethering(bus, &wifi.path).await;
        technology::ensure_powered(bus, &wifi.path).await?;

        // Subscribe FIRST to avoid race condition
        let mut changes = OneShot::new(bus.subscribe_services_changed().await?);
        debug!("Scan session: {} on {}", ScanPhase::Scanning, wifi.path);

        let settled = {
            let mut request = pin!(bus.scan(&wifi.path).fuse());
            let mut timeout_delay = pin!(Delay::new(self.timeout).fuse());

            loop {
                select! {
                    result = request => match result {
                        Ok(()) => debug!("Scan request completed"),
                        // keep waiting, the list may still change or the timer settles it
                        Err(e) => warn!("Scan request failed: {e}"),
                    },
                    snapshot = changes.next() => {
                        break match snapshot {
                            Some(services) => Settled::Signal(services),
                            None => Settled::Closed,
                        };
                    }
                    _ = timeout_delay => break Settled::TimedOut,
                }
            }
        };

        // no-op after a delivery; unsubscribes on the timeout path
        changes.cancel();
        debug!("Scan session: {}", ScanPhase::Settling);

        match settled {
            Settled::Signal(delta) => {
                debug!(
                    "ServicesChanged carried {} entries, re-reading service list",
                    delta.len()
                );
            }
            Settled::TimedOut => {
                warn!(
                    "No ServicesChanged within {:?}, settling with the current service list",
                    self.timeout
                );
            }
            Settled::Closed => {
                warn!("ServicesChanged subscription closed, settling with the current service list");
            }
        }

        let services = directory::list_by_medium(bus, &MediumType::Wifi).await;
        debug!(
            "Scan session: {} with {} services",
            ScanPhase::Done,
            services.len()
        );
        Ok(services)
    }
}
