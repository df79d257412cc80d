//! Bus-name owner tracking.
//!
//! Both ConnMan and wpantund can restart underneath the gateway. Watching
//! `NameOwnerChanged` for their well-known names is how the gateway learns
//! that any handle it holds is stale.

use futures::future::ready;
use futures::stream::Stream;
use futures::{FutureExt, StreamExt, select};
use log::{debug, warn};
use std::pin::Pin;
use tokio::sync::watch;
use zbus::Connection;
use zbus::fdo::DBusProxy;
use zbus::names::BusName;

use crate::Result;
use crate::api::models::ConnectionError;

/// Owner changes for one bus name: `true` when it gains an owner, `false`
/// when it loses one.
pub(crate) type OwnerChanges = Pin<Box<dyn Stream<Item = bool> + Send>>;

/// Returns whether `name` currently has an owner on the bus.
pub(crate) async fn name_has_owner(conn: &Connection, name: &'static str) -> Result<bool> {
    let dbus = DBusProxy::new(conn).await?;
    let bus_name = BusName::try_from(name).map_err(zbus::Error::from)?;
    Ok(dbus.name_has_owner(bus_name).await?)
}

/// Subscribes to `NameOwnerChanged` for `name`.
pub(crate) async fn owner_changes(conn: &Connection, name: &'static str) -> Result<OwnerChanges> {
    let dbus = DBusProxy::new(conn).await?;
    let stream = dbus
        .receive_name_owner_changed_with_args(&[(0, name)])
        .await?;
    debug!("Subscribed to NameOwnerChanged for {name}");

    Ok(Box::pin(stream.filter_map(move |signal| {
        ready(match signal.args() {
            Ok(args) => Some(args.new_owner.is_some()),
            Err(e) => {
                warn!("Failed to parse NameOwnerChanged args for {name}: {e}");
                None
            }
        })
    })))
}

/// Invokes `on_change` with `true` when `name` gains an owner and `false`
/// when it loses one, until `shutdown` fires.
///
/// The subscription is set up before the current owner is queried, so an
/// owner change racing with startup is not lost. The callback is invoked
/// once up front with the current state.
pub(crate) async fn watch_name_owner<F>(
    conn: &Connection,
    name: &'static str,
    shutdown: watch::Receiver<()>,
    mut on_change: F,
) -> Result<()>
where
    F: FnMut(bool),
{
    // Subscribe FIRST to avoid race condition
    let changes = owner_changes(conn, name).await?;
    on_change(name_has_owner(conn, name).await?);

    follow_owner(changes, name, shutdown, on_change).await
}

/// Feeds owner changes from `changes` to `on_change` until `shutdown` fires.
///
/// Fails with `MonitorStopped` if the change stream ends first.
pub(crate) async fn follow_owner<S, F>(
    changes: S,
    name: &str,
    mut shutdown: watch::Receiver<()>,
    mut on_change: F,
) -> Result<()>
where
    S: Stream<Item = bool> + Unpin,
    F: FnMut(bool),
{
    let mut changes = changes.fuse();

    loop {
        select! {
            _ = shutdown.changed().fuse() => {
                debug!("Owner watch for {name} shutting down");
                return Ok(());
            }
            change = changes.next() => match change {
                Some(up) => {
                    debug!("{name} owner changed (running: {up})");
                    on_change(up);
                }
                None => {
                    warn!("NameOwnerChanged stream for {name} ended unexpectedly");
                    return Err(ConnectionError::MonitorStopped(format!(
                        "owner watch for {name}"
                    )));
                }
            },
        }
    }
}
