//! Command-line front end and daemon for gateway network setup.

pub mod file_lock;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use log::{error, info, warn};
use std::time::Duration;
use tokio::sync::watch;

use netsetup::{Gateway, GatewayConfig, Service, WpanMonitor, WpanStatus};

use crate::file_lock::acquire_daemon_lock;

#[derive(Parser, Debug)]
#[command(name = "netsetupd")]
#[command(version, about = "Network setup for the KNoT IoT gateway")]
struct Args {
    /// How long a scan waits for ConnMan to report changes, in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    scan_timeout_ms: Option<u64>,

    /// Prefix for the SSID derived from the Ethernet address
    #[arg(long, global = true)]
    ssid_prefix: Option<String>,

    /// Passphrase of the gateway access point
    #[arg(long = "passphrase", global = true, value_name = "PASSPHRASE")]
    tethering_passphrase: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Advertise the gateway access point and track ConnMan and wpantund
    /// until interrupted
    Daemon,
    /// Control the gateway access point
    Tether {
        #[command(subcommand)]
        action: TetherAction,
    },
    /// Print visible Wi-Fi networks
    List {
        /// Scan before listing
        #[arg(long)]
        scan: bool,
    },
    /// Join a WPA-PSK network
    Connect { ssid: String, passphrase: String },
    /// Print the Thread interface status
    Wpan,
}

#[derive(Subcommand, Debug, PartialEq)]
enum TetherAction {
    Enable {
        /// SSID to advertise instead of the derived one
        #[arg(long)]
        ssid: Option<String>,
    },
    Disable,
}

impl Args {
    fn config(&self) -> GatewayConfig {
        let mut config = GatewayConfig::new();
        if let Some(ms) = self.scan_timeout_ms {
            config = config.with_scan_timeout(Duration::from_millis(ms));
        }
        if let Some(prefix) = &self.ssid_prefix {
            config = config.with_ssid_prefix(prefix.as_str());
        }
        if let Some(passphrase) = &self.tethering_passphrase {
            config = config.with_tethering_passphrase(passphrase.as_str());
        }
        config
    }
}

pub async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = args.config();
    match args.command {
        Command::Daemon => daemon(config).await,
        Command::Tether { action } => {
            let gw = connect_gateway(config).await?;
            match action {
                TetherAction::Enable { ssid } => {
                    let ssid = gw.enable_tethering(ssid.as_deref()).await?;
                    println!("{ssid}");
                }
                TetherAction::Disable => gw.disable_tethering().await?,
            }
            Ok(())
        }
        Command::List { scan } => {
            let gw = connect_gateway(config).await?;
            let services = if scan {
                gw.scan().await?
            } else {
                gw.list_wifi_services().await
            };
            print_services(&services);
            Ok(())
        }
        Command::Connect { ssid, passphrase } => {
            let gw = connect_gateway(config).await?;
            gw.connect(&ssid, &passphrase).await?;
            println!("Connected to {ssid}");
            Ok(())
        }
        Command::Wpan => {
            let wpan = WpanMonitor::system()
                .await
                .context("Failed to connect to the system bus")?;
            let status = wpan.refresh().await.context("wpantund did not answer")?;
            print_wpan(&status);
            Ok(())
        }
    }
}

async fn connect_gateway(config: GatewayConfig) -> anyhow::Result<Gateway> {
    Gateway::with_config(config)
        .await
        .context("Failed to connect to the system bus")
}

async fn daemon(config: GatewayConfig) -> anyhow::Result<()> {
    let _lock = acquire_daemon_lock()?;

    let gw = connect_gateway(config).await?;
    let wpan = WpanMonitor::system()
        .await
        .context("Failed to connect to the system bus")?;

    match gw.enable_tethering(None).await {
        Ok(ssid) => info!("Gateway access point {ssid} is up"),
        Err(e) => warn!("Could not enable tethering: {e}"),
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(());

    let owner_task = tokio::spawn({
        let gw = gw.clone();
        let shutdown = shutdown_rx.clone();
        async move {
            if let Err(e) = gw.monitor_service_owner(shutdown).await {
                error!("ConnMan watcher stopped: {e}");
            }
        }
    });

    let wpan_task = tokio::spawn(async move {
        if let Err(e) = wpan.run(shutdown_rx).await {
            error!("WPAN monitor stopped: {e}");
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutting down");

    let _ = shutdown_tx.send(());
    let (owner, wpan) = tokio::join!(owner_task, wpan_task);
    if let Err(e) = owner.and(wpan) {
        error!("Background task failed: {e}");
    }

    Ok(())
}

fn print_services(services: &[Service]) {
    if services.is_empty() {
        println!("No Wi-Fi networks found.");
        return;
    }

    for svc in services {
        let security = if svc.security.is_empty() {
            "open".to_string()
        } else {
            svc.security.join(",")
        };
        println!(
            "{:30} {:>3}% {:12} {}",
            svc.name,
            svc.strength.unwrap_or(0),
            security,
            svc.state
        );
    }
}

fn print_wpan(status: &WpanStatus) {
    println!("state:     {}", status.state);
    if !status.is_associated() {
        return;
    }
    println!("node type: {}", status.node_type);
    println!("network:   {}", status.network_name);
    println!("pan id:    {:#06x}", status.pan_id);
    println!("channel:   {}", status.channel);
    println!("xpan id:   {}", status.xpan_id);
    println!("mesh ipv6: {}", status.mesh_ipv6);
}
