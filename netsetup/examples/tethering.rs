/// Example advertising the gateway access point for a while, then
/// switching back to client mode.
///
/// The SSID is derived from the Ethernet hardware address unless one is
/// given on the command line.
use std::time::Duration;

use netsetup::{Gateway, GatewayConfig};

#[tokio::main]
async fn main() -> netsetup::Result<()> {
    let identifier = std::env::args().nth(1);

    let config = GatewayConfig::new().with_tethering_passphrase("knotNetworkOfThings");
    let gw = Gateway::with_config(config).await?;

    let ssid = gw.enable_tethering(identifier.as_deref()).await?;
    println!("Advertising {ssid} for 60 seconds...");

    tokio::time::sleep(Duration::from_secs(60)).await;

    gw.disable_tethering().await?;
    println!("Tethering off");

    Ok(())
}
