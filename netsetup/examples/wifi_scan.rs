use netsetup::Gateway;

#[tokio::main]
async fn main() -> netsetup::Result<()> {
    let gw = Gateway::new().await?;

    println!("Scanning for WiFi networks...");
    let services = gw.scan().await?;

    for svc in services {
        let secured = if svc.is_secured() { "secured" } else { "open" };
        println!(
            "{:30} {:>3}% {:8} {}",
            svc.name,
            svc.strength.unwrap_or(0),
            secured,
            svc.state
        );
    }

    Ok(())
}
