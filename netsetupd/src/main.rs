#[tokio::main]
async fn main() -> anyhow::Result<()> {
    netsetupd::run().await
}
