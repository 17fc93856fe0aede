#[tokio::main]
async fn main() -> anyhow::Result<()> {
    weathervane::app::run().await
}
