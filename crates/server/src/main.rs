#[tokio::main]
async fn main() -> anyhow::Result<()> {
    sqlgate_server::start().await
}
