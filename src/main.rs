use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    sparkmon::run().await
}
