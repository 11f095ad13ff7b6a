use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    espfatfs::cli::run().await
}
