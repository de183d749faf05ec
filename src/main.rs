use std::error::Error;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,resolver=debug"))
        .expect("valid default log filter");

    tracing_subscriber::fmt().with_env_filter(filter).init();

    api::start().await?;

    Ok(())
}
