//! Packcalc API entry point.

use tracing::info;

use packcalc_api::{init_tracing, run, ApiConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ApiConfig::load()?;
    info!(
        port = config.port,
        database = ?config.database_path,
        max_search_limit = config.max_search_limit,
        "Starting Packcalc API"
    );

    run(config).await
}
