//! Kitchen display server entry point

use kds_server::core::{AppState, Config};
use kds_server::utils::logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    logger::init_logger_with_file(None, config.log_dir.as_deref());

    tracing::info!(
        addr = %config.listen_addr(),
        elevated_min = config.escalation.elevated_after_minutes,
        urgent_min = config.escalation.urgent_after_minutes,
        "Starting kitchen display server"
    );

    let state = AppState::build(config)?;
    kds_server::core::run(state).await
}
