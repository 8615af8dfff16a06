use stockroom::utils::logger;
use stockroom::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    // Log to daily files in production, stdout otherwise
    if config.is_production() {
        let log_dir = config.log_dir();
        std::fs::create_dir_all(&log_dir)?;
        logger::init_logger_with_file(Some(config.log_level.as_str()), log_dir.to_str());
    } else {
        logger::init_logger_with_file(Some(config.log_level.as_str()), None);
    }

    tracing::info!("Stockroom server starting...");

    let state = ServerState::initialize(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize server state: {}", e))?;

    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(anyhow::anyhow!("{}", e));
    }

    Ok(())
}
