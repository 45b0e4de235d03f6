use bridge::error::BridgeError;
use bridge::logger::initialize as LoggerInitialize;
use bridge::startup::{Bridge, wait_for_shutdown_signal};

use session_core::config::{BridgeConfig, BridgePaths, try_load_dotenv};

use std::process::ExitCode;

use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("wa-bridge failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BridgeError> {
    // Before anything reads WA_BRIDGE_* variables
    let dotenv = try_load_dotenv();

    let paths = BridgePaths::detect()?;
    let mut config = BridgeConfig::load(&paths.config_dir)?;
    config.apply_env_overrides()?;

    let log_dir = paths.log_dir(config.logging.log_dir.as_deref());
    LoggerInitialize(&log_dir, config.log_level())?;

    info!("wa-bridge starting");
    info!("Config directory: {} ({})", paths.config_dir.display(), paths.source);
    info!("Log directory: {}", log_dir.display());
    if let Some(path) = dotenv.path {
        info!("Environment loaded from {}", path.display());
    }

    let bridge = Bridge::start(&config, &paths).await?;
    info!("wa-bridge listening on http://{}", bridge.local_addr());

    wait_for_shutdown_signal().await;

    info!("Shutting down");
    bridge.shutdown().await
}
