#![allow(missing_docs)]

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use csa_dashboard_lib::cli::{self, Cli};
use csa_dashboard_lib::infrastructure::logging::{init_logging_with_config, log_system_info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    if let Err(e) = init_logging_with_config(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
    }
    log_system_info(&config.logging);
    info!("🚀 CSA dashboard starting");

    let result = cli::run(cli, config).await;
    if let Err(e) = &result {
        error!("❌ {:#}", e);
    }
    result
}
