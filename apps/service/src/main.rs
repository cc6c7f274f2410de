mod alerts;
mod config;
mod error;
mod monitoring;
mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use alerts::twilio::TwilioGateway;
use config::Config;
use monitoring::{Scheduler, SchedulerConfig};
use store::FileRecordStore;
use store::logs::FileLogStore;

#[derive(Debug, Parser)]
#[command(name = "vigil-service", about = "Background uptime monitoring service", version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_tracing();

    let args = Args::parse();
    let config = Config::from_config(args.config.as_deref())?;
    info!("{config}");

    let records = Arc::new(FileRecordStore::new(&config.storage.data_dir));
    let logs = Arc::new(FileLogStore::new(&config.storage.logs_dir));
    let gateway = Arc::new(TwilioGateway::new(&config.twilio));

    let scheduler = Arc::new(Scheduler::new(
        records,
        logs,
        gateway,
        SchedulerConfig {
            probe_interval: Duration::from_secs(config.monitoring.probe_interval_seconds),
            rotation_interval: Duration::from_secs(config.monitoring.rotation_interval_seconds),
            max_concurrent_probes: config.monitoring.max_concurrent_probes,
        },
    )?);
    let handles = scheduler.start();
    info!("probe and log-rotation cycles started");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    for handle in handles {
        handle.abort();
    }

    Ok(())
}
