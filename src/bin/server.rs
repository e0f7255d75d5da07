use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pulsewatch::{
    config::{Config, read_config_file},
    scheduler::{HttpProbe, SchedulerRegistry},
    storage::open_store,
};
use tracing::{error, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Schedules and runs HTTP health checks for registered monitors")]
struct Args {
    /// Config file (JSON); defaults apply when omitted
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("pulsewatch", LevelFilter::DEBUG),
        ("pulsewatch_server", LevelFilter::TRACE),
        ("tower_http", LevelFilter::INFO),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(file) => read_config_file(file)?,
        None => Config::default(),
    };

    let store = open_store(&config.storage())
        .await
        .context("failed to open monitor store")?;
    let probe = HttpProbe::new(config.probe().timeout())?;
    let registry = Arc::new(SchedulerRegistry::new(
        Arc::clone(&store),
        Arc::new(probe),
    ));

    let scheduled = registry
        .on_process_start()
        .await
        .context("failed to schedule persisted monitors")?;
    info!("{scheduled} monitors scheduled");

    #[cfg(feature = "api")]
    {
        use pulsewatch::api::{ApiConfig, ApiState, spawn_api_server};

        let api_config = ApiConfig::new(config.bind_addr(), &config.api());
        let state = ApiState::new(Arc::clone(&store), Arc::clone(&registry));
        let addr = spawn_api_server(api_config, state).await?;
        info!("server running on {addr}");
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");

    registry.shutdown();
    if let Err(e) = store.close().await {
        error!("failed to close monitor store: {e}");
    }

    Ok(())
}
