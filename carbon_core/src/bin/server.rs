use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing::info;

use carbon_core::config::CONFIG_PATH_ENV;
use carbon_core::{
    load_dashboard_config_from_env, server, DashboardConfig, DashboardConfigMetadata,
    DashboardContext, Dataset, TickSource,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "European carbon intensity dashboard server", long_about = None)]
struct Cli {
    /// Dashboard config JSON (defaults to CARBON_DASHBOARD_CONFIG_PATH, then the builtin config).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Dataset CSV with country, carbon-intensity, low-carbon and renewable columns.
    #[arg(long)]
    data: Option<PathBuf>,
    /// Address to listen on.
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Let the page drive timer ticks instead of the server.
    #[arg(long)]
    client_ticks: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let (mut config, metadata) = match &cli.config {
        Some(path) => {
            let config = DashboardConfig::from_file(path)
                .wrap_err_with(|| format!("loading dashboard config {}", path.display()))?;
            (config, DashboardConfigMetadata::new(Some(path.clone())))
        }
        None => load_dashboard_config_from_env()
            .wrap_err_with(|| format!("loading dashboard config from {CONFIG_PATH_ENV}"))?,
    };
    if let Some(path) = cli.data {
        config.set_dataset_path(path);
    }
    if let Some(bind) = cli.bind {
        config.set_bind(bind);
    }
    if cli.client_ticks {
        config.set_tick_source(TickSource::Client);
    }

    let dataset = Dataset::from_file(config.dataset_path()).wrap_err_with(|| {
        format!("loading dataset {}", config.dataset_path().display())
    })?;

    let bind = config.bind();
    let context = Arc::new(
        DashboardContext::new(config, dataset).wrap_err("dashboard configuration is inconsistent")?,
    );

    let listener = TcpListener::bind(bind)
        .await
        .wrap_err_with(|| format!("binding {bind}"))?;

    info!(
        target: "carbon_dashboard::server",
        config = ?metadata.path(),
        default_country = context.config().default_country(),
        max_ticks = context.config().max_ticks(),
        "carbon dashboard ready"
    );

    server::serve(listener, context).await?;
    Ok(())
}
