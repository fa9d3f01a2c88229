use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use windns_api::executor::DynExecutor;
use windns_api::{Config, PowershellExecutor, RecordService, SharedConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("windns-api".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    if config.acl.is_empty() {
        tracing::warn!("no ACL configured, any client may create and delete records");
    }
    if !config.command_timeout_fits() {
        tracing::warn!(
            "command_timeout of {:?} can't run {} commands within api_timeout of {:?}, slow creates will time out as HTTP 408",
            config.powershell.command_timeout,
            windns_api::config::MAX_COMMANDS_PER_REQUEST,
            config.api_timeout
        );
    }
    match config.dns.server_name() {
        Some(server) => tracing::info!("managing records on DNS server {server}"),
        None => tracing::info!("managing records on the local DNS server"),
    }

    let executor: DynExecutor = Arc::new(PowershellExecutor::new(&config.powershell));
    let records = RecordService::new(config.dns.clone(), executor);

    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = windns_api::new_http(config.clone(), records, shutdown_signal())?;
    api_server.await?;

    tracing::info!("goodbye");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("could not listen for shutdown signal: {err}");
        return;
    }
    tracing::info!("quitting from signal");
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "windns_api=info,tower_http=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            tracing::debug!("loaded config from {config_file}");
            let config = Config::try_from_file(&config_file)?;
            Ok(Arc::new(config))
        }
    }
}
