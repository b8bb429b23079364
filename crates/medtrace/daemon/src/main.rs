//! medtrace daemon - medicine provenance ledger over HTTP

use clap::{Parser, ValueEnum};
use medtrace_daemon::error::{DaemonError, DaemonResult};
use medtrace_daemon::{DaemonConfig, Server, StorageConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// medtrace daemon CLI
#[derive(Parser)]
#[command(name = "medtraced")]
#[command(about = "medtrace - Medicine provenance ledger daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MEDTRACE_CONFIG")]
    config: Option<String>,

    /// Listen address, overrides the configuration file
    #[arg(short, long, env = "MEDTRACE_LISTEN_ADDR")]
    listen: Option<String>,

    /// Log level, used when RUST_LOG is unset
    #[arg(long, env = "MEDTRACE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "MEDTRACE_LOG_JSON")]
    json: bool,

    /// World state backend
    #[arg(long, value_enum)]
    storage: Option<StorageKind>,

    /// PostgreSQL connection URL, implies `--storage postgres`
    #[arg(long, env = "MEDTRACE_DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageKind {
    Memory,
    Postgres,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    match (cli.storage, cli.database_url) {
        (Some(StorageKind::Memory), _) => config.storage = StorageConfig::Memory,
        (_, Some(url)) => config.storage = StorageConfig::postgres(url),
        (Some(StorageKind::Postgres), None) => {
            if !matches!(config.storage, StorageConfig::Postgres { .. }) {
                return Err(DaemonError::Config(
                    "--storage postgres requires --database-url".to_string(),
                ));
            }
        }
        (None, None) => {}
    }

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        "============ medtrace daemon starts ============"
    );

    let server = Server::new(config).await?;
    server.run().await?;

    tracing::info!("============ medtrace daemon stopped ============");
    Ok(())
}
