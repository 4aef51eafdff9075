use anyhow::{Context, Result};
use hostmon_agent::config::{AgentConfig, ConfigManager};
use hostmon_agent::data_source::{DataSource, KeyProcessor};
use hostmon_agent::items::Catalog;
use hostmon_agent::server::{serve, spawn_collection};
use hostmon_agent::source::TomlSourceLoader;
use hostmon_collector::fs::RealFs;
use hostmon_collector::linux::Linux;
use hostmon_collector::provider::HostStatsProvider;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn env_filter(directives: Option<&str>) -> Result<EnvFilter> {
    match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log_filter {directives:?}")),
        None => Ok(EnvFilter::from_default_env().add_directive("hostmon=info".parse()?)),
    }
}

fn apply_log_filter(handle: &FilterHandle, config: &AgentConfig) {
    match env_filter(config.log_filter.as_deref()) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                tracing::warn!(error = %e, "Failed to apply log filter");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Keeping previous log filter"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "config/agent.toml".to_string()),
    );

    let (filter, filter_handle) = reload::Layer::new(env_filter(None)?);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bootstrap = AgentConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    apply_log_filter(&filter_handle, &bootstrap);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hostmon-agent starting");

    let provider: Arc<dyn HostStatsProvider> = Arc::new(Linux::with_fs(
        Arc::new(RealFs::new()),
        bootstrap.history_retention_secs,
    ));
    let catalog = Arc::new(Catalog::new(Arc::clone(&provider)));
    let loader = Arc::new(TomlSourceLoader::new(Arc::clone(&catalog)));
    let manager = Arc::new(ConfigManager::new(
        config_path,
        loader,
        catalog.default_items(),
    ));
    let config = manager.update_config()?;

    let collection = spawn_collection(
        Arc::clone(&provider),
        Duration::from_secs(config.collection_interval_secs),
    );

    let processor: Arc<dyn KeyProcessor> = Arc::new(DataSource::new(manager.registry()));
    let listen = config.listen_address();
    let listener = TcpListener::bind(&listen)
        .await
        .with_context(|| format!("binding {listen}"))?;
    let server = tokio::spawn(serve(
        listener,
        processor,
        Duration::from_secs(config.io_timeout_secs),
    ));

    let mut hangup = unix_signal(SignalKind::hangup())?;
    loop {
        tokio::select! {
            _ = hangup.recv() => {
                tracing::info!("Reloading configuration");
                let manager = Arc::clone(&manager);
                match tokio::task::spawn_blocking(move || manager.update_config()).await {
                    Ok(Ok(config)) => {
                        apply_log_filter(&filter_handle, &config);
                        if config.listen_address() != listen {
                            tracing::warn!(
                                current = %listen,
                                configured = %config.listen_address(),
                                "Listen address changes take effect on restart"
                            );
                        }
                    }
                    Ok(Err(e)) => tracing::error!(error = %e, "Reload failed, keeping previous items"),
                    Err(e) => tracing::error!(error = %e, "Reload task failed"),
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    collection.abort();
    server.abort();
    Ok(())
}
