mod cli;
mod stdio;

use ciska_common::{ConfigError, EventBus};
use ciska_config::{AppConfig, ConfigStore};
use ciska_message::{Host, NullPicker, ShellUseCases};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIRECTIVE: &str = "ciska=info";

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    // stdout carries the protocol, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Create the config file if needed, then load it. Runs before logging is
/// installed, so the creation flag is returned for main to report.
fn load_startup_config(store: &ConfigStore) -> Result<(AppConfig, bool), ConfigError> {
    let created = store.ensure_exists()?;
    Ok((store.load()?, created))
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let store = match &args.config_dir {
        Some(dir) => Ok(ConfigStore::new(dir.clone())),
        None => ConfigStore::for_environment(&args.env),
    };
    let loaded = store
        .as_ref()
        .map_err(|e| e.to_string())
        .and_then(|s| load_startup_config(s).map_err(|e| e.to_string()));

    let directive = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().and_then(|(c, _)| c.log_level.clone()))
        .unwrap_or_else(|| DEFAULT_LOG_DIRECTIVE.to_string());
    init_logging(&directive);

    tracing::info!("Ciska v{} starting (env: {})", env!("CARGO_PKG_VERSION"), args.env);

    let store = match store {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("cannot locate config: {e}");
            std::process::exit(1);
        }
    };
    let config = match loaded {
        Ok((config, created)) => {
            if created {
                tracing::info!("Created default config at {}", store.path().display());
            } else {
                tracing::info!("Config at {}", store.path().display());
            }
            config
        }
        Err(e) => {
            tracing::warn!("Config load failed, using defaults: {e}");
            AppConfig::default()
        }
    };

    let events = EventBus::new(config.event_capacity as usize);
    let host = Host::new(ShellUseCases::new(store), NullPicker, events);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    if let Err(e) = stdio::run(&host, stdin, stdout).await {
        tracing::error!("Host loop error: {e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_load_reports_creation_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("development"));

        let (config, created) = load_startup_config(&store).unwrap();
        assert!(created);
        assert_eq!(config, AppConfig::default());

        let (_, created) = load_startup_config(&store).unwrap();
        assert!(!created);
    }

    #[test]
    fn startup_load_keeps_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        std::fs::write(store.path(), r#"{"log_level":"ciska=debug"}"#).unwrap();

        let (config, created) = load_startup_config(&store).unwrap();
        assert!(!created);
        assert_eq!(config.log_level.as_deref(), Some("ciska=debug"));
    }
}
