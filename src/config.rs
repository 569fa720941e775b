use std::env;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::info;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Application configuration, loaded from defaults, optional `config/` files,
/// and `APP__`-prefixed environment variables (later sources win).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Deployment environment name (development, production, ...)
    pub environment: String,

    /// Base log level when RUST_LOG is not set
    pub log_level: String,

    /// Emit logs as JSON
    pub log_json: bool,

    /// Directory holding the durable session documents (cart, orders)
    pub data_dir: String,

    /// Artificial latency of the simulated payment authorization step
    pub payment_delay_ms: u64,

    /// Allow any CORS origin (implied in development)
    pub cors_allow_any_origin: bool,
}

impl AppConfig {
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Loads configuration for the environment selected by `RUN_ENV`/`APP_ENV`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8080i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("data_dir", "data")?
        .set_default("payment_delay_ms", 1500i64)?
        .set_default("cors_allow_any_origin", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

/// Initializes the global tracing subscriber. `RUST_LOG` overrides the
/// configured level. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("darna_api={},tower_http=debug", level);
    let directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let filter = EnvFilter::new(directive);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
            .ok();
    }
}
