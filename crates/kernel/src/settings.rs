use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use libris_db::DbConfig;
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "LIBRIS_ENV";
const CONFIG_DIR_ENV: &str = "LIBRIS_CONFIG_DIR";
const ENV_PREFIX: &str = "LIBRIS";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    fn parse(name: &str) -> anyhow::Result<Self> {
        match name {
            "local" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" => Ok(Environment::Production),
            other => Err(anyhow!(
                "unsupported environment '{}'; expected local/staging/production",
                other
            )),
        }
    }
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&environment, &config_dir)
    }

    /// Load `base.toml` and `{environment}.toml` from `config_dir`, then apply
    /// `LIBRIS_*` variables (`__` separates nested keys, e.g. `LIBRIS_SERVER__PORT`).
    pub fn load_from(environment: &str, config_dir: &Path) -> anyhow::Result<Self> {
        let parsed_environment = Environment::parse(environment)?;

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let cfg = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "ServerSettings::default_host")]
    pub host: String,
    #[serde(default = "ServerSettings::default_port")]
    pub port: u16,
    #[serde(default = "ServerSettings::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_request_timeout_ms() -> u64 {
        15000
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_ms: Self::default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_url")]
    pub url: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseSettings::default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl DatabaseSettings {
    fn default_url() -> String {
        "sqlite://livros.db".to_string()
    }

    fn default_max_connections() -> u32 {
        5
    }

    fn default_acquire_timeout_ms() -> u64 {
        5000
    }

    /// Pool parameters for the storage layer.
    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_millis(self.acquire_timeout_ms),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
            acquire_timeout_ms: Self::default_acquire_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
    /// Default filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "TelemetrySettings::default_level")]
    pub level: String,
}

impl TelemetrySettings {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
