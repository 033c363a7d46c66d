use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::MatcherLimits;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub geocoding: GeocodingSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Shared tier; the service falls back to in-process caching when unset or unreachable
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingSettings {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

/// Search tuning
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    #[serde(default = "default_alert_preview_limit")]
    pub alert_preview_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            default_radius_km: default_radius_km(),
            alert_preview_limit: default_alert_preview_limit(),
        }
    }
}

impl SearchSettings {
    /// Reject values that would otherwise surface as client errors on every request
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(ConfigError::Message(
                "search.default_page_size and search.max_page_size must be at least 1".to_string(),
            ));
        }
        if !self.default_radius_km.is_finite() || self.default_radius_km < 0.0 {
            return Err(ConfigError::Message(format!(
                "search.default_radius_km must be a non-negative number, got {}",
                self.default_radius_km
            )));
        }
        Ok(())
    }

    pub fn limits(&self) -> MatcherLimits {
        MatcherLimits {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            alert_preview_limit: self.alert_preview_limit,
        }
    }
}

fn default_page_size() -> u32 { 12 }
fn default_max_page_size() -> u32 { 100 }
fn default_radius_km() -> f64 { 10.0 }
fn default_alert_preview_limit() -> usize { 20 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration files (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with IMMO__)
    /// 4. DATABASE_URL and GEOCODING_API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., IMMO__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        let settings: Settings = substitute_env_vars(settings)?.try_deserialize()?;
        settings.search.validate()?;

        Ok(settings)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("IMMO")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional unprefixed variables on top of the loaded config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(api_key) = env::var("GEOCODING_API_KEY") {
        builder = builder.set_override("geocoding.api_key", api_key)?;
    }

    builder.build()
}
