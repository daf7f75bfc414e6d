use std::{env, net::IpAddr, str::FromStr, time::Duration};

use dotenvy::dotenv;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

// Server-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub workers: usize,
    pub read_timeout_seconds: u64,
    /// Trust `Forwarded`/`X-Forwarded-For` when identifying the requester
    pub behind_proxy: bool,
}

// Application-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub environment: Environment,
    pub log_level: String,
}

// Environment enum for different deployment environments
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Testing,
    Production,
}

// Implement FromStr trait for Environment enum to enable parsing from string
impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!(
                "Invalid environment: {}. Must be one of: development, testing, production",
                s
            )),
        }
    }
}

// Result type for configuration functions
type ConfigResult<T> = Result<T, ConfigError>;

// Database Config
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub use_migrations: bool,
    pub connect_timeout_seconds: u64,
    pub create_database_if_missing: bool,
}

// Shortener behaviour
#[derive(Clone, Deserialize)]
pub struct ShortenerConfig {
    /// Prefix of every short URL, also the fallback redirect target
    pub base_url: String,
    pub site_title: String,
    pub site_header: String,
    /// Creations allowed per IP between two resets
    pub max_rate: u32,
    pub rate_reset_seconds: u64,
    pub analytics_window_hours: i64,
    pub admin_key: String,
}

impl ShortenerConfig {
    /// Interval between two rate limit resets, never zero
    pub fn rate_reset_period(&self) -> ConfigResult<Duration> {
        if self.rate_reset_seconds == 0 {
            return Err(ConfigError::ParseError(
                "SHORTENER_RATE_RESET_SECONDS must be at least 1".to_string(),
            ));
        }
        Ok(Duration::from_secs(self.rate_reset_seconds))
    }

    /// Span the analytics counters look back over
    pub fn analytics_window(&self) -> ConfigResult<chrono::Duration> {
        if self.analytics_window_hours <= 0 {
            return Err(ConfigError::ParseError(
                "SHORTENER_ANALYTICS_WINDOW_HOURS must be at least 1".to_string(),
            ));
        }
        chrono::Duration::try_hours(self.analytics_window_hours).ok_or_else(|| {
            ConfigError::ParseError(format!(
                "SHORTENER_ANALYTICS_WINDOW_HOURS is out of range: {}",
                self.analytics_window_hours
            ))
        })
    }

    fn validate(&self) -> ConfigResult<()> {
        self.rate_reset_period()?;
        self.analytics_window()?;
        Ok(())
    }
}

// Hand-written so the admin key never reaches the logs
impl std::fmt::Debug for ShortenerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShortenerConfig")
            .field("base_url", &self.base_url)
            .field("site_title", &self.site_title)
            .field("site_header", &self.site_header)
            .field("max_rate", &self.max_rate)
            .field("rate_reset_seconds", &self.rate_reset_seconds)
            .field("analytics_window_hours", &self.analytics_window_hours)
            .field("admin_key", &"<redacted>")
            .finish()
    }
}

// Config struct that matches our environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub db: DatabaseConfig,
    pub shortener: ShortenerConfig,
}

impl Config {
    // Load configuration from environment variables
    pub fn load() -> ConfigResult<Self> {
        // Load .env file if it exists
        match dotenv() {
            Ok(_) => debug!(".env file loaded successfully"),
            Err(e) => warn!("Could not load .env file: {}", e),
        }

        // Create the server config
        let server = ServerConfig {
            host: get_env_or_default("SERVER_HOST", "127.0.0.1")?,
            port: get_env_or_default("SERVER_PORT", "8000")?,
            workers: get_env_or_default("SERVER_WORKERS", "4")?,
            read_timeout_seconds: get_env_or_default("SERVER_READ_TIMEOUT_SECONDS", "5")?,
            behind_proxy: get_env_or_default("SERVER_BEHIND_PROXY", "false")?,
        };

        // Get version from Cargo.toml or environment
        let version = option_env!("CARGO_PKG_VERSION")
            .unwrap_or("0.1.0")
            .to_string();

        // Create the app config
        let app = AppConfig {
            name: get_env_or_default("APP_NAME", "anoni-shortener")?,
            version: env::var("APP_VERSION").unwrap_or(version),
            environment: get_env_or_default("APP_ENVIRONMENT", "development")?,
            log_level: get_env_or_default("RUST_LOG", "info")?,
        };

        // Database config
        let db = DatabaseConfig {
            url: get_env_or_default("DATABASE_URL", "sqlite://sessions.db")?,
            max_connections: get_env_or_default("DATABASE_MAX_CONNECTIONS", "5")?,
            connect_timeout_seconds: get_env_or_default("DATABASE_CONNECT_TIMEOUT_SECONDS", "5")?,
            use_migrations: get_env_or_default("DATABASE_USE_MIGRATIONS", "true")?,
            create_database_if_missing: get_env_or_default(
                "DATABASE_CREATE_DATABASE_IF_MISSING",
                "true",
            )?,
        };

        let shortener = ShortenerConfig {
            base_url: get_env_or_default("SHORTENER_BASE_URL", "https://anoni.sh/")?,
            site_title: get_env_or_default("SHORTENER_SITE_TITLE", "Anoni.sh URL Shortener")?,
            site_header: get_env_or_default("SHORTENER_SITE_HEADER", "anoni.sh")?,
            max_rate: get_env_or_default("SHORTENER_MAX_RATE", "10")?,
            rate_reset_seconds: get_env_or_default("SHORTENER_RATE_RESET_SECONDS", "3600")?,
            analytics_window_hours: get_env_or_default("SHORTENER_ANALYTICS_WINDOW_HOURS", "24")?,
            admin_key: get_required_env("ADMIN_KEY")?,
        };
        shortener.validate()?;

        let config = Config {
            db,
            app,
            server,
            shortener,
        };
        info!("Configuration loaded successfully");
        debug!("Loaded config: {:?}", config);

        Ok(config)
    }
}

/// Helper function to get an env variable with a default value
fn get_env_or_default<T: FromStr>(key: &str, default: &str) -> ConfigResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(format!("Could not parse {}: {}", key, e))),
        Err(env::VarError::NotPresent) => {
            debug!("{} not set, using default: {}", key, default);
            default.parse::<T>().map_err(|e| {
                ConfigError::ParseError(format!("Could not parse default for {}: {}", key, e))
            })
        }
        Err(e) => Err(ConfigError::EnvVarError(e)),
    }
}

/// Helper function for variables the service cannot start without
fn get_required_env(key: &str) -> ConfigResult<String> {
    match env::var(key) {
        Ok(val) if !val.is_empty() => Ok(val),
        Ok(_) | Err(env::VarError::NotPresent) => Err(ConfigError::MissingVar(key.to_string())),
        Err(e) => Err(ConfigError::EnvVarError(e)),
    }
}
