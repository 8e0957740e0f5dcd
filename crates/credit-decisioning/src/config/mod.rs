use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

const DEFAULT_BUREAU_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub bureau: BureauConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let timeout_secs = match non_empty_var("BUREAU_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidBureauTimeout { value: raw })?,
            None => DEFAULT_BUREAU_TIMEOUT_SECS,
        };

        let bureau = BureauConfig {
            base_url: non_empty_var("BUREAU_BASE_URL"),
            api_key: non_empty_var("BUREAU_API_KEY"),
            timeout: Duration::from_secs(timeout_secs),
            tables_path: non_empty_var("BUREAU_TABLES_PATH").map(PathBuf::from),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            bureau,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Connection settings for the credit bureau collaborator.
///
/// Credentials are optional at load time so the service can still normalize
/// uploaded payloads; anything that actually calls the bureau must go through
/// [`BureauConfig::credentials`].
#[derive(Debug, Clone)]
pub struct BureauConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub tables_path: Option<PathBuf>,
}

/// Validated credentials required before any bureau call is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BureauCredentials {
    pub base_url: String,
    pub api_key: String,
}

impl BureauConfig {
    pub fn credentials(&self) -> Result<BureauCredentials, ConfigError> {
        let base_url = self
            .base_url
            .clone()
            .ok_or(ConfigError::MissingBureauCredentials {
                variable: "BUREAU_BASE_URL",
            })?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBureauUrl { value: base_url });
        }
        let api_key = self
            .api_key
            .clone()
            .ok_or(ConfigError::MissingBureauCredentials {
                variable: "BUREAU_API_KEY",
            })?;

        Ok(BureauCredentials { base_url, api_key })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBureauTimeout { value: String },
    InvalidBureauUrl { value: String },
    MissingBureauCredentials { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBureauTimeout { value } => write!(
                f,
                "BUREAU_TIMEOUT_SECS must be a positive number of seconds (found '{}')",
                value
            ),
            ConfigError::InvalidBureauUrl { value } => write!(
                f,
                "BUREAU_BASE_URL must start with http:// or https:// (found '{}')",
                value
            ),
            ConfigError::MissingBureauCredentials { variable } => {
                write!(f, "{} is required to call the credit bureau", variable)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidBureauTimeout { .. }
            | ConfigError::InvalidBureauUrl { .. }
            | ConfigError::MissingBureauCredentials { .. } => None,
        }
    }
}
