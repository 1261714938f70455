use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ForecastConfig {
    /// IANA zone used for day boundaries
    pub timezone: Option<String>,
    /// Default display units ("metric" or "imperial")
    pub units: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub server: Option<ServerConfig>,
    pub upstream: Option<UpstreamConfig>,
    pub forecast: Option<ForecastConfig>,
    pub cors: Option<CorsConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),
    #[error("Invalid PORT: {0}")]
    InvalidPort(String),
    #[error("Invalid bind address: {0}")]
    InvalidBind(String),
}

impl AppConfig {
    /// Load configuration from WXDASH_CONFIG path (TOML) if present, with reasonable defaults.
    /// PORT, when set, replaces the port of the bind address.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("WXDASH_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = Self::from_path(&path)?;
        if let Ok(port) = std::env::var("PORT") {
            cfg.apply_port(&port)?;
        }
        Ok(cfg)
    }

    /// Read a TOML file, falling back to defaults when it does not exist
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    fn apply_port(&mut self, port: &str) -> Result<(), ConfigError> {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port.to_string()))?;
        let bind = self.bind_address();
        let host = bind.rsplit_once(':').map(|(h, _)| h).unwrap_or("0.0.0.0");
        self.server.get_or_insert_with(ServerConfig::default).bind = Some(format!("{host}:{port}"));
        Ok(())
    }

    fn bind_address(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
    }

    /// Get HTTP bind address (default 0.0.0.0:3000)
    pub fn http_bind(&self) -> Result<SocketAddr, ConfigError> {
        let bind = self.bind_address();
        bind.trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind))
    }

    /// Get upstream API base URL
    pub fn upstream_base_url(&self) -> String {
        self.upstream
            .as_ref()
            .and_then(|u| u.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn upstream_timeout_secs(&self) -> u64 {
        self.upstream
            .as_ref()
            .and_then(|u| u.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Time zone for forecast day boundaries (default UTC)
    pub fn forecast_timezone(&self) -> Result<chrono_tz::Tz, ConfigError> {
        let name = self
            .forecast
            .as_ref()
            .and_then(|f| f.timezone.as_deref())
            .unwrap_or(DEFAULT_TIMEZONE);
        name.parse::<chrono_tz::Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
    }

    /// Default display units, "metric" unless configured
    pub fn default_units(&self) -> String {
        self.forecast
            .as_ref()
            .and_then(|f| f.units.clone())
            .unwrap_or_else(|| "metric".to_string())
    }

    /// Allowed CORS origins; `None` means any origin
    pub fn cors_origins(&self) -> Option<Vec<String>> {
        self.cors
            .as_ref()
            .and_then(|c| c.allowed_origins.clone())
            .filter(|origins| !origins.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.http_bind().unwrap().to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.upstream_base_url(), "https://api.openweathermap.org/data/2.5");
        assert_eq!(cfg.upstream_timeout_secs(), 10);
        assert_eq!(cfg.forecast_timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(cfg.default_units(), "metric");
        assert!(cfg.cors_origins().is_none());
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
bind = "127.0.0.1:8080"

[upstream]
base_url = "http://localhost:9999"
timeout_secs = 3

[forecast]
timezone = "Europe/Berlin"
units = "imperial"

[cors]
allowed_origins = ["https://example.com"]
"#
        )
        .unwrap();

        let cfg = AppConfig::from_path(file.path()).unwrap();
        assert_eq!(cfg.http_bind().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.upstream_base_url(), "http://localhost:9999");
        assert_eq!(cfg.upstream_timeout_secs(), 3);
        assert_eq!(cfg.forecast_timezone().unwrap(), chrono_tz::Europe::Berlin);
        assert_eq!(cfg.default_units(), "imperial");
        assert_eq!(cfg.cors_origins().unwrap(), vec!["https://example.com".to_string()]);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.http_bind().unwrap().port(), 3000);
    }

    #[test]
    fn invalid_timezone_is_reported() {
        let cfg = AppConfig {
            forecast: Some(ForecastConfig {
                timezone: Some("Mars/Olympus".into()),
                units: None,
            }),
            ..Default::default()
        };
        assert!(matches!(
            cfg.forecast_timezone(),
            Err(ConfigError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn port_overrides_bind() {
        let mut cfg = AppConfig::default();
        cfg.apply_port("8081").unwrap();
        assert_eq!(cfg.http_bind().unwrap().to_string(), "0.0.0.0:8081");
        assert!(matches!(
            cfg.apply_port("not-a-port"),
            Err(ConfigError::InvalidPort(_))
        ));
    }

    #[test]
    fn invalid_bind_is_reported() {
        let cfg = AppConfig {
            server: Some(ServerConfig {
                bind: Some("localhost:http".into()),
            }),
            ..Default::default()
        };
        assert!(matches!(cfg.http_bind(), Err(ConfigError::InvalidBind(_))));
    }
}
