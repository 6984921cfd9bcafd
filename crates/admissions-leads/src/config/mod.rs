use chrono::{FixedOffset, Offset, Utc};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;
const DEFAULT_EVALUATION_DELAY_MS: u64 = 3000;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Staging,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "staging" | "stage" => Self::Staging,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }

    /// Suffix appended to every tracking event name before it leaves the service.
    pub const fn event_suffix(self) -> &'static str {
        match self {
            Self::Production => "_prod",
            Self::Staging => "_staging",
            Self::Development | Self::Test => "_dev",
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub leads: LeadConfig,
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

        let utc_offset_minutes = match env::var("LEADS_UTC_OFFSET_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|_| ConfigError::InvalidUtcOffset { value: raw.clone() })?,
            Err(_) => DEFAULT_UTC_OFFSET_MINUTES,
        };
        let utc_offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset {
                value: utc_offset_minutes.to_string(),
            })?;

        let evaluation_delay_ms = match env::var("LEADS_EVALUATION_DELAY_MS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidEvaluationDelay)?,
            Err(_) => DEFAULT_EVALUATION_DELAY_MS,
        };

        let event_suffix = env::var("LEADS_EVENT_SUFFIX")
            .unwrap_or_else(|_| environment.event_suffix().to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            leads: LeadConfig {
                utc_offset,
                evaluation_delay_ms,
                event_suffix,
            },
        })
    }
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

/// Lead-capture settings: the counselors' local clock, the interstitial shown before
/// the booking page, and the transport suffix for tracking events.
#[derive(Debug, Clone)]
pub struct LeadConfig {
    pub utc_offset: FixedOffset,
    pub evaluation_delay_ms: u64,
    pub event_suffix: String,
}

impl Default for LeadConfig {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
                .unwrap_or_else(|| Utc.fix()),
            evaluation_delay_ms: DEFAULT_EVALUATION_DELAY_MS,
            event_suffix: AppEnvironment::Development.event_suffix().to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidUtcOffset { value: String },
    InvalidEvaluationDelay,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidUtcOffset { value } => write!(
                f,
                "LEADS_UTC_OFFSET_MINUTES must be whole minutes within +/-24h (got '{}')",
                value
            ),
            ConfigError::InvalidEvaluationDelay => {
                write!(f, "LEADS_EVALUATION_DELAY_MS must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidUtcOffset { .. }
            | ConfigError::InvalidEvaluationDelay => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("LEADS_UTC_OFFSET_MINUTES");
        env::remove_var("LEADS_EVALUATION_DELAY_MS");
        env::remove_var("LEADS_EVENT_SUFFIX");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.leads.utc_offset.local_minus_utc(), 330 * 60);
        assert_eq!(config.leads.evaluation_delay_ms, 3000);
        assert_eq!(config.leads.event_suffix, "_dev");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn event_suffix_follows_environment_unless_overridden() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.leads.event_suffix, "_prod");

        env::set_var("APP_ENV", "staging");
        env::set_var("LEADS_EVENT_SUFFIX", "_qa");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Staging);
        assert_eq!(config.leads.event_suffix, "_qa");
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_utc_offset() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEADS_UTC_OFFSET_MINUTES", "5000");
        match AppConfig::load() {
            Err(ConfigError::InvalidUtcOffset { value }) => assert_eq!(value, "5000"),
            other => panic!("expected invalid offset, got {other:?}"),
        }

        env::set_var("LEADS_UTC_OFFSET_MINUTES", "ist");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidUtcOffset { .. })
        ));
        reset_env();
    }
}
