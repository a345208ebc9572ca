use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::recruitment::{FanOutMode, MatchingSettings, ServiceSettings};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub matching: MatchingConfig,
    pub notification: NotificationConfig,
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

        let fan_out_concurrency = positive_var("MATCH_FANOUT_CONCURRENCY", 8)?;
        let scoring_timeout = Duration::from_millis(positive_var("MATCH_SCORING_TIMEOUT_MS", 5_000)?);
        let fan_out_mode = match env::var("MATCH_FANOUT_MODE") {
            Err(_) => FanOutMode::Background,
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "background" => FanOutMode::Background,
                "inline" => FanOutMode::Inline,
                _ => return Err(ConfigError::InvalidFanOutMode(raw)),
            },
        };

        let smtp_username = non_empty_var("SMTP_USERNAME");
        let sender = non_empty_var("NOTIFY_FROM_EMAIL")
            .or_else(|| non_empty_var("FROM_EMAIL"))
            .or_else(|| smtp_username.clone());
        let dispatch_timeout = Duration::from_millis(positive_var("NOTIFY_TIMEOUT_MS", 10_000)?);
        let smtp = match non_empty_var("SMTP_SERVER") {
            None => None,
            Some(host) => {
                let port = match env::var("SMTP_PORT") {
                    Err(_) => 587,
                    Ok(raw) => raw
                        .trim()
                        .parse::<u16>()
                        .map_err(|_| ConfigError::InvalidNumber {
                            name: "SMTP_PORT",
                            value: raw,
                        })?,
                };
                let starttls = match env::var("SMTP_STARTTLS") {
                    Err(_) => true,
                    Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                        "1" | "true" | "yes" => true,
                        "0" | "false" | "no" => false,
                        _ => return Err(ConfigError::InvalidFlag {
                            name: "SMTP_STARTTLS",
                            value: raw,
                        }),
                    },
                };
                Some(SmtpConfig {
                    host,
                    port,
                    username: smtp_username,
                    password: non_empty_var("SMTP_PASSWORD"),
                    starttls,
                })
            }
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            matching: MatchingConfig {
                fan_out_concurrency: fan_out_concurrency as usize,
                scoring_timeout,
                fan_out_mode,
            },
            notification: NotificationConfig {
                sender,
                dispatch_timeout,
                smtp,
            },
        })
    }

    pub fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            matching: MatchingSettings {
                fan_out_concurrency: self.matching.fan_out_concurrency,
                scoring_timeout: self.matching.scoring_timeout,
            },
            fan_out_mode: self.matching.fan_out_mode,
            dispatch_timeout: self.notification.dispatch_timeout,
        }
    }
}

fn positive_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidNumber { name, value: raw }),
        },
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
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
    pub ansi: bool,
}

/// Scoring fan-out controls.
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub fan_out_concurrency: usize,
    pub scoring_timeout: Duration,
    pub fan_out_mode: FanOutMode,
}

/// Shortlist notification settings. Delivery needs both a sender and an SMTP relay.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub sender: Option<String>,
    pub dispatch_timeout: Duration,
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay used for shortlist e-mail.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub starttls: bool,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("starttls", &self.starttls)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidFanOutMode(String),
    InvalidFlag { name: &'static str, value: String },
    InvalidNotification(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a positive integer, got '{value}'")
            }
            ConfigError::InvalidFanOutMode(value) => write!(
                f,
                "MATCH_FANOUT_MODE must be 'background' or 'inline', got '{value}'"
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
            ConfigError::InvalidNotification(reason) => {
                write!(f, "notification settings rejected: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFanOutMode(_)
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidNotification(_) => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "MATCH_FANOUT_CONCURRENCY",
            "MATCH_SCORING_TIMEOUT_MS",
            "MATCH_FANOUT_MODE",
            "NOTIFY_FROM_EMAIL",
            "NOTIFY_TIMEOUT_MS",
            "FROM_EMAIL",
            "SMTP_SERVER",
            "SMTP_PORT",
            "SMTP_USERNAME",
            "SMTP_PASSWORD",
            "SMTP_STARTTLS",
        ] {
            env::remove_var(name);
        }
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
        assert_eq!(config.matching.fan_out_concurrency, 8);
        assert_eq!(config.matching.scoring_timeout, Duration::from_secs(5));
        assert_eq!(config.matching.fan_out_mode, FanOutMode::Background);
        assert!(config.notification.sender.is_none());
        assert!(config.notification.smtp.is_none());
    }

    #[test]
    fn smtp_relay_settings_are_read_with_sender_fallback() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SMTP_SERVER", "smtp.example.com");
        env::set_var("SMTP_USERNAME", "recruiting@example.com");
        env::set_var("SMTP_PASSWORD", "hunter2");
        env::set_var("SMTP_STARTTLS", "false");

        let config = AppConfig::load().expect("config loads");
        let smtp = config.notification.smtp.clone().expect("relay configured");
        assert_eq!(smtp.host, "smtp.example.com");
        assert_eq!(smtp.port, 587);
        assert!(!smtp.starttls);
        assert_eq!(
            config.notification.sender.as_deref(),
            Some("recruiting@example.com")
        );
        assert!(!format!("{smtp:?}").contains("hunter2"));

        env::set_var("SMTP_PORT", "mail");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber { name: "SMTP_PORT", .. })
        ));
        reset_env();
    }

    #[test]
    fn matching_overrides_flow_into_service_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MATCH_FANOUT_CONCURRENCY", "3");
        env::set_var("MATCH_SCORING_TIMEOUT_MS", "250");
        env::set_var("MATCH_FANOUT_MODE", "Inline");
        env::set_var("NOTIFY_FROM_EMAIL", "talent@example.com");

        let config = AppConfig::load().expect("config loads");
        let settings = config.service_settings();
        assert_eq!(settings.matching.fan_out_concurrency, 3);
        assert_eq!(settings.matching.scoring_timeout, Duration::from_millis(250));
        assert_eq!(settings.fan_out_mode, FanOutMode::Inline);
        assert_eq!(
            config.notification.sender.as_deref(),
            Some("talent@example.com")
        );
        reset_env();
    }

    #[test]
    fn rejects_zero_concurrency_and_unknown_mode() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("MATCH_FANOUT_CONCURRENCY", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                name: "MATCH_FANOUT_CONCURRENCY",
                ..
            })
        ));

        reset_env();
        env::set_var("MATCH_FANOUT_MODE", "eventually");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFanOutMode(_))
        ));
        reset_env();
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
}
