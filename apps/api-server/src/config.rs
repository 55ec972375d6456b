//! Application configuration loaded from environment variables.

use std::env;

#[cfg(feature = "postgres")]
use relief_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use relief_infra::RedisConfig;
use relief_infra::GeocoderConfig;

use crate::telemetry::TelemetryConfig;

/// Which cache backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    /// Postgres when `DATABASE_URL` is set, memory otherwise.
    Auto,
    Postgres,
    Redis,
    Memory,
}

impl CacheBackendKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "postgres" => Some(Self::Postgres),
            "redis" => Some(Self::Redis),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Which notification bus to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyBackendKind {
    Memory,
    Redis,
}

impl NotifyBackendKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cache_backend: CacheBackendKind,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: RedisConfig,
    pub notify_backend: NotifyBackendKind,
    pub notify_buffer_size: usize,
    pub geocoder: GeocoderConfig,
    /// Cron expression for purging expired rows. `None` keeps expiry lazy.
    pub purge_schedule: Option<String>,
    pub telemetry: TelemetryConfig,
    /// Settings ignored while loading, reported once logging is up.
    pub rejected: Vec<RejectedSetting>,
}

/// An environment value that was not understood and fell back to a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSetting {
    pub var: String,
    pub value: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut rejected = Vec::new();
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cache_backend: parse_kind(
                "CACHE_BACKEND",
                env::var("CACHE_BACKEND").ok(),
                CacheBackendKind::parse,
                &mut rejected,
            )
            .unwrap_or(CacheBackendKind::Auto),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: RedisConfig::from_env(),
            notify_backend: parse_kind(
                "NOTIFY_BACKEND",
                env::var("NOTIFY_BACKEND").ok(),
                NotifyBackendKind::parse,
                &mut rejected,
            )
            .unwrap_or(NotifyBackendKind::Memory),
            notify_buffer_size: env::var("NOTIFY_BUFFER_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            geocoder: GeocoderConfig::from_env(),
            purge_schedule: env::var("CACHE_PURGE_SCHEDULE")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            telemetry: TelemetryConfig::from_env(),
            rejected,
        }
    }

    /// Log settings that were ignored. Call after telemetry is initialized.
    pub fn warn_rejected(&self) {
        for setting in &self.rejected {
            tracing::warn!(
                var = %setting.var,
                value = %setting.value,
                "Ignoring unknown setting, using default"
            );
        }
    }
}

fn parse_kind<T>(
    var: &str,
    raw: Option<String>,
    parse: fn(&str) -> Option<T>,
    rejected: &mut Vec<RejectedSetting>,
) -> Option<T> {
    let raw = raw?;
    let kind = parse(&raw);
    if kind.is_none() {
        rejected.push(RejectedSetting {
            var: var.to_string(),
            value: raw,
        });
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names() {
        assert_eq!(CacheBackendKind::parse(" Postgres "), Some(CacheBackendKind::Postgres));
        assert_eq!(CacheBackendKind::parse("memory"), Some(CacheBackendKind::Memory));
        assert_eq!(CacheBackendKind::parse("sqlite"), None);
        assert_eq!(NotifyBackendKind::parse("REDIS"), Some(NotifyBackendKind::Redis));
    }

    #[test]
    fn test_unknown_backend_is_recorded() {
        let mut rejected = Vec::new();

        let kind = parse_kind(
            "CACHE_BACKEND",
            Some("sqlite".to_string()),
            CacheBackendKind::parse,
            &mut rejected,
        );
        assert_eq!(kind, None);

        let unset = parse_kind("NOTIFY_BACKEND", None, NotifyBackendKind::parse, &mut rejected);
        assert_eq!(unset, None);

        assert_eq!(
            rejected,
            vec![RejectedSetting {
                var: "CACHE_BACKEND".to_string(),
                value: "sqlite".to_string(),
            }]
        );
    }
}
