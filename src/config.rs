//! Application configuration
//!
//! Loaded from a TOML file (default `<config_dir>/venue-booking/config.toml`).
//! Every section and field has a default, so a missing file or a partial file
//! is valid. A few secrets can be overridden from the environment:
//! `DATABASE_URL`, `JWT_SECRET`, `PAYMENT_SERVER_KEY`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::booking::PollerConfig;
use crate::domain::slot::SlotGrid;
use crate::domain::venue::{NewVenue, SportType};
use crate::infrastructure::database::DatabaseConfig;
use crate::infrastructure::payment::PaymentGatewayConfig;
use crate::shared::retry::RetryConfig;

/// Environment variable naming an alternative config file
pub const CONFIG_ENV: &str = "VENUE_BOOKING_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("venue-booking")
        .join("config.toml")
}

// ── Sections ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for background work on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 4000,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Full connection URL; takes precedence over `path`
    pub url: Option<String>,
    /// SQLite file path
    pub path: String,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            path: "./venue-booking.db".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) if !url.trim().is_empty() => url.clone(),
            _ => format!("sqlite://{}?mode=rwc", self.path),
        }
    }

    pub fn to_database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.connection_url(),
            max_connections: self.max_connections,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_issuer: "venue-booking".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub opening_hour: u32,
    pub closing_hour: u32,
    pub slot_minutes: u32,
    /// Local `HH:MM` slot starts that are never bookable
    pub closed_slots: Vec<String>,
    pub utc_offset_minutes: i32,
    /// Minutes a booking may stay `PENDING` before it expires
    pub pending_ttl_minutes: i64,
    pub expiry_check_interval_secs: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            opening_hour: 8,
            closing_hour: 22,
            slot_minutes: 60,
            closed_slots: vec!["12:00".to_string()],
            utc_offset_minutes: 420,
            pending_ttl_minutes: 60,
            expiry_check_interval_secs: 60,
        }
    }
}

impl BookingConfig {
    pub fn slot_grid(&self) -> Result<SlotGrid, ConfigError> {
        let closed = self
            .closed_slots
            .iter()
            .map(|s| {
                NaiveTime::parse_from_str(s.trim(), "%H:%M")
                    .map_err(|e| ConfigError::Invalid(format!("closed slot '{}': {}", s, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        SlotGrid::new(
            self.opening_hour,
            self.closing_hour,
            self.slot_minutes,
            closed,
            self.utc_offset_minutes,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub base_url: String,
    pub server_key: String,
    pub finish_url: Option<String>,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://app.sandbox.midtrans.com".to_string(),
            server_key: String::new(),
            finish_url: None,
            request_timeout_secs: 5,
            max_attempts: 3,
        }
    }
}

impl PaymentConfig {
    pub fn gateway_config(&self) -> PaymentGatewayConfig {
        PaymentGatewayConfig {
            base_url: self.base_url.clone(),
            server_key: self.server_key.clone(),
            finish_url: self.finish_url.clone(),
            request_timeout: self.request_timeout(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::default().with_max_attempts(self.max_attempts)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSection {
    pub interval_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for PollerSection {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            fetch_timeout_secs: 5,
        }
    }
}

impl PollerSection {
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(self.interval_secs),
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}

/// Venue inserted into an empty catalog on startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueSeed {
    pub name: String,
    pub sport: String,
    #[serde(default)]
    pub location: String,
    pub price_per_hour: i64,
    #[serde(default)]
    pub facilities: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl VenueSeed {
    pub fn to_new_venue(&self) -> NewVenue {
        NewVenue {
            name: self.name.clone(),
            sport: SportType::parse(&self.sport),
            location: self.location.clone(),
            price_per_hour: self.price_per_hour,
            facilities: self.facilities.iter().map(|f| f.trim().to_string()).collect(),
            image_url: self.image_url.clone(),
        }
    }
}

fn default_venues() -> Vec<VenueSeed> {
    vec![
        VenueSeed {
            name: "Lapangan Futsal A".to_string(),
            sport: "FUTSAL".to_string(),
            location: "Jl. Jamin Ginting No. 37".to_string(),
            price_per_hour: 100_000,
            facilities: vec!["Parkir".to_string(), "Toilet".to_string()],
            image_url: None,
        },
        VenueSeed {
            name: "Lapangan Badminton 1".to_string(),
            sport: "BADMINTON".to_string(),
            location: "Jl. Jamin Ginting No. 37".to_string(),
            price_per_hour: 50_000,
            facilities: vec!["Parkir".to_string()],
            image_url: None,
        },
    ]
}

// ── AppConfig ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub booking: BookingConfig,
    pub payment: PaymentConfig,
    pub poller: PollerSection,
    pub venues: Vec<VenueSeed>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseSection::default(),
            logging: LoggingConfig::default(),
            security: SecurityConfig::default(),
            booking: BookingConfig::default(),
            payment: PaymentConfig::default(),
            poller: PollerSection::default(),
            venues: default_venues(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file does not
    /// exist, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&raw)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, raw).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            self.security.jwt_secret = secret;
        }
        if let Ok(key) = std::env::var("PAYMENT_SERVER_KEY") {
            self.payment.server_key = key;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.booking.slot_grid()?;
        if self.poller.interval_secs == 0 {
            return Err(ConfigError::Invalid("poller.interval_secs must be positive".into()));
        }
        if self.poller.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "poller.fetch_timeout_secs must be positive".into(),
            ));
        }
        if self.booking.expiry_check_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "booking.expiry_check_interval_secs must be positive".into(),
            ));
        }
        if self.booking.pending_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "booking.pending_ttl_minutes must be positive".into(),
            ));
        }
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("security.jwt_secret is empty".into()));
        }
        if let Some(seed) = self.venues.iter().find(|v| v.price_per_hour <= 0) {
            return Err(ConfigError::Invalid(format!(
                "venue '{}' needs a positive price_per_hour",
                seed.name
            )));
        }
        Ok(())
    }
}
