//! Runtime configuration
//!
//! Loaded from a TOML file; every field has a default so a missing file
//! yields a working (development) configuration.
//!
//! ```toml
//! database_path = "/var/lib/stockroom/stockroom.db"
//!
//! [auth]
//! token_secret = "change-me"
//! token_lifetime_minutes = 20
//! cookie_max_age_hours = 24
//! require_live_session = false
//!
//! [bootstrap_admin]
//! username = "admin"
//! full_name = "Administrator"
//! password = "admin123"
//! ```

use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::token::generate_secret;

/// One year
const MAX_TOKEN_LIFETIME_MINUTES: i64 = 60 * 24 * 365;
/// Ten years
const MAX_COOKIE_MAX_AGE_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file; defaults to `stockroom.db` in the platform data directory
    pub database_path: Option<PathBuf>,
    pub auth: AuthConfig,
    pub bootstrap_admin: BootstrapAdmin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token signing secret. When unset a random one is generated per process.
    pub token_secret: Option<String>,
    pub token_lifetime_minutes: i64,
    /// Lifetime of the transport cookie, independent of the token expiry
    pub cookie_max_age_hours: i64,
    /// Also require a live session row for every presented token
    pub require_live_session: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            token_lifetime_minutes: 20,
            cookie_max_age_hours: 24,
            require_live_session: false,
        }
    }
}

impl AuthConfig {
    /// Token lifetime, clamped to the range `validate` accepts.
    pub fn token_lifetime(&self) -> Duration {
        Duration::minutes(self.token_lifetime_minutes.clamp(1, MAX_TOKEN_LIFETIME_MINUTES))
    }

    /// Cookie max age, clamped to the range `validate` accepts.
    pub fn cookie_max_age(&self) -> Duration {
        Duration::hours(self.cookie_max_age_hours.clamp(1, MAX_COOKIE_MAX_AGE_HOURS))
    }

    /// Secret bytes to sign with, generating a throwaway one if none is configured.
    pub fn signing_secret(&self) -> Vec<u8> {
        match &self.token_secret {
            Some(secret) => secret.as_bytes().to_vec(),
            None => {
                warn!("No token_secret configured; tokens will not survive a restart");
                generate_secret().into_bytes()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_TOKEN_LIFETIME_MINUTES).contains(&self.token_lifetime_minutes) {
            return Err(Error::Config(format!(
                "auth.token_lifetime_minutes must be between 1 and {MAX_TOKEN_LIFETIME_MINUTES}"
            )));
        }
        if !(1..=MAX_COOKIE_MAX_AGE_HOURS).contains(&self.cookie_max_age_hours) {
            return Err(Error::Config(format!(
                "auth.cookie_max_age_hours must be between 1 and {MAX_COOKIE_MAX_AGE_HOURS}"
            )));
        }
        if matches!(&self.token_secret, Some(s) if s.is_empty()) {
            return Err(Error::Config("auth.token_secret must not be empty".into()));
        }
        Ok(())
    }
}

/// Administrator account created on startup when missing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapAdmin {
    pub username: String,
    pub full_name: String,
    pub password: String,
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            full_name: "Administrator".into(),
            password: "admin123".into(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.auth.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, falling back to defaults when no file exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration");
                let text = std::fs::read_to_string(path)?;
                Self::from_toml(&text)
            }
            Some(path) => {
                warn!(path = %path.display(), "Configuration file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Resolve the database file, creating its parent directory
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => Self::data_dir()?.join("stockroom.db"),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(path)
    }

    fn data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "stockroom", "stockroom").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;

        Ok(dirs.data_dir().to_path_buf())
    }
}
