//! Application state management

use std::fs::OpenOptions;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use stockroom_core::token::generate_secret;
use stockroom_core::{Config, Result, Stockroom};
use tracing::info;

const SECRET_FILE: &str = "token.secret";

/// Main application state
pub struct AppState {
    pub stockroom: Stockroom,
}

impl AppState {
    /// Load configuration and open the store it points at.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::load(config_path)?;

        if config.auth.token_secret.is_none() {
            let db_path = config.database_path()?;
            config.auth.token_secret = Some(Self::load_or_create_secret(&Self::secret_path(&db_path))?);
        }

        Ok(Self {
            stockroom: Stockroom::open(&config)?,
        })
    }

    fn secret_path(db_path: &Path) -> PathBuf {
        db_path
            .parent()
            .map(|dir| dir.join(SECRET_FILE))
            .unwrap_or_else(|| PathBuf::from(SECRET_FILE))
    }

    /// Tokens must verify across invocations, so an unconfigured secret is
    /// generated once and kept beside the database.
    fn load_or_create_secret(path: &Path) -> Result<String> {
        if path.exists() {
            let secret = std::fs::read_to_string(path)?.trim().to_string();
            if !secret.is_empty() {
                return Ok(secret);
            }
        }

        let secret = generate_secret();
        Self::write_private(path, &secret)?;
        info!(path = %path.display(), "Generated token secret");
        Ok(secret)
    }

    /// Write `contents`, readable by the owner only on unix.
    fn write_private(path: &Path, contents: &str) -> Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(path)?;
        // mode() only applies on creation; tighten a pre-existing file too
        #[cfg(unix)]
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}
