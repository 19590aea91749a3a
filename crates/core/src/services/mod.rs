//! Services over the storage layer
//!
//! Each service borrows the [`Database`] and enforces the rules of its area:
//! validation, existence and uniqueness checks, and audit recording.
//! [`Stockroom`] owns the shared pieces and hands out services on demand.

mod audit;
mod auth;
mod catalog;
mod gate;
mod inventory;

use tracing::info;

use crate::config::{AuthConfig, Config};
use crate::error::Result;
use crate::password::{Argon2Hasher, PasswordHasher};
use crate::storage::Database;
use crate::token::TokenSigner;

pub use audit::AuditLog;
pub use auth::AuthService;
pub use catalog::CategoryCatalog;
pub use gate::AccessGate;
pub use inventory::InventoryService;

/// Application root: one database, one hasher, one token signer.
pub struct Stockroom {
    db: Database,
    hasher: Box<dyn PasswordHasher>,
    signer: TokenSigner,
    auth: AuthConfig,
}

impl Stockroom {
    pub fn new(db: Database, auth: AuthConfig) -> Self {
        let signer = TokenSigner::new(&auth.signing_secret(), auth.token_lifetime());
        Self {
            db,
            hasher: Box::new(Argon2Hasher::new()),
            signer,
            auth,
        }
    }

    /// Replace the password hasher
    pub fn with_hasher(mut self, hasher: impl PasswordHasher + 'static) -> Self {
        self.hasher = Box::new(hasher);
        self
    }

    /// Open the configured database and make sure the bootstrap admin exists.
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.database_path()?;
        let db = Database::open(&path)?;
        let stockroom = Self::new(db, config.auth.clone());

        if stockroom.auth().ensure_admin(&config.bootstrap_admin)? {
            info!(username = %config.bootstrap_admin.username, "Created bootstrap admin");
        }
        info!(path = %path.display(), "Stockroom ready");
        Ok(stockroom)
    }

    pub fn open_in_memory(auth: AuthConfig) -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?, auth))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(
            &self.db,
            self.hasher.as_ref(),
            &self.signer,
            self.auth.cookie_max_age(),
        )
    }

    /// Gate for protected operations, checking live sessions when configured to.
    pub fn gate(&self) -> AccessGate<'_> {
        let gate = AccessGate::new(&self.signer);
        if self.auth.require_live_session {
            gate.with_live_sessions(&self.db)
        } else {
            gate
        }
    }

    pub fn categories(&self) -> CategoryCatalog<'_> {
        CategoryCatalog::new(&self.db)
    }

    pub fn inventory(&self) -> InventoryService<'_> {
        InventoryService::new(&self.db)
    }

    pub fn audit(&self) -> AuditLog<'_> {
        AuditLog::new(&self.db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootstrapAdmin;
    use crate::models::{Credentials, Role};

    #[test]
    fn test_open_bootstraps_admin_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: Some(dir.path().join("stockroom.db")),
            auth: AuthConfig {
                token_secret: Some("secret".into()),
                ..AuthConfig::default()
            },
            bootstrap_admin: BootstrapAdmin::default(),
        };

        {
            let stockroom = Stockroom::open(&config).unwrap();
            let admin = stockroom.auth().get_by_username("admin").unwrap();
            assert_eq!(admin.role, Role::Admin);
        }

        let stockroom = Stockroom::open(&config).unwrap();
        assert_eq!(stockroom.auth().get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_configured_secret_survives_reopen() {
        let auth = AuthConfig {
            token_secret: Some("shared-secret".into()),
            ..AuthConfig::default()
        };
        let first = Stockroom::open_in_memory(auth.clone()).unwrap();
        first.auth().ensure_admin(&BootstrapAdmin::default()).unwrap();
        let token = first
            .auth()
            .login(&Credentials {
                username: "admin".into(),
                password: "admin123".into(),
            })
            .unwrap();

        let second = Stockroom::open_in_memory(auth).unwrap();
        assert_eq!(second.gate().authenticate(Some(&token)).unwrap().username, "admin");
    }
}
