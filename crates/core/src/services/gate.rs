//! Bearer-token gate in front of protected operations

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::Identity;
use crate::permissions::{PermissionMatrix, StockAction};
use crate::storage::SessionRepository;
use crate::token::TokenSigner;

/// Resolves a presented token into the caller's identity.
///
/// By default only the signature and expiry are checked. With
/// [`AccessGate::with_live_sessions`] the token must also belong to an
/// unexpired session row, so logout takes effect immediately.
pub struct AccessGate<'a> {
    signer: &'a TokenSigner,
    sessions: Option<&'a dyn SessionRepository>,
}

impl<'a> AccessGate<'a> {
    pub fn new(signer: &'a TokenSigner) -> Self {
        Self {
            signer,
            sessions: None,
        }
    }

    pub fn with_live_sessions(mut self, sessions: &'a dyn SessionRepository) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Accepts either a raw token or an `Authorization` header value.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity> {
        let raw = token.map(str::trim).unwrap_or_default();
        let token = match raw.strip_prefix("Bearer") {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
            _ => raw,
        };
        if token.is_empty() {
            debug!("Request without token");
            return Err(Error::MissingToken);
        }

        let claims = self.signer.verify(token).map_err(|e| {
            warn!(error = %e, "Rejected bearer token");
            e
        })?;

        if let Some(sessions) = self.sessions {
            let live = sessions
                .find_session_by_token(token)?
                .is_some_and(|s| s.is_valid());
            if !live {
                warn!(username = %claims.username, "Token has no live session");
                return Err(Error::InvalidToken);
            }
        }

        Ok(claims.identity())
    }

    pub fn require_admin(&self, identity: &Identity) -> Result<()> {
        if identity.is_admin() {
            Ok(())
        } else {
            warn!(username = %identity.username, "Admin access denied");
            Err(Error::NotAdmin)
        }
    }

    /// Authenticate, then check the caller's role may perform `action`.
    pub fn authorize(&self, token: Option<&str>, action: StockAction) -> Result<Identity> {
        let identity = self.authenticate(token)?;
        if !PermissionMatrix::can_perform(identity.role, action) {
            warn!(username = %identity.username, ?action, "Action denied for role");
            return Err(Error::NotAdmin);
        }
        Ok(identity)
    }
}
