//! Account registration, login and profile management

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument, warn};

use crate::config::BootstrapAdmin;
use crate::error::{Error, Result};
use crate::models::{
    Credentials, ProfileUpdate, Registration, Role, Session, SessionCookie, User,
};
use crate::password::PasswordHasher;
use crate::storage::{Database, SessionRepository, UserRepository};
use crate::token::TokenSigner;
use crate::validation::Validate;

pub struct AuthService<'a> {
    db: &'a Database,
    hasher: &'a dyn PasswordHasher,
    signer: &'a TokenSigner,
    cookie_max_age: Duration,
}

fn user_not_found(username: &str) -> Error {
    Error::not_found(format!("user '{username}'"))
}

impl<'a> AuthService<'a> {
    pub fn new(
        db: &'a Database,
        hasher: &'a dyn PasswordHasher,
        signer: &'a TokenSigner,
        cookie_max_age: Duration,
    ) -> Self {
        Self {
            db,
            hasher,
            signer,
            cookie_max_age,
        }
    }

    /// Create an account. Only the password hash is stored.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub fn register(&self, request: &Registration) -> Result<User> {
        request.validate()?;

        if self.check_available(&request.username)? {
            return Err(Error::Conflict(format!(
                "username '{}' is already taken",
                request.username
            )));
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = self.db.create_user(&User::new(
            request.username.clone(),
            request.full_name.clone(),
            password_hash,
            request.role,
        ))?;

        info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user.redacted())
    }

    /// Verify credentials, sign a token and record a session for it.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub fn login(&self, request: &Credentials) -> Result<String> {
        request.validate()?;

        let user = self
            .db
            .find_user(&request.username)?
            .ok_or_else(|| user_not_found(&request.username))?;

        if !self.hasher.verify(&request.password, &user.password_hash)? {
            warn!("Login rejected: wrong password");
            return Err(Error::InvalidCredentials);
        }

        let issued = self.signer.issue(&user.username, user.role)?;
        self.db.create_session(&Session::new(
            user.username.clone(),
            issued.token.clone(),
            issued.claims.expires_at(),
        ))?;

        info!(expires_at = %issued.claims.expires_at(), "User logged in");
        Ok(issued.token)
    }

    /// Overwrite name, password and role. The password is always re-hashed.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub fn update(&self, request: &ProfileUpdate) -> Result<User> {
        request.validate()?;

        let mut user = self
            .db
            .find_user(&request.username)?
            .ok_or_else(|| user_not_found(&request.username))?;

        user.full_name = request.full_name.clone();
        user.password_hash = self.hasher.hash(&request.password)?;
        user.role = request.role;
        user.updated_at = Utc::now();

        if !self.db.update_user(&user)? {
            return Err(user_not_found(&request.username));
        }

        info!(role = %user.role, "User updated");
        Ok(user.redacted())
    }

    /// Remove an account. Its sessions stay behind and its tokens stay valid until expiry.
    #[instrument(skip(self))]
    pub fn delete(&self, username: &str) -> Result<()> {
        if !self.db.delete_user(username)? {
            return Err(user_not_found(username));
        }
        info!("User deleted");
        Ok(())
    }

    pub fn get_all(&self) -> Result<Vec<User>> {
        let users = self.db.list_users()?;
        debug!(count = users.len(), "Listed users");
        Ok(users.into_iter().map(User::redacted).collect())
    }

    pub fn get_by_username(&self, username: &str) -> Result<User> {
        self.db
            .find_user(username)?
            .map(User::redacted)
            .ok_or_else(|| user_not_found(username))
    }

    /// Whether an account with this username already exists
    pub fn check_available(&self, username: &str) -> Result<bool> {
        Ok(self.db.find_user(username)?.is_some())
    }

    /// Drop every session row recorded for `username`.
    ///
    /// Tokens already handed out keep verifying until they expire unless the
    /// gate runs with live-session checks.
    #[instrument(skip(self))]
    pub fn logout(&self, username: &str) -> Result<usize> {
        let removed = self.db.delete_user_sessions(username)?;
        if removed == 0 {
            return Err(Error::not_found(format!("session for '{username}'")));
        }
        info!(removed, "User logged out");
        Ok(removed)
    }

    /// Most recent session recorded for `username`
    pub fn current_session(&self, username: &str) -> Result<Session> {
        self.db
            .find_latest_session(username)?
            .ok_or_else(|| Error::not_found(format!("session for '{username}'")))
    }

    pub fn prune_expired_sessions(&self) -> Result<u64> {
        let removed = self.db.cleanup_expired_sessions()?;
        if removed > 0 {
            info!(removed, "Pruned expired sessions");
        }
        Ok(removed)
    }

    pub fn session_cookie(&self, token: String) -> SessionCookie {
        SessionCookie::new(token, self.cookie_max_age)
    }

    /// Create the bootstrap administrator unless the username is already taken.
    /// Returns whether an account was created.
    pub fn ensure_admin(&self, admin: &BootstrapAdmin) -> Result<bool> {
        if self.check_available(&admin.username)? {
            debug!(username = %admin.username, "Bootstrap admin already present");
            return Ok(false);
        }

        self.register(&Registration {
            full_name: admin.full_name.clone(),
            username: admin.username.clone(),
            password: admin.password.clone(),
            role: Role::Admin,
        })?;
        Ok(true)
    }
}
