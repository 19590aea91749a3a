//! User model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::validation::{require_len, require_text, Validate};

/// Placeholder written over password hashes before a user leaves the service.
pub const REDACTED_PASSWORD: &str = "-";

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(Error::Validation(format!(
                "role must be 'admin' or 'user', got '{other}'"
            ))),
        }
    }
}

/// A back-office account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build an unsaved user; storage assigns the id.
    pub fn new(username: String, full_name: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            username,
            full_name,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn redacted(mut self) -> Self {
        self.password_hash = REDACTED_PASSWORD.to_string();
        self
    }
}

fn validate_account_fields(full_name: &str, username: &str, password: &str) -> Result<()> {
    require_text("full_name", full_name)?;
    require_len("username", username, 5, 20)?;
    require_len("password", password, 8, 20)?;
    Ok(())
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl Validate for Registration {
    fn validate(&self) -> Result<()> {
        validate_account_fields(&self.full_name, &self.username, &self.password)
    }
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Validation("username is required".into()));
        }
        if self.password.is_empty() {
            return Err(Error::Validation("password is required".into()));
        }
        Ok(())
    }
}

/// Profile update request. The username identifies the account and is never changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> Result<()> {
        validate_account_fields(&self.full_name, &self.username, &self.password)
    }
}
