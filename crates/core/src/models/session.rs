//! Session and identity models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// Cookie name the bearer token travels under.
pub const SESSION_COOKIE_NAME: &str = "session_token";

/// Persisted record of a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub username: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(username: String, token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            username,
            token,
            created_at: Utc::now(),
            expires_at,
        }
    }

    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Caller identity resolved from a verified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Transport wrapper for an issued token.
///
/// `max_age` is configured separately from the token's own expiry and the
/// two are not kept in sync.
#[derive(Debug, Clone, Serialize)]
pub struct SessionCookie {
    pub name: &'static str,
    pub value: String,
    #[serde(with = "duration_secs")]
    pub max_age: Duration,
    pub http_only: bool,
}

impl SessionCookie {
    pub fn new(value: String, max_age: Duration) -> Self {
        Self {
            name: SESSION_COOKIE_NAME,
            value,
            max_age,
            http_only: true,
        }
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_seconds())
    }
}
