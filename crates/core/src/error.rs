//! Error types for Stockroom Core

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Session token is missing")]
    MissingToken,

    #[error("Malformed session token")]
    MalformedToken,

    #[error("Session token is invalid or expired")]
    InvalidToken,

    #[error("User is not an admin")]
    NotAdmin,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse error class handed to callers outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Unauthorized,
    Forbidden,
    Internal,
}

impl ErrorKind {
    /// HTTP-style status code used as a machine-checkable class.
    pub fn code(self) -> u16 {
        match self {
            ErrorKind::Validation | ErrorKind::Conflict => 400,
            ErrorKind::Unauthorized | ErrorKind::Forbidden => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }

    pub fn status(self) -> &'static str {
        match self.code() {
            400 => "status bad request",
            401 => "status unauthorized",
            404 => "status not found",
            _ => "status internal server error",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidCredentials | Error::MalformedToken => {
                ErrorKind::Validation
            }
            Error::Conflict(_) => ErrorKind::Conflict,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::MissingToken | Error::InvalidToken => ErrorKind::Unauthorized,
            Error::NotAdmin => ErrorKind::Forbidden,
            Error::Database(_)
            | Error::Hashing(_)
            | Error::TokenSigning(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Serialization(_) => ErrorKind::Internal,
        }
    }

    pub fn code(&self) -> u16 {
        self.kind().code()
    }

    pub(crate) fn not_found(what: impl std::fmt::Display) -> Self {
        Error::NotFound(format!("{what} not found"))
    }
}
