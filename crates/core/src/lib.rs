//! Stockroom Core Library
//!
//! Models, storage, authentication and the audited inventory services
//! behind the Stockroom back office.

pub mod config;
pub mod envelope;
pub mod error;
pub mod invariants;
pub mod models;
pub mod password;
pub mod permissions;
pub mod services;
pub mod storage;
pub mod token;
pub mod validation;

pub use config::{AuthConfig, BootstrapAdmin, Config};
pub use envelope::Envelope;
pub use error::{Error, ErrorKind, Result};
pub use models::*;
pub use password::{Argon2Hasher, PasswordHasher};
pub use permissions::*;
pub use services::{
    AccessGate, AuditLog, AuthService, CategoryCatalog, InventoryService, Stockroom,
};
pub use storage::{Database, Storage};
pub use token::{Claims, TokenSigner};
pub use validation::Validate;
