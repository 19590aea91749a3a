//! Storage repository traits
//!
//! These traits define the storage interface the services read and write
//! through. Item mutations are absent from [`ItemRepository`]: they always
//! travel with an audit entry and go through `Database::atomically`.

use crate::error::Result;
use crate::models::{ActivityRecord, Category, Item, NewActivity, Session, User};

/// User repository operations
pub trait UserRepository {
    /// Create a new user
    fn create_user(&self, user: &User) -> Result<User>;

    /// Find user by username
    fn find_user(&self, username: &str) -> Result<Option<User>>;

    /// List all users
    fn list_users(&self) -> Result<Vec<User>>;

    /// Overwrite a user's profile
    fn update_user(&self, user: &User) -> Result<bool>;

    /// Delete a user
    fn delete_user(&self, username: &str) -> Result<bool>;
}

/// Session repository operations
pub trait SessionRepository {
    /// Append a session
    fn create_session(&self, session: &Session) -> Result<Session>;

    /// Most recent session for a user
    fn find_latest_session(&self, username: &str) -> Result<Option<Session>>;

    /// Session issued for a token
    fn find_session_by_token(&self, token: &str) -> Result<Option<Session>>;

    /// Delete all sessions for a user
    fn delete_user_sessions(&self, username: &str) -> Result<usize>;

    /// Clean up expired sessions
    fn cleanup_expired_sessions(&self) -> Result<u64>;
}

/// Category repository operations
pub trait CategoryRepository {
    fn create_category(&self, name: &str) -> Result<Category>;

    fn find_category(&self, id: i64) -> Result<Option<Category>>;

    fn find_category_by_name(&self, name: &str) -> Result<Option<Category>>;

    fn list_categories(&self) -> Result<Vec<Category>>;

    fn rename_category(&self, id: i64, name: &str) -> Result<bool>;

    fn delete_category(&self, id: i64) -> Result<bool>;
}

/// Item read operations
pub trait ItemRepository {
    fn find_item(&self, id: i64) -> Result<Option<Item>>;

    fn find_item_by_name(&self, name: &str) -> Result<Option<Item>>;

    fn list_items(&self) -> Result<Vec<Item>>;

    fn list_items_by_category(&self, category_id: i64) -> Result<Vec<Item>>;

    /// Items holding `threshold` units or fewer
    fn list_items_at_or_below(&self, threshold: i64) -> Result<Vec<Item>>;
}

/// Audit trail operations
pub trait ActivityRepository {
    /// Append an entry on its own
    fn append_activity(&self, entry: &NewActivity) -> Result<ActivityRecord>;

    /// All entries in insertion order
    fn list_activities(&self) -> Result<Vec<ActivityRecord>>;

    fn list_item_activities(&self, item_id: i64) -> Result<Vec<ActivityRecord>>;
}

/// Combined storage interface
pub trait Storage:
    UserRepository + SessionRepository + CategoryRepository + ItemRepository + ActivityRepository
{
}

// Blanket implementation: any type implementing all traits implements Storage
impl<T> Storage for T where
    T: UserRepository + SessionRepository + CategoryRepository + ItemRepository + ActivityRepository
{
}
