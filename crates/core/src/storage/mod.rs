//! SQLite storage layer for Stockroom

mod activities;
mod categories;
mod items;
mod migrations;
mod parse;
mod sessions;
mod traits;
mod users;

use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

use crate::error::Result;
use crate::models::{ActivityRecord, Category, Item, NewActivity, Session, User};

pub use activities::ActivityStore;
pub use categories::CategoryStore;
pub use items::ItemStore;
pub use parse::is_unique_violation;
pub use sessions::SessionStore;
pub use traits::{
    ActivityRepository, CategoryRepository, ItemRepository, SessionRepository, Storage,
    UserRepository,
};
pub use users::UserStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<u32> {
        migrations::get_current_version(&self.conn)
    }

    /// Run `f` inside a single transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`; any error rolls
    /// back every write `f` made.
    pub fn atomically<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn users(&self) -> UserStore<'_> {
        UserStore::new(&self.conn)
    }

    pub fn sessions(&self) -> SessionStore<'_> {
        SessionStore::new(&self.conn)
    }

    pub fn categories(&self) -> CategoryStore<'_> {
        CategoryStore::new(&self.conn)
    }

    pub fn items(&self) -> ItemStore<'_> {
        ItemStore::new(&self.conn)
    }

    pub fn activities(&self) -> ActivityStore<'_> {
        ActivityStore::new(&self.conn)
    }
}

// Implement repository traits for Database
// This enables using Database through the trait interface

impl UserRepository for Database {
    fn create_user(&self, user: &User) -> Result<User> {
        self.users().create(user)
    }

    fn find_user(&self, username: &str) -> Result<Option<User>> {
        self.users().find_by_username(username)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.users().list()
    }

    fn update_user(&self, user: &User) -> Result<bool> {
        self.users().update(user)
    }

    fn delete_user(&self, username: &str) -> Result<bool> {
        self.users().delete(username)
    }
}

impl SessionRepository for Database {
    fn create_session(&self, session: &Session) -> Result<Session> {
        self.sessions().create(session)
    }

    fn find_latest_session(&self, username: &str) -> Result<Option<Session>> {
        self.sessions().find_by_username(username)
    }

    fn find_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        self.sessions().find_by_token(token)
    }

    fn delete_user_sessions(&self, username: &str) -> Result<usize> {
        self.sessions().delete_for_user(username)
    }

    fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.sessions().cleanup_expired()
    }
}

impl CategoryRepository for Database {
    fn create_category(&self, name: &str) -> Result<Category> {
        self.categories().create(name)
    }

    fn find_category(&self, id: i64) -> Result<Option<Category>> {
        self.categories().find_by_id(id)
    }

    fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.categories().find_by_name(name)
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        self.categories().list()
    }

    fn rename_category(&self, id: i64, name: &str) -> Result<bool> {
        self.categories().rename(id, name)
    }

    fn delete_category(&self, id: i64) -> Result<bool> {
        self.categories().delete(id)
    }
}

impl ItemRepository for Database {
    fn find_item(&self, id: i64) -> Result<Option<Item>> {
        self.items().find_by_id(id)
    }

    fn find_item_by_name(&self, name: &str) -> Result<Option<Item>> {
        self.items().find_by_name(name)
    }

    fn list_items(&self) -> Result<Vec<Item>> {
        self.items().list()
    }

    fn list_items_by_category(&self, category_id: i64) -> Result<Vec<Item>> {
        self.items().list_by_category(category_id)
    }

    fn list_items_at_or_below(&self, threshold: i64) -> Result<Vec<Item>> {
        self.items().list_at_or_below(threshold)
    }
}

impl ActivityRepository for Database {
    fn append_activity(&self, entry: &NewActivity) -> Result<ActivityRecord> {
        self.activities().append(entry)
    }

    fn list_activities(&self) -> Result<Vec<ActivityRecord>> {
        self.activities().list()
    }

    fn list_item_activities(&self, item_id: i64) -> Result<Vec<ActivityRecord>> {
        self.activities().list_for_item(item_id)
    }
}
