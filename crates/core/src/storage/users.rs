//! User storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;

use super::parse::{conflict_on_unique, format_datetime, parse_datetime, parse_role, OptionalExt};
use crate::error::Result;
use crate::models::User;

const USER_COLUMNS: &str = "id, username, full_name, password_hash, role, created_at, updated_at";

pub struct UserStore<'a> {
    conn: &'a Connection,
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        password_hash: row.get(3)?,
        role: parse_role(&row.get::<_, String>(4)?)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(6)?)?,
    })
}

impl<'a> UserStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Create a new user, returning it with its assigned id
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub fn create(&self, user: &User) -> Result<User> {
        self.conn
            .execute(
                "INSERT INTO users (username, full_name, password_hash, role, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.username,
                    user.full_name,
                    user.password_hash,
                    user.role.as_str(),
                    format_datetime(&user.created_at),
                    format_datetime(&user.updated_at),
                ],
            )
            .map_err(|e| {
                conflict_on_unique(e, || format!("username '{}' is already taken", user.username))
            })?;

        let mut stored = user.clone();
        stored.id = self.conn.last_insert_rowid();
        Ok(stored)
    }

    /// Find user by username
    #[instrument(skip(self))]
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"))?;

        let user = stmt
            .query_row(params![username], user_from_row)
            .optional()?;

        Ok(user)
    }

    /// List all users in creation order
    pub fn list(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;

        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Overwrite name, password hash and role. Returns false when no row matched.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub fn update(&self, user: &User) -> Result<bool> {
        let count = self.conn.execute(
            "UPDATE users SET full_name = ?1, password_hash = ?2, role = ?3, updated_at = ?4
             WHERE username = ?5",
            params![
                user.full_name,
                user.password_hash,
                user.role.as_str(),
                format_datetime(&Utc::now()),
                user.username,
            ],
        )?;
        Ok(count > 0)
    }

    /// Delete user. Returns false when no row matched.
    pub fn delete(&self, username: &str) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM users WHERE username = ?1", params![username])?;
        Ok(count > 0)
    }
}
