//! Session storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;

use super::parse::{format_datetime, parse_datetime, OptionalExt};
use crate::error::Result;
use crate::models::Session;

pub struct SessionStore<'a> {
    conn: &'a Connection,
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        username: row.get(1)?,
        token: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?)?,
        expires_at: parse_datetime(&row.get::<_, String>(4)?)?,
    })
}

impl<'a> SessionStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append a session row; earlier sessions for the same user are kept
    #[instrument(skip(self, session), fields(username = %session.username))]
    pub fn create(&self, session: &Session) -> Result<Session> {
        self.conn.execute(
            "INSERT INTO sessions (username, token, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.username,
                session.token,
                format_datetime(&session.created_at),
                format_datetime(&session.expires_at),
            ],
        )?;

        let mut stored = session.clone();
        stored.id = self.conn.last_insert_rowid();
        Ok(stored)
    }

    /// Most recent session for a user
    #[instrument(skip(self))]
    pub fn find_by_username(&self, username: &str) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, token, created_at, expires_at FROM sessions
             WHERE username = ?1 ORDER BY id DESC LIMIT 1",
        )?;

        let session = stmt
            .query_row(params![username], session_from_row)
            .optional()?;

        Ok(session)
    }

    #[instrument(skip(self, token))]
    pub fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, token, created_at, expires_at FROM sessions WHERE token = ?1",
        )?;

        let session = stmt.query_row(params![token], session_from_row).optional()?;

        Ok(session)
    }

    pub fn list_for_user(&self, username: &str) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, token, created_at, expires_at FROM sessions
             WHERE username = ?1 ORDER BY id",
        )?;

        let sessions = stmt
            .query_map(params![username], session_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Delete all sessions for user, returning how many were removed
    pub fn delete_for_user(&self, username: &str) -> Result<usize> {
        let count = self
            .conn
            .execute("DELETE FROM sessions WHERE username = ?1", params![username])?;
        Ok(count)
    }

    /// Clean up expired sessions
    pub fn cleanup_expired(&self) -> Result<u64> {
        let count = self.conn.execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![format_datetime(&Utc::now())],
        )?;
        Ok(count as u64)
    }
}
