//! Category storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;

use super::parse::{conflict_on_unique, format_datetime, parse_datetime, OptionalExt};
use crate::error::Result;
use crate::models::Category;

pub struct CategoryStore<'a> {
    conn: &'a Connection,
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: parse_datetime(&row.get::<_, String>(2)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(3)?)?,
    })
}

fn name_taken(name: &str) -> String {
    format!("category '{name}' already exists")
}

impl<'a> CategoryStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a category. A duplicate name is reported as a conflict by the unique index.
    #[instrument(skip(self))]
    pub fn create(&self, name: &str) -> Result<Category> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO categories (name, created_at, updated_at) VALUES (?1, ?2, ?3)",
                params![name, format_datetime(&now), format_datetime(&now)],
            )
            .map_err(|e| conflict_on_unique(e, || name_taken(name)))?;

        Ok(Category {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at, updated_at FROM categories WHERE id = ?1")?;

        let category = stmt.query_row(params![id], category_from_row).optional()?;

        Ok(category)
    }

    #[instrument(skip(self))]
    pub fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at, updated_at FROM categories WHERE name = ?1")?;

        let category = stmt.query_row(params![name], category_from_row).optional()?;

        Ok(category)
    }

    pub fn list(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at, updated_at FROM categories ORDER BY id")?;

        let categories = stmt
            .query_map([], category_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(categories)
    }

    /// Rename a category. Returns false when no row matched.
    #[instrument(skip(self))]
    pub fn rename(&self, id: i64, name: &str) -> Result<bool> {
        let count = self
            .conn
            .execute(
                "UPDATE categories SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![name, format_datetime(&Utc::now()), id],
            )
            .map_err(|e| conflict_on_unique(e, || name_taken(name)))?;
        Ok(count > 0)
    }

    /// Delete a category. Items still pointing at it are left alone.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }
}
