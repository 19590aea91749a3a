//! Item storage operations

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::instrument;

use super::parse::{conflict_on_unique, format_datetime, parse_datetime, OptionalExt};
use crate::error::Result;
use crate::models::{Item, NewItem};

const ITEM_COLUMNS: &str =
    "id, name, category_id, quantity, price, specification, created_at, updated_at";

pub struct ItemStore<'a> {
    conn: &'a Connection,
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get(0)?,
        name: row.get(1)?,
        category_id: row.get(2)?,
        quantity: row.get(3)?,
        price: row.get(4)?,
        specification: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?)?,
        updated_at: parse_datetime(&row.get::<_, String>(7)?)?,
    })
}

fn name_taken(name: &str) -> String {
    format!("item '{name}' already exists")
}

impl<'a> ItemStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, item), fields(item_name = %item.name))]
    pub fn create(&self, item: &NewItem) -> Result<Item> {
        let now = Utc::now();
        self.conn
            .execute(
                "INSERT INTO items (name, category_id, quantity, price, specification, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    item.name,
                    item.category_id,
                    item.quantity,
                    item.price,
                    item.specification,
                    format_datetime(&now),
                    format_datetime(&now),
                ],
            )
            .map_err(|e| conflict_on_unique(e, || name_taken(&item.name)))?;

        Ok(Item {
            id: self.conn.last_insert_rowid(),
            name: item.name.clone(),
            category_id: item.category_id,
            quantity: item.quantity,
            price: item.price,
            specification: item.specification.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: i64) -> Result<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1"))?;

        let item = stmt.query_row(params![id], item_from_row).optional()?;

        Ok(item)
    }

    #[instrument(skip(self))]
    pub fn find_by_name(&self, name: &str) -> Result<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE name = ?1"))?;

        let item = stmt.query_row(params![name], item_from_row).optional()?;

        Ok(item)
    }

    pub fn list(&self) -> Result<Vec<Item>> {
        self.query_list(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id"), [])
    }

    pub fn list_by_category(&self, category_id: i64) -> Result<Vec<Item>> {
        self.query_list(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE category_id = ?1 ORDER BY id"),
            params![category_id],
        )
    }

    /// Items holding `threshold` units or fewer
    pub fn list_at_or_below(&self, threshold: i64) -> Result<Vec<Item>> {
        self.query_list(
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE quantity <= ?1 ORDER BY quantity, id"),
            params![threshold],
        )
    }

    fn query_list<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Item>> {
        let mut stmt = self.conn.prepare(sql)?;
        let items = stmt
            .query_map(params, item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Overwrite every mutable column. Returns false when no row matched.
    #[instrument(skip(self, item), fields(item_id = item.id))]
    pub fn update(&self, item: &Item) -> Result<bool> {
        let count = self
            .conn
            .execute(
                "UPDATE items SET name = ?1, category_id = ?2, quantity = ?3, price = ?4,
                 specification = ?5, updated_at = ?6 WHERE id = ?7",
                params![
                    item.name,
                    item.category_id,
                    item.quantity,
                    item.price,
                    item.specification,
                    format_datetime(&item.updated_at),
                    item.id,
                ],
            )
            .map_err(|e| conflict_on_unique(e, || name_taken(&item.name)))?;
        Ok(count > 0)
    }

    pub fn delete(&self, id: i64) -> Result<bool> {
        let count = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1", params![id])?;
        Ok(count > 0)
    }
}
