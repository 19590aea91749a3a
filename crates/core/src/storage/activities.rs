//! Activity (audit trail) storage operations
//!
//! Rows are only ever inserted; the AUTOINCREMENT id preserves insertion order.

use rusqlite::{params, Connection, Row};
use tracing::instrument;

use super::parse::{format_datetime, parse_action, parse_datetime};
use crate::error::Result;
use crate::models::{ActivityRecord, NewActivity};

pub struct ActivityStore<'a> {
    conn: &'a Connection,
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<ActivityRecord> {
    Ok(ActivityRecord {
        id: row.get(0)?,
        item_id: row.get(1)?,
        action: parse_action(&row.get::<_, String>(2)?)?,
        quantity_change: row.get(3)?,
        timestamp: parse_datetime(&row.get::<_, String>(4)?)?,
        performed_by: row.get(5)?,
    })
}

impl<'a> ActivityStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[instrument(skip(self, entry), fields(item_id = entry.item_id, action = %entry.action))]
    pub fn append(&self, entry: &NewActivity) -> Result<ActivityRecord> {
        self.conn.execute(
            "INSERT INTO activities (item_id, action, quantity_change, timestamp, performed_by)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.item_id,
                entry.action.as_str(),
                entry.quantity_change,
                format_datetime(&entry.timestamp),
                entry.performed_by,
            ],
        )?;

        Ok(ActivityRecord {
            id: self.conn.last_insert_rowid(),
            item_id: entry.item_id,
            action: entry.action,
            quantity_change: entry.quantity_change,
            timestamp: entry.timestamp,
            performed_by: entry.performed_by.clone(),
        })
    }

    /// All entries in insertion order
    pub fn list(&self) -> Result<Vec<ActivityRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, action, quantity_change, timestamp, performed_by
             FROM activities ORDER BY id",
        )?;

        let records = stmt
            .query_map([], activity_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn list_for_item(&self, item_id: i64) -> Result<Vec<ActivityRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, action, quantity_change, timestamp, performed_by
             FROM activities WHERE item_id = ?1 ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![item_id], activity_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
