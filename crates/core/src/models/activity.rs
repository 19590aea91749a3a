//! Audit trail model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Item;
use crate::error::{Error, Result};
use crate::validation::{require_id, require_text, Validate};

/// Kind of item mutation recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Post,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Post => "POST",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "POST" => Ok(Action::Post),
            "UPDATE" => Ok(Action::Update),
            "DELETE" => Ok(Action::Delete),
            other => Err(Error::Validation(format!("unknown action '{other}'"))),
        }
    }
}

/// Immutable audit entry for one item mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: i64,
    pub item_id: i64,
    pub action: Action,
    /// Net quantity effect of the mutation, not the resulting quantity.
    pub quantity_change: i64,
    pub timestamp: DateTime<Utc>,
    pub performed_by: String,
}

/// An audit entry waiting to be appended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub item_id: i64,
    pub action: Action,
    pub quantity_change: i64,
    pub timestamp: DateTime<Utc>,
    pub performed_by: String,
}

impl NewActivity {
    /// Creation counts the whole starting quantity as stock added.
    pub fn created(item: &Item, performed_by: &str) -> Self {
        Self::entry(item.id, Action::Post, item.quantity, performed_by)
    }

    pub fn updated(before: &Item, after: &Item, performed_by: &str) -> Self {
        Self::entry(
            after.id,
            Action::Update,
            after.quantity - before.quantity,
            performed_by,
        )
    }

    /// Deletion always records a zero delta, whatever stock the item held.
    pub fn deleted(item: &Item, performed_by: &str) -> Self {
        Self::entry(item.id, Action::Delete, 0, performed_by)
    }

    fn entry(item_id: i64, action: Action, quantity_change: i64, performed_by: &str) -> Self {
        Self {
            item_id,
            action,
            quantity_change,
            timestamp: Utc::now(),
            performed_by: performed_by.to_string(),
        }
    }
}

impl Validate for NewActivity {
    fn validate(&self) -> Result<()> {
        require_id("item_id", self.item_id)?;
        require_text("performed_by", &self.performed_by)?;
        if self.action == Action::Delete && self.quantity_change != 0 {
            return Err(Error::Validation(format!(
                "DELETE entry must record a zero quantity change, got {}",
                self.quantity_change
            )));
        }
        Ok(())
    }
}
