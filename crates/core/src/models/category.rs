//! Category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::{require_id, require_text, Validate};

/// A stock-keeping category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

impl Validate for NewCategory {
    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub id: i64,
    pub name: String,
}

impl Validate for CategoryUpdate {
    fn validate(&self) -> Result<()> {
        require_id("id", self.id)?;
        require_text("name", &self.name)
    }
}
