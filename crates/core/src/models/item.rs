//! Item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::validation::{require_amount, require_id, require_non_negative, require_text, Validate};

/// A stocked item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub specification: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Stock value of this line (`price * quantity`).
    pub fn stock_value(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Overwrite the mutable fields from an update request.
    pub fn apply(&mut self, update: &ItemUpdate) {
        self.name = update.name.clone();
        self.category_id = update.category_id;
        self.quantity = update.quantity;
        self.price = update.price;
        self.specification = update.specification.clone();
        self.updated_at = Utc::now();
    }
}

fn validate_item_fields(
    name: &str,
    category_id: i64,
    quantity: i64,
    price: f64,
    specification: &str,
) -> Result<()> {
    require_text("name", name)?;
    require_id("category_id", category_id)?;
    require_non_negative("quantity", quantity)?;
    require_amount("price", price)?;
    require_text("specification", specification)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub category_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub specification: String,
}

impl Validate for NewItem {
    fn validate(&self) -> Result<()> {
        validate_item_fields(
            &self.name,
            self.category_id,
            self.quantity,
            self.price,
            &self.specification,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub specification: String,
}

impl Validate for ItemUpdate {
    fn validate(&self) -> Result<()> {
        require_id("id", self.id)?;
        validate_item_fields(
            &self.name,
            self.category_id,
            self.quantity,
            self.price,
            &self.specification,
        )
    }
}
