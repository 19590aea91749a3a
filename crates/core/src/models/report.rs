//! Low-stock report

use serde::{Deserialize, Serialize};

use super::Item;

/// Items at or below a stock threshold, with totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReport {
    pub threshold: i64,
    pub total_items: usize,
    /// Wider than a single quantity so the sum cannot overflow
    pub total_quantity: i128,
    pub total_inventory_value: f64,
    pub items: Vec<Item>,
}

impl StockReport {
    pub fn new(threshold: i64, items: Vec<Item>) -> Self {
        Self {
            threshold,
            total_items: items.len(),
            total_quantity: items.iter().map(|i| i128::from(i.quantity)).sum(),
            total_inventory_value: items.iter().map(Item::stock_value).sum(),
            items,
        }
    }
}
