//! Read side of the audit trail, plus stock reporting

use tracing::{debug, instrument};

use crate::error::Result;
use crate::invariants::assert_activity_invariants;
use crate::models::{ActivityRecord, NewActivity, StockReport};
use crate::storage::{ActivityRepository, Database, ItemRepository};
use crate::validation::Validate;

pub struct AuditLog<'a> {
    db: &'a Database,
}

impl<'a> AuditLog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append an entry on its own. Item mutations go through
    /// [`InventoryService`](super::InventoryService), which appends inside
    /// the mutation's transaction.
    pub fn record(&self, entry: &NewActivity) -> Result<ActivityRecord> {
        entry.validate()?;
        assert_activity_invariants(entry);
        self.db.append_activity(entry)
    }

    /// Every entry in insertion order
    pub fn get_all(&self) -> Result<Vec<ActivityRecord>> {
        self.db.list_activities()
    }

    /// Entries for one item id, including items since deleted
    pub fn for_item(&self, item_id: i64) -> Result<Vec<ActivityRecord>> {
        self.db.list_item_activities(item_id)
    }

    /// Items at or below `threshold`, lowest stock first, with totals.
    #[instrument(skip(self))]
    pub fn report_stock(&self, threshold: i64) -> Result<StockReport> {
        let items = self.db.list_items_at_or_below(threshold)?;
        let report = StockReport::new(threshold, items);
        debug!(
            total_items = report.total_items,
            total_quantity = %report.total_quantity,
            "Stock report built"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::error::Error;
    use crate::models::{Action, NewItem};
    use crate::storage::CategoryRepository;

    fn stock(db: &Database, name: &str, quantity: i64, price: f64) {
        let category_id = match db.find_category_by_name("VGA").unwrap() {
            Some(c) => c.id,
            None => db.create_category("VGA").unwrap().id,
        };
        db.items()
            .create(&NewItem {
                name: name.into(),
                category_id,
                quantity,
                price,
                specification: "spec".into(),
            })
            .unwrap();
    }

    #[test]
    fn test_record_and_read() {
        let db = Database::open_in_memory().unwrap();
        let audit = AuditLog::new(&db);
        assert!(audit.get_all().unwrap().is_empty());

        let record = audit
            .record(&NewActivity {
                item_id: 3,
                action: Action::Post,
                quantity_change: 4,
                timestamp: Utc::now(),
                performed_by: "alice".into(),
            })
            .unwrap();
        assert!(record.id > 0);

        assert_eq!(audit.get_all().unwrap(), vec![record.clone()]);
        assert_eq!(audit.for_item(3).unwrap(), vec![record]);
        assert!(audit.for_item(4).unwrap().is_empty());
    }

    #[test]
    fn test_record_rejects_malformed_entries() {
        let db = Database::open_in_memory().unwrap();
        let audit = AuditLog::new(&db);
        let entry = |action, quantity_change, performed_by: &str| NewActivity {
            item_id: 3,
            action,
            quantity_change,
            timestamp: Utc::now(),
            performed_by: performed_by.into(),
        };

        assert!(matches!(
            audit.record(&entry(Action::Delete, -10, "alice")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            audit.record(&entry(Action::Post, 4, "")),
            Err(Error::Validation(_))
        ));
        assert!(audit.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_report_stock() {
        let db = Database::open_in_memory().unwrap();
        stock(&db, "RTX", 10, 500.0);
        stock(&db, "GTX", 2, 150.0);
        stock(&db, "Arc", 5, 200.0);

        let report = AuditLog::new(&db).report_stock(5).unwrap();
        assert_eq!(report.threshold, 5);
        assert_eq!(report.total_items, 2);
        assert_eq!(report.total_quantity, 7);
        assert_eq!(report.total_inventory_value, 2.0 * 150.0 + 5.0 * 200.0);

        let names: Vec<_> = report.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["GTX", "Arc"]);
    }

    #[test]
    fn test_report_totals_do_not_overflow() {
        let db = Database::open_in_memory().unwrap();
        let half = i64::MAX / 2 + 1;
        stock(&db, "RTX", half, 1.0);
        stock(&db, "GTX", half, 1.0);

        let report = AuditLog::new(&db).report_stock(i64::MAX).unwrap();
        assert_eq!(report.total_items, 2);
        assert_eq!(report.total_quantity, 2 * i128::from(half));
    }

    #[test]
    fn test_empty_report() {
        let db = Database::open_in_memory().unwrap();
        stock(&db, "RTX", 10, 500.0);

        let report = AuditLog::new(&db).report_stock(0).unwrap();
        assert_eq!(report.total_items, 0);
        assert_eq!(report.total_inventory_value, 0.0);
        assert!(report.items.is_empty());
    }
}
