//! Item mutations and their audit trail
//!
//! Every write to `items` and the audit entry describing it run in one
//! transaction: if the audit append fails, the mutation is rolled back.

use rusqlite::Connection;
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::invariants::{assert_activity_invariants, assert_item_invariants, assert_quantity_delta};
use crate::models::{ActivityRecord, Identity, Item, ItemUpdate, NewActivity, NewItem};
use crate::storage::{
    ActivityStore, CategoryRepository, CategoryStore, Database, ItemRepository, ItemStore,
};
use crate::validation::Validate;

pub struct InventoryService<'a> {
    db: &'a Database,
}

fn item_not_found(id: i64) -> Error {
    Error::not_found(format!("item {id}"))
}

fn ensure_category(conn: &Connection, category_id: i64) -> Result<()> {
    match CategoryStore::new(conn).find_by_id(category_id)? {
        Some(_) => Ok(()),
        None => Err(Error::not_found(format!("category {category_id}"))),
    }
}

fn ensure_name_free(items: &ItemStore<'_>, name: &str, except: Option<i64>) -> Result<()> {
    match items.find_by_name(name)? {
        Some(existing) if Some(existing.id) != except => {
            Err(Error::Conflict(format!("item '{name}' already exists")))
        }
        _ => Ok(()),
    }
}

fn append_entry(conn: &Connection, entry: &NewActivity) -> Result<ActivityRecord> {
    entry.validate()?;
    assert_activity_invariants(entry);
    ActivityStore::new(conn).append(entry)
}

impl<'a> InventoryService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create an item and record a POST entry for its starting quantity.
    #[instrument(skip(self, request, actor), fields(name = %request.name, actor = %actor.username))]
    pub fn add(&self, request: &NewItem, actor: &Identity) -> Result<Item> {
        request.validate()?;

        let (item, record) = self.db.atomically(|conn| {
            ensure_category(conn, request.category_id)?;

            let items = ItemStore::new(conn);
            ensure_name_free(&items, &request.name, None)?;

            let item = items.create(request)?;
            assert_item_invariants(&item);

            let record = append_entry(conn, &NewActivity::created(&item, &actor.username))?;
            Ok((item, record))
        })?;

        info!(item_id = item.id, quantity_change = record.quantity_change, "Item added");
        Ok(item)
    }

    /// Overwrite an item and record an UPDATE entry with the net quantity change.
    #[instrument(skip(self, request, actor), fields(item_id = request.id, actor = %actor.username))]
    pub fn update(&self, request: &ItemUpdate, actor: &Identity) -> Result<Item> {
        request.validate()?;

        let (item, record) = self.db.atomically(|conn| {
            ensure_category(conn, request.category_id)?;

            let items = ItemStore::new(conn);
            let before = items
                .find_by_id(request.id)?
                .ok_or_else(|| item_not_found(request.id))?;

            if request.name != before.name {
                ensure_name_free(&items, &request.name, Some(before.id))?;
            }

            let mut after = before.clone();
            after.apply(request);
            if !items.update(&after)? {
                return Err(item_not_found(request.id));
            }
            assert_item_invariants(&after);

            let entry = NewActivity::updated(&before, &after, &actor.username);
            assert_quantity_delta(&before, &after, &entry);
            let record = append_entry(conn, &entry)?;
            Ok((after, record))
        })?;

        info!(quantity_change = record.quantity_change, "Item updated");
        Ok(item)
    }

    /// Remove an item and record a DELETE entry. Its earlier audit entries remain.
    #[instrument(skip(self, actor), fields(actor = %actor.username))]
    pub fn delete(&self, id: i64, actor: &Identity) -> Result<()> {
        self.db.atomically(|conn| {
            let items = ItemStore::new(conn);
            let item = items.find_by_id(id)?.ok_or_else(|| item_not_found(id))?;

            if !items.delete(id)? {
                return Err(item_not_found(id));
            }

            append_entry(conn, &NewActivity::deleted(&item, &actor.username))?;
            Ok(())
        })?;

        info!("Item deleted");
        Ok(())
    }

    pub fn get_all(&self) -> Result<Vec<Item>> {
        self.db.list_items()
    }

    pub fn get_by_id(&self, id: i64) -> Result<Item> {
        self.db.find_item(id)?.ok_or_else(|| item_not_found(id))
    }

    /// Items filed under a category; the category itself must exist.
    pub fn get_by_category(&self, category_id: i64) -> Result<Vec<Item>> {
        if self.db.find_category(category_id)?.is_none() {
            return Err(Error::not_found(format!("category {category_id}")));
        }
        self.db.list_items_by_category(category_id)
    }

    /// Whether an item with this name already exists
    pub fn check_available(&self, name: &str) -> Result<bool> {
        Ok(self.db.find_item_by_name(name)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{Action, Role};
    use crate::storage::ActivityRepository;

    fn actor() -> Identity {
        Identity {
            username: "alice".into(),
            role: Role::User,
        }
    }

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let category = db.create_category("VGA").unwrap();
        (db, category.id)
    }

    fn rtx(category_id: i64) -> NewItem {
        NewItem {
            name: "RTX".into(),
            category_id,
            quantity: 10,
            price: 499.0,
            specification: "16GB".into(),
        }
    }

    fn update_of(item: &Item, quantity: i64) -> ItemUpdate {
        ItemUpdate {
            id: item.id,
            name: item.name.clone(),
            category_id: item.category_id,
            quantity,
            price: item.price,
            specification: item.specification.clone(),
        }
    }

    #[test]
    fn test_add_records_post() {
        let (db, vga) = setup();
        let item = InventoryService::new(&db).add(&rtx(vga), &actor()).unwrap();

        let log = db.list_activities().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].item_id, item.id);
        assert_eq!(log[0].action, Action::Post);
        assert_eq!(log[0].quantity_change, 10);
        assert_eq!(log[0].performed_by, "alice");
    }

    #[test]
    fn test_add_missing_category_writes_nothing() {
        let (db, vga) = setup();
        let err = InventoryService::new(&db)
            .add(&rtx(vga + 100), &actor())
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert!(db.list_items().unwrap().is_empty());
        assert!(db.list_activities().unwrap().is_empty());
    }

    #[test]
    fn test_add_duplicate_name_conflicts() {
        let (db, vga) = setup();
        let inventory = InventoryService::new(&db);
        inventory.add(&rtx(vga), &actor()).unwrap();

        assert!(matches!(
            inventory.add(&rtx(vga), &actor()),
            Err(Error::Conflict(_))
        ));
        assert_eq!(db.list_activities().unwrap().len(), 1);
    }

    #[test]
    fn test_update_records_net_change() {
        let (db, vga) = setup();
        let inventory = InventoryService::new(&db);
        let item = inventory.add(&rtx(vga), &actor()).unwrap();

        let updated = inventory.update(&update_of(&item, 5), &actor()).unwrap();
        assert_eq!(updated.quantity, 5);
        assert_eq!(inventory.get_by_id(item.id).unwrap().quantity, 5);

        inventory.update(&update_of(&updated, 12), &actor()).unwrap();

        let changes: Vec<_> = db
            .list_item_activities(item.id)
            .unwrap()
            .into_iter()
            .map(|r| (r.action, r.quantity_change))
            .collect();
        assert_eq!(
            changes,
            vec![(Action::Post, 10), (Action::Update, -5), (Action::Update, 7)]
        );
    }

    #[test]
    fn test_update_without_quantity_change_still_logged() {
        let (db, vga) = setup();
        let inventory = InventoryService::new(&db);
        let item = inventory.add(&rtx(vga), &actor()).unwrap();

        let mut request = update_of(&item, 10);
        request.price = 399.0;
        inventory.update(&request, &actor()).unwrap();

        let log = db.list_item_activities(item.id).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].quantity_change, 0);
    }

    #[test]
    fn test_update_failures_write_nothing() {
        let (db, vga) = setup();
        let inventory = InventoryService::new(&db);
        let item = inventory.add(&rtx(vga), &actor()).unwrap();
        let mut other = rtx(vga);
        other.name = "GTX".into();
        inventory.add(&other, &actor()).unwrap();

        let mut missing_category = update_of(&item, 1);
        missing_category.category_id = vga + 100;
        assert!(matches!(
            inventory.update(&missing_category, &actor()),
            Err(Error::NotFound(_))
        ));

        let mut missing_item = update_of(&item, 1);
        missing_item.id = item.id + 100;
        assert!(matches!(
            inventory.update(&missing_item, &actor()),
            Err(Error::NotFound(_))
        ));

        let mut taken = update_of(&item, 1);
        taken.name = "GTX".into();
        assert!(matches!(
            inventory.update(&taken, &actor()),
            Err(Error::Conflict(_))
        ));

        assert_eq!(inventory.get_by_id(item.id).unwrap().quantity, 10);
        assert_eq!(db.list_activities().unwrap().len(), 2);
    }

    #[test]
    fn test_delete_records_zero_change() {
        let (db, vga) = setup();
        let inventory = InventoryService::new(&db);
        let item = inventory.add(&rtx(vga), &actor()).unwrap();

        inventory.delete(item.id, &actor()).unwrap();
        assert!(matches!(inventory.get_by_id(item.id), Err(Error::NotFound(_))));
        assert!(matches!(
            inventory.delete(item.id, &actor()),
            Err(Error::NotFound(_))
        ));

        let log = db.list_item_activities(item.id).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].action, Action::Delete);
        assert_eq!(log[1].quantity_change, 0);
    }

    #[test]
    fn test_reads() {
        let (db, vga) = setup();
        let cpu = db.create_category("CPU").unwrap().id;
        let inventory = InventoryService::new(&db);
        assert!(inventory.get_all().unwrap().is_empty());

        inventory.add(&rtx(vga), &actor()).unwrap();
        let mut ryzen = rtx(cpu);
        ryzen.name = "Ryzen".into();
        inventory.add(&ryzen, &actor()).unwrap();

        assert_eq!(inventory.get_all().unwrap().len(), 2);
        let vga_items = inventory.get_by_category(vga).unwrap();
        assert_eq!(vga_items.len(), 1);
        assert_eq!(vga_items[0].name, "RTX");
        assert!(matches!(
            inventory.get_by_category(999),
            Err(Error::NotFound(_))
        ));
        assert!(inventory.check_available("Ryzen").unwrap());
        assert!(!inventory.check_available("Xeon").unwrap());
    }

    fn break_audit_trail(db: &Database) {
        db.atomically(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_activities BEFORE INSERT ON activities
                 BEGIN SELECT RAISE(ABORT, 'audit trail unavailable'); END;",
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_failed_audit_rolls_back_add() {
        let (db, vga) = setup();
        break_audit_trail(&db);

        let err = InventoryService::new(&db).add(&rtx(vga), &actor()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(db.list_items().unwrap().is_empty());
    }

    #[test]
    fn test_failed_audit_rolls_back_update_and_delete() {
        let (db, vga) = setup();
        let inventory = InventoryService::new(&db);
        let item = inventory.add(&rtx(vga), &actor()).unwrap();
        break_audit_trail(&db);

        let err = inventory.update(&update_of(&item, 3), &actor()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(inventory.get_by_id(item.id).unwrap().quantity, 10);

        let err = inventory.delete(item.id, &actor()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(inventory.get_by_id(item.id).is_ok());
        assert_eq!(db.list_activities().unwrap().len(), 1);
    }
}
