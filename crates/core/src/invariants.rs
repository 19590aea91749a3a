//! Developer guardrails and invariants
//!
//! Debug assertions for detecting impossible states during development.
//! These checks are compiled out in release builds.

use crate::models::{Action, Item, NewActivity};

/// Validate that a stored item is internally consistent
pub fn assert_item_invariants(item: &Item) {
    debug_assert!(item.id > 0, "Item {:?} has no id", item.name);

    debug_assert!(
        !item.name.trim().is_empty(),
        "Item {} has empty name",
        item.id
    );

    debug_assert!(
        item.category_id > 0,
        "Item {} has invalid category_id {}",
        item.id,
        item.category_id
    );
}

/// Validate that an audit entry is well formed for its action
pub fn assert_activity_invariants(entry: &NewActivity) {
    debug_assert!(
        entry.action != Action::Delete || entry.quantity_change == 0,
        "DELETE entry for item {} carries quantity_change {}",
        entry.item_id,
        entry.quantity_change
    );

    debug_assert!(
        !entry.performed_by.trim().is_empty(),
        "Audit entry for item {} has no actor",
        entry.item_id
    );
}

/// Validate that an UPDATE entry records the net change between two snapshots
pub fn assert_quantity_delta(before: &Item, after: &Item, entry: &NewActivity) {
    debug_assert_eq!(
        entry.quantity_change,
        after.quantity - before.quantity,
        "Item {} delta does not match {} -> {}",
        after.id,
        before.quantity,
        after.quantity
    );
}
