//! Permission system for back-office operations

use crate::models::Role;

/// Actions a caller can attempt once authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAction {
    // Reads
    ViewStock,
    ViewAudit,
    ViewUsers,

    // Catalog and inventory writes
    EditCategory,
    DeleteCategory,
    EditItem,
    DeleteItem,

    // Account management
    ManageUsers,
    /// End one's own sessions
    Logout,
}

impl StockAction {
    pub fn admin_only(self) -> bool {
        matches!(
            self,
            StockAction::DeleteCategory | StockAction::DeleteItem | StockAction::ManageUsers
        )
    }
}

/// Permission matrix for account roles
pub struct PermissionMatrix;

impl PermissionMatrix {
    /// Check if a role has permission to perform an action
    pub fn can_perform(role: Role, action: StockAction) -> bool {
        role.is_admin() || !action.admin_only()
    }
}
