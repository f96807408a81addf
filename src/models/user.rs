//! User reference data and session context

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Department sentinel granting cross-department access
pub const ALL_DEPARTMENTS: &str = "ALL";

/// A row of the user master table.
///
/// The password is stored in plaintext in the table and compared by exact
/// string match; that is the store's contract, preserved as-is.
#[derive(Debug, Clone, Default)]
pub struct StoredUser {
    pub id: String,
    pub password: String,
    pub display_name: String,
    pub department: String,
}

/// Authenticated session context, created at login and cleared at logout.
///
/// Passed explicitly to every operation that needs it; there is no ambient
/// session state anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionContext {
    pub user_id: String,
    pub display_name: String,
    /// Department name, or the sentinel "ALL" for cross-department access
    pub department: String,
}

impl SessionContext {
    pub fn has_all_access(&self) -> bool {
        self.department == ALL_DEPARTMENTS
    }

    pub fn can_access_department(&self, department: &str) -> bool {
        self.has_all_access() || self.department == department
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_sentinel_grants_every_department() {
        let ctx = SessionContext {
            user_id: "master".into(),
            display_name: "Master".into(),
            department: ALL_DEPARTMENTS.into(),
        };
        assert!(ctx.can_access_department("plasma"));
        assert!(ctx.can_access_department("surface"));
    }

    #[test]
    fn plain_department_is_scoped() {
        let ctx = SessionContext {
            user_id: "klee".into(),
            display_name: "K.H. Lee".into(),
            department: "plasma".into(),
        };
        assert!(ctx.can_access_department("plasma"));
        assert!(!ctx.can_access_department("surface"));
    }
}
