//! Equipment reference data
//!
//! Loaded from the equipment master table at session start; never created or
//! mutated by this server. The equipment name doubles as the name of its
//! per-machine record table in the document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// One piece of equipment from the master table
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub name: String,
    pub equipment_no: String,
    pub equipment_type: String,
    pub department: String,
}

/// Department -> equipment names, plus a by-name info map.
///
/// Load failures degrade to an empty map so callers can still render
/// "no data" instead of failing the whole session.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct EquipmentDirectory {
    /// Departments in display order with their equipment names
    #[schema(value_type = Object)]
    pub by_department: BTreeMap<String, Vec<String>>,
    /// Equipment details keyed by name
    #[schema(value_type = Object)]
    pub by_name: BTreeMap<String, Equipment>,
}

impl EquipmentDirectory {
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn departments(&self) -> Vec<String> {
        self.by_department.keys().cloned().collect()
    }

    pub fn equipment_in(&self, department: &str) -> Vec<String> {
        self.by_department
            .get(department)
            .cloned()
            .unwrap_or_default()
    }

    pub fn info(&self, name: &str) -> Option<&Equipment> {
        self.by_name.get(name)
    }
}
