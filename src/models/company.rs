//! Company reference data

use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Company directory loaded once per session from the company master table.
///
/// Size labels are kept verbatim as found in the sheet; aggregation orders
/// the known buckets first and appends anything else in first-seen order.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CompanyDirectory {
    /// Company names in sheet order
    pub names: Vec<String>,
    /// Company name -> size bucket label
    #[schema(value_type = Object)]
    pub sizes: HashMap<String, String>,
    /// Company name -> business registration number (only when present)
    #[schema(value_type = Object)]
    pub biz_numbers: HashMap<String, String>,
}

impl CompanyDirectory {
    /// Size bucket for a company name; unmatched names resolve to "other",
    /// never to an error.
    pub fn bucket_for(&self, company_name: &str) -> String {
        self.sizes
            .get(company_name.trim())
            .cloned()
            .unwrap_or_else(|| "other".to_string())
    }

    pub fn biz_number(&self, company_name: &str) -> Option<&str> {
        self.biz_numbers.get(company_name.trim()).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
