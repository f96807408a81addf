//! Soft column resolution
//!
//! Tables arrive with loosely named headers ("Usage Hours", "usage_hours",
//! "usage hours (h)"). Resolution is an explicit ordered list of
//! (canonical name, candidate substrings) pairs evaluated once per header
//! row, producing a fixed mapping. A logical column with no matching header
//! resolves to nothing; callers treat that as "column absent", not an error.

use indexmap::IndexMap;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// One resolvable logical column
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    pub candidates: &'static [&'static str],
}

/// Record-table specs, most specific first: a spec earlier in the list
/// claims its header before looser candidates below it can. Each header is
/// claimed at most once.
pub const RECORD_COLUMN_SPECS: &[ColumnSpec] = &[
    ColumnSpec { canonical: "purpose_other", candidates: &["purpose_other"] },
    ColumnSpec { canonical: "process_category", candidates: &["process_category", "process"] },
    ColumnSpec { canonical: "usage_type", candidates: &["usage_type"] },
    ColumnSpec { canonical: "usage_start", candidates: &["usage_start", "start_date"] },
    ColumnSpec { canonical: "usage_end", candidates: &["usage_end", "end_date"] },
    ColumnSpec { canonical: "usage_hours", candidates: &["usage_hours", "hours"] },
    ColumnSpec { canonical: "usage_fee", candidates: &["usage_fee", "fee"] },
    ColumnSpec { canonical: "sample_count", candidates: &["sample_count", "sample"] },
    ColumnSpec { canonical: "support_disclosure", candidates: &["support_disclosure", "disclosure"] },
    ColumnSpec { canonical: "support_detail", candidates: &["support_detail"] },
    ColumnSpec { canonical: "company_biz_number", candidates: &["company_biz_number", "biz_number", "business_registration"] },
    ColumnSpec { canonical: "company_name", candidates: &["company_name", "company"] },
    ColumnSpec { canonical: "internal_dept", candidates: &["internal_dept", "department"] },
    ColumnSpec { canonical: "industry", candidates: &["industry"] },
    ColumnSpec { canonical: "sub_item", candidates: &["sub_item"] },
    ColumnSpec { canonical: "product_name", candidates: &["product_name", "product"] },
    ColumnSpec { canonical: "item", candidates: &["item"] },
    ColumnSpec { canonical: "equipment_no", candidates: &["equipment_no", "equipment_number"] },
    ColumnSpec { canonical: "equipment_type", candidates: &["equipment_type"] },
    ColumnSpec { canonical: "equipment_name", candidates: &["equipment_name", "equipment", "machine"] },
    ColumnSpec { canonical: "includes_holiday", candidates: &["includes_holiday", "holiday"] },
    ColumnSpec { canonical: "purpose", candidates: &["purpose"] },
];

/// Equipment master table specs
pub const EQUIPMENT_COLUMN_SPECS: &[ColumnSpec] = &[
    ColumnSpec { canonical: "department", candidates: &["department", "dept"] },
    ColumnSpec { canonical: "equipment_no", candidates: &["equipment_no", "equipment_number"] },
    ColumnSpec { canonical: "equipment_type", candidates: &["equipment_type"] },
    ColumnSpec { canonical: "equipment_name", candidates: &["equipment_name", "equipment", "machine"] },
];

/// Company master table specs
pub const COMPANY_COLUMN_SPECS: &[ColumnSpec] = &[
    ColumnSpec { canonical: "company_biz_number", candidates: &["company_biz_number", "biz_number", "business_registration", "registration_number"] },
    ColumnSpec { canonical: "company_size", candidates: &["company_size", "size", "classification"] },
    ColumnSpec { canonical: "company_name", candidates: &["company_name", "company"] },
];

/// User master table specs
pub const USER_COLUMN_SPECS: &[ColumnSpec] = &[
    ColumnSpec { canonical: "user_id", candidates: &["user_id", "login", "id"] },
    ColumnSpec { canonical: "password", candidates: &["password"] },
    ColumnSpec { canonical: "display_name", candidates: &["display_name", "name"] },
    ColumnSpec { canonical: "department", candidates: &["department", "dept"] },
];

/// Fold a label for matching: NFKC-normalize, lowercase, strip whitespace
/// and underscores.
fn fold(label: &str) -> String {
    label
        .nfkc()
        .flat_map(char::to_lowercase)
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

/// Resolves headers against an ordered spec list.
pub struct ColumnResolver {
    specs: Vec<ColumnSpec>,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new(RECORD_COLUMN_SPECS)
    }
}

impl ColumnResolver {
    pub fn new(specs: &[ColumnSpec]) -> Self {
        Self { specs: specs.to_vec() }
    }

    /// Evaluate the column specs once against a header row.
    pub fn resolve(&self, headers: &[String]) -> ResolvedColumns {
        let folded: Vec<String> = headers.iter().map(|h| fold(h)).collect();
        let mut claimed = vec![false; headers.len()];
        let mut keys = HashMap::new();

        for spec in &self.specs {
            let found = folded.iter().enumerate().find(|(i, header)| {
                !claimed[*i]
                    && !header.is_empty()
                    && spec
                        .candidates
                        .iter()
                        .any(|candidate| header.contains(&fold(candidate)))
            });
            if let Some((i, _)) = found {
                claimed[i] = true;
                keys.insert(spec.canonical.to_string(), headers[i].clone());
            }
        }

        ResolvedColumns { keys }
    }
}

/// Fixed mapping of canonical names to actual header keys.
#[derive(Debug, Clone, Default)]
pub struct ResolvedColumns {
    keys: HashMap<String, String>,
}

impl ResolvedColumns {
    /// Header key for a canonical column, if one matched.
    pub fn key_for(&self, canonical: &str) -> Option<&str> {
        self.keys.get(canonical).map(|k| k.as_str())
    }

    /// Value of a canonical column in a normalized row, if the column exists.
    pub fn value<'r>(
        &self,
        row: &'r IndexMap<String, String>,
        canonical: &str,
    ) -> Option<&'r str> {
        self.key_for(canonical)
            .and_then(|key| row.get(key))
            .map(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn exact_canonical_headers_all_resolve() {
        let hs = headers(&["purpose", "usage_hours", "company_name"]);
        let cols = ColumnResolver::default().resolve(&hs);
        assert_eq!(cols.key_for("purpose"), Some("purpose"));
        assert_eq!(cols.key_for("usage_hours"), Some("usage_hours"));
        assert_eq!(cols.key_for("company_name"), Some("company_name"));
    }

    #[test]
    fn matching_is_case_whitespace_and_underscore_insensitive() {
        let hs = headers(&["Usage Hours (h)", "COMPANY NAME", " Process Category "]);
        let cols = ColumnResolver::default().resolve(&hs);
        assert_eq!(cols.key_for("usage_hours"), Some("Usage Hours (h)"));
        assert_eq!(cols.key_for("company_name"), Some("COMPANY NAME"));
        assert_eq!(cols.key_for("process_category"), Some(" Process Category "));
    }

    #[test]
    fn absent_column_resolves_to_none() {
        let hs = headers(&["purpose", "usage_hours"]);
        let cols = ColumnResolver::default().resolve(&hs);
        assert_eq!(cols.key_for("usage_fee"), None);
    }

    #[test]
    fn specific_columns_claim_before_loose_candidates() {
        // "equipment" is a candidate for equipment_name but must not steal
        // the equipment_no / equipment_type headers
        let hs = headers(&["equipment_no", "equipment_type", "equipment_name"]);
        let cols = ColumnResolver::default().resolve(&hs);
        assert_eq!(cols.key_for("equipment_no"), Some("equipment_no"));
        assert_eq!(cols.key_for("equipment_type"), Some("equipment_type"));
        assert_eq!(cols.key_for("equipment_name"), Some("equipment_name"));
    }

    #[test]
    fn sub_item_is_not_shadowed_by_item() {
        let hs = headers(&["sub_item", "item"]);
        let cols = ColumnResolver::default().resolve(&hs);
        assert_eq!(cols.key_for("sub_item"), Some("sub_item"));
        assert_eq!(cols.key_for("item"), Some("item"));
    }

    #[test]
    fn value_reads_through_the_resolved_key() {
        let hs = headers(&["Usage Hours"]);
        let cols = ColumnResolver::default().resolve(&hs);
        let mut row = IndexMap::new();
        row.insert("Usage Hours".to_string(), "3.5".to_string());
        assert_eq!(cols.value(&row, "usage_hours"), Some("3.5"));
        assert_eq!(cols.value(&row, "usage_fee"), None);
    }
}
