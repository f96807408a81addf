//! Usage record model and the canonical 22-column schema

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tabular::{coerce, columns::ResolvedColumns};
use chrono::NaiveDate;

/// The canonical record schema, in wire order.
///
/// Field ORDER is the contract with the record store: a header row names the
/// columns but position, not name, determines append order. Bulk import maps
/// external headers onto exactly these names.
pub const CANONICAL_COLUMNS: [&str; 22] = [
    "purpose",
    "usage_type",
    "company_name",
    "company_biz_number",
    "internal_dept",
    "industry",
    "item",
    "sub_item",
    "product_name",
    "sample_count",
    "support_disclosure",
    "support_detail",
    "equipment_name",
    "equipment_no",
    "equipment_type",
    "usage_start",
    "usage_end",
    "includes_holiday",
    "usage_hours",
    "usage_fee",
    "purpose_other",
    "process_category",
];

/// One logged equipment session, in wire form.
///
/// Every field is held as the string that is (or will be) stored; missing
/// optional values are empty strings, never a null marker. `usage_fee` is
/// `None` only when the source table carried no fee column at all, which
/// downstream aggregation reports as "fee total unavailable" rather than 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UsageRecord {
    pub purpose: String,
    pub usage_type: String,
    pub company_name: String,
    pub company_biz_number: String,
    pub internal_dept: String,
    pub industry: String,
    pub item: String,
    pub sub_item: String,
    pub product_name: String,
    pub sample_count: String,
    pub support_disclosure: String,
    pub support_detail: String,
    pub equipment_name: String,
    pub equipment_no: String,
    pub equipment_type: String,
    pub usage_start: String,
    pub usage_end: String,
    pub includes_holiday: String,
    pub usage_hours: String,
    /// `None` = the source table had no fee column
    pub usage_fee: Option<String>,
    pub purpose_other: String,
    pub process_category: String,
}

impl UsageRecord {
    /// Serialize into the canonical 22-cell row for append.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.purpose.clone(),
            self.usage_type.clone(),
            self.company_name.clone(),
            self.company_biz_number.clone(),
            self.internal_dept.clone(),
            self.industry.clone(),
            self.item.clone(),
            self.sub_item.clone(),
            self.product_name.clone(),
            self.sample_count.clone(),
            self.support_disclosure.clone(),
            self.support_detail.clone(),
            self.equipment_name.clone(),
            self.equipment_no.clone(),
            self.equipment_type.clone(),
            self.usage_start.clone(),
            self.usage_end.clone(),
            self.includes_holiday.clone(),
            self.usage_hours.clone(),
            self.usage_fee.clone().unwrap_or_default(),
            self.purpose_other.clone(),
            self.process_category.clone(),
        ]
    }

    /// Build a record from a normalized row using resolved soft columns.
    ///
    /// Absent columns read as empty strings, except the fee column whose
    /// absence is preserved as `None`.
    pub fn from_mapping(row: &IndexMap<String, String>, cols: &ResolvedColumns) -> Self {
        let get = |canonical: &str| -> String {
            cols.value(row, canonical).unwrap_or("").trim().to_string()
        };
        Self {
            purpose: get("purpose"),
            usage_type: get("usage_type"),
            company_name: get("company_name"),
            company_biz_number: get("company_biz_number"),
            internal_dept: get("internal_dept"),
            industry: get("industry"),
            item: get("item"),
            sub_item: get("sub_item"),
            product_name: get("product_name"),
            sample_count: get("sample_count"),
            support_disclosure: get("support_disclosure"),
            support_detail: get("support_detail"),
            equipment_name: get("equipment_name"),
            equipment_no: get("equipment_no"),
            equipment_type: get("equipment_type"),
            usage_start: get("usage_start"),
            usage_end: get("usage_end"),
            includes_holiday: get("includes_holiday"),
            usage_hours: get("usage_hours"),
            usage_fee: cols
                .value(row, "usage_fee")
                .map(|v| v.trim().to_string()),
            purpose_other: get("purpose_other"),
            process_category: get("process_category"),
        }
    }

    /// Usage hours with the coercion fallback applied (unparseable -> 0.0).
    pub fn hours(&self) -> f64 {
        coerce::hours(&self.usage_hours)
    }

    /// Usage fee with the coercion fallback applied (unparseable -> 0).
    /// `None` when the source table had no fee column.
    pub fn fee(&self) -> Option<i64> {
        self.usage_fee.as_deref().map(coerce::fee)
    }

    /// Sample count with the coercion fallback applied (unparseable -> 0).
    pub fn sample_count_value(&self) -> i64 {
        coerce::count(&self.sample_count)
    }

    /// Start date, `None` when unparseable. An unparseable start date makes
    /// the record fail every date-range filter while still counting toward
    /// unfiltered totals.
    pub fn start_date(&self) -> Option<NaiveDate> {
        coerce::date(&self.usage_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::{columns::ColumnResolver, normalize};

    #[test]
    fn row_has_canonical_width() {
        let record = UsageRecord::default();
        assert_eq!(record.to_row().len(), CANONICAL_COLUMNS.len());
    }

    #[test]
    fn mapping_round_trip_preserves_values() {
        let mut record = UsageRecord::default();
        record.purpose = "analysis".into();
        record.company_name = "Acme Plasma".into();
        record.equipment_name = "XRD-01".into();
        record.usage_start = "2026-03-02".into();
        record.usage_hours = "3.5".into();
        record.usage_fee = Some("120000".into());
        record.process_category = "unit-process".into();

        let mut rows = vec![CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect()];
        rows.push(record.to_row());

        let mapped = normalize::normalize(&rows, None);
        let cols = ColumnResolver::default().resolve(
            &CANONICAL_COLUMNS.map(String::from),
        );
        let back = UsageRecord::from_mapping(&mapped[0], &cols);
        assert_eq!(back, record);
    }

    #[test]
    fn missing_fee_column_reads_as_none() {
        let rows = vec![
            vec!["equipment_name".to_string(), "usage_hours".to_string()],
            vec!["XRD-01".to_string(), "2".to_string()],
        ];
        let mapped = normalize::normalize(&rows, None);
        let headers: Vec<String> = rows[0].clone();
        let cols = ColumnResolver::default().resolve(&headers);
        let record = UsageRecord::from_mapping(&mapped[0], &cols);
        assert_eq!(record.usage_fee, None);
        assert_eq!(record.fee(), None);
        assert_eq!(record.hours(), 2.0);
    }
}
