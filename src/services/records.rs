//! Per-machine record tables
//!
//! Each piece of equipment owns a table named after it. Appends write the
//! canonical 22-cell row; reads normalize whatever the table currently
//! holds. Header cosmetics (style, freeze) are best-effort and never fail
//! the data operation.

use indexmap::IndexMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::record::UsageRecord,
    store::RecordStore,
    tabular::{columns::ColumnResolver, normalize},
};

#[derive(Clone)]
pub struct RecordsService {
    store: Arc<dyn RecordStore>,
}

impl RecordsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Append one usage record to its equipment table, then apply header
    /// cosmetics best-effort.
    pub async fn append_record(&self, equipment: &str, record: &UsageRecord) -> AppResult<()> {
        self.store
            .append_rows(equipment, vec![record.to_row()])
            .await?;
        self.apply_header_cosmetics(equipment).await;
        Ok(())
    }

    /// Header style + freeze; failures are logged and swallowed, the data
    /// is already committed.
    pub async fn apply_header_cosmetics(&self, equipment: &str) {
        if let Err(e) = self.store.format_header_row(equipment).await {
            tracing::warn!(table = equipment, "header format skipped: {}", e);
        }
        if let Err(e) = self.store.freeze_header_row(equipment).await {
            tracing::warn!(table = equipment, "header freeze skipped: {}", e);
        }
    }

    /// Read an equipment table as typed records.
    pub async fn read_records(&self, equipment: &str) -> AppResult<Vec<UsageRecord>> {
        let rows = self.store.read_table(equipment).await?;
        let headers = rows
            .first()
            .map(|h| normalize::clean_headers(h))
            .unwrap_or_default();
        let cols = ColumnResolver::default().resolve(&headers);
        Ok(normalize::normalize(&rows, None)
            .iter()
            .map(|row| UsageRecord::from_mapping(row, &cols))
            .collect())
    }

    /// Read an equipment table as normalized display rows, restricted to
    /// that equipment's own records, date-filtered when a range is given,
    /// newest first.
    ///
    /// Rows with an unparseable usage_start are excluded by ANY range
    /// filter (even an unbounded-equivalent one) but appear in unfiltered
    /// listings.
    pub async fn list_records(
        &self,
        equipment: &str,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<IndexMap<String, String>>> {
        let rows = self.store.read_table(equipment).await?;
        let headers = rows
            .first()
            .map(|h| normalize::clean_headers(h))
            .unwrap_or_default();
        let cols = ColumnResolver::default().resolve(&headers);

        let mut mapped: Vec<IndexMap<String, String>> = normalize::normalize(&rows, None)
            .into_iter()
            .filter(|row| {
                let record = UsageRecord::from_mapping(row, &cols);
                if !record.equipment_name.is_empty() && record.equipment_name != equipment {
                    return false;
                }
                match range {
                    None => true,
                    Some((start, end)) => match record.start_date() {
                        Some(d) => d >= start && d <= end,
                        None => false,
                    },
                }
            })
            .collect();

        let start_key = cols.key_for("usage_start").map(str::to_string);
        if let Some(key) = start_key {
            mapped.sort_by(|a, b| {
                let av = a.get(&key).map(String::as_str).unwrap_or("");
                let bv = b.get(&key).map(String::as_str).unwrap_or("");
                bv.cmp(av)
            });
        }
        Ok(mapped)
    }

    /// The full raw table for export: cleaned header plus data rows padded
    /// to the header width, sorted newest first by the usage_start column.
    pub async fn export_table(
        &self,
        equipment: &str,
    ) -> AppResult<(Vec<String>, Vec<Vec<String>>)> {
        let rows = self.store.read_table(equipment).await?;
        let headers = rows
            .first()
            .map(|h| normalize::clean_headers(h))
            .unwrap_or_default();
        let cols = ColumnResolver::default().resolve(&headers);
        let start_idx = cols
            .key_for("usage_start")
            .and_then(|key| headers.iter().position(|h| h == key));

        let mut data: Vec<Vec<String>> = rows
            .get(1..)
            .unwrap_or_default()
            .iter()
            .map(|row| {
                (0..headers.len())
                    .map(|i| row.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        if let Some(idx) = start_idx {
            data.sort_by(|a, b| b[idx].cmp(&a[idx]));
        }
        Ok((headers, data))
    }
}
