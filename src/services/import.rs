//! Bulk import reconciler
//!
//! Maps the externally authored reporting template onto the canonical
//! 22-column schema. The template keeps its header at a known fixed row
//! offset (one row above the first data row); this service never tries to
//! auto-detect it. Column presence is an all-or-nothing gate: if any
//! canonical column is missing from the header, nothing is coerced and
//! nothing is written. Row-level value problems are NOT errors; they
//! coerce exactly like aggregation does.

use serde::Serialize;
use serde_with::skip_serializing_none;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::record::CANONICAL_COLUMNS,
    store::RecordStore,
    tabular::{coerce, normalize},
};

/// Rows ready for append, already in canonical column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledBatch {
    pub rows: Vec<Vec<String>>,
}

impl ReconciledBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How an import run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Completed,
    /// The append sequence stopped mid-way; batches before the failure
    /// remain committed (there is no rollback across batches).
    Aborted,
}

/// Report returned for every import run.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportOutcome {
    pub status: ImportStatus,
    /// Data rows reconciled from the upload (empty rows already dropped)
    pub total_rows: usize,
    /// Rows actually committed to the store
    pub appended_rows: usize,
    pub batches_committed: usize,
    /// Store error that stopped the sequence, when aborted
    pub error: Option<String>,
}

/// Reconcile an external table against the canonical schema.
///
/// Drops fully empty rows, then gates on every canonical column being
/// present in the header by exact trimmed name (order free). On success,
/// rows are rebuilt in canonical order with per-column coercion: integer
/// and decimal columns fall back to 0, date columns normalize to
/// `YYYY-MM-DD` with unparseable dates becoming empty null-date markers,
/// text columns are trimmed.
pub fn reconcile(
    raw_rows: &[Vec<String>],
    header_row_index: usize,
) -> AppResult<ReconciledBatch> {
    let Some(header) = raw_rows.get(header_row_index) else {
        return Err(AppError::Validation(format!(
            "header row {} is past the end of the upload ({} rows)",
            header_row_index,
            raw_rows.len()
        )));
    };

    let present: Vec<&str> = header.iter().map(|h| h.trim()).collect();
    let missing_columns: Vec<String> = CANONICAL_COLUMNS
        .iter()
        .filter(|col| !present.contains(*col))
        .map(|col| col.to_string())
        .collect();
    if !missing_columns.is_empty() {
        return Err(AppError::SchemaMismatch { missing_columns });
    }

    let rows = normalize::normalize(raw_rows, Some(header_row_index))
        .into_iter()
        .filter(|row| row.values().any(|v| !v.trim().is_empty()))
        .map(|row| {
            CANONICAL_COLUMNS
                .iter()
                .map(|col| {
                    let value = row.get(*col).map(String::as_str).unwrap_or("");
                    match *col {
                        "sample_count" => coerce::count(value).to_string(),
                        "usage_hours" => coerce::hours(value).to_string(),
                        "usage_fee" => coerce::fee(value).to_string(),
                        "usage_start" | "usage_end" => coerce::normalize_date(value),
                        _ => value.trim().to_string(),
                    }
                })
                .collect()
        })
        .collect();

    Ok(ReconciledBatch { rows })
}

#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn RecordStore>,
    batch_size: usize,
}

impl ImportService {
    pub fn new(store: Arc<dyn RecordStore>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Reconcile and append to the target equipment table in sequential,
    /// independent batches.
    ///
    /// A failure before anything is committed propagates as a plain error.
    /// A failure after at least one committed batch returns an `Aborted`
    /// outcome instead: prior batches stay in the store and the caller must
    /// be told so.
    pub async fn run(
        &self,
        equipment: &str,
        raw_rows: &[Vec<String>],
        header_row_index: usize,
    ) -> AppResult<ImportOutcome> {
        let batch = reconcile(raw_rows, header_row_index)?;
        let total_rows = batch.len();

        let mut appended_rows = 0usize;
        let mut batches_committed = 0usize;

        for chunk in batch.rows.chunks(self.batch_size) {
            match self.store.append_rows(equipment, chunk.to_vec()).await {
                Ok(()) => {
                    appended_rows += chunk.len();
                    batches_committed += 1;
                }
                Err(e) if batches_committed == 0 => return Err(e),
                Err(e) => {
                    tracing::error!(
                        table = equipment,
                        appended_rows,
                        "import aborted mid-sequence: {}",
                        e
                    );
                    return Ok(ImportOutcome {
                        status: ImportStatus::Aborted,
                        total_rows,
                        appended_rows,
                        batches_committed,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        if appended_rows > 0 {
            // cosmetic; failures must not taint a committed import
            if let Err(e) = self.store.format_header_row(equipment).await {
                tracing::warn!(table = equipment, "header format skipped: {}", e);
            }
            if let Err(e) = self.store.freeze_header_row(equipment).await {
                tracing::warn!(table = equipment, "header freeze skipped: {}", e);
            }
        }

        Ok(ImportOutcome {
            status: ImportStatus::Completed,
            total_rows,
            appended_rows,
            batches_committed,
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, MockRecordStore};

    /// Template with the header at row 3 (three preamble rows), like the
    /// real reporting workbook.
    fn template(data: &[&[&str]]) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = vec![
            vec!["Usage report template".to_string()],
            vec![String::new()],
            vec![String::new()],
            CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
        ];
        for row in data {
            rows.push(row.iter().map(|c| c.to_string()).collect());
        }
        rows
    }

    fn data_row(start: &str, hours: &str, fee: &str) -> Vec<String> {
        CANONICAL_COLUMNS
            .iter()
            .map(|col| match *col {
                "purpose" => "analysis".to_string(),
                "equipment_name" => "XRD-01".to_string(),
                "usage_start" => start.to_string(),
                "usage_end" => start.to_string(),
                "usage_hours" => hours.to_string(),
                "usage_fee" => fee.to_string(),
                _ => "x".to_string(),
            })
            .collect()
    }

    #[test]
    fn missing_column_lists_exactly_that_column() {
        let mut rows = template(&[]);
        let idx = CANONICAL_COLUMNS
            .iter()
            .position(|c| *c == "usage_hours")
            .unwrap();
        rows[3].remove(idx);
        let err = reconcile(&rows, 3).unwrap_err();
        match err {
            AppError::SchemaMismatch { missing_columns } => {
                assert_eq!(missing_columns, vec!["usage_hours".to_string()]);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn header_order_is_free_but_output_is_canonical() {
        let mut rows = template(&[]);
        rows[3].reverse();
        let mut data: Vec<String> = data_row("2026-03-02", "2", "1000");
        data.reverse();
        rows.push(data);

        let batch = reconcile(&rows, 3).unwrap();
        assert_eq!(batch.rows.len(), 1);
        // canonical order restored regardless of template column order
        assert_eq!(batch.rows[0][0], "analysis");
        assert_eq!(batch.rows[0][15], "2026-03-02");
        assert_eq!(batch.rows[0][18], "2");
    }

    #[test]
    fn fully_empty_rows_are_dropped() {
        let mut rows = template(&[]);
        rows.push(vec![String::new(); CANONICAL_COLUMNS.len()]);
        rows.push(data_row("2026-03-02", "1", "0"));
        rows.push(vec![" ".to_string(); CANONICAL_COLUMNS.len()]);
        let batch = reconcile(&rows, 3).unwrap();
        assert_eq!(batch.rows.len(), 1);
    }

    #[test]
    fn value_coercion_is_not_a_schema_failure() {
        let mut rows = template(&[]);
        rows.push(data_row("2026-03-01", "1.5", "1000"));
        rows.push(data_row("2026-03-02", "abc", "2000"));
        rows.push(data_row("2026-03-03", "2", "3000"));

        let batch = reconcile(&rows, 3).unwrap();
        assert_eq!(batch.rows.len(), 3);
        let hours_idx = 18;
        assert_eq!(batch.rows[0][hours_idx], "1.5");
        assert_eq!(batch.rows[1][hours_idx], "0");
        assert_eq!(batch.rows[2][hours_idx], "2");
        // neighbors of the coerced cell survive untouched
        assert_eq!(batch.rows[1][0], "analysis");
    }

    #[test]
    fn dates_normalize_and_bad_dates_become_null_markers() {
        let mut rows = template(&[]);
        rows.push(data_row("2026/03/02", "1", "0"));
        rows.push(data_row("sometime", "1", "0"));
        let batch = reconcile(&rows, 3).unwrap();
        assert_eq!(batch.rows[0][15], "2026-03-02");
        assert_eq!(batch.rows[1][15], "");
    }

    #[tokio::test]
    async fn import_chunks_into_batches() {
        let store = Arc::new(MemoryStore::new().with_table(
            "XRD-01",
            vec![CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect()],
        ));
        let service = ImportService::new(store.clone(), 2);

        let mut rows = template(&[]);
        for day in 1..=5 {
            rows.push(data_row(&format!("2026-03-{:02}", day), "1", "0"));
        }
        let outcome = service.run("XRD-01", &rows, 3).await.unwrap();
        assert_eq!(outcome.status, ImportStatus::Completed);
        assert_eq!(outcome.total_rows, 5);
        assert_eq!(outcome.appended_rows, 5);
        assert_eq!(outcome.batches_committed, 3);

        let stored = store.read_table("XRD-01").await.unwrap();
        assert_eq!(stored.len(), 6);
    }

    #[tokio::test]
    async fn schema_mismatch_appends_nothing() {
        let store = Arc::new(MemoryStore::new().with_table(
            "XRD-01",
            vec![CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect()],
        ));
        let service = ImportService::new(store.clone(), 50);

        let mut rows = template(&[]);
        rows[3].pop();
        rows.push(data_row("2026-03-02", "1", "0"));
        let err = service.run("XRD-01", &rows, 3).await.unwrap_err();
        assert!(matches!(err, AppError::SchemaMismatch { .. }));
        assert_eq!(store.read_table("XRD-01").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mid_sequence_failure_reports_partial_commit() {
        let mut mock = MockRecordStore::new();
        let mut call = 0;
        mock.expect_append_rows().returning(move |_, _| {
            call += 1;
            if call == 1 {
                Ok(())
            } else {
                Err(AppError::StoreUnavailable("connection reset".to_string()))
            }
        });
        let service = ImportService::new(Arc::new(mock), 2);

        let mut rows = template(&[]);
        for day in 1..=4 {
            rows.push(data_row(&format!("2026-03-{:02}", day), "1", "0"));
        }
        let outcome = service.run("XRD-01", &rows, 3).await.unwrap();
        assert_eq!(outcome.status, ImportStatus::Aborted);
        assert_eq!(outcome.appended_rows, 2);
        assert_eq!(outcome.batches_committed, 1);
        assert!(outcome.error.unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn first_batch_failure_is_a_plain_error() {
        let store = Arc::new(MemoryStore::new());
        let service = ImportService::new(store, 50);
        let mut rows = template(&[]);
        rows.push(data_row("2026-03-02", "1", "0"));
        let err = service.run("NO-SUCH", &rows, 3).await.unwrap_err();
        assert!(matches!(err, AppError::LookupMiss { .. }));
    }
}
