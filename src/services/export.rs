//! Export service
//!
//! Renders a table view verbatim as UTF-8 CSV (with BOM, so spreadsheet
//! applications pick the encoding up) or as a single-sheet XLSX workbook.
//! Filenames carry the entity name and a timestamp.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

/// UTF-8 byte order mark expected by spreadsheet applications
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Characters not welcome in filenames or sheet names
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w.-]+").expect("invalid filename pattern"));

/// XLSX sheet name length limit
const MAX_SHEET_NAME: usize = 31;

#[derive(Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Header + rows as a BOM-prefixed CSV body.
    pub fn to_csv(&self, headers: &[String], rows: &[Vec<String>]) -> AppResult<Vec<u8>> {
        let mut body = Vec::from(UTF8_BOM);
        {
            let mut writer = csv::Writer::from_writer(&mut body);
            writer
                .write_record(headers)
                .map_err(|e| AppError::Internal(format!("csv write failed: {}", e)))?;
            for row in rows {
                writer
                    .write_record(row)
                    .map_err(|e| AppError::Internal(format!("csv write failed: {}", e)))?;
            }
            writer
                .flush()
                .map_err(|e| AppError::Internal(format!("csv flush failed: {}", e)))?;
        }
        Ok(body)
    }

    /// Header + rows as a single-sheet XLSX workbook.
    pub fn to_xlsx(
        &self,
        sheet_name: &str,
        headers: &[String],
        rows: &[Vec<String>],
    ) -> AppResult<Vec<u8>> {
        use rust_xlsxwriter::{Workbook, Worksheet};

        let mut workbook = Workbook::new();
        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(Self::sheet_name(sheet_name))
            .map_err(|e| AppError::Internal(format!("xlsx sheet name rejected: {}", e)))?;

        for (col, header) in headers.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, header)
                .map_err(|e| AppError::Internal(format!("xlsx write failed: {}", e)))?;
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                worksheet
                    .write_string((r + 1) as u32, c as u16, value)
                    .map_err(|e| AppError::Internal(format!("xlsx write failed: {}", e)))?;
            }
        }

        workbook.push_worksheet(worksheet);
        workbook
            .save_to_buffer()
            .map_err(|e| AppError::Internal(format!("xlsx save failed: {}", e)))
    }

    /// `{entity}_records_{YYYYMMDD_HHMM}.{ext}` with unsafe characters
    /// replaced.
    pub fn filename(&self, entity: &str, extension: &str, now: DateTime<Utc>) -> String {
        let safe = UNSAFE_CHARS.replace_all(entity.trim(), "_");
        format!(
            "{}_records_{}.{}",
            safe,
            now.format("%Y%m%d_%H%M"),
            extension
        )
    }

    fn sheet_name(entity: &str) -> String {
        let safe = UNSAFE_CHARS.replace_all(entity.trim(), "_");
        safe.chars().take(MAX_SHEET_NAME).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn headers() -> Vec<String> {
        vec!["equipment_name".to_string(), "usage_hours".to_string()]
    }

    #[test]
    fn csv_starts_with_bom_and_escapes_cells() {
        let rows = vec![vec!["XRD-01".to_string(), "uses \"quotes\", commas".to_string()]];
        let body = ExportService::new().to_csv(&headers(), &rows).unwrap();
        assert_eq!(&body[..3], UTF8_BOM);
        let text = String::from_utf8(body[3..].to_vec()).unwrap();
        assert!(text.starts_with("equipment_name,usage_hours"));
        assert!(text.contains("\"uses \"\"quotes\"\", commas\""));
    }

    #[test]
    fn xlsx_body_is_a_zip_container() {
        let rows = vec![vec!["XRD-01".to_string(), "2.5".to_string()]];
        let body = ExportService::new()
            .to_xlsx("XRD-01", &headers(), &rows)
            .unwrap();
        // xlsx is a zip; PK magic is enough of a smoke check here
        assert_eq!(&body[..2], b"PK");
    }

    #[test]
    fn filename_carries_entity_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap();
        let name = ExportService::new().filename("XRD 01/plasma", "csv", now);
        assert_eq!(name, "XRD_01_plasma_records_20260302_1430.csv");
    }

    #[test]
    fn sheet_name_is_truncated_to_xlsx_limit() {
        let long = "a".repeat(64);
        assert_eq!(ExportService::sheet_name(&long).len(), 31);
    }
}
