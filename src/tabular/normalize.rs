//! Schema normalization for raw tables
//!
//! A raw table is a sequence of rows of string cells. The header row may
//! contain blank or duplicate cells; both are rewritten to synthetic
//! `unassigned-N` placeholders so every data row produces a full mapping
//! with unique keys and no silent column collisions during aggregation.

use indexmap::IndexMap;
use std::collections::HashSet;

/// Clean a raw header row: trim cells, replace empty or duplicate labels
/// with `unassigned-1`, `unassigned-2`, ...
pub fn clean_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut unassigned = 0usize;
    let mut headers = Vec::with_capacity(raw.len());

    for cell in raw {
        let trimmed = cell.trim();
        let mut label = trimmed.to_string();
        if trimmed.is_empty() || seen.contains(trimmed) {
            // a literal "unassigned-N" header could collide with the
            // synthesized name, so keep bumping until unique
            loop {
                unassigned += 1;
                label = format!("unassigned-{}", unassigned);
                if !seen.contains(&label) {
                    break;
                }
            }
        }
        seen.insert(label.clone());
        headers.push(label);
    }

    headers
}

/// Normalize a raw table into row mappings keyed by cleaned header names.
///
/// `header_row_index` defaults to 0. Rows before the header are ignored.
/// Short rows pad missing trailing cells with empty strings; no row is
/// dropped for being short. Cells beyond the header width are dropped:
/// the header defines the mapping.
pub fn normalize(
    rows: &[Vec<String>],
    header_row_index: Option<usize>,
) -> Vec<IndexMap<String, String>> {
    let header_idx = header_row_index.unwrap_or(0);
    let Some(header_row) = rows.get(header_idx) else {
        return Vec::new();
    };
    let headers = clean_headers(header_row);

    rows[header_idx + 1..]
        .iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let value = row.get(i).cloned().unwrap_or_default();
                    (key.clone(), value)
                })
                .collect()
        })
        .collect()
}
