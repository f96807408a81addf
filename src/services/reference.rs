//! Reference data service
//!
//! Loads the read-only master tables (equipment, companies, equipment info)
//! fresh on every call; nothing is cached across requests, so staleness is
//! bounded by the request itself. Equipment and company load failures
//! degrade to empty directories so views can still report "no data".

use indexmap::IndexMap;
use std::sync::Arc;

use crate::{
    config::MasterTablesConfig,
    error::{AppError, AppResult},
    models::{
        company::CompanyDirectory,
        equipment::{Equipment, EquipmentDirectory},
    },
    store::RecordStore,
    tabular::{
        columns::{ColumnResolver, COMPANY_COLUMN_SPECS, EQUIPMENT_COLUMN_SPECS},
        normalize,
    },
};

/// Rows whose name cell starts with this marker are template annotations,
/// not data.
const ANNOTATION_PREFIX: char = '※';

/// Case/whitespace/underscore-insensitive fold for table titles and header
/// detection.
fn fold(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect()
}

#[derive(Clone)]
pub struct ReferenceService {
    store: Arc<dyn RecordStore>,
    tables: MasterTablesConfig,
}

impl ReferenceService {
    pub fn new(store: Arc<dyn RecordStore>, tables: MasterTablesConfig) -> Self {
        Self { store, tables }
    }

    /// Find and read the first table whose title matches one of the
    /// candidates (case/whitespace-insensitive). A miss reports the
    /// available table names.
    async fn read_candidate_table(
        &self,
        candidates: &[String],
    ) -> AppResult<Vec<Vec<String>>> {
        let available = self.store.list_tables().await?;
        for candidate in candidates {
            if let Some(name) = available.iter().find(|n| fold(n) == fold(candidate)) {
                return self.store.read_table(name).await;
            }
        }
        Err(AppError::LookupMiss {
            name: candidates.first().cloned().unwrap_or_default(),
            available,
        })
    }

    /// Equipment master table -> department/equipment directory.
    /// Degrades to an empty directory on any load failure.
    pub async fn load_equipment(&self) -> EquipmentDirectory {
        match self.try_load_equipment().await {
            Ok(directory) => directory,
            Err(e) => {
                tracing::warn!("equipment master load failed, degrading to empty: {}", e);
                EquipmentDirectory::default()
            }
        }
    }

    async fn try_load_equipment(&self) -> AppResult<EquipmentDirectory> {
        let rows = self
            .read_candidate_table(&self.tables.equipment_candidates)
            .await?;
        let headers = rows
            .first()
            .map(|h| normalize::clean_headers(h))
            .unwrap_or_default();
        let cols = ColumnResolver::new(EQUIPMENT_COLUMN_SPECS).resolve(&headers);

        let mut directory = EquipmentDirectory::default();
        for row in normalize::normalize(&rows, None) {
            let department = cols.value(&row, "department").unwrap_or("").trim().to_string();
            let name = cols.value(&row, "equipment_name").unwrap_or("").trim().to_string();
            if department.is_empty() || name.is_empty() {
                continue;
            }
            directory
                .by_department
                .entry(department.clone())
                .or_default()
                .push(name.clone());
            directory.by_name.insert(
                name.clone(),
                Equipment {
                    name,
                    equipment_no: cols.value(&row, "equipment_no").unwrap_or("").trim().to_string(),
                    equipment_type: cols
                        .value(&row, "equipment_type")
                        .unwrap_or("")
                        .trim()
                        .to_string(),
                    department,
                },
            );
        }
        Ok(directory)
    }

    /// Company master table -> company directory.
    /// Degrades to an empty directory on any load failure.
    pub async fn load_companies(&self) -> CompanyDirectory {
        match self.try_load_companies().await {
            Ok(directory) => directory,
            Err(e) => {
                tracing::warn!("company master load failed, degrading to empty: {}", e);
                CompanyDirectory::default()
            }
        }
    }

    async fn try_load_companies(&self) -> AppResult<CompanyDirectory> {
        let rows = self
            .read_candidate_table(&self.tables.company_candidates)
            .await?;

        // The company sheet historically carries preamble rows before the
        // real header; locate the header by scanning for the company-name
        // label itself (prose cells mentioning companies must not match).
        let resolver = ColumnResolver::new(COMPANY_COLUMN_SPECS);
        let header_idx = rows
            .iter()
            .position(|row| row.iter().any(|cell| fold(cell).contains("companyname")))
            .unwrap_or(0);

        let headers = rows
            .get(header_idx)
            .map(|h| normalize::clean_headers(h))
            .unwrap_or_default();
        let cols = resolver.resolve(&headers);

        let mut directory = CompanyDirectory::default();
        for row in normalize::normalize(&rows, Some(header_idx)) {
            let name = cols.value(&row, "company_name").unwrap_or("").trim().to_string();
            if name.is_empty() || name.starts_with(ANNOTATION_PREFIX) {
                continue;
            }
            let size = cols
                .value(&row, "company_size")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or("other")
                .to_string();
            directory.names.push(name.clone());
            directory.sizes.insert(name.clone(), size);
            if let Some(biz) = cols.value(&row, "company_biz_number") {
                let biz = biz.trim();
                if !biz.is_empty() {
                    directory.biz_numbers.insert(name, biz.to_string());
                }
            }
        }
        Ok(directory)
    }

    /// The equipment-information sheet as normalized rows, optionally
    /// filtered by a substring search over every cell. Unlike the master
    /// loads this does NOT degrade: a missing sheet is reported with the
    /// available names.
    pub async fn equipment_info(
        &self,
        search: Option<&str>,
    ) -> AppResult<Vec<IndexMap<String, String>>> {
        let rows = self
            .read_candidate_table(&self.tables.equipment_info_candidates)
            .await?;
        let mut mapped = normalize::normalize(&rows, None);

        // drop rows with an empty leading cell (spacer rows in the sheet)
        mapped.retain(|row| {
            row.values()
                .next()
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false)
        });

        if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            mapped.retain(|row| {
                row.values()
                    .any(|v| v.to_lowercase().contains(&needle))
            });
        }
        Ok(mapped)
    }

    /// All table names in the document (used for self-correction hints).
    pub async fn table_names(&self) -> AppResult<Vec<String>> {
        self.store.list_tables().await
    }
}
