//! Business logic services

pub mod export;
pub mod import;
pub mod records;
pub mod reference;
pub mod sessions;
pub mod stats;

use std::sync::Arc;

use crate::{config::AppConfig, store::RecordStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub sessions: sessions::SessionsService,
    pub reference: reference::ReferenceService,
    pub records: records::RecordsService,
    pub stats: stats::StatsService,
    pub import: import::ImportService,
    pub export: export::ExportService,
}

impl Services {
    /// Create all services over the given record store
    pub fn new(store: Arc<dyn RecordStore>, config: &AppConfig) -> Self {
        let reference = reference::ReferenceService::new(store.clone(), config.tables.clone());
        let records = records::RecordsService::new(store.clone());
        Self {
            sessions: sessions::SessionsService::new(store.clone(), config.tables.clone()),
            stats: stats::StatsService::new(records.clone(), reference.clone()),
            import: import::ImportService::new(store.clone(), config.store.append_batch_size),
            export: export::ExportService::new(),
            reference,
            records,
        }
    }
}
