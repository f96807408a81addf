//! In-process table store
//!
//! Used by tests and by the `backend = "memory"` development mode. Behaves
//! like the remote service at the interface: appends require an existing
//! table, and a miss reports the available names.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    store::RecordStore,
};

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<IndexMap<String, Vec<Vec<String>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table, replacing any previous contents.
    pub fn insert_table(&self, name: &str, rows: Vec<Vec<String>>) {
        self.tables
            .write()
            .expect("memory store lock poisoned")
            .insert(name.to_string(), rows);
    }

    /// Builder-style seeding for tests.
    pub fn with_table(self, name: &str, rows: Vec<Vec<String>>) -> Self {
        self.insert_table(name, rows);
        self
    }

    fn miss(&self, name: &str) -> AppError {
        let available = self
            .tables
            .read()
            .expect("memory store lock poisoned")
            .keys()
            .cloned()
            .collect();
        AppError::LookupMiss {
            name: name.to_string(),
            available,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_tables(&self) -> AppResult<Vec<String>> {
        Ok(self
            .tables
            .read()
            .expect("memory store lock poisoned")
            .keys()
            .cloned()
            .collect())
    }

    async fn read_table(&self, name: &str) -> AppResult<Vec<Vec<String>>> {
        self.tables
            .read()
            .expect("memory store lock poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| self.miss(name))
    }

    async fn append_rows(&self, name: &str, rows: Vec<Vec<String>>) -> AppResult<()> {
        let mut tables = self.tables.write().expect("memory store lock poisoned");
        match tables.get_mut(name) {
            Some(existing) => {
                existing.extend(rows);
                Ok(())
            }
            None => {
                drop(tables);
                Err(self.miss(name))
            }
        }
    }

    async fn format_header_row(&self, _name: &str) -> AppResult<()> {
        Ok(())
    }

    async fn freeze_header_row(&self, _name: &str) -> AppResult<()> {
        Ok(())
    }
}
