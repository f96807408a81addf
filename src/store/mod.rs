//! Record store adapter
//!
//! The system's sole persistence layer is a remote spreadsheet-style table
//! service: a named document holding named tables of string cells. This
//! module is the boundary. Network and auth failures surface as a single
//! `StoreUnavailable` condition; a missing table surfaces as `LookupMiss`
//! carrying the available table names so the user can self-correct.
//!
//! The store offers no locking and no conflict detection: two sessions
//! appending to the same table race at the store, and last-write-wins is the
//! de facto policy.

pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::error::AppResult;

pub use http::HttpTableStore;
pub use memory::MemoryStore;

/// Abstract table store: a fixed document of named tables of string cells.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Names of all tables in the document.
    async fn list_tables(&self) -> AppResult<Vec<String>>;

    /// All rows of a table, as raw string cells.
    async fn read_table(&self, name: &str) -> AppResult<Vec<Vec<String>>>;

    /// Append rows at the end of a table. The table must already exist.
    async fn append_rows(&self, name: &str, rows: Vec<Vec<String>>) -> AppResult<()>;

    /// Apply the standard header style to row 1. Cosmetic only.
    async fn format_header_row(&self, name: &str) -> AppResult<()>;

    /// Freeze row 1 so the header stays visible. Cosmetic only.
    async fn freeze_header_row(&self, name: &str) -> AppResult<()>;
}
