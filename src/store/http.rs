//! HTTP-backed table store client
//!
//! Talks to the remote table service over its JSON API. Every call is a
//! plain request/response round trip; nothing is cached and nothing is
//! retried here. Recovery is user-initiated.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{
    config::StoreConfig,
    error::{AppError, AppResult},
    store::RecordStore,
};

#[derive(Clone)]
pub struct HttpTableStore {
    client: reqwest::Client,
    base_url: String,
    document: String,
    api_token: Option<String>,
}

#[derive(Deserialize)]
struct TableListBody {
    tables: Vec<String>,
}

#[derive(Deserialize)]
struct TableValuesBody {
    values: Vec<Vec<String>>,
}

#[derive(Serialize)]
struct AppendBody {
    values: Vec<Vec<String>>,
}

/// Standard header style applied after imports (bold white on blue,
/// centered), mirrored from the reporting template.
#[derive(Serialize)]
struct HeaderStyleBody {
    bold: bool,
    background: &'static str,
    foreground: &'static str,
    horizontal_align: &'static str,
}

impl HttpTableStore {
    /// Open the configured document, verifying it exists and the token is
    /// accepted.
    pub async fn open(config: &StoreConfig) -> AppResult<Self> {
        let client = reqwest::Client::new();
        let store = Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            document: config.document.clone(),
            api_token: config.api_token.clone(),
        };
        // A failed open is fatal: without the document nothing else works.
        store.list_tables().await?;
        Ok(store)
    }

    fn table_url(&self, table: &str, suffix: &str) -> String {
        format!(
            "{}/documents/{}/tables/{}{}",
            self.base_url, self.document, table, suffix
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        let response = self
            .request(builder)
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::StoreUnavailable(
                "table service rejected the credentials".to_string(),
            )),
            status if status.is_server_error() => Err(AppError::StoreUnavailable(format!(
                "table service returned {}",
                status
            ))),
            _ => Ok(response),
        }
    }

    /// Translate a 404 on a table operation into a lookup miss with the
    /// available table names.
    async fn table_miss(&self, table: &str) -> AppError {
        let available = self.list_tables().await.unwrap_or_default();
        AppError::LookupMiss {
            name: table.to_string(),
            available,
        }
    }
}

#[async_trait]
impl RecordStore for HttpTableStore {
    async fn list_tables(&self) -> AppResult<Vec<String>> {
        let url = format!("{}/documents/{}/tables", self.base_url, self.document);
        let response = self.send(self.client.get(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::StoreUnavailable(format!(
                "document '{}' not found",
                self.document
            )));
        }
        let body: TableListBody = response
            .json()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Ok(body.tables)
    }

    async fn read_table(&self, name: &str) -> AppResult<Vec<Vec<String>>> {
        let url = self.table_url(name, "/values");
        let response = self.send(self.client.get(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(self.table_miss(name).await);
        }
        let body: TableValuesBody = response
            .json()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Ok(body.values)
    }

    async fn append_rows(&self, name: &str, rows: Vec<Vec<String>>) -> AppResult<()> {
        let url = self.table_url(name, "/values:append");
        let response = self
            .send(self.client.post(&url).json(&AppendBody { values: rows }))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(self.table_miss(name).await);
        }
        if !response.status().is_success() {
            return Err(AppError::StoreUnavailable(format!(
                "append to '{}' returned {}",
                name,
                response.status()
            )));
        }
        Ok(())
    }

    async fn format_header_row(&self, name: &str) -> AppResult<()> {
        let url = self.table_url(name, "/format-header");
        let style = HeaderStyleBody {
            bold: true,
            background: "#3380CC",
            foreground: "#FFFFFF",
            horizontal_align: "center",
        };
        let response = self.send(self.client.post(&url).json(&style)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(self.table_miss(name).await);
        }
        Ok(())
    }

    async fn freeze_header_row(&self, name: &str) -> AppResult<()> {
        let url = self.table_url(name, "/freeze-header");
        let response = self.send(self.client.post(&url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(self.table_miss(name).await);
        }
        Ok(())
    }
}
