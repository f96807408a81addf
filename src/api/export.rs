//! Export endpoints
//!
//! Both endpoints stream the full per-equipment table (newest first) with a
//! content-disposition filename carrying the equipment name and a
//! timestamp.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppResult, AppState};

use super::SessionAuth;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Equipment table to export
    pub equipment: String,
}

fn attachment(filename: &str, content_type: &str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

/// Full table as UTF-8 CSV with BOM
#[utoipa::path(
    get,
    path = "/export/records.csv",
    tag = "export",
    security(("bearer_auth" = [])),
    params(ExportQuery),
    responses(
        (status = 200, description = "CSV attachment", body = Vec<u8>, content_type = "text/csv"),
        (status = 404, description = "Equipment table missing; available names are listed")
    )
)]
pub async fn export_csv(
    State(state): State<AppState>,
    SessionAuth { .. }: SessionAuth,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let (headers, rows) = state
        .services
        .records
        .export_table(&query.equipment)
        .await?;
    let body = state.services.export.to_csv(&headers, &rows)?;
    let filename = state
        .services
        .export
        .filename(&query.equipment, "csv", Utc::now());
    Ok(attachment(&filename, "text/csv; charset=utf-8", body))
}

/// Full table as a single-sheet XLSX workbook
#[utoipa::path(
    get,
    path = "/export/records.xlsx",
    tag = "export",
    security(("bearer_auth" = [])),
    params(ExportQuery),
    responses(
        (status = 200, description = "XLSX attachment", body = Vec<u8>,
         content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 404, description = "Equipment table missing; available names are listed")
    )
)]
pub async fn export_xlsx(
    State(state): State<AppState>,
    SessionAuth { .. }: SessionAuth,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let (headers, rows) = state
        .services
        .records
        .export_table(&query.equipment)
        .await?;
    let body = state
        .services
        .export
        .to_xlsx(&query.equipment, &headers, &rows)?;
    let filename = state
        .services
        .export
        .filename(&query.equipment, "xlsx", Utc::now());
    Ok(attachment(
        &filename,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        body,
    ))
}
