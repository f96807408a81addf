//! Bulk import endpoints
//!
//! The reporting template keeps its header one row above the first data
//! row, at a fixed offset the caller supplies (the stock template uses
//! row 3, counted from zero). Uploads arrive either as a multipart CSV
//! file or as pre-parsed JSON rows.

use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::Multipart;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    services::import::ImportOutcome,
    AppState,
};

use super::SessionAuth;

/// Header row offset of the stock reporting template (zero-based)
const TEMPLATE_HEADER_ROW: usize = 3;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ImportQuery {
    /// Equipment table the rows are appended to
    pub equipment: String,
    /// Zero-based header row offset; defaults to the stock template's
    pub header_row: Option<usize>,
}

/// Parse an uploaded CSV body into raw rows. Ragged rows are fine; the
/// reconciler pads and validates later.
fn parse_csv_upload(bytes: &[u8]) -> AppResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result
            .map_err(|e| AppError::Validation(format!("CSV upload unreadable: {}", e)))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    Ok(rows)
}

/// Import a template file (multipart field "file", CSV)
#[utoipa::path(
    post,
    path = "/import",
    tag = "import",
    security(("bearer_auth" = [])),
    params(ImportQuery),
    responses(
        (status = 200, description = "Import outcome; check status for partial commits", body = ImportOutcome),
        (status = 400, description = "Missing columns or unreadable upload"),
        (status = 404, description = "Equipment table missing; available names are listed")
    )
)]
pub async fn import_file(
    State(state): State<AppState>,
    SessionAuth { .. }: SessionAuth,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> AppResult<Json<ImportOutcome>> {
    let mut upload: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("multipart upload unreadable: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("upload body unreadable: {}", e)))?;
            upload = Some(bytes.to_vec());
        }
    }
    let bytes = upload.ok_or_else(|| {
        AppError::Validation("multipart field 'file' is required".to_string())
    })?;

    let rows = parse_csv_upload(&bytes)?;
    let header_row = query.header_row.unwrap_or(TEMPLATE_HEADER_ROW);
    let outcome = state
        .services
        .import
        .run(&query.equipment, &rows, header_row)
        .await?;
    Ok(Json(outcome))
}

/// JSON import request
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ImportRowsRequest {
    #[validate(length(min = 1, message = "equipment must not be empty"))]
    pub equipment: String,
    /// Zero-based header row offset within `rows`
    pub header_row_index: usize,
    /// Raw table rows, header row included
    pub rows: Vec<Vec<String>>,
}

/// Import pre-parsed rows
#[utoipa::path(
    post,
    path = "/import/rows",
    tag = "import",
    security(("bearer_auth" = [])),
    request_body = ImportRowsRequest,
    responses(
        (status = 200, description = "Import outcome; check status for partial commits", body = ImportOutcome),
        (status = 400, description = "Missing columns"),
        (status = 404, description = "Equipment table missing; available names are listed")
    )
)]
pub async fn import_rows(
    State(state): State<AppState>,
    SessionAuth { .. }: SessionAuth,
    Json(request): Json<ImportRowsRequest>,
) -> AppResult<Json<ImportOutcome>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let outcome = state
        .services
        .import
        .run(&request.equipment, &request.rows, request.header_row_index)
        .await?;
    Ok(Json(outcome))
}
