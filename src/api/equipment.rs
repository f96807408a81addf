//! Department and equipment reference endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{company::CompanyDirectory, equipment::Equipment},
    AppState,
};

use super::SessionAuth;

/// Departments visible to the session
#[derive(Serialize, ToSchema)]
pub struct DepartmentsResponse {
    pub departments: Vec<String>,
}

/// Departments the session can select equipment from. A session scoped to
/// one department sees only that department; the ALL sentinel sees every
/// department in the master table.
#[utoipa::path(
    get,
    path = "/departments",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible departments", body = DepartmentsResponse)
    )
)]
pub async fn list_departments(
    State(state): State<AppState>,
    SessionAuth { context, .. }: SessionAuth,
) -> AppResult<Json<DepartmentsResponse>> {
    let directory = state.services.reference.load_equipment().await;
    let departments = if context.has_all_access() {
        directory.departments()
    } else if directory.by_department.contains_key(&context.department) {
        vec![context.department.clone()]
    } else {
        // no registered equipment for this department; the view reports
        // "no data" rather than failing
        Vec::new()
    };
    Ok(Json(DepartmentsResponse { departments }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EquipmentQuery {
    /// Department to list equipment for
    pub department: String,
}

/// Equipment list response
#[derive(Serialize, ToSchema)]
pub struct EquipmentListResponse {
    pub equipment: Vec<Equipment>,
}

/// Equipment registered for a department
#[utoipa::path(
    get,
    path = "/equipment",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentQuery),
    responses(
        (status = 200, description = "Equipment for the department", body = EquipmentListResponse),
        (status = 403, description = "Session is scoped to another department")
    )
)]
pub async fn list_equipment(
    State(state): State<AppState>,
    SessionAuth { context, .. }: SessionAuth,
    Query(query): Query<EquipmentQuery>,
) -> AppResult<Json<EquipmentListResponse>> {
    if !context.can_access_department(&query.department) {
        return Err(AppError::Authorization(format!(
            "session is scoped to department '{}'",
            context.department
        )));
    }
    let directory = state.services.reference.load_equipment().await;
    let equipment = directory
        .equipment_in(&query.department)
        .into_iter()
        .filter_map(|name| directory.info(&name).cloned())
        .collect();
    Ok(Json(EquipmentListResponse { equipment }))
}

/// Registered companies with size buckets and business registration
/// numbers, for the log-entry form's company picker. Loads degrade to an
/// empty directory, so the form falls back to free-text entry.
#[utoipa::path(
    get,
    path = "/companies",
    tag = "equipment",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Company directory", body = CompanyDirectory)
    )
)]
pub async fn list_companies(
    State(state): State<AppState>,
    SessionAuth { .. }: SessionAuth,
) -> AppResult<Json<CompanyDirectory>> {
    Ok(Json(state.services.reference.load_companies().await))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct EquipmentInfoQuery {
    /// Substring searched case-insensitively over every cell
    pub search: Option<String>,
}

/// Equipment info response: the sheet rendered as row mappings
#[derive(Serialize, ToSchema)]
pub struct EquipmentInfoResponse {
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<IndexMap<String, String>>,
    pub total: usize,
}

/// The equipment-information sheet, optionally filtered by search
#[utoipa::path(
    get,
    path = "/equipment/info",
    tag = "equipment",
    security(("bearer_auth" = [])),
    params(EquipmentInfoQuery),
    responses(
        (status = 200, description = "Equipment info rows", body = EquipmentInfoResponse),
        (status = 404, description = "Info sheet missing; available table names are listed")
    )
)]
pub async fn equipment_info(
    State(state): State<AppState>,
    SessionAuth { .. }: SessionAuth,
    Query(query): Query<EquipmentInfoQuery>,
) -> AppResult<Json<EquipmentInfoResponse>> {
    let rows = state
        .services
        .reference
        .equipment_info(query.search.as_deref())
        .await?;
    let total = rows.len();
    Ok(Json(EquipmentInfoResponse { rows, total }))
}
