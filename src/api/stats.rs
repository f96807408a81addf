//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    services::stats::{GroupBy, GroupSummary, UtilizationSummary},
    AppState,
};

use super::{parse_range, SessionAuth};

/// Default monthly target when the caller does not supply one
const DEFAULT_TARGET_HOURS: f64 = 1000.0;

#[derive(Debug, Deserialize, IntoParams)]
pub struct UtilizationQuery {
    /// Equipment to compute utilization for
    pub equipment: String,
    /// Range start (YYYY-MM-DD), inclusive; requires end_date
    pub start_date: Option<String>,
    /// Range end (YYYY-MM-DD), inclusive; requires start_date
    pub end_date: Option<String>,
    /// Monthly target hours the percentage is computed against
    pub target_hours: Option<f64>,
}

/// Utilization for one machine over a period
#[utoipa::path(
    get,
    path = "/stats/utilization",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(UtilizationQuery),
    responses(
        (status = 200, description = "Utilization summary", body = UtilizationSummary),
        (status = 404, description = "Equipment table missing; available names are listed")
    )
)]
pub async fn utilization(
    State(state): State<AppState>,
    SessionAuth { .. }: SessionAuth,
    Query(query): Query<UtilizationQuery>,
) -> AppResult<Json<UtilizationSummary>> {
    let range = parse_range(&query.start_date, &query.end_date)?;
    let target = query.target_hours.unwrap_or(DEFAULT_TARGET_HOURS);
    if target < 0.0 {
        return Err(AppError::Validation(
            "target_hours must not be negative".to_string(),
        ));
    }
    let summary = state
        .services
        .stats
        .utilization(&query.equipment, range, target)
        .await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BreakdownQuery {
    /// Comma-separated equipment names to union
    pub equipment: String,
    /// Range start (YYYY-MM-DD), inclusive; requires end_date
    pub start_date: Option<String>,
    /// Range end (YYYY-MM-DD), inclusive; requires start_date
    pub end_date: Option<String>,
    /// Grouping axis
    pub group_by: GroupBy,
}

/// Breakdown response
#[derive(Serialize, ToSchema)]
pub struct BreakdownResponse {
    pub groups: Vec<GroupSummary>,
    /// Machines that contributed records to the union
    pub equipment: Vec<String>,
}

/// Grouped totals over a multi-machine union. Company-size and process
/// groups come back in their mandated display order; equipment groups come
/// back by total hours descending.
#[utoipa::path(
    get,
    path = "/stats/breakdown",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(BreakdownQuery),
    responses(
        (status = 200, description = "Grouped totals", body = BreakdownResponse),
        (status = 400, description = "No equipment selected")
    )
)]
pub async fn breakdown(
    State(state): State<AppState>,
    SessionAuth { .. }: SessionAuth,
    Query(query): Query<BreakdownQuery>,
) -> AppResult<Json<BreakdownResponse>> {
    let equipment: Vec<String> = query
        .equipment
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if equipment.is_empty() {
        return Err(AppError::Validation(
            "select at least one equipment name".to_string(),
        ));
    }
    let range = parse_range(&query.start_date, &query.end_date)?;
    let groups = state
        .services
        .stats
        .breakdown(&equipment, range, query.group_by)
        .await?;
    Ok(Json(BreakdownResponse { groups, equipment }))
}
