//! Usage record endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{Purpose, UsageType, YesNo, ProcessCategory},
        record::UsageRecord,
    },
    tabular::coerce,
    AppState,
};

use super::{parse_range, SessionAuth};

/// Typed log-entry form. Converted to the canonical 22-cell wire row on
/// submit; equipment number and type default from the master table when
/// left empty.
///
/// Note usage_end is deliberately not checked against usage_start; the
/// logbook accepts whatever the operator enters.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLogEntry {
    pub purpose: Purpose,
    pub usage_type: UsageType,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_biz_number: String,
    #[serde(default)]
    pub internal_dept: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub sub_item: String,
    #[serde(default)]
    pub product_name: String,
    #[validate(range(min = 0, message = "sample count must not be negative"))]
    #[serde(default)]
    pub sample_count: i64,
    pub support_disclosure: YesNo,
    #[serde(default)]
    pub support_detail: String,
    #[validate(length(min = 1, message = "equipment name must not be empty"))]
    pub equipment_name: String,
    #[serde(default)]
    pub equipment_no: String,
    #[serde(default)]
    pub equipment_type: String,
    pub usage_start: NaiveDate,
    pub usage_end: NaiveDate,
    #[serde(default)]
    pub includes_holiday: bool,
    #[validate(range(min = 0.0, message = "usage hours must not be negative"))]
    pub usage_hours: f64,
    #[validate(range(min = 0, message = "usage fee must not be negative"))]
    #[serde(default)]
    pub usage_fee: i64,
    #[serde(default)]
    pub purpose_other: String,
    pub process_category: ProcessCategory,
}

impl CreateLogEntry {
    fn into_record(self, equipment_no: String, equipment_type: String) -> UsageRecord {
        UsageRecord {
            purpose: self.purpose.to_string(),
            usage_type: self.usage_type.to_string(),
            company_name: self.company_name.trim().to_string(),
            company_biz_number: self.company_biz_number.trim().to_string(),
            internal_dept: self.internal_dept.trim().to_string(),
            industry: self.industry.trim().to_string(),
            item: self.item.trim().to_string(),
            sub_item: self.sub_item.trim().to_string(),
            product_name: self.product_name.trim().to_string(),
            sample_count: self.sample_count.to_string(),
            support_disclosure: self.support_disclosure.to_string(),
            support_detail: self.support_detail.trim().to_string(),
            equipment_name: self.equipment_name.trim().to_string(),
            equipment_no,
            equipment_type,
            usage_start: self.usage_start.format(coerce::DATE_FORMAT).to_string(),
            usage_end: self.usage_end.format(coerce::DATE_FORMAT).to_string(),
            includes_holiday: YesNo::from(self.includes_holiday).to_string(),
            usage_hours: self.usage_hours.to_string(),
            usage_fee: Some(self.usage_fee.to_string()),
            purpose_other: self.purpose_other.trim().to_string(),
            process_category: self.process_category.to_string(),
        }
    }
}

/// Created record response
#[derive(Serialize, ToSchema)]
pub struct CreateLogEntryResponse {
    pub record: UsageRecord,
}

/// Append one usage record to its equipment table
#[utoipa::path(
    post,
    path = "/records",
    tag = "records",
    security(("bearer_auth" = [])),
    request_body = CreateLogEntry,
    responses(
        (status = 200, description = "Record appended", body = CreateLogEntryResponse),
        (status = 403, description = "Equipment belongs to another department"),
        (status = 404, description = "Equipment not registered or table missing")
    )
)]
pub async fn create_record(
    State(state): State<AppState>,
    SessionAuth { context, .. }: SessionAuth,
    Json(entry): Json<CreateLogEntry>,
) -> AppResult<Json<CreateLogEntryResponse>> {
    entry
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let directory = state.services.reference.load_equipment().await;
    let info = directory.info(&entry.equipment_name).ok_or_else(|| {
        AppError::NotFound(format!(
            "equipment '{}' is not in the master table",
            entry.equipment_name
        ))
    })?;
    if !context.can_access_department(&info.department) {
        return Err(AppError::Authorization(format!(
            "equipment '{}' belongs to department '{}'",
            info.name, info.department
        )));
    }

    // master data fills the blanks the form leaves
    let equipment_no = if entry.equipment_no.trim().is_empty() {
        info.equipment_no.clone()
    } else {
        entry.equipment_no.trim().to_string()
    };
    let equipment_type = if entry.equipment_type.trim().is_empty() {
        info.equipment_type.clone()
    } else {
        entry.equipment_type.trim().to_string()
    };

    let equipment_name = entry.equipment_name.trim().to_string();
    let record = entry.into_record(equipment_no, equipment_type);
    state
        .services
        .records
        .append_record(&equipment_name, &record)
        .await?;

    Ok(Json(CreateLogEntryResponse { record }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecordsQuery {
    /// Equipment table to read
    pub equipment: String,
    /// Range start (YYYY-MM-DD), inclusive; requires end_date
    pub start_date: Option<String>,
    /// Range end (YYYY-MM-DD), inclusive; requires start_date
    pub end_date: Option<String>,
}

/// Record listing response
#[derive(Serialize, ToSchema)]
pub struct RecordListResponse {
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<IndexMap<String, String>>,
    pub total: usize,
}

/// Records for one machine, newest first, optionally date filtered.
/// Rows whose start date cannot be parsed are excluded whenever a range is
/// given, even an unbounded-equivalent one.
#[utoipa::path(
    get,
    path = "/records",
    tag = "records",
    security(("bearer_auth" = [])),
    params(RecordsQuery),
    responses(
        (status = 200, description = "Record rows", body = RecordListResponse),
        (status = 404, description = "Equipment table missing; available names are listed")
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
    SessionAuth { context, .. }: SessionAuth,
    Query(query): Query<RecordsQuery>,
) -> AppResult<Json<RecordListResponse>> {
    let range = parse_range(&query.start_date, &query.end_date)?;

    let directory = state.services.reference.load_equipment().await;
    if let Some(info) = directory.info(&query.equipment) {
        if !context.can_access_department(&info.department) {
            return Err(AppError::Authorization(format!(
                "equipment '{}' belongs to department '{}'",
                info.name, info.department
            )));
        }
    }

    let records = state
        .services
        .records
        .list_records(&query.equipment, range)
        .await?;
    let total = records.len();
    Ok(Json(RecordListResponse { records, total }))
}
