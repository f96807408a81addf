//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, equipment, export, health, import, records, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Usagelog API",
        version = "1.0.0",
        description = "Equipment Usage Logbook REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::logout,
        auth::me,
        // Equipment
        equipment::list_departments,
        equipment::list_equipment,
        equipment::equipment_info,
        equipment::list_companies,
        // Records
        records::create_record,
        records::list_records,
        // Stats
        stats::utilization,
        stats::breakdown,
        // Import
        import::import_file,
        import::import_rows,
        // Export
        export::export_csv,
        export::export_xlsx,
    ),
    components(
        schemas(
            // Health
            health::HealthResponse,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::LogoutResponse,
            crate::models::user::SessionContext,
            // Equipment
            equipment::DepartmentsResponse,
            equipment::EquipmentListResponse,
            equipment::EquipmentInfoResponse,
            crate::models::equipment::Equipment,
            crate::models::company::CompanyDirectory,
            // Records
            records::CreateLogEntry,
            records::CreateLogEntryResponse,
            records::RecordListResponse,
            crate::models::record::UsageRecord,
            crate::models::enums::Purpose,
            crate::models::enums::UsageType,
            crate::models::enums::ProcessCategory,
            crate::models::enums::CompanySize,
            crate::models::enums::YesNo,
            // Stats
            stats::BreakdownResponse,
            crate::services::stats::GroupBy,
            crate::services::stats::GroupSummary,
            crate::services::stats::UtilizationSummary,
            // Import
            import::ImportRowsRequest,
            crate::services::import::ImportOutcome,
            crate::services::import::ImportStatus,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Session management"),
        (name = "equipment", description = "Reference data"),
        (name = "records", description = "Usage records"),
        (name = "stats", description = "Utilization and breakdowns"),
        (name = "import", description = "Bulk import"),
        (name = "export", description = "CSV / XLSX export")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
