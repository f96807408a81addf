//! Usagelog Server - Equipment Usage Logbook
//!
//! A REST JSON API server for logging equipment usage sessions against a
//! remote spreadsheet-style record store.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use usagelog_server::{
    api,
    config::AppConfig,
    services::Services,
    store::{HttpTableStore, MemoryStore, RecordStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            format!("usagelog_server={},tower_http=debug", config.logging.level).into()
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Usagelog Server v{}", env!("CARGO_PKG_VERSION"));

    // Open the record store
    let store: Arc<dyn RecordStore> = match config.store.backend.as_str() {
        "memory" => {
            tracing::warn!("using the in-process store; nothing will persist");
            Arc::new(MemoryStore::new())
        }
        _ => {
            let store = HttpTableStore::open(&config.store)
                .await
                .expect("Failed to open the record store document");
            tracing::info!(
                document = %config.store.document,
                "Connected to record store"
            );
            Arc::new(store)
        }
    };

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create services
    let services = Services::new(store, &config);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/me", get(api::auth::me))
        // Reference data
        .route("/departments", get(api::equipment::list_departments))
        .route("/equipment", get(api::equipment::list_equipment))
        .route("/equipment/info", get(api::equipment::equipment_info))
        .route("/companies", get(api::equipment::list_companies))
        // Usage records
        .route("/records", post(api::records::create_record))
        .route("/records", get(api::records::list_records))
        // Statistics
        .route("/stats/utilization", get(api::stats::utilization))
        .route("/stats/breakdown", get(api::stats::breakdown))
        // Bulk import
        .route("/import", post(api::import::import_file))
        .route("/import/rows", post(api::import::import_rows))
        // Export
        .route("/export/records.csv", get(api::export::export_csv))
        .route("/export/records.xlsx", get(api::export::export_xlsx))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
