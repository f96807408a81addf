//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::SessionContext,
    AppState,
};

use super::SessionAuth;

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "user id must not be empty"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Login response
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub user: SessionContext,
}

/// Logout response
#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub cleared: bool,
}

/// Open a session
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 401, description = "Unknown user id or wrong password"),
        (status = 502, description = "Record store unreachable")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, user) = state
        .services
        .sessions
        .login(&request.user_id, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Current session context
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session context", body = SessionContext),
        (status = 401, description = "No session")
    )
)]
pub async fn me(SessionAuth { context, .. }: SessionAuth) -> Json<SessionContext> {
    Json(context)
}

/// Clear the session
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session cleared", body = LogoutResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    SessionAuth { token, .. }: SessionAuth,
) -> Json<LogoutResponse> {
    let cleared = state.services.sessions.logout(&token);
    Json(LogoutResponse { cleared })
}
