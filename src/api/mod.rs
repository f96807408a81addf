//! API handlers for the Usagelog REST endpoints

pub mod auth;
pub mod equipment;
pub mod export;
pub mod health;
pub mod import;
pub mod openapi;
pub mod records;
pub mod stats;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::user::SessionContext,
    AppState,
};

/// Extractor for the authenticated session behind a bearer token
pub struct SessionAuth {
    pub token: String,
    pub context: SessionContext,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication("Invalid authorization header format".to_string()));
        }

        let token = auth_header[7..].to_string();

        let context = state
            .services
            .sessions
            .session(&token)
            .ok_or_else(|| AppError::Authentication("Session not found, log in again".to_string()))?;

        Ok(SessionAuth { token, context })
    }
}

/// Parse an optional inclusive date range from query parameters. Both ends
/// must be present together; a malformed date names the offending value.
pub(crate) fn parse_range(
    start_date: &Option<String>,
    end_date: &Option<String>,
) -> AppResult<Option<(NaiveDate, NaiveDate)>> {
    match (start_date, end_date) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let parse = |value: &str| {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    AppError::Validation(format!(
                        "'{}' is not a date in YYYY-MM-DD form",
                        value
                    ))
                })
            };
            Ok(Some((parse(start)?, parse(end)?)))
        }
        _ => Err(AppError::Validation(
            "start_date and end_date must be provided together".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_requires_both_ends() {
        assert!(parse_range(&Some("2026-01-01".to_string()), &None).is_err());
        assert!(parse_range(&None, &None).unwrap().is_none());
    }

    #[test]
    fn malformed_date_names_the_value() {
        let err = parse_range(
            &Some("2026-01-01".to_string()),
            &Some("tomorrow".to_string()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("tomorrow"));
    }
}
