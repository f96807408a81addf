//! Session service
//!
//! Authenticates against the read-only user master table and keeps the
//! session registry. Passwords live in the table as plaintext and are
//! compared by exact string match; tokens are opaque uuids with no expiry.
//! The session context is created at login and cleared at logout; no other
//! session state exists anywhere in the server.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::{
    config::MasterTablesConfig,
    error::{AppError, AppResult},
    models::user::{SessionContext, StoredUser},
    store::RecordStore,
    tabular::{
        columns::{ColumnResolver, USER_COLUMN_SPECS},
        normalize,
    },
};

#[derive(Clone)]
pub struct SessionsService {
    store: Arc<dyn RecordStore>,
    tables: MasterTablesConfig,
    registry: Arc<RwLock<HashMap<String, SessionContext>>>,
}

impl SessionsService {
    pub fn new(store: Arc<dyn RecordStore>, tables: MasterTablesConfig) -> Self {
        Self {
            store,
            tables,
            registry: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load the user master table. Unlike the other reference tables this
    /// one does not degrade to empty: without it nobody can log in, so the
    /// store failure propagates.
    async fn load_users(&self) -> AppResult<Vec<StoredUser>> {
        let rows = self.store.read_table(&self.tables.users).await?;
        let headers = rows
            .first()
            .map(|h| normalize::clean_headers(h))
            .unwrap_or_default();
        let cols = ColumnResolver::new(USER_COLUMN_SPECS).resolve(&headers);

        Ok(normalize::normalize(&rows, None)
            .iter()
            .filter_map(|row| {
                let id = cols.value(row, "user_id")?.trim().to_string();
                if id.is_empty() {
                    return None;
                }
                Some(StoredUser {
                    id,
                    password: cols.value(row, "password").unwrap_or("").trim().to_string(),
                    display_name: cols
                        .value(row, "display_name")
                        .unwrap_or("")
                        .trim()
                        .to_string(),
                    department: cols
                        .value(row, "department")
                        .unwrap_or("")
                        .trim()
                        .to_string(),
                })
            })
            .collect())
    }

    /// Authenticate and open a session. Returns the opaque token and the
    /// context it maps to.
    pub async fn login(
        &self,
        user_id: &str,
        password: &str,
    ) -> AppResult<(String, SessionContext)> {
        let users = self.load_users().await?;
        let user = users
            .iter()
            .find(|u| u.id == user_id.trim())
            .ok_or_else(|| AppError::Authentication("Unknown user id".to_string()))?;

        if user.password != password.trim() {
            return Err(AppError::Authentication("Password does not match".to_string()));
        }

        let context = SessionContext {
            user_id: user.id.clone(),
            display_name: user.display_name.clone(),
            department: user.department.clone(),
        };

        let token = Uuid::new_v4().to_string();
        self.registry
            .write()
            .expect("session registry lock poisoned")
            .insert(token.clone(), context.clone());

        tracing::info!(user_id = %context.user_id, "session opened");
        Ok((token, context))
    }

    /// Look up the context for a token.
    pub fn session(&self, token: &str) -> Option<SessionContext> {
        self.registry
            .read()
            .expect("session registry lock poisoned")
            .get(token)
            .cloned()
    }

    /// Clear a session. Returns whether a session existed for the token.
    pub fn logout(&self, token: &str) -> bool {
        self.registry
            .write()
            .expect("session registry lock poisoned")
            .remove(token)
            .is_some()
    }
}
