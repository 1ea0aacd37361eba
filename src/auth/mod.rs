use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Duration, Utc};
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Principal;
use crate::state::AppState;

pub const PRINCIPAL_HEADER: &str = "x-principal";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

const SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Checks credentials against the configured admin account and mints a
/// session valid for the configured TTL.
pub fn login(state: &AppState, username: &str, password: &str) -> Result<AdminSession, AppError> {
    if username != state.config.admin_username || password != state.config.admin_password {
        state
            .metrics
            .admin_logins_total
            .with_label_values(&["failure"])
            .inc();
        warn!(username, "admin login rejected");
        return Err(AppError::Unauthorized("invalid credentials".to_string()));
    }

    let session = AdminSession {
        token: Uuid::new_v4(),
        username: username.to_string(),
        expires_at: Utc::now() + Duration::hours(state.config.session_ttl_hours),
    };
    state.sessions.insert(session.token, session.clone());

    state
        .metrics
        .admin_logins_total
        .with_label_values(&["success"])
        .inc();
    info!(username, "admin session created");

    Ok(session)
}

pub fn revoke(state: &AppState, token: Uuid) {
    state.sessions.remove(&token);
}

fn validate_token(state: &AppState, token: Uuid) -> Result<AdminSession, AppError> {
    let session = state
        .sessions
        .get(&token)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::Unauthorized("unknown admin token".to_string()))?;

    if session.expires_at <= Utc::now() {
        state.sessions.remove(&token);
        return Err(AppError::Unauthorized("admin session expired".to_string()));
    }

    Ok(session)
}

/// Periodically drops expired admin sessions so the map does not grow
/// unbounded under repeated logins.
pub async fn run_session_sweeper(state: Arc<AppState>) {
    let mut ticker = interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));

    loop {
        ticker.tick().await;
        let now = Utc::now();
        let before = state.sessions.len();
        state.sessions.retain(|_, session| session.expires_at > now);
        let swept = before.saturating_sub(state.sessions.len());
        if swept > 0 {
            debug!(swept, "expired admin sessions removed");
        }
    }
}

/// Caller identity from the `x-principal` header, trusted as-is; an
/// upstream gateway is expected to have authenticated it.
pub struct CallerPrincipal(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CallerPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .unwrap_or_default();

        if raw.is_empty() {
            return Err(AppError::Unauthorized(format!(
                "missing {PRINCIPAL_HEADER} header"
            )));
        }

        Ok(CallerPrincipal(Principal::new(raw)))
    }
}

/// Live admin session from the `x-admin-token` header.
pub struct AdminAuth(pub AdminSession);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(format!("missing {ADMIN_TOKEN_HEADER} header"))
            })?;

        let token = raw
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized("malformed admin token".to_string()))?;

        Ok(AdminAuth(validate_token(state, token)?))
    }
}
