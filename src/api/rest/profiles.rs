use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;

use crate::api::rest::non_blank;
use crate::auth::CallerPrincipal;
use crate::error::AppError;
use crate::models::Principal;
use crate::models::profile::UserProfile;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(get_caller_profile).put(save_profile))
        .route("/profiles/:principal", get(get_profile))
}

async fn save_profile(
    State(state): State<Arc<AppState>>,
    CallerPrincipal(caller): CallerPrincipal,
    Json(profile): Json<UserProfile>,
) -> Result<Json<UserProfile>, AppError> {
    non_blank(&profile.name, "name")?;

    state.profiles.insert(caller.clone(), profile.clone());
    tracing::info!(principal = %caller, role = ?profile.role, "profile saved");

    Ok(Json(profile))
}

async fn get_caller_profile(
    State(state): State<Arc<AppState>>,
    CallerPrincipal(caller): CallerPrincipal,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .profiles
        .get(&caller)
        .ok_or_else(|| AppError::NotFound(format!("no profile for {caller}")))?;

    Ok(Json(profile.value().clone()))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(principal): Path<Principal>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .profiles
        .get(&principal)
        .ok_or_else(|| AppError::NotFound(format!("no profile for {principal}")))?;

    Ok(Json(profile.value().clone()))
}
