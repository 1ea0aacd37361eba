use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::non_blank;
use crate::auth::{self, AdminAuth};
use crate::error::AppError;
use crate::models::settings::{CompanySettings, DeliveryRate};
use crate::reports::{self, KpiSummary, ReportData, ReportPeriod};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/login", post(login))
        .route("/admin/logout", post(logout))
        .route("/admin/session", get(session_info))
        .route("/admin/reports", get(report))
        .route("/admin/reports/csv", get(report_csv))
        .route("/admin/kpis", get(kpis))
        .route("/admin/settings", get(get_settings).put(update_settings))
        .route("/admin/rates", get(list_rates).post(add_rate))
        .route("/admin/rates/:id", put(update_rate).delete(delete_rate))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = auth::login(&state, &payload.username, &payload.password)?;

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
    }))
}

async fn logout(State(state): State<Arc<AppState>>, AdminAuth(session): AdminAuth) -> StatusCode {
    auth::revoke(&state, session.token);
    StatusCode::NO_CONTENT
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

async fn session_info(AdminAuth(session): AdminAuth) -> Json<SessionResponse> {
    Json(SessionResponse {
        username: session.username,
        expires_at: session.expires_at,
    })
}

#[derive(Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub period: ReportPeriod,
}

async fn report(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Query(query): Query<ReportQuery>,
) -> Json<ReportData> {
    Json(reports::generate_report(
        &state.order_snapshot(),
        query.period,
        Utc::now(),
        state.config.base_delivery_rate,
    ))
}

async fn report_csv(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Query(query): Query<ReportQuery>,
) -> Response {
    let data = reports::generate_report(
        &state.order_snapshot(),
        query.period,
        Utc::now(),
        state.config.base_delivery_rate,
    );
    let body = reports::render_csv(&data, query.period);

    let filename = format!(
        "bikaner-express-report-{}-{}.csv",
        query.period.as_str(),
        Utc::now().format("%Y-%m-%d")
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

async fn kpis(State(state): State<Arc<AppState>>, _admin: AdminAuth) -> Json<KpiSummary> {
    Json(reports::kpi_summary(
        &state.order_snapshot(),
        &state.rider_snapshot(),
        Utc::now(),
        state.config.base_delivery_rate,
    ))
}

async fn get_settings(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<Json<CompanySettings>, AppError> {
    let settings = state
        .settings
        .read()
        .map_err(|_| AppError::Internal("settings lock poisoned".to_string()))?
        .clone();

    Ok(Json(settings))
}

async fn update_settings(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Json(payload): Json<CompanySettings>,
) -> Result<Json<CompanySettings>, AppError> {
    non_blank(&payload.company_name, "company name")?;

    let mut settings = state
        .settings
        .write()
        .map_err(|_| AppError::Internal("settings lock poisoned".to_string()))?;
    *settings = payload.clone();

    Ok(Json(payload))
}

async fn list_rates(State(state): State<Arc<AppState>>, _admin: AdminAuth) -> Json<Vec<DeliveryRate>> {
    let mut rates: Vec<DeliveryRate> = state
        .rates
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    rates.sort_by(|a, b| a.name.cmp(&b.name));

    Json(rates)
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub name: String,
    pub amount: u64,
}

async fn add_rate(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Json(payload): Json<RateRequest>,
) -> Result<Json<DeliveryRate>, AppError> {
    non_blank(&payload.name, "rate name")?;

    let rate = DeliveryRate {
        id: Uuid::new_v4(),
        name: payload.name,
        amount: payload.amount,
    };
    state.rates.insert(rate.id, rate.clone());

    Ok(Json(rate))
}

async fn update_rate(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<RateRequest>,
) -> Result<Json<DeliveryRate>, AppError> {
    non_blank(&payload.name, "rate name")?;

    let mut rate = state
        .rates
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("rate {id} not found")))?;

    rate.name = payload.name;
    rate.amount = payload.amount;

    Ok(Json(rate.clone()))
}

async fn delete_rate(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .rates
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(format!("rate {id} not found")))?;

    Ok(StatusCode::NO_CONTENT)
}
