use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use serde::Deserialize;

use crate::api::rest::non_blank;
use crate::auth::AdminAuth;
use crate::error::AppError;
use crate::models::Principal;
use crate::models::order::DeliveryOrder;
use crate::models::rider::RiderProfile;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/riders", post(add_rider).get(list_riders))
        .route("/riders/:id", get(get_rider))
        .route("/riders/:id/location", patch(update_location))
        .route("/riders/:id/orders", get(rider_orders))
}

#[derive(Deserialize)]
pub struct AddRiderRequest {
    pub id: Principal,
    pub name: String,
    pub phone_number: String,
    pub vehicle_type: String,
}

async fn add_rider(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Json(payload): Json<AddRiderRequest>,
) -> Result<Json<RiderProfile>, AppError> {
    if payload.id.is_blank() {
        return Err(AppError::BadRequest("rider id cannot be empty".to_string()));
    }
    non_blank(&payload.name, "name")?;
    non_blank(&payload.phone_number, "phone number")?;
    non_blank(&payload.vehicle_type, "vehicle type")?;

    if state.riders.contains_key(&payload.id) {
        return Err(AppError::Conflict(format!(
            "rider {} already registered",
            payload.id
        )));
    }

    let rider = RiderProfile {
        id: payload.id,
        name: payload.name,
        phone_number: payload.phone_number,
        vehicle_type: payload.vehicle_type,
        location_url: None,
    };

    state.riders.insert(rider.id.clone(), rider.clone());
    tracing::info!(rider = %rider.id, "rider registered");

    Ok(Json(rider))
}

async fn list_riders(State(state): State<Arc<AppState>>) -> Json<Vec<RiderProfile>> {
    Json(state.rider_snapshot())
}

async fn get_rider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Principal>,
) -> Result<Json<RiderProfile>, AppError> {
    let rider = state
        .riders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("rider {id} not found")))?;

    Ok(Json(rider.value().clone()))
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location_url: String,
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Principal>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<RiderProfile>, AppError> {
    non_blank(&payload.location_url, "location url")?;

    let mut rider = state
        .riders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("rider {id} not found")))?;

    rider.location_url = Some(payload.location_url);

    Ok(Json(rider.clone()))
}

async fn rider_orders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Principal>,
) -> Json<Vec<DeliveryOrder>> {
    let mut orders: Vec<DeliveryOrder> = state
        .orders
        .iter()
        .filter(|entry| entry.value().assigned_rider.as_ref() == Some(&id))
        .map(|entry| entry.value().clone())
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(orders)
}
