use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::rest::non_blank;
use crate::auth::{AdminAuth, CallerPrincipal};
use crate::error::AppError;
use crate::models::Principal;
use crate::models::order::{DeliveryOrder, OrderStatus, PaymentType};
use crate::models::rider::RiderProfile;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/mine", get(my_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/rider", get(get_order_with_rider))
        .route("/orders/:id/assign", post(assign_rider))
        .route("/orders/:id/status", post(update_status))
        .route(
            "/orders/:id/parcel-photo",
            put(upload_parcel_photo).get(get_parcel_photo),
        )
        .route(
            "/orders/:id/proof-photo",
            put(upload_proof_photo).get(get_proof_photo),
        )
        .route("/orders/:id/whatsapp-link", get(whatsapp_link))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub mobile_number: String,
    pub pickup_address: String,
    pub delivery_address: String,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub drop_location: String,
    pub parcel_description: String,
    pub payment_type: PaymentType,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    CallerPrincipal(customer): CallerPrincipal,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<DeliveryOrder>, AppError> {
    non_blank(&payload.customer_name, "customer name")?;
    non_blank(&payload.mobile_number, "mobile number")?;
    non_blank(&payload.pickup_address, "pickup address")?;
    non_blank(&payload.delivery_address, "delivery address")?;
    non_blank(&payload.parcel_description, "parcel description")?;

    let order = DeliveryOrder {
        id: Uuid::new_v4(),
        customer,
        customer_name: payload.customer_name,
        mobile_number: payload.mobile_number,
        pickup_address: payload.pickup_address,
        delivery_address: payload.delivery_address,
        pickup_location: payload.pickup_location,
        drop_location: payload.drop_location,
        parcel_description: payload.parcel_description,
        payment_type: payload.payment_type,
        status: OrderStatus::New,
        assigned_rider: None,
        has_parcel_photo: false,
        has_proof_photo: false,
        proof_photo_at: None,
        created_at: Utc::now(),
    };

    state.orders.insert(order.id, order.clone());
    state.metrics.orders_created_total.inc();
    state.metrics.open_orders.inc();

    tracing::info!(order_id = %order.id, customer = %order.customer, "order created");

    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Query(query): Query<ListOrdersQuery>,
) -> Json<Vec<DeliveryOrder>> {
    let mut orders: Vec<DeliveryOrder> = state
        .orders
        .iter()
        .map(|entry| entry.value().clone())
        .filter(|order| query.status.is_none_or(|status| order.status == status))
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(orders)
}

async fn my_orders(
    State(state): State<Arc<AppState>>,
    CallerPrincipal(caller): CallerPrincipal,
) -> Json<Vec<DeliveryOrder>> {
    let mut orders: Vec<DeliveryOrder> = state
        .orders
        .iter()
        .filter(|entry| entry.value().customer == caller)
        .map(|entry| entry.value().clone())
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Json(orders)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryOrder>, AppError> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    Ok(Json(order.value().clone()))
}

#[derive(Serialize)]
pub struct OrderWithRider {
    pub order: DeliveryOrder,
    pub rider: Option<RiderProfile>,
}

async fn get_order_with_rider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithRider>, AppError> {
    let order = state
        .orders
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    let rider = order
        .assigned_rider
        .as_ref()
        .and_then(|rider_id| state.riders.get(rider_id))
        .map(|entry| entry.value().clone());

    Ok(Json(OrderWithRider { order, rider }))
}

#[derive(Deserialize)]
pub struct AssignRiderRequest {
    pub rider: Principal,
}

async fn assign_rider(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignRiderRequest>,
) -> Result<Json<OrderWithRider>, AppError> {
    let rider = state
        .riders
        .get(&payload.rider)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("rider {} not registered", payload.rider)))?;

    let mut order = state
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    if order.status != OrderStatus::New {
        return Err(AppError::Conflict(format!(
            "order {id} is already {}",
            order.status
        )));
    }

    order.status = OrderStatus::Assigned;
    order.assigned_rider = Some(rider.id.clone());
    let order = order.clone();

    state
        .metrics
        .status_transitions_total
        .with_label_values(&[OrderStatus::Assigned.as_str()])
        .inc();

    tracing::info!(order_id = %id, rider = %rider.id, "rider assigned");

    Ok(Json(OrderWithRider {
        order,
        rider: Some(rider),
    }))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<DeliveryOrder>, AppError> {
    let mut order = state
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    let from = order.status;
    let to = payload.status;

    if to == OrderStatus::Assigned {
        return Err(AppError::Conflict(
            "assigned is set by rider assignment".to_string(),
        ));
    }

    if !from.can_advance_to(to) {
        return Err(AppError::InvalidTransition { from, to });
    }

    if to == OrderStatus::Delivered && !order.has_proof_photo {
        return Err(AppError::Conflict(
            "proof photo required before marking delivered".to_string(),
        ));
    }

    order.status = to;
    let order = order.clone();

    state
        .metrics
        .status_transitions_total
        .with_label_values(&[to.as_str()])
        .inc();
    if to == OrderStatus::Delivered {
        state.metrics.open_orders.dec();
    }

    tracing::info!(order_id = %id, from = %from, to = %to, "order status updated");

    Ok(Json(order))
}

async fn upload_parcel_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    check_photo(&state, &body)?;

    let mut order = state
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    state.parcel_photos.insert(id, body.to_vec());
    order.has_parcel_photo = true;

    state
        .metrics
        .photo_uploads_total
        .with_label_values(&["parcel"])
        .inc();
    tracing::info!(order_id = %id, bytes = body.len(), "parcel photo stored");

    Ok(StatusCode::NO_CONTENT)
}

async fn upload_proof_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    check_photo(&state, &body)?;

    let mut order = state
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    state.proof_photos.insert(id, body.to_vec());
    order.has_proof_photo = true;
    order.proof_photo_at = Some(Utc::now());

    state
        .metrics
        .photo_uploads_total
        .with_label_values(&["proof"])
        .inc();
    tracing::info!(order_id = %id, bytes = body.len(), "proof photo stored");

    Ok(StatusCode::NO_CONTENT)
}

fn check_photo(state: &AppState, body: &Bytes) -> Result<(), AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("photo body cannot be empty".to_string()));
    }
    if body.len() > state.config.max_photo_bytes {
        return Err(AppError::BadRequest(format!(
            "photo exceeds {} bytes",
            state.config.max_photo_bytes
        )));
    }
    Ok(())
}

async fn get_parcel_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    photo_response(&state.parcel_photos, id, "parcel photo")
}

async fn get_proof_photo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    photo_response(&state.proof_photos, id, "proof photo")
}

fn photo_response(
    photos: &dashmap::DashMap<Uuid, Vec<u8>>,
    id: Uuid,
    kind: &str,
) -> Result<Response, AppError> {
    let bytes = photos
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("{kind} for order {id} not found")))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/jpeg")],
        bytes,
    )
        .into_response())
}

#[derive(Serialize)]
pub struct WhatsAppLinkResponse {
    pub url: String,
}

/// wa.me deep link carrying an order summary to the customer's number.
async fn whatsapp_link(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WhatsAppLinkResponse>, AppError> {
    let order = state
        .orders
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))?;

    let company = state
        .settings
        .read()
        .map_err(|_| AppError::Internal("settings lock poisoned".to_string()))?
        .company_name
        .clone();

    let message = format!(
        "Hello {}, your {} order {} is {}. Pickup: {}. Drop: {}.",
        order.customer_name,
        company,
        order.id,
        order.status,
        order.pickup_address,
        order.delivery_address,
    );

    Ok(Json(WhatsAppLinkResponse {
        url: build_whatsapp_url(&message, Some(&order.mobile_number)),
    }))
}

fn build_whatsapp_url(message: &str, phone_number: Option<&str>) -> String {
    let encoded = encode_component(message);
    match phone_number {
        Some(raw) => {
            let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
            format!("https://wa.me/{digits}?text={encoded}")
        }
        None => format!("https://wa.me/?text={encoded}"),
    }
}

// Same unreserved set as JS encodeURIComponent, so the text renders the
// way WhatsApp expects.
fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{build_whatsapp_url, encode_component};

    #[test]
    fn whatsapp_url_strips_non_digits_from_phone() {
        let url = build_whatsapp_url("hi", Some("+91 98765-43210"));
        assert_eq!(url, "https://wa.me/919876543210?text=hi");
    }

    #[test]
    fn whatsapp_url_without_phone_omits_number() {
        let url = build_whatsapp_url("hi there", None);
        assert_eq!(url, "https://wa.me/?text=hi%20there");
    }

    #[test]
    fn encode_component_matches_js_unreserved_set() {
        assert_eq!(encode_component("a-b_c.d!e~f*g'h(i)j"), "a-b_c.d!e~f*g'h(i)j");
        assert_eq!(encode_component("a b&c?d=e"), "a%20b%26c%3Fd%3De");
    }
}
