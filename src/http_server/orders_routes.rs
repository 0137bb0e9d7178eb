//! Order HTTP Routes
//!
//! Every order operation needs a token belonging to the order owner.
//! The owner's identity record keeps the list of their order ids.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};

use super::response::{method_not_allowed, ApiError, ApiResult};
use super::state::AppState;
use super::validate::Fields;
use crate::auth::AuthError;
use crate::observability::Logger;
use crate::shop::{Order, ShopError, ORDER_ID_LEN};

pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/orders",
        post(create_order)
            .get(get_order)
            .put(update_order)
            .delete(delete_order)
            .fallback(method_not_allowed),
    )
}

/// Unknown products in a submitted order are the client's mistake
fn order_input_error(err: ShopError) -> ApiError {
    match err {
        ShopError::ProductNotFound(_) | ShopError::InvalidOrder(_) => {
            ApiError::BadRequest(err.to_string())
        }
        other => other.into(),
    }
}

/// Load an order and check the caller owns it
fn owned_order(state: &AppState, headers: &HeaderMap, order_id: &str) -> ApiResult<Order> {
    let order = state.orders.get(order_id)?;
    state.authorize(headers, &order.identity_id)?;
    Ok(order)
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Order>> {
    let fields = Fields::from_body(&body)?;
    let email = fields.required_email("email")?;
    let items = fields.required_items("items")?;
    state.authorize(&headers, &email)?;

    let order = state.orders.place(&email, items).map_err(order_input_error)?;

    if let Err(e) = state.auth.vault().attach_order(&email, &order.id) {
        // Don't leave an order nobody lists
        if let Err(cleanup) = state.orders.cancel(&order.id) {
            Logger::error(
                "ORDER_ORPHANED",
                &[("order_id", order.id.as_str()), ("error", &cleanup.to_string())],
            );
        }
        return Err(match e {
            AuthError::IdentityNotFound => ApiError::BadRequest(e.to_string()),
            other => other.into(),
        });
    }

    let total = order.total_cents.to_string();
    Logger::info(
        "ORDER_PLACED",
        &[("email", email.as_str()), ("order_id", order.id.as_str()), ("total_cents", &total)],
    );
    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Order>> {
    let id = Fields::from_query(query).required_id("id", ORDER_ID_LEN)?;
    let order = owned_order(&state, &headers, &id)?;
    Ok(Json(order))
}

async fn update_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Order>> {
    let fields = Fields::from_body(&body)?;
    let id = fields.required_id("id", ORDER_ID_LEN)?;
    let items = fields.required_items("items")?;
    owned_order(&state, &headers, &id)?;

    let order = state
        .orders
        .replace_items(&id, items)
        .map_err(order_input_error)?;

    Logger::info("ORDER_UPDATED", &[("order_id", id.as_str())]);
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<StatusCode> {
    let id = Fields::from_query(query).required_id("id", ORDER_ID_LEN)?;
    let order = owned_order(&state, &headers, &id)?;

    state.orders.cancel(&id)?;
    match state.auth.vault().detach_order(&order.identity_id, &id) {
        Ok(()) | Err(AuthError::IdentityNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    Logger::info(
        "ORDER_CANCELLED",
        &[("email", order.identity_id.as_str()), ("order_id", id.as_str())],
    );
    Ok(StatusCode::OK)
}
