//! Product HTTP Routes
//!
//! The catalog is public and read-only over HTTP.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::response::{method_not_allowed, ApiResult};
use super::state::AppState;
use super::validate::Fields;

pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/products",
        get(get_products).fallback(method_not_allowed),
    )
}

/// Whole catalog, or one product when `?id=` is given
async fn get_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    match Fields::from_query(query).optional_slug("id")? {
        Some(id) => Ok(Json(state.catalog.get(&id)?).into_response()),
        None => Ok(Json(state.catalog.list()?).into_response()),
    }
}
