//! User HTTP Routes
//!
//! - `POST /users` registers an identity (no token required)
//! - `GET /users?email=` returns the profile without the secret hash
//! - `PUT /users` changes any of fullName, password, address
//! - `DELETE /users?email=` removes the identity and its orders

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
use super::state::{bearer, AppState};
use super::validate::Fields;
use crate::auth::{AuthError, Identity, Profile, ProfileUpdate};
use crate::observability::Logger;
use crate::shop::ShopError;

pub fn users_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/users",
        post(create_user)
            .get(get_user)
            .put(update_user)
            .delete(delete_user)
            .fallback(method_not_allowed),
    )
}

async fn create_user(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<StatusCode> {
    let fields = Fields::from_body(&body)?;
    let full_name = fields.required_text("fullName")?;
    let email = fields.required_email("email")?;
    let password = fields.required_text("password")?;
    let address = fields.required_text("address")?;

    state
        .auth
        .vault()
        .register(&email, &password, Profile { full_name, address })
        .map_err(|e| match e {
            AuthError::IdentityExists => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(StatusCode::OK)
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Identity>> {
    let email = Fields::from_query(query).required_email("email")?;
    state.authorize(&headers, &email)?;

    let identity = state.auth.vault().identity(&email)?;
    Ok(Json(identity))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Identity>> {
    let fields = Fields::from_body(&body)?;
    let email = fields.required_email("email")?;
    let update = ProfileUpdate {
        full_name: fields.optional_text("fullName")?,
        secret: fields.optional_text("password")?,
        address: fields.optional_text("address")?,
    };
    if update.is_empty() {
        return Err(ApiError::BadRequest("Missing fields to update".to_string()));
    }

    state.authorize(&headers, &email)?;

    let identity = state
        .auth
        .vault()
        .update_profile(&email, update)
        .map_err(|e| match e {
            AuthError::IdentityNotFound => ApiError::BadRequest(e.to_string()),
            other => other.into(),
        })?;
    Ok(Json(identity))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<StatusCode> {
    let email = Fields::from_query(query).required_email("email")?;
    state.authorize(&headers, &email)?;

    // Order list of a removed identity is final
    let identity = state.auth.vault().remove_identity(&email).map_err(|e| match e {
        AuthError::IdentityNotFound => ApiError::BadRequest("Could not find the specified user".into()),
        other => other.into(),
    })?;

    for order_id in &identity.orders {
        match state.orders.cancel(order_id) {
            Ok(()) | Err(ShopError::OrderNotFound) => {}
            Err(e) => {
                return Err(ApiError::Internal(format!(
                    "could not delete order {} of {}: {}",
                    order_id, email, e
                )))
            }
        }
    }

    // The presented token can never authorize anything again
    if let Some(token_id) = bearer(&headers).map(str::trim) {
        if let Err(e) = state.auth.tokens().revoke(token_id) {
            if !matches!(e, AuthError::TokenNotFound) {
                Logger::warn(
                    "TOKEN_REVOKE_FAILED",
                    &[("email", email.as_str()), ("error", &e.to_string())],
                );
            }
        }
    }

    Ok(StatusCode::OK)
}
