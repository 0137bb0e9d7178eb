//! Token HTTP Routes
//!
//! Session tokens are created by exchanging credentials and are then
//! passed back in the `token` request header.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use super::response::{method_not_allowed, ApiError, ApiResult};
use super::state::AppState;
use super::validate::Fields;
use crate::auth::{AuthError, Token, TOKEN_ID_LEN};

pub fn tokens_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/tokens",
        post(create_token)
            .get(get_token)
            .put(extend_token)
            .delete(delete_token)
            .fallback(method_not_allowed),
    )
}

async fn create_token(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Token>> {
    let fields = Fields::from_body(&body)?;
    let email = fields.required_email("email")?;
    let password = fields.required_text("password")?;

    let token = state.auth.login(&email, &password).map_err(|e| match e {
        AuthError::InvalidCredentials => ApiError::BadRequest(e.to_string()),
        other => ApiError::Internal(other.to_string()),
    })?;
    Ok(Json(token))
}

async fn get_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Token>> {
    let id = Fields::from_query(query).required_id("id", TOKEN_ID_LEN)?;
    let token = state.auth.tokens().fetch(&id)?;
    Ok(Json(token))
}

async fn extend_token(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Token>> {
    let fields = Fields::from_body(&body)?;
    let id = fields.required_id("id", TOKEN_ID_LEN)?;
    fields.required_true("extend")?;

    let token = state.auth.tokens().renew(&id).map_err(|e| match e {
        AuthError::TokenNotFound | AuthError::TokenExpired => ApiError::BadRequest(e.to_string()),
        other => other.into(),
    })?;
    Ok(Json(token))
}

async fn delete_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<StatusCode> {
    let id = Fields::from_query(query).required_id("id", TOKEN_ID_LEN)?;

    state.auth.tokens().revoke(&id).map_err(|e| match e {
        AuthError::TokenNotFound => ApiError::BadRequest("Could not find the specified token".into()),
        other => other.into(),
    })?;
    Ok(StatusCode::OK)
}
