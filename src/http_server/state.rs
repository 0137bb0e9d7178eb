//! Shared handler state

use std::sync::Arc;

use axum::http::HeaderMap;

use super::response::{ApiError, ApiResult};
use crate::auth::{AuthService, Clock, SecretHasher, TokenConfig};
use crate::shop::{OrderBook, ProductCatalog};
use crate::store::FileRecordStore;

/// Request header carrying the session token id
pub const TOKEN_HEADER: &str = "token";

/// Services behind every route, all over one record store
pub struct AppState {
    pub auth: AuthService<FileRecordStore>,
    pub catalog: ProductCatalog<FileRecordStore>,
    pub orders: OrderBook<FileRecordStore>,
}

impl AppState {
    pub fn new(
        store: Arc<FileRecordStore>,
        hasher: SecretHasher,
        clock: Arc<dyn Clock>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&store), hasher, Arc::clone(&clock), token_config),
            catalog: ProductCatalog::new(Arc::clone(&store)),
            orders: OrderBook::new(store, clock),
        }
    }

    /// Require a live token for `identity_id` in the request headers
    pub fn authorize(&self, headers: &HeaderMap, identity_id: &str) -> ApiResult<()> {
        if self.auth.authorize(bearer(headers), identity_id) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Raw token header value, if present and readable
pub fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers.get(TOKEN_HEADER).and_then(|value| value.to_str().ok())
}
