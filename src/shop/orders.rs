//! # Orders
//!
//! Orders live in the `orders` collection, each owned by one identity.
//! Ownership is checked by the HTTP layer before any mutating call here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{ShopError, ShopResult};
use super::products::ProductCatalog;
use crate::auth::clock::Clock;
use crate::auth::crypto::generate_id;
use crate::store::{RecordStore, StoreError, ORDERS};

/// Length of every order id
pub const ORDER_ID_LEN: usize = 20;

/// Upper bound on distinct lines per order
pub const MAX_ORDER_ITEMS: usize = 50;

/// Upper bound on quantity per line
pub const MAX_ITEM_QUANTITY: u32 = 100;

/// One order line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: u32,
}

/// Order record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub identity_id: String,
    pub items: Vec<OrderItem>,
    pub total_cents: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order storage and pricing
pub struct OrderBook<S: RecordStore> {
    store: Arc<S>,
    catalog: ProductCatalog<S>,
    clock: Arc<dyn Clock>,
}

impl<S: RecordStore> OrderBook<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog: ProductCatalog::new(Arc::clone(&store)),
            store,
            clock,
        }
    }

    /// Create an order for `identity_id`
    ///
    /// An id collision surfaces as `PersistFailure`.
    pub fn place(&self, identity_id: &str, items: Vec<OrderItem>) -> ShopResult<Order> {
        let total_cents = self.price(&items)?;
        let now = self.clock.now();
        let order = Order {
            id: generate_id(ORDER_ID_LEN),
            identity_id: identity_id.to_string(),
            items,
            total_cents,
            created_at: now,
            updated_at: now,
        };

        self.store
            .create_as(ORDERS, &order.id, &order)
            .map_err(|e| ShopError::PersistFailure(e.to_string()))?;
        Ok(order)
    }

    /// Read an order
    pub fn get(&self, order_id: &str) -> ShopResult<Order> {
        self.store.read_as(ORDERS, order_id).map_err(order_error)
    }

    /// Replace the items of an existing order and re-price it
    pub fn replace_items(&self, order_id: &str, items: Vec<OrderItem>) -> ShopResult<Order> {
        let mut order = self.get(order_id)?;
        order.total_cents = self.price(&items)?;
        order.items = items;
        order.updated_at = self.clock.now();

        self.store
            .update_as(ORDERS, order_id, &order)
            .map_err(|e| match e {
                StoreError::NotFound { .. } => ShopError::OrderNotFound,
                other => ShopError::PersistFailure(other.to_string()),
            })?;
        Ok(order)
    }

    /// Delete an order
    pub fn cancel(&self, order_id: &str) -> ShopResult<()> {
        self.store.delete(ORDERS, order_id).map_err(order_error)
    }

    /// Sum of `price * quantity` over all lines; every product must exist
    fn price(&self, items: &[OrderItem]) -> ShopResult<u64> {
        if items.is_empty() || items.len() > MAX_ORDER_ITEMS {
            return Err(ShopError::InvalidOrder(format!(
                "an order needs between 1 and {} items",
                MAX_ORDER_ITEMS
            )));
        }

        let mut total: u64 = 0;
        for item in items {
            if item.quantity == 0 || item.quantity > MAX_ITEM_QUANTITY {
                return Err(ShopError::InvalidOrder(format!(
                    "quantity for {} must be between 1 and {}",
                    item.product_id, MAX_ITEM_QUANTITY
                )));
            }
            let product = self.catalog.get(&item.product_id)?;
            total = product
                .price_cents
                .checked_mul(u64::from(item.quantity))
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| ShopError::InvalidOrder("order total is too large".to_string()))?;
        }
        Ok(total)
    }
}

fn order_error(err: StoreError) -> ShopError {
    if err.is_not_found() {
        ShopError::OrderNotFound
    } else {
        err.into()
    }
}
