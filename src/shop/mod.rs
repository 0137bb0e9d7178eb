//! # Shop Module
//!
//! Product catalog and per-identity orders.

pub mod errors;
pub mod products;
pub mod orders;

pub use errors::{ShopError, ShopResult};
pub use products::{ImportReport, Product, ProductCatalog};
pub use orders::{Order, OrderBook, OrderItem, ORDER_ID_LEN};
