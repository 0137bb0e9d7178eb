//! # Record Store
//!
//! Durable JSON records keyed by `(collection, id)`.
//!
//! This is the only durability boundary in the crate. Every other
//! component goes through [`RecordStore`] and re-reads on each call.

pub mod errors;
pub mod backend;
pub mod file;
pub mod locks;

pub use errors::{StoreError, StoreResult};
pub use backend::RecordStore;
pub use file::{FileRecordStore, MAX_KEY_LEN};
pub use locks::KeyLocks;

/// Collection holding identities
pub const USERS: &str = "users";

/// Collection holding session tokens
pub const TOKENS: &str = "tokens";

/// Collection holding the product catalog
pub const PRODUCTS: &str = "products";

/// Collection holding orders
pub const ORDERS: &str = "orders";

/// All collections created by `orderdesk init`
pub const COLLECTIONS: [&str; 4] = [USERS, TOKENS, PRODUCTS, ORDERS];
