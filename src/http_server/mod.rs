//! # orderdesk HTTP Server Module
//!
//! Axum routers for the users, tokens, products and orders resources.
//!
//! # Endpoints
//!
//! - `/ping` - Liveness check
//! - `/users` - Registration and profile management
//! - `/tokens` - Session tokens
//! - `/products` - Read-only catalog
//! - `/orders` - Orders of the token holder
//!
//! Protected operations read the session token id from the `token`
//! request header.

pub mod config;
pub mod response;
pub mod state;
pub mod validate;
pub mod server;
pub mod users_routes;
pub mod tokens_routes;
pub mod products_routes;
pub mod orders_routes;

pub use config::HttpServerConfig;
pub use response::{ApiError, ErrorResponse};
pub use server::{build_router, HttpServer};
pub use state::{AppState, TOKEN_HEADER};
