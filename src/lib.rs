//! orderdesk - token-authenticated users, products and orders API
//!
//! Records are flat JSON files, one per record, under a data directory.

pub mod auth;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod shop;
pub mod store;
