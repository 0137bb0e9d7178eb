//! Observability for orderdesk
//!
//! Structured JSON-lines logging. Observability is read-only: a failed
//! log write is ignored and never affects request handling.
//!
//! # Usage
//!
//! ```ignore
//! use orderdesk::observability::Logger;
//!
//! Logger::info("TOKEN_ISSUED", &[("email", "a@b.com")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
