//! # Auth Module
//!
//! Credential storage and session tokens.
//!
//! - [`CredentialVault`]: identities with Argon2id-hashed secrets
//! - [`TokenService`]: issue / fetch / renew / revoke / verify bearer tokens
//! - [`AuthService`]: login and request authorization on top of both

pub mod errors;
pub mod clock;
pub mod crypto;
pub mod vault;
pub mod tokens;
pub mod service;

pub use errors::{AuthError, AuthResult};
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::SecretHasher;
pub use vault::{CredentialVault, Identity, Profile, ProfileUpdate};
pub use tokens::{Token, TokenConfig, TokenService, TOKEN_ID_LEN};
pub use service::AuthService;
