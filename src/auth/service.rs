//! # Auth Service
//!
//! Combines the credential vault and the token service over one store.

use std::sync::Arc;

use super::clock::Clock;
use super::crypto::SecretHasher;
use super::errors::{AuthError, AuthResult};
use super::tokens::{is_token_id, Token, TokenConfig, TokenService};
use super::vault::CredentialVault;
use crate::store::RecordStore;

/// Auth service combining all auth components
pub struct AuthService<S: RecordStore> {
    vault: CredentialVault<S>,
    tokens: TokenService<S>,
}

impl<S: RecordStore> AuthService<S> {
    pub fn new(
        store: Arc<S>,
        hasher: SecretHasher,
        clock: Arc<dyn Clock>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            vault: CredentialVault::new(Arc::clone(&store), hasher),
            tokens: TokenService::new(store, clock, token_config),
        }
    }

    pub fn vault(&self) -> &CredentialVault<S> {
        &self.vault
    }

    pub fn tokens(&self) -> &TokenService<S> {
        &self.tokens
    }

    /// Exchange credentials for a new session token
    ///
    /// Unknown identity and wrong secret both yield `InvalidCredentials`.
    pub fn login(&self, identity_id: &str, secret: &str) -> AuthResult<Token> {
        match self.vault.verify_secret(identity_id, secret) {
            Ok(true) => self.tokens.issue(identity_id),
            Ok(false) | Err(AuthError::IdentityNotFound) => Err(AuthError::InvalidCredentials),
            Err(e) => Err(e),
        }
    }

    /// Authorize a request for `identity_id` given the raw bearer header.
    ///
    /// A missing or malformed header is treated exactly like an invalid
    /// token.
    pub fn authorize(&self, bearer: Option<&str>, identity_id: &str) -> bool {
        match bearer.map(str::trim) {
            Some(token_id) if is_token_id(token_id) => self.tokens.verify(token_id, identity_id),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::auth::vault::Profile;
    use crate::store::FileRecordStore;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn service() -> (TempDir, Arc<ManualClock>, AuthService<FileRecordStore>) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileRecordStore::new(temp.path().to_path_buf()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = AuthService::new(
            store,
            SecretHasher::with_cost(None, 8, 1).unwrap(),
            clock.clone(),
            TokenConfig::default(),
        );
        (temp, clock, service)
    }

    fn register(service: &AuthService<FileRecordStore>) {
        service
            .vault()
            .register(
                "a@b.com",
                "pw123",
                Profile {
                    full_name: "A B".into(),
                    address: "Somewhere 1".into(),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_login_issues_token() {
        let (_temp, _clock, service) = service();
        register(&service);

        let token = service.login("a@b.com", "pw123").unwrap();
        assert_eq!(token.identity_id, "a@b.com");
        assert!(service.authorize(Some(token.id.as_str()), "a@b.com"));
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let (_temp, _clock, service) = service();
        register(&service);

        let wrong_secret = service.login("a@b.com", "wrong").unwrap_err();
        let unknown_user = service.login("x@b.com", "pw123").unwrap_err();
        assert!(matches!(wrong_secret, AuthError::InvalidCredentials));
        assert_eq!(wrong_secret.to_string(), unknown_user.to_string());
    }

    #[test]
    fn test_authorize_rejects_missing_and_malformed_headers() {
        let (_temp, clock, service) = service();
        register(&service);
        let token = service.login("a@b.com", "pw123").unwrap();

        assert!(!service.authorize(None, "a@b.com"));
        assert!(!service.authorize(Some(""), "a@b.com"));
        assert!(!service.authorize(Some("short"), "a@b.com"));
        assert!(!service.authorize(Some(token.id.as_str()), "x@b.com"));

        clock.advance(Duration::minutes(61));
        assert!(!service.authorize(Some(token.id.as_str()), "a@b.com"));
    }
}
