//! # Session Tokens
//!
//! Opaque bearer tokens stored in the `tokens` collection.
//!
//! ## Lifecycle
//! - `issue`: new token, `expiresAt = now + ttl`
//! - `renew`: only while `expiresAt > now`; moves expiry to `now + ttl`
//! - `revoke`: deletes the record
//! - expiry is evaluated lazily; expired records stay on disk

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::crypto::generate_id;
use super::errors::{AuthError, AuthResult};
use crate::observability::Logger;
use crate::store::{RecordStore, StoreError, TOKENS};

/// Length of every token id
pub const TOKEN_ID_LEN: usize = 20;

/// Session token record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Opaque random id, also the bearer value
    pub id: String,

    /// Identity this token was issued to
    pub identity_id: String,

    /// Absolute expiry
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Whether the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token service configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Lifetime granted on issue and on each renewal
    pub ttl: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(1),
        }
    }
}

/// Issues and checks session tokens
pub struct TokenService<S: RecordStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: TokenConfig,
}

impl<S: RecordStore> TokenService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: TokenConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Issue a fresh token for an identity
    ///
    /// An id collision surfaces as `PersistFailure`; no new id is tried.
    pub fn issue(&self, identity_id: &str) -> AuthResult<Token> {
        let token = Token {
            id: generate_id(TOKEN_ID_LEN),
            identity_id: identity_id.to_string(),
            expires_at: self.clock.now() + self.config.ttl,
        };

        self.store
            .create_as(TOKENS, &token.id, &token)
            .map_err(|e| AuthError::PersistFailure(e.to_string()))?;

        Logger::info(
            "TOKEN_ISSUED",
            &[("email", identity_id), ("token", &token_hint(&token.id))],
        );
        Ok(token)
    }

    /// Read a token as stored. Expiry is not checked.
    pub fn fetch(&self, token_id: &str) -> AuthResult<Token> {
        self.store.read_as(TOKENS, token_id).map_err(token_error)
    }

    /// Extend a live token by one ttl from now
    pub fn renew(&self, token_id: &str) -> AuthResult<Token> {
        let mut token = self.fetch(token_id)?;

        let now = self.clock.now();
        if token.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }

        token.expires_at = now + self.config.ttl;
        self.store
            .update_as(TOKENS, token_id, &token)
            .map_err(|e| match e {
                StoreError::NotFound { .. } => AuthError::TokenNotFound,
                other => AuthError::PersistFailure(other.to_string()),
            })?;

        Logger::info("TOKEN_RENEWED", &[("token", &token_hint(token_id))]);
        Ok(token)
    }

    /// Delete a token
    pub fn revoke(&self, token_id: &str) -> AuthResult<()> {
        self.store.delete(TOKENS, token_id).map_err(token_error)?;
        Logger::info("TOKEN_REVOKED", &[("token", &token_hint(token_id))]);
        Ok(())
    }

    /// Authorization decision: the token exists, belongs to `identity_id`
    /// and has not expired. Every failure, including storage errors, is
    /// `false`.
    pub fn verify(&self, token_id: &str, identity_id: &str) -> bool {
        match self.fetch(token_id) {
            Ok(token) => token.identity_id == identity_id && !token.is_expired_at(self.clock.now()),
            Err(AuthError::TokenNotFound) => false,
            Err(e) => {
                Logger::warn(
                    "TOKEN_VERIFY_STORE_ERROR",
                    &[("token", &token_hint(token_id)), ("error", &e.to_string())],
                );
                false
            }
        }
    }
}

/// Whether a raw header value has the shape of a token id
pub fn is_token_id(candidate: &str) -> bool {
    candidate.len() == TOKEN_ID_LEN && candidate.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Short prefix of a token id, safe to log
pub fn token_hint(token_id: &str) -> String {
    let prefix: String = token_id.chars().take(4).collect();
    format!("{}…", prefix)
}

fn token_error(err: StoreError) -> AuthError {
    if err.is_not_found() {
        AuthError::TokenNotFound
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::store::FileRecordStore;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        store: Arc<FileRecordStore>,
        clock: Arc<ManualClock>,
        service: TokenService<FileRecordStore>,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileRecordStore::new(temp.path().to_path_buf()));
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let service = TokenService::new(Arc::clone(&store), clock.clone(), TokenConfig::default());
        Fixture {
            _temp: temp,
            store,
            clock,
            service,
        }
    }

    #[test]
    fn test_issue_sets_expiry_one_hour_ahead() {
        let f = fixture();
        let t0 = f.clock.now();
        let token = f.service.issue("a@b.com").unwrap();

        assert!(is_token_id(&token.id));
        assert_eq!(token.identity_id, "a@b.com");
        assert_eq!(token.expires_at, t0 + Duration::hours(1));
        assert_eq!(f.service.fetch(&token.id).unwrap(), token);
    }

    #[test]
    fn test_verify_truth_table() {
        let f = fixture();
        let token = f.service.issue("a@b.com").unwrap();

        assert!(f.service.verify(&token.id, "a@b.com"));
        assert!(!f.service.verify(&token.id, "other@b.com"));
        assert!(!f.service.verify("AAAAAAAAAAAAAAAAAAAA", "a@b.com"));
        assert!(!f.service.verify("../../etc/passwd", "a@b.com"));

        f.clock.advance(Duration::hours(1));
        // expiresAt == now is expired
        assert!(!f.service.verify(&token.id, "a@b.com"));
    }

    #[test]
    fn test_verify_is_false_for_corrupt_record() {
        let f = fixture();
        f.store
            .create(TOKENS, "AAAAAAAAAAAAAAAAAAAA", &serde_json::json!({"garbage": true}))
            .unwrap();
        assert!(!f.service.verify("AAAAAAAAAAAAAAAAAAAA", "a@b.com"));
    }

    #[test]
    fn test_renew_extends_from_now() {
        let f = fixture();
        let t0 = f.clock.now();
        let token = f.service.issue("a@b.com").unwrap();

        f.clock.advance(Duration::minutes(30));
        let renewed = f.service.renew(&token.id).unwrap();
        assert_eq!(renewed.expires_at, t0 + Duration::minutes(90));
        assert_eq!(f.service.fetch(&token.id).unwrap().expires_at, t0 + Duration::minutes(90));
    }

    #[test]
    fn test_renew_expired_token_is_rejected_and_unchanged() {
        let f = fixture();
        let token = f.service.issue("a@b.com").unwrap();

        f.clock.advance(Duration::minutes(61));
        assert!(matches!(f.service.renew(&token.id), Err(AuthError::TokenExpired)));
        assert_eq!(f.service.fetch(&token.id).unwrap().expires_at, token.expires_at);
    }

    #[test]
    fn test_missing_token_operations() {
        let f = fixture();
        assert!(matches!(f.service.fetch("nope"), Err(AuthError::TokenNotFound)));
        assert!(matches!(f.service.renew("nope"), Err(AuthError::TokenNotFound)));
        assert!(matches!(f.service.revoke("nope"), Err(AuthError::TokenNotFound)));
    }

    #[test]
    fn test_revoke_terminates_token() {
        let f = fixture();
        let token = f.service.issue("a@b.com").unwrap();

        f.service.revoke(&token.id).unwrap();
        assert!(!f.service.verify(&token.id, "a@b.com"));
        assert!(matches!(f.service.fetch(&token.id), Err(AuthError::TokenNotFound)));
    }

    #[test]
    fn test_expired_tokens_are_not_purged() {
        let f = fixture();
        let token = f.service.issue("a@b.com").unwrap();

        f.clock.advance(Duration::days(2));
        assert_eq!(f.service.fetch(&token.id).unwrap(), token);
    }

    #[test]
    fn test_token_shape_helpers() {
        assert!(is_token_id("abcdefghij0123456789"));
        assert!(!is_token_id("abcdefghij012345678"));
        assert!(!is_token_id("abcdefghij012345678/"));
        assert_eq!(token_hint("abcdefghij0123456789"), "abcd…");
        assert_eq!(token_hint("ab"), "ab…");
    }
}
