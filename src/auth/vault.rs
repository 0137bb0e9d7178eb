//! # Credential Vault
//!
//! One record per registered identity in the `users` collection, keyed
//! by email.
//!
//! ## Invariants
//! - Only the Argon2id hash of a secret is persisted, never the secret
//! - A failed hash performs no write
//! - Records leave this module only as [`Identity`], which has no hash field

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use super::crypto::{generate_id, SecretHasher};
use super::errors::{AuthError, AuthResult};
use crate::observability::Logger;
use crate::store::{KeyLocks, RecordStore, StoreError, USERS};

/// Stored identity record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    email: String,
    full_name: String,
    hashed_secret: String,
    address: String,
    #[serde(default)]
    orders: Vec<String>,
}

/// Identity as seen by callers outside the vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    pub full_name: String,
    pub address: String,
    pub orders: Vec<String>,
}

impl From<IdentityRecord> for Identity {
    fn from(record: IdentityRecord) -> Self {
        Self {
            email: record.email,
            full_name: record.full_name,
            address: record.address,
            orders: record.orders,
        }
    }
}

/// Profile fields supplied at registration
#[derive(Debug, Clone)]
pub struct Profile {
    pub full_name: String,
    pub address: String,
}

/// Self-service changes; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub secret: Option<String>,
    pub address: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.secret.is_none() && self.address.is_none()
    }
}

/// Credential vault over a record store
pub struct CredentialVault<S: RecordStore> {
    store: Arc<S>,
    hasher: SecretHasher,
    // Serializes read-modify-write sequences on the same identity
    locks: KeyLocks,
    // Verified against when the identity is unknown
    decoy_hash: OnceLock<String>,
}

impl<S: RecordStore> CredentialVault<S> {
    pub fn new(store: Arc<S>, hasher: SecretHasher) -> Self {
        Self {
            store,
            hasher,
            locks: KeyLocks::default(),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Register a new identity
    pub fn register(&self, identity_id: &str, secret: &str, profile: Profile) -> AuthResult<Identity> {
        let _guard = self.locks.lock(USERS, identity_id);

        match self.store.read(USERS, identity_id) {
            Ok(_) => return Err(AuthError::IdentityExists),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let hashed_secret = self.hasher.hash(secret)?;
        let record = IdentityRecord {
            email: identity_id.to_string(),
            full_name: profile.full_name,
            hashed_secret,
            address: profile.address,
            orders: Vec::new(),
        };

        self.store
            .create_as(USERS, identity_id, &record)
            .map_err(|e| match e {
                StoreError::AlreadyExists { .. } => AuthError::IdentityExists,
                other => AuthError::PersistFailure(other.to_string()),
            })?;

        Logger::info("USER_REGISTERED", &[("email", identity_id)]);
        Ok(record.into())
    }

    /// Check a supplied secret against the stored hash
    ///
    /// An unknown identity still runs a full verification before failing
    /// with `IdentityNotFound`.
    pub fn verify_secret(&self, identity_id: &str, supplied: &str) -> AuthResult<bool> {
        let record = match self.load(identity_id) {
            Ok(record) => record,
            Err(AuthError::IdentityNotFound) => {
                self.hasher.verify(supplied, self.decoy_hash()?)?;
                return Err(AuthError::IdentityNotFound);
            }
            Err(e) => return Err(e),
        };
        self.hasher.verify(supplied, &record.hashed_secret)
    }

    fn decoy_hash(&self) -> AuthResult<&str> {
        if let Some(hash) = self.decoy_hash.get() {
            return Ok(hash);
        }
        let hash = self.hasher.hash(&generate_id(32))?;
        Ok(self.decoy_hash.get_or_init(|| hash))
    }

    /// Read an identity
    pub fn identity(&self, identity_id: &str) -> AuthResult<Identity> {
        self.load(identity_id).map(Identity::from)
    }

    /// Apply a self-service profile update
    ///
    /// A new secret is hashed before anything is written.
    pub fn update_profile(&self, identity_id: &str, update: ProfileUpdate) -> AuthResult<Identity> {
        let _guard = self.locks.lock(USERS, identity_id);
        let mut record = self.load(identity_id)?;

        if let Some(secret) = update.secret {
            record.hashed_secret = self.hasher.hash(&secret)?;
        }
        if let Some(full_name) = update.full_name {
            record.full_name = full_name;
        }
        if let Some(address) = update.address {
            record.address = address;
        }

        self.save(identity_id, &record)?;
        Ok(record.into())
    }

    /// Delete an identity and return its last stored state
    ///
    /// The returned order list is final: any later `attach_order` for this
    /// identity fails with `IdentityNotFound`.
    pub fn remove_identity(&self, identity_id: &str) -> AuthResult<Identity> {
        let _guard = self.locks.lock(USERS, identity_id);
        let record = self.load(identity_id)?;
        self.store.delete(USERS, identity_id).map_err(identity_error)?;
        Logger::info("USER_REMOVED", &[("email", identity_id)]);
        Ok(record.into())
    }

    /// Record that `order_id` belongs to this identity
    pub fn attach_order(&self, identity_id: &str, order_id: &str) -> AuthResult<()> {
        let _guard = self.locks.lock(USERS, identity_id);
        let mut record = self.load(identity_id)?;

        if !record.orders.iter().any(|id| id == order_id) {
            record.orders.push(order_id.to_string());
            self.save(identity_id, &record)?;
        }
        Ok(())
    }

    /// Forget `order_id` for this identity; a no-op if it was not listed
    pub fn detach_order(&self, identity_id: &str, order_id: &str) -> AuthResult<()> {
        let _guard = self.locks.lock(USERS, identity_id);
        let mut record = self.load(identity_id)?;

        let before = record.orders.len();
        record.orders.retain(|id| id != order_id);
        if record.orders.len() != before {
            self.save(identity_id, &record)?;
        }
        Ok(())
    }

    fn load(&self, identity_id: &str) -> AuthResult<IdentityRecord> {
        self.store
            .read_as(USERS, identity_id)
            .map_err(identity_error)
    }

    fn save(&self, identity_id: &str, record: &IdentityRecord) -> AuthResult<()> {
        self.store
            .update_as(USERS, identity_id, record)
            .map_err(|e| match e {
                StoreError::NotFound { .. } => AuthError::IdentityNotFound,
                other => AuthError::PersistFailure(other.to_string()),
            })
    }
}

fn identity_error(err: StoreError) -> AuthError {
    if err.is_not_found() {
        AuthError::IdentityNotFound
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FileRecordStore;
    use tempfile::TempDir;

    fn vault() -> (TempDir, Arc<FileRecordStore>, CredentialVault<FileRecordStore>) {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(FileRecordStore::new(temp.path().to_path_buf()));
        let hasher = SecretHasher::with_cost(None, 8, 1).unwrap();
        let vault = CredentialVault::new(Arc::clone(&store), hasher);
        (temp, store, vault)
    }

    fn profile() -> Profile {
        Profile {
            full_name: "Ada Lovelace".to_string(),
            address: "12 Analytical Way".to_string(),
        }
    }

    #[test]
    fn test_register_and_verify() {
        let (_temp, _store, vault) = vault();
        let identity = vault.register("a@b.com", "pw123", profile()).unwrap();

        assert_eq!(identity.email, "a@b.com");
        assert!(identity.orders.is_empty());
        assert!(vault.verify_secret("a@b.com", "pw123").unwrap());
        assert!(!vault.verify_secret("a@b.com", "wrong").unwrap());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let (_temp, _store, vault) = vault();
        vault.register("a@b.com", "pw123", profile()).unwrap();

        let result = vault.register("a@b.com", "other", profile());
        assert!(matches!(result, Err(AuthError::IdentityExists)));
        // First secret still valid
        assert!(vault.verify_secret("a@b.com", "pw123").unwrap());
    }

    #[test]
    fn test_stored_record_never_holds_plaintext() {
        let (_temp, store, vault) = vault();
        vault.register("a@b.com", "pw123", profile()).unwrap();

        let raw = store.read(USERS, "a@b.com").unwrap();
        let hashed = raw["hashedSecret"].as_str().unwrap();
        assert!(hashed.starts_with("$argon2id$"));
        assert!(!raw.to_string().contains("pw123"));
    }

    #[test]
    fn test_identity_view_has_no_hash() {
        let (_temp, _store, vault) = vault();
        vault.register("a@b.com", "pw123", profile()).unwrap();

        let json = serde_json::to_value(vault.identity("a@b.com").unwrap()).unwrap();
        assert!(json.get("hashedSecret").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_unknown_identity() {
        let (_temp, _store, vault) = vault();

        assert!(matches!(vault.verify_secret("nobody@x.io", "pw"), Err(AuthError::IdentityNotFound)));
        assert!(matches!(vault.identity("nobody@x.io"), Err(AuthError::IdentityNotFound)));
        assert!(matches!(
            vault.update_profile("nobody@x.io", ProfileUpdate::default()),
            Err(AuthError::IdentityNotFound)
        ));
        assert!(matches!(vault.remove_identity("nobody@x.io"), Err(AuthError::IdentityNotFound)));
    }

    #[test]
    fn test_unknown_identity_still_hashes() {
        let (_temp, _store, vault) = vault();
        assert!(vault.decoy_hash.get().is_none());

        let result = vault.verify_secret("nobody@x.io", "pw123");
        assert!(matches!(result, Err(AuthError::IdentityNotFound)));

        let decoy = vault.decoy_hash.get().unwrap();
        assert!(decoy.starts_with("$argon2id$"));
        // Reused across calls
        vault.verify_secret("other@x.io", "pw123").unwrap_err();
        assert_eq!(vault.decoy_hash.get().unwrap(), decoy);
    }

    #[test]
    fn test_update_profile_fields() {
        let (_temp, _store, vault) = vault();
        vault.register("a@b.com", "pw123", profile()).unwrap();

        let updated = vault
            .update_profile(
                "a@b.com",
                ProfileUpdate {
                    address: Some("1 New Street".into()),
                    secret: Some("newpw".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.full_name, "Ada Lovelace");
        assert_eq!(updated.address, "1 New Street");
        assert!(vault.verify_secret("a@b.com", "newpw").unwrap());
        assert!(!vault.verify_secret("a@b.com", "pw123").unwrap());
    }

    #[test]
    fn test_remove_identity() {
        let (_temp, _store, vault) = vault();
        vault.register("a@b.com", "pw123", profile()).unwrap();
        vault.remove_identity("a@b.com").unwrap();

        assert!(matches!(vault.identity("a@b.com"), Err(AuthError::IdentityNotFound)));
        // Can register again afterwards
        vault.register("a@b.com", "pw123", profile()).unwrap();
    }

    #[test]
    fn test_removed_identity_reports_final_orders() {
        let (_temp, _store, vault) = vault();
        vault.register("a@b.com", "pw123", profile()).unwrap();
        vault.attach_order("a@b.com", "order1").unwrap();

        let removed = vault.remove_identity("a@b.com").unwrap();
        assert_eq!(removed.orders, vec!["order1"]);

        // Nothing can be attached once the list has been handed out
        let late = vault.attach_order("a@b.com", "order2");
        assert!(matches!(late, Err(AuthError::IdentityNotFound)));
    }

    #[test]
    fn test_attach_and_detach_orders() {
        let (_temp, _store, vault) = vault();
        vault.register("a@b.com", "pw123", profile()).unwrap();

        vault.attach_order("a@b.com", "order1").unwrap();
        vault.attach_order("a@b.com", "order2").unwrap();
        vault.attach_order("a@b.com", "order1").unwrap();
        assert_eq!(vault.identity("a@b.com").unwrap().orders, vec!["order1", "order2"]);

        vault.detach_order("a@b.com", "order1").unwrap();
        vault.detach_order("a@b.com", "missing").unwrap();
        assert_eq!(vault.identity("a@b.com").unwrap().orders, vec!["order2"]);
    }
}
