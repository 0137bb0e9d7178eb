//! # Record Store Trait

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::errors::{StoreError, StoreResult};

/// Keyed storage of JSON records grouped into named collections.
///
/// Every call is a single atomic step against durable storage. Nothing is
/// cached between calls.
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Persist a new record; fails with `AlreadyExists` if the key is taken
    fn create(&self, collection: &str, id: &str, value: &Value) -> StoreResult<()>;

    /// Read and decode a record
    fn read(&self, collection: &str, id: &str) -> StoreResult<Value>;

    /// Replace the full content of an existing record
    fn update(&self, collection: &str, id: &str, value: &Value) -> StoreResult<()>;

    /// Remove an existing record
    fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// List record ids in a collection, sorted
    fn list(&self, collection: &str) -> StoreResult<Vec<String>>;

    /// Create a record from any serializable type
    fn create_as<T: Serialize>(&self, collection: &str, id: &str, record: &T) -> StoreResult<()>
    where
        Self: Sized,
    {
        self.create(collection, id, &encode(record)?)
    }

    /// Read a record into a concrete type
    ///
    /// A record that is valid JSON but does not match `T` is reported as
    /// `Corrupt`.
    fn read_as<T: DeserializeOwned>(&self, collection: &str, id: &str) -> StoreResult<T>
    where
        Self: Sized,
    {
        let value = self.read(collection, id)?;
        serde_json::from_value(value).map_err(|e| StoreError::corrupt(collection, id, e.to_string()))
    }

    /// Update a record from any serializable type
    fn update_as<T: Serialize>(&self, collection: &str, id: &str, record: &T) -> StoreResult<()>
    where
        Self: Sized,
    {
        self.update(collection, id, &encode(record)?)
    }
}

fn encode<T: Serialize>(record: &T) -> StoreResult<Value> {
    serde_json::to_value(record).map_err(|e| StoreError::Encoding(e.to_string()))
}
