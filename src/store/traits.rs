//! Session storage contract and the key-value client it is built on

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SessionError;

/// The four-operation contract the session machinery persists through.
///
/// Ids are the full store keys minted by `create_data`. Reading an absent id
/// yields `Ok(None)`, and deleting one is not an error.
#[async_trait]
pub trait SessionDataStore<T>: Send + Sync + 'static
where
    T: Send + Sync + 'static,
{
    /// Store a new payload under a freshly minted id and return that id
    async fn create_data(
        &self,
        data: &T,
        expires: Option<DateTime<Utc>>,
    ) -> Result<String, SessionError>;

    /// Load the payload stored under `id`
    async fn read_data(&self, id: &str) -> Result<Option<T>, SessionError>;

    /// Overwrite the payload stored under `id`
    async fn update_data(
        &self,
        id: &str,
        data: &T,
        expires: Option<DateTime<Utc>>,
    ) -> Result<(), SessionError>;

    /// Remove `id` from the store
    async fn delete_data(&self, id: &str) -> Result<(), SessionError>;
}

/// Minimal string key-value client
#[async_trait]
pub trait KeyValueClient: Send + Sync + 'static {
    /// Fetch the value at `key`
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Write `value` at `key`.
    ///
    /// `Some(ttl)` expires the key after `ttl` seconds, with 0 meaning already
    /// expired. `None` writes without expiry, replacing any previous TTL.
    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), SessionError>;

    /// Delete `key`; absent keys are ignored
    async fn del(&self, key: &str) -> Result<(), SessionError>;
}
