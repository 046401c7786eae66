//! Session adapter over a key-value client
//!
//! Storage layout:
//! - Key: `app_name + ":Sessions:" + 16 hex chars`, also used as the session id
//! - Value: payload encoded by the codec (JSON by default)
//! - TTL: whole seconds until the session expiry, when one is given

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::marker::PhantomData;

use super::{KeyValueClient, SessionDataStore};
use crate::codec::{JsonCodec, SessionCodec};
use crate::error::SessionError;
use crate::key::{expires_to_seconds, format_key, generate_id};
use crate::session::SessionData;

/// Session store that maps the session contract onto a key-value client
///
/// # Example
///
/// ```rust,ignore
/// use salvo_redis_session::{KvSessionStore, MemoryClient, SessionData, SessionDataStore};
///
/// let store: KvSessionStore<MemoryClient> = KvSessionStore::new(MemoryClient::new(), "app1");
///
/// let mut data = SessionData::new();
/// data.set("userId", 42);
/// let key = store.create_data(&data, None).await?;
/// assert!(key.starts_with("app1:Sessions:"));
/// ```
pub struct KvSessionStore<K, T = SessionData, C = JsonCodec> {
    client: K,
    app_name: String,
    codec: C,
    _payload: PhantomData<fn() -> T>,
}

impl<K, T> KvSessionStore<K, T, JsonCodec>
where
    K: KeyValueClient,
{
    /// Create a store that JSON-encodes payloads under the `app_name` namespace
    pub fn new<S: Into<String>>(client: K, app_name: S) -> Self {
        Self::with_codec(client, app_name, JsonCodec)
    }
}

impl<K, T, C> KvSessionStore<K, T, C>
where
    K: KeyValueClient,
{
    /// Create a store with an explicit payload codec
    pub fn with_codec<S: Into<String>>(client: K, app_name: S, codec: C) -> Self {
        let app_name = app_name.into();
        tracing::debug!(app_name = %app_name, "session store ready");
        Self {
            client,
            app_name,
            codec,
            _payload: PhantomData,
        }
    }

    /// The key namespace
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// The underlying key-value client
    pub fn client(&self) -> &K {
        &self.client
    }

    /// Consume the store and hand back its client
    pub fn into_client(self) -> K {
        self.client
    }

    /// Mint a new namespaced key
    fn new_key(&self) -> String {
        format_key(&self.app_name, &generate_id())
    }

    async fn write(
        &self,
        key: &str,
        data: &T,
        expires: Option<DateTime<Utc>>,
    ) -> Result<(), SessionError>
    where
        C: SessionCodec<T>,
    {
        let value = self.codec.encode(data)?;
        let ttl = expires.map(|exp| expires_to_seconds(exp, Utc::now()));
        tracing::trace!(key, ttl = ?ttl, "writing session");
        self.client.set(key, &value, ttl).await
    }
}

impl<K: Clone, T, C: Clone> Clone for KvSessionStore<K, T, C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            app_name: self.app_name.clone(),
            codec: self.codec.clone(),
            _payload: PhantomData,
        }
    }
}

impl<K, T, C> std::fmt::Debug for KvSessionStore<K, T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvSessionStore")
            .field("app_name", &self.app_name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<K, T, C> SessionDataStore<T> for KvSessionStore<K, T, C>
where
    K: KeyValueClient,
    T: Send + Sync + 'static,
    C: SessionCodec<T>,
{
    async fn create_data(
        &self,
        data: &T,
        expires: Option<DateTime<Utc>>,
    ) -> Result<String, SessionError> {
        let key = self.new_key();
        self.write(&key, data, expires).await?;
        Ok(key)
    }

    async fn read_data(&self, id: &str) -> Result<Option<T>, SessionError> {
        tracing::trace!(key = id, "reading session");
        match self.client.get(id).await? {
            Some(text) => Ok(Some(self.codec.decode(&text)?)),
            None => Ok(None),
        }
    }

    async fn update_data(
        &self,
        id: &str,
        data: &T,
        expires: Option<DateTime<Utc>>,
    ) -> Result<(), SessionError> {
        self.write(id, data, expires).await
    }

    async fn delete_data(&self, id: &str) -> Result<(), SessionError> {
        tracing::trace!(key = id, "deleting session");
        self.client.del(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryClient;
    use chrono::Duration;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    fn store() -> KvSessionStore<MemoryClient> {
        KvSessionStore::new(MemoryClient::new(), "app1")
    }

    fn user(id: i64) -> SessionData {
        let mut data = SessionData::new();
        data.set("userId", id);
        data
    }

    fn is_session_key(key: &str, app_name: &str) -> bool {
        let prefix = format!("{}:Sessions:", app_name);
        match key.strip_prefix(&prefix) {
            Some(id) => {
                id.len() == 16 && id.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
            }
            None => false,
        }
    }

    #[tokio::test]
    async fn test_create_read_delete_lifecycle() {
        let store = store();

        let key = store.create_data(&user(42), None).await.unwrap();
        assert!(is_session_key(&key, "app1"), "unexpected key {}", key);

        let read = store.read_data(&key).await.unwrap();
        assert_eq!(read, Some(user(42)));
        assert_eq!(
            serde_json::to_value(read.unwrap()).unwrap(),
            json!({"userId": 42})
        );

        store.delete_data(&key).await.unwrap();
        assert_eq!(store.read_data(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stored_value_is_json_without_ttl() {
        let store = store();
        let key = store.create_data(&user(7), None).await.unwrap();

        let raw = store.client().get(&key).await.unwrap();
        assert_eq!(raw.as_deref(), Some(r#"{"userId":7}"#));
        assert_eq!(store.client().ttl(&key), Some(None));
    }

    #[tokio::test]
    async fn test_future_expiry_sets_ttl() {
        let store = store();
        let expires = Utc::now() + Duration::seconds(120);
        let key = store.create_data(&user(1), Some(expires)).await.unwrap();

        let remaining = store.client().ttl(&key).unwrap().unwrap();
        assert!(remaining.as_secs() <= 120);
        assert!(remaining.as_secs() >= 118);
        assert_eq!(store.read_data(&key).await.unwrap(), Some(user(1)));
    }

    #[tokio::test]
    async fn test_past_expiry_writes_expired_record() {
        let store = store();
        let expires = Utc::now() - Duration::seconds(5);
        let key = store.create_data(&user(1), Some(expires)).await.unwrap();

        assert!(is_session_key(&key, "app1"));
        assert_eq!(store.read_data(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_replaces_payload() {
        let store = store();
        let key = store.create_data(&user(1), None).await.unwrap();

        store.update_data(&key, &user(2), None).await.unwrap();
        assert_eq!(store.read_data(&key).await.unwrap(), Some(user(2)));
        assert_eq!(store.client().len(), 1);
    }

    #[tokio::test]
    async fn test_update_without_expiry_clears_ttl() {
        let store = store();
        let key = store
            .create_data(&user(1), Some(Utc::now() + Duration::seconds(60)))
            .await
            .unwrap();

        store.update_data(&key, &user(1), None).await.unwrap();
        assert_eq!(store.client().ttl(&key), Some(None));
    }

    #[tokio::test]
    async fn test_read_unknown_and_double_delete() {
        let store = store();
        assert_eq!(store.read_data("app1:Sessions:0000000000000000").await.unwrap(), None);
        assert_eq!(store.read_data("not even a key").await.unwrap(), None);

        let key = store.create_data(&user(3), None).await.unwrap();
        store.delete_data(&key).await.unwrap();
        store.delete_data(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_stored_text_is_an_error() {
        let store = store();
        store
            .client()
            .set("app1:Sessions:badbadbadbadbad0", "{oops", None)
            .await
            .unwrap();

        let result = store.read_data("app1:Sessions:badbadbadbadbad0").await;
        assert!(matches!(result, Err(SessionError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_namespaces_share_client() {
        let client = MemoryClient::new();
        let a: KvSessionStore<MemoryClient> = KvSessionStore::new(client.clone(), "shop");
        let b: KvSessionStore<MemoryClient> = KvSessionStore::new(client.clone(), "admin");

        let ka = a.create_data(&user(1), None).await.unwrap();
        let kb = b.create_data(&user(2), None).await.unwrap();

        assert!(is_session_key(&ka, "shop"));
        assert!(is_session_key(&kb, "admin"));
        assert_eq!(client.len(), 2);
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        roles: Vec<String>,
    }

    #[tokio::test]
    async fn test_typed_payload() {
        let store: KvSessionStore<MemoryClient, Profile> =
            KvSessionStore::new(MemoryClient::new(), "typed");
        let profile = Profile {
            name: "ada".into(),
            roles: vec!["admin".into()],
        };

        let key = store.create_data(&profile, None).await.unwrap();
        assert_eq!(store.read_data(&key).await.unwrap(), Some(profile));
    }

    /// Stores payloads as reversed strings
    struct ReversedCodec;

    impl SessionCodec<String> for ReversedCodec {
        fn encode(&self, value: &String) -> Result<String, SessionError> {
            Ok(value.chars().rev().collect())
        }

        fn decode(&self, text: &str) -> Result<String, SessionError> {
            Ok(text.chars().rev().collect())
        }
    }

    #[tokio::test]
    async fn test_custom_codec() {
        let store: KvSessionStore<MemoryClient, String, ReversedCodec> =
            KvSessionStore::with_codec(MemoryClient::new(), "codec", ReversedCodec);
        let key = store.create_data(&"hello".to_string(), None).await.unwrap();

        let raw = store.client().get(&key).await.unwrap();
        assert_eq!(raw.as_deref(), Some("olleh"));
        assert_eq!(store.read_data(&key).await.unwrap(), Some("hello".to_string()));
    }
}
