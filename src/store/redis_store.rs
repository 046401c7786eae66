//! Redis key-value client and session store
//!
//! Writes use `SET key value EX ttl` when an expiry is known and a plain `SET`
//! otherwise. A TTL of zero deletes the key, since Redis rejects `EX 0` and the
//! record would be expired on arrival anyway.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{KeyValueClient, KvSessionStore};
use crate::codec::JsonCodec;
use crate::config::{RedisConfig, StoreOptions};
use crate::config::redis_options::ClientSource;
use crate::error::SessionError;
use crate::session::SessionData;

/// Session store backed by Redis
pub type RedisSessionStore<T = SessionData, C = JsonCodec> = KvSessionStore<RedisClient, T, C>;

/// Redis client used by the session store
///
/// A client built from [`RedisConfig`] owns its connection, which is released
/// once every clone is dropped or [`RedisClient::close`] is called. A client
/// wrapping a caller's connection manager only holds another handle to it.
///
/// # Example
///
/// ```rust,ignore
/// use salvo_redis_session::{RedisClient, RedisConfig};
///
/// let client = RedisClient::connect(&RedisConfig::new("127.0.0.1", 6379)).await?;
/// ```
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    owned: bool,
}

impl RedisClient {
    /// Open a new connection from config
    pub async fn connect(config: &RedisConfig) -> Result<Self, SessionError> {
        let client = redis::Client::open(config.connection_info())?;
        let conn = ConnectionManager::new_with_config(client, config.manager_config()).await?;
        tracing::debug!(host = %config.host, port = config.port, db = config.db, "connected to redis");
        Ok(Self { conn, owned: true })
    }

    /// Open a new connection from a `redis://` URL
    pub async fn from_url(url: &str) -> Result<Self, SessionError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn, owned: true })
    }

    /// Wrap a connection manager owned by the caller
    pub fn from_connection_manager(conn: ConnectionManager) -> Self {
        Self { conn, owned: false }
    }

    /// Build a client from store options, preferring a supplied client
    pub async fn from_options(options: StoreOptions) -> Result<Self, SessionError> {
        match options.into_source()? {
            ClientSource::Shared(conn) => Ok(Self::from_connection_manager(conn)),
            ClientSource::Config(config) => Self::connect(&config).await,
        }
    }

    /// Whether this client opened its own connection
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Another handle to the underlying connection manager
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Release this handle to the connection.
    ///
    /// The socket closes once no other clone of an owned client remains.
    /// Shared clients leave the caller's connection untouched.
    pub fn close(self) {
        if self.owned {
            tracing::debug!("releasing redis connection");
        }
    }
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("owned", &self.owned)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueClient for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        match ttl_secs {
            Some(0) => conn.del::<_, ()>(key).await?,
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

impl<T, C> KvSessionStore<RedisClient, T, C> {
    /// Connect according to `options` and create a store under `app_name`
    pub async fn connect<S: Into<String>>(
        options: StoreOptions,
        app_name: S,
        codec: C,
    ) -> Result<Self, SessionError> {
        let client = RedisClient::from_options(options).await?;
        Ok(Self::with_codec(client, app_name, codec))
    }
}
