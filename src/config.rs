//! Session configuration

use chrono::{DateTime, Utc};
use std::time::Duration;

#[cfg(feature = "redis-store")]
pub use self::redis_options::{RedisConfig, RedisSessionArgs, StoreOptions};

/// Attributes of the session cookie
#[derive(Clone, Debug)]
pub struct CookieOptions {
    /// Name of the session cookie (default: "__session")
    pub name: String,

    /// Secrets for signing the cookie value.
    /// The first secret signs new cookies; all of them are tried when verifying.
    /// An empty list leaves the cookie unsigned.
    pub secrets: Vec<String>,

    /// Cookie path (default: "/")
    pub path: String,

    /// Cookie domain (default: None - current domain only)
    pub domain: Option<String>,

    /// HttpOnly flag for cookie (default: true)
    pub http_only: bool,

    /// Secure flag for cookie (default: false)
    pub secure: bool,

    /// SameSite attribute for cookie
    pub same_site: SameSite,

    /// Max age in seconds. Takes precedence over `expires`.
    pub max_age: Option<u64>,

    /// Absolute expiry, used when `max_age` is not set
    pub expires: Option<DateTime<Utc>>,
}

/// SameSite cookie attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
    /// Strict - cookie only sent for same-site requests
    Strict,
    /// Lax - cookie sent for same-site requests and top-level navigations
    Lax,
    /// None - cookie sent for all requests (requires Secure)
    None,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: "__session".to_string(),
            secrets: Vec::new(),
            path: "/".to_string(),
            domain: None,
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
            max_age: None,
            expires: None,
        }
    }
}

impl CookieOptions {
    /// Create cookie options signed with the given secret
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            secrets: vec![secret.into()],
            ..Default::default()
        }
    }

    /// Create cookie options with multiple secrets for rotation
    pub fn with_secrets<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            secrets: secrets.into_iter().map(|s| s.into()).collect(),
            ..Default::default()
        }
    }

    /// Set the cookie name (default: "__session")
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Set the cookie path (default: "/")
    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain
    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the HttpOnly flag (default: true)
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set the Secure flag (default: false)
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the SameSite attribute (default: Lax)
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Set max age in seconds
    pub fn with_max_age(mut self, max_age: impl Into<Option<u64>>) -> Self {
        self.max_age = max_age.into();
        self
    }

    /// Set max age from Duration
    pub fn with_max_age_duration(mut self, duration: impl Into<Option<Duration>>) -> Self {
        self.max_age = duration.into().map(|d| d.as_secs());
        self
    }

    /// Set an absolute expiry
    pub fn with_expires(mut self, expires: impl Into<Option<DateTime<Utc>>>) -> Self {
        self.expires = expires.into();
        self
    }

    /// Whether cookie values are signed
    pub fn is_signed(&self) -> bool {
        !self.secrets.is_empty()
    }

    /// Point in time at which a session committed at `now` expires
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.max_age {
            Some(secs) => Some(now + chrono::Duration::seconds(secs as i64)),
            None => self.expires,
        }
    }
}

#[cfg(feature = "redis-store")]
pub(crate) mod redis_options {
    use redis::aio::{ConnectionManager, ConnectionManagerConfig};
    use redis::{ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::time::Duration;

    use super::CookieOptions;
    use crate::error::SessionError;

    /// Connection parameters for building a new Redis client
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct RedisConfig {
        /// Server host (default: "127.0.0.1")
        pub host: String,
        /// Server port (default: 6379)
        pub port: u16,
        /// Logical database index (default: 0)
        pub db: i64,
        /// ACL username
        pub username: Option<String>,
        /// Password
        pub password: Option<String>,
        /// Timeout for establishing a connection, in milliseconds
        pub connection_timeout_ms: Option<u64>,
        /// Timeout for a single command response, in milliseconds
        pub response_timeout_ms: Option<u64>,
    }

    impl Default for RedisConfig {
        fn default() -> Self {
            Self {
                host: "127.0.0.1".to_string(),
                port: 6379,
                db: 0,
                username: None,
                password: None,
                connection_timeout_ms: None,
                response_timeout_ms: None,
            }
        }
    }

    impl RedisConfig {
        /// Config for the given host and port
        pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
            Self {
                host: host.into(),
                port,
                ..Default::default()
            }
        }

        /// Select a logical database
        pub fn with_db(mut self, db: i64) -> Self {
            self.db = db;
            self
        }

        /// Authenticate with a password (and optional ACL username)
        pub fn with_credentials<S: Into<String>>(
            mut self,
            username: Option<S>,
            password: S,
        ) -> Self {
            self.username = username.map(Into::into);
            self.password = Some(password.into());
            self
        }

        /// Set the connection timeout
        pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
            self.connection_timeout_ms = Some(timeout.as_millis() as u64);
            self
        }

        /// Set the per-command response timeout
        pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
            self.response_timeout_ms = Some(timeout.as_millis() as u64);
            self
        }

        /// Connection info understood by the redis crate
        pub fn connection_info(&self) -> ConnectionInfo {
            ConnectionInfo {
                addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
                redis: RedisConnectionInfo {
                    db: self.db,
                    username: self.username.clone(),
                    password: self.password.clone(),
                    ..Default::default()
                },
            }
        }

        /// Connection manager settings carrying the configured timeouts
        pub fn manager_config(&self) -> ConnectionManagerConfig {
            let mut config = ConnectionManagerConfig::new();
            if let Some(ms) = self.connection_timeout_ms {
                config = config.set_connection_timeout(Duration::from_millis(ms));
            }
            if let Some(ms) = self.response_timeout_ms {
                config = config.set_response_timeout(Duration::from_millis(ms));
            }
            config
        }
    }

    /// Where the Redis client comes from
    pub(crate) enum ClientSource {
        /// Caller-owned connection manager
        Shared(ConnectionManager),
        /// Build and own a new connection
        Config(RedisConfig),
    }

    /// Store connection options: exactly one of a config or a ready client is needed
    #[derive(Clone, Default)]
    pub struct StoreOptions {
        /// Parameters for constructing a new client
        pub redis_config: Option<RedisConfig>,
        /// Pre-built client to reuse; wins over `redis_config`
        pub redis_client: Option<ConnectionManager>,
    }

    impl StoreOptions {
        /// Options that build a new client from `config`
        pub fn from_config(config: RedisConfig) -> Self {
            Self {
                redis_config: Some(config),
                redis_client: None,
            }
        }

        /// Options that reuse an existing connection manager
        pub fn from_client(client: ConnectionManager) -> Self {
            Self {
                redis_config: None,
                redis_client: Some(client),
            }
        }

        pub(crate) fn into_source(self) -> Result<ClientSource, SessionError> {
            match (self.redis_client, self.redis_config) {
                (Some(client), _) => Ok(ClientSource::Shared(client)),
                (None, Some(config)) => Ok(ClientSource::Config(config)),
                (None, None) => Err(SessionError::Config(
                    "Need to provide either options.redis_config or options.redis_client"
                        .to_string(),
                )),
            }
        }
    }

    impl fmt::Debug for StoreOptions {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("StoreOptions")
                .field("redis_config", &self.redis_config)
                .field("redis_client", &self.redis_client.as_ref().map(|_| "<ConnectionManager>"))
                .finish()
        }
    }

    /// Everything needed to build a Redis-backed session storage
    #[derive(Debug, Clone)]
    pub struct RedisSessionArgs {
        /// Key namespace prefix
        pub app_name: String,
        /// Session cookie attributes
        pub cookie: CookieOptions,
        /// Store connection options
        pub options: StoreOptions,
    }

    impl RedisSessionArgs {
        /// Arguments with default cookie options
        pub fn new<S: Into<String>>(app_name: S, options: StoreOptions) -> Self {
            Self {
                app_name: app_name.into(),
                cookie: CookieOptions::default(),
                options,
            }
        }

        /// Set the cookie options
        pub fn with_cookie(mut self, cookie: CookieOptions) -> Self {
            self.cookie = cookie;
            self
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_defaults() {
        let options = CookieOptions::default();
        assert_eq!(options.name, "__session");
        assert_eq!(options.path, "/");
        assert!(options.http_only);
        assert!(!options.is_signed());
        assert_eq!(options.same_site, SameSite::Lax);
    }

    #[test]
    fn test_expires_at_prefers_max_age() {
        let now = Utc::now();
        let fixed = now + chrono::Duration::days(7);

        let options = CookieOptions::new("s").with_expires(fixed);
        assert_eq!(options.expires_at(now), Some(fixed));

        let options = options.with_max_age(60);
        assert_eq!(options.expires_at(now), Some(now + chrono::Duration::seconds(60)));

        assert_eq!(CookieOptions::default().expires_at(now), None);
    }
}
