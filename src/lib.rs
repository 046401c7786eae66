//! # salvo-redis-session
//!
//! Redis-backed session storage for the Salvo web framework.
//!
//! Session payloads live in Redis under namespaced keys of the form
//! `"{app_name}:Sessions:{16 hex chars}"`; the browser only carries a signed
//! cookie holding that key.
//!
//! ## Features
//!
//! - **Four-operation store contract**: create, read, update and delete session data
//!   through [`SessionDataStore`], with optional expiry converted to a TTL in seconds
//! - **Pluggable backends**: Redis, or an in-memory client for development and tests
//! - **Typed payloads**: any serde type through [`JsonCodec`], or a custom [`SessionCodec`]
//! - **Signed cookies**: HMAC-SHA256 with secret rotation
//! - **Salvo middleware**: load, commit, regenerate and destroy sessions per request
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salvo::prelude::*;
//! use salvo_redis_session::{
//!     create_redis_session_storage, CookieOptions, RedisConfig, RedisSessionArgs,
//!     SessionDepotExt, SessionHandler, StoreOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let args = RedisSessionArgs::new("app1", StoreOptions::from_config(RedisConfig::default()))
//!         .with_cookie(CookieOptions::new("your-secret-key").with_max_age(86400));
//!     let storage = create_redis_session_storage(args).await.unwrap();
//!
//!     let router = Router::new()
//!         .hoop(SessionHandler::new(storage))
//!         .get(index);
//!
//!     let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
//!     Server::new(acceptor).serve(router).await;
//! }
//!
//! #[handler]
//! async fn index(depot: &mut Depot) -> &'static str {
//!     let session = depot.session_mut().unwrap();
//!     let views: i32 = session.get("views").unwrap_or(0);
//!     session.set("views", views + 1);
//!     "Hello, World!"
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod key;
pub mod session;
pub mod signed_cookie;
pub mod storage;
pub mod store;

pub use codec::{JsonCodec, SessionCodec};
pub use config::{CookieOptions, SameSite};
pub use error::SessionError;
pub use handler::SessionHandler;
pub use session::{Session, SessionData};
pub use storage::SessionStorage;
pub use store::{KeyValueClient, KvSessionStore, MemoryClient, SessionDataStore};

#[cfg(feature = "redis-store")]
pub use config::{RedisConfig, RedisSessionArgs, StoreOptions};
#[cfg(feature = "redis-store")]
pub use storage::create_redis_session_storage;
#[cfg(feature = "redis-store")]
pub use store::{RedisClient, RedisSessionStore};

/// Extension trait for Depot to easily access session
pub mod depot_ext;
pub use depot_ext::SessionDepotExt;
