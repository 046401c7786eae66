//! Cookie-driven session storage
//!
//! Ties a [`SessionDataStore`] to the session cookie: the cookie carries only
//! the signed session id, the payload lives in the store.

use chrono::Utc;
use salvo_core::http::cookie::{self, Cookie};
use std::sync::Arc;

use crate::config::{CookieOptions, SameSite};
use crate::error::SessionError;
use crate::session::{Session, SessionData};
use crate::signed_cookie::{decode_cookie_value, encode_cookie_value};
use crate::store::SessionDataStore;

#[cfg(feature = "redis-store")]
use crate::config::RedisSessionArgs;
#[cfg(feature = "redis-store")]
use crate::store::{RedisClient, RedisSessionStore};

/// Session storage bound to a store and a cookie definition
pub struct SessionStorage<S> {
    store: Arc<S>,
    cookie: CookieOptions,
}

impl<S> SessionStorage<S>
where
    S: SessionDataStore<SessionData>,
{
    /// Create a session storage
    pub fn new(store: S, cookie: CookieOptions) -> Self {
        if !cookie.is_signed() {
            tracing::warn!(
                cookie = %cookie.name,
                "session cookie is not signed; configure secrets to prevent tampering"
            );
        }
        Self {
            store: Arc::new(store),
            cookie,
        }
    }

    /// The cookie definition
    pub fn cookie(&self) -> &CookieOptions {
        &self.cookie
    }

    /// The backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the session referenced by a raw cookie value.
    ///
    /// A missing, unverifiable or unknown id yields a new, empty session.
    pub async fn get_session(&self, cookie_value: Option<&str>) -> Result<Session, SessionError> {
        let id = cookie_value.and_then(|raw| {
            // Cookie values may arrive percent-encoded
            let decoded = urlencoding::decode(raw)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| raw.to_string());
            decode_cookie_value(&decoded, &self.cookie.secrets)
        });

        let Some(id) = id else {
            return Ok(Session::new(None, SessionData::new()));
        };

        match self.store.read_data(&id).await? {
            Some(data) => Ok(Session::new(Some(id), data)),
            None => Ok(Session::new(None, SessionData::new())),
        }
    }

    /// Persist the session and return the cookie that references it
    pub async fn commit_session(&self, session: &Session) -> Result<Cookie<'static>, SessionError> {
        let data = session.data();
        let expires = self.cookie.expires_at(Utc::now());
        let id = match session.id() {
            Some(id) => {
                self.store.update_data(id, &data, expires).await?;
                id.to_string()
            }
            None => self.store.create_data(&data, expires).await?,
        };
        Ok(self.session_cookie(&id))
    }

    /// Move the session to a freshly minted key, dropping the old one
    pub async fn regenerate_session(
        &self,
        session: &Session,
    ) -> Result<Cookie<'static>, SessionError> {
        if let Some(old) = session.id() {
            self.store.delete_data(old).await?;
        }
        let expires = self.cookie.expires_at(Utc::now());
        let id = self.store.create_data(&session.data(), expires).await?;
        Ok(self.session_cookie(&id))
    }

    /// Delete the session and return a cookie that clears it in the browser
    pub async fn destroy_session(
        &self,
        session: &Session,
    ) -> Result<Cookie<'static>, SessionError> {
        if let Some(id) = session.id() {
            self.store.delete_data(id).await?;
        }
        let mut expired = self.base_cookie(String::new());
        expired.set_max_age(cookie::time::Duration::ZERO);
        expired.set_expires(cookie::time::OffsetDateTime::UNIX_EPOCH);
        Ok(expired)
    }

    fn session_cookie(&self, id: &str) -> Cookie<'static> {
        let mut built = self.base_cookie(encode_cookie_value(id, &self.cookie.secrets));
        if let Some(max_age) = self.cookie.max_age {
            built.set_max_age(cookie::time::Duration::seconds(max_age as i64));
        } else if let Some(expires) = self.cookie.expires {
            if let Ok(at) = cookie::time::OffsetDateTime::from_unix_timestamp(expires.timestamp()) {
                built.set_expires(at);
            }
        }
        built
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let options = &self.cookie;
        let mut builder = Cookie::build((options.name.clone(), value))
            .path(options.path.clone())
            .http_only(options.http_only)
            .secure(options.secure)
            .same_site(match options.same_site {
                SameSite::Strict => cookie::SameSite::Strict,
                SameSite::Lax => cookie::SameSite::Lax,
                SameSite::None => cookie::SameSite::None,
            });

        if let Some(domain) = &options.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }
}

impl<S> Clone for SessionStorage<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cookie: self.cookie.clone(),
        }
    }
}

/// Build a Redis-backed session storage.
///
/// Fails with [`SessionError::Config`] before any I/O when `args.options`
/// holds neither a client nor a config.
#[cfg(feature = "redis-store")]
pub async fn create_redis_session_storage(
    args: RedisSessionArgs,
) -> Result<SessionStorage<RedisSessionStore>, SessionError> {
    let RedisSessionArgs {
        app_name,
        cookie,
        options,
    } = args;
    let client = RedisClient::from_options(options).await?;
    Ok(SessionStorage::new(
        RedisSessionStore::new(client, app_name),
        cookie,
    ))
}
