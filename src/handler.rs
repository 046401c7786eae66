//! Session middleware handler for Salvo

use salvo_core::http::cookie::Cookie;
use salvo_core::prelude::*;
use std::sync::Arc;

use crate::session::{Session, SessionData};
use crate::storage::SessionStorage;
use crate::store::SessionDataStore;

pub(crate) const SESSION_KEY: &str = "salvo.redis.session";

/// Session middleware for Salvo
///
/// Loads the session named by the request cookie into the `Depot`, runs the
/// rest of the chain, then persists whatever the handlers changed and attaches
/// the updated cookie. Unmodified sessions are not written back.
pub struct SessionHandler<S> {
    storage: Arc<SessionStorage<S>>,
}

impl<S> SessionHandler<S>
where
    S: SessionDataStore<SessionData>,
{
    /// Create a new session handler
    pub fn new(storage: SessionStorage<S>) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    /// The session storage this handler persists through
    pub fn storage(&self) -> &SessionStorage<S> {
        &self.storage
    }

    fn cookie_value(&self, req: &Request) -> Option<String> {
        req.cookie(&self.storage.cookie().name)
            .map(|c| c.value().to_string())
    }

    async fn load(&self, cookie_value: Option<String>) -> Session {
        match self.storage.get_session(cookie_value.as_deref()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to load session: {}", e);
                Session::new(None, SessionData::new())
            }
        }
    }

    async fn persist(&self, session: &Session) -> Option<Cookie<'static>> {
        if session.should_destroy() {
            return match self.storage.destroy_session(session).await {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::error!("Failed to destroy session: {}", e);
                    None
                }
            };
        }

        if session.should_regenerate() {
            return match self.storage.regenerate_session(session).await {
                Ok(cookie) => Some(cookie),
                Err(e) => {
                    tracing::error!("Failed to regenerate session: {}", e);
                    None
                }
            };
        }

        if !session.is_modified() {
            return None;
        }

        match self.storage.commit_session(session).await {
            Ok(cookie) => Some(cookie),
            Err(e) => {
                tracing::error!("Failed to save session: {}", e);
                None
            }
        }
    }
}

impl<S> Clone for SessionHandler<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

#[async_trait]
impl<S> Handler for SessionHandler<S>
where
    S: SessionDataStore<SessionData>,
{
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        let session = self.load(self.cookie_value(req)).await;
        depot.insert(SESSION_KEY, session.clone());

        ctrl.call_next(req, depot, res).await;

        if let Some(cookie) = self.persist(&session).await {
            res.add_cookie(cookie);
        }
    }
}
