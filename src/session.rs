//! Session payload and the per-request session handle

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session payload: string keys mapped to JSON values
///
/// Serialized as a bare JSON object, so a payload stored as
/// `{"userId":42}` reads back as exactly that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData(Map<String, Value>);

impl SessionData {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value from session data
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get the raw JSON value for a key
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a value in session data
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.0.insert(key.to_string(), v);
        }
    }

    /// Remove a value from session data
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Clear all session data
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Check if session data is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over stored entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for SessionData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<SessionData> for Value {
    fn from(data: SessionData) -> Self {
        Value::Object(data.0)
    }
}

fn flash_key(name: &str) -> String {
    format!("__flash_{}__", name)
}

/// Session handle that tracks modifications
///
/// Clones share data and flags, so a handler can mutate the session the
/// middleware later persists.
pub struct Session {
    /// Store key, `None` until the session is first committed
    id: Option<String>,

    data: Arc<RwLock<SessionData>>,

    modified: Arc<AtomicBool>,

    destroy: Arc<AtomicBool>,

    regenerate: Arc<AtomicBool>,
}

impl Session {
    /// Create a session handle
    pub fn new(id: Option<String>, data: SessionData) -> Self {
        Self {
            id,
            data: Arc::new(RwLock::new(data)),
            modified: Arc::new(AtomicBool::new(false)),
            destroy: Arc::new(AtomicBool::new(false)),
            regenerate: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the session ID (its store key)
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Check if this session has never been stored
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Check if the session has been modified
    pub fn is_modified(&self) -> bool {
        self.modified.load(Ordering::SeqCst)
    }

    /// Check if the session should be destroyed
    pub fn should_destroy(&self) -> bool {
        self.destroy.load(Ordering::SeqCst)
    }

    /// Check if the session should be stored under a fresh key
    pub fn should_regenerate(&self) -> bool {
        self.regenerate.load(Ordering::SeqCst)
    }

    /// Get a value from the session.
    ///
    /// Falls back to a flashed value of the same name, which is removed on read.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        {
            let data = self.data.read();
            if data.contains(key) {
                return data.get(key);
            }
        }
        let flashed = self.data.write().remove(&flash_key(key))?;
        self.modified.store(true, Ordering::SeqCst);
        serde_json::from_value(flashed).ok()
    }

    /// Set a value in the session
    pub fn set<T: Serialize>(&self, key: &str, value: T) {
        self.data.write().set(key, value);
        self.modified.store(true, Ordering::SeqCst);
    }

    /// Set a value that is available for exactly one subsequent `get`
    pub fn flash<T: Serialize>(&self, key: &str, value: T) {
        self.data.write().set(&flash_key(key), value);
        self.modified.store(true, Ordering::SeqCst);
    }

    /// Check if a key (or a flashed value for it) exists
    pub fn has(&self, key: &str) -> bool {
        let data = self.data.read();
        data.contains(key) || data.contains(&flash_key(key))
    }

    /// Remove a value from the session
    pub fn unset(&self, key: &str) -> Option<Value> {
        let result = self.data.write().remove(key);
        if result.is_some() {
            self.modified.store(true, Ordering::SeqCst);
        }
        result
    }

    /// Clear all session data
    pub fn clear(&self) {
        self.data.write().clear();
        self.modified.store(true, Ordering::SeqCst);
    }

    /// Mark the session for destruction
    pub fn destroy(&self) {
        self.destroy.store(true, Ordering::SeqCst);
    }

    /// Mark the session to be moved to a new key on commit
    pub fn regenerate(&self) {
        self.regenerate.store(true, Ordering::SeqCst);
        self.modified.store(true, Ordering::SeqCst);
    }

    /// Get a copy of the session data
    pub fn data(&self) -> SessionData {
        self.data.read().clone()
    }

    /// Check if the session holds no data
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            data: Arc::clone(&self.data),
            modified: Arc::clone(&self.modified),
            destroy: Arc::clone(&self.destroy),
            regenerate: Arc::clone(&self.regenerate),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("data", &*self.data.read())
            .field("modified", &self.modified.load(Ordering::SeqCst))
            .finish()
    }
}
