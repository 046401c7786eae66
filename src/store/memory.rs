//! In-memory key-value client
//!
//! This is primarily for development and testing.
//! For production, use RedisClient.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::KeyValueClient;
use crate::error::SessionError;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(exp) => exp > now,
            None => true,
        }
    }
}

/// In-memory key-value client
///
/// Warning: This client is not suitable for production use because:
/// - Sessions are lost on server restart
/// - Sessions are not shared across multiple server instances
/// - Expired entries are only dropped by `cleanup_expired`
#[derive(Clone, Default)]
pub struct MemoryClient {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryClient {
    /// Create an empty client
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop expired entries
    pub fn cleanup_expired(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, entry| entry.is_live(now));
    }

    /// Remaining lifetime of `key`.
    ///
    /// `None` when the key is absent or expired, `Some(None)` when it never expires.
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        let entries = self.entries.read();
        let entry = entries.get(key).filter(|e| e.is_live(now))?;
        Some(entry.expires_at.map(|exp| exp - now))
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.cleanup_expired();
        self.entries.read().len()
    }

    /// Whether no live entries remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live keys, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.cleanup_expired();
        self.entries.read().keys().cloned().collect()
    }
}

#[async_trait]
impl KeyValueClient for MemoryClient {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: Option<u64>) -> Result<(), SessionError> {
        let expires_at = ttl_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
        let entry = Entry {
            value: value.to_string(),
            expires_at,
        };
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), SessionError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
