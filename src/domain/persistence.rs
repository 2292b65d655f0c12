use crate::domain::errors::AppResult;
use crate::domain::logging::LogComponent;
use crate::log_warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Durable string storage, e.g. browser localStorage
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;
}

/// Storage keys and write cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub ticker_key: String,
    pub range_key: String,
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            ticker_key: "app:ticker".to_string(),
            range_key: "app:visibleRange".to_string(),
            debounce_ms: 120,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingWrite {
    encoded: String,
    due_at: u64,
}

/// Typed JSON read/write over a [`KeyValueStore`] with per-key debouncing.
///
/// A debounced write replaces any pending write for the same key and
/// pushes its deadline out, so at most one write per key is pending and
/// it fires once the key has been quiet for `debounce_ms`.
pub struct PersistenceBridge {
    store: Box<dyn KeyValueStore>,
    debounce_ms: u64,
    pending: HashMap<String, PendingWrite>,
}

impl PersistenceBridge {
    pub fn new(store: Box<dyn KeyValueStore>, debounce_ms: u64) -> Self {
        Self { store, debounce_ms, pending: HashMap::new() }
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    /// Missing, unreadable or corrupt values yield `fallback`
    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                log_warn!(LogComponent::Domain("Persistence"), "read {} failed: {}", key, e);
                return fallback;
            }
        };
        serde_json::from_str(&raw).unwrap_or(fallback)
    }

    /// Immediate fire-and-forget write; supersedes a pending write for `key`
    pub fn write<T: Serialize>(&mut self, key: &str, value: &T) {
        self.pending.remove(key);
        if let Some(encoded) = encode(key, value) {
            self.store_raw(key, &encoded);
        }
    }

    /// Schedule a write for `now_ms + debounce_ms`. Returns the deadline.
    pub fn write_debounced<T: Serialize>(&mut self, key: &str, value: &T, now_ms: u64) -> u64 {
        let due_at = now_ms.saturating_add(self.debounce_ms);
        if let Some(encoded) = encode(key, value) {
            self.pending.insert(key.to_string(), PendingWrite { encoded, due_at });
        }
        due_at
    }

    pub fn has_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    /// Earliest pending deadline
    pub fn next_due(&self) -> Option<u64> {
        self.pending.values().map(|w| w.due_at).min()
    }

    /// Write every pending value whose deadline has passed
    pub fn flush_due(&mut self, now_ms: u64) -> usize {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, w)| w.due_at <= now_ms)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &due {
            if let Some(write) = self.pending.remove(key) {
                self.store_raw(key, &write.encoded);
            }
        }
        due.len()
    }

    /// Write everything pending regardless of deadlines
    pub fn flush(&mut self) -> usize {
        let pending: Vec<(String, PendingWrite)> = self.pending.drain().collect();
        for (key, write) in &pending {
            self.store_raw(key, &write.encoded);
        }
        pending.len()
    }

    fn store_raw(&self, key: &str, encoded: &str) {
        if let Err(e) = self.store.set_item(key, encoded) {
            log_warn!(LogComponent::Domain("Persistence"), "write {} failed: {}", key, e);
        }
    }
}

fn encode<T: Serialize>(key: &str, value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            log_warn!(LogComponent::Domain("Persistence"), "encode {} failed: {}", key, e);
            None
        }
    }
}
