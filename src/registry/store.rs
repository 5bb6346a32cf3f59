//! In-memory store of captured upstream bodies.

use axum::body::Bytes;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::config::RegistryConfig;
use crate::observability::metrics;

/// A captured upstream response body.
#[derive(Debug, Clone)]
pub struct CapturedBody {
    bytes: Bytes,
}

impl CapturedBody {
    /// Raw bytes as received from upstream.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Body as text. Invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Concurrent registry mapping relay ids to captured bodies.
///
/// Cloning is cheap and every clone shares the same entries. Relay callers
/// only ever write; there is no retrieval path exposed over HTTP.
#[derive(Clone, Default)]
pub struct ResponseRegistry {
    entries: Arc<DashMap<String, CapturedBody>>,
    /// Insertion order, only tracked when a bound is configured.
    order: Option<Arc<Mutex<VecDeque<String>>>>,
    max_entries: Option<usize>,
}

impl ResponseRegistry {
    /// Create an empty, unbounded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry that keeps at most `max_entries` bodies,
    /// evicting the oldest first.
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            order: Some(Arc::new(Mutex::new(VecDeque::new()))),
            max_entries: Some(max_entries),
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        match config.max_entries {
            Some(max) => Self::bounded(max),
            None => Self::new(),
        }
    }

    /// Store a body under `id`. A repeated id overwrites the previous body.
    pub fn put(&self, id: impl Into<String>, body: Bytes) {
        let id = id.into();
        let previous = self.entries.insert(id.clone(), CapturedBody { bytes: body });

        if let (Some(order), Some(max)) = (&self.order, self.max_entries) {
            // A poisoned lock only means another writer panicked mid-push.
            let mut order = order.lock().unwrap_or_else(|e| e.into_inner());
            if previous.is_none() {
                order.push_back(id);
            }
            while order.len() > max {
                if let Some(oldest) = order.pop_front() {
                    self.entries.remove(&oldest);
                    tracing::debug!(relay_id = %oldest, "Evicted registry entry");
                }
            }
        }

        metrics::record_registry_size(self.entries.len());
    }

    /// Number of stored bodies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a body is stored under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Configured bound, if any.
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    #[cfg(test)]
    pub(crate) fn get(&self, id: &str) -> Option<CapturedBody> {
        self.entries.get(id).map(|r| r.value().clone())
    }
}
