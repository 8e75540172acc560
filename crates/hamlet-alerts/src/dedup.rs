//! Near-duplicate suppression for generated content.
//!
//! Content is normalized (lowercased, reduced to alphanumerics, cut to a
//! fixed prefix) and fingerprinted with SHA-256. The store remembers at
//! most `capacity` fingerprints and evicts the single oldest on overflow.
//!
//! Fingerprint input: the normalized prefix as UTF-8 bytes, nothing else.

use std::{
    collections::{HashSet, VecDeque},
    sync::Mutex,
};

use sha2::{Digest, Sha256};
use tracing::debug;

use hamlet_contracts::config::DedupConfig;

/// Lowercase, keep only alphanumerics, truncate to `prefix_len` characters.
pub fn normalize(content: &str, prefix_len: usize) -> String {
    content
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .take(prefix_len)
        .collect()
}

/// SHA-256 hex fingerprint of the normalized content, or `None` when the
/// content normalizes to nothing.
pub fn fingerprint(content: &str, prefix_len: usize) -> Option<String> {
    let normalized = normalize(content, prefix_len);
    if normalized.is_empty() {
        return None;
    }
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    Some(hex::encode(hasher.finalize()))
}

struct DedupState {
    order: VecDeque<String>,
    seen: HashSet<String>,
}

pub struct DedupStore {
    capacity: usize,
    prefix_len: usize,
    state: Mutex<DedupState>,
}

impl DedupStore {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            capacity: config.capacity.max(1),
            prefix_len: config.prefix_len,
            state: Mutex::new(DedupState {
                order: VecDeque::new(),
                seen: HashSet::new(),
            }),
        }
    }

    pub fn is_duplicate(&self, content: &str) -> bool {
        let Some(hash) = fingerprint(content, self.prefix_len) else {
            return false;
        };
        let state = self.state.lock().expect("dedup lock poisoned");
        state.seen.contains(&hash)
    }

    /// Remember `content`. Returns `true` if it was not already known.
    pub fn remember(&self, content: &str) -> bool {
        let Some(hash) = fingerprint(content, self.prefix_len) else {
            return false;
        };
        let mut state = self.state.lock().expect("dedup lock poisoned");
        Self::insert(&mut state, hash, self.capacity)
    }

    /// Atomically test and record. Returns `true` when `content` is a near
    /// duplicate of something already remembered.
    pub fn check_and_remember(&self, content: &str) -> bool {
        let Some(hash) = fingerprint(content, self.prefix_len) else {
            return false;
        };
        let mut state = self.state.lock().expect("dedup lock poisoned");
        if state.seen.contains(&hash) {
            debug!(fingerprint = %&hash[..12], "duplicate content suppressed");
            return true;
        }
        Self::insert(&mut state, hash, self.capacity);
        false
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("dedup lock poisoned").order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(state: &mut DedupState, hash: String, capacity: usize) -> bool {
        if !state.seen.insert(hash.clone()) {
            return false;
        }
        state.order.push_back(hash);
        if state.order.len() > capacity {
            if let Some(oldest) = state.order.pop_front() {
                state.seen.remove(&oldest);
            }
        }
        true
    }
}
