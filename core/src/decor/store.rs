//! DecorStore — the per-marker cooldown map and its persisted slot.
//!
//! The store exclusively owns the `id → expiry` mapping; callers change it
//! only through `decorate`, `cleanup_expired`, and `reset`. Every query
//! takes the caller's `now_ms`, so the store itself never reads the clock
//! and stays fully deterministic under test.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::decor::codec;


#[derive(Debug)]
pub struct DecorStore {
    slot_path: PathBuf,
    cooldown_ms: u64,
    entries: HashMap<String, u64>,
}


impl DecorStore {
    /// Load the store from its slot file.
    ///
    /// A missing, unreadable, or malformed slot yields an empty map; lapsed
    /// entries survive loading and are evicted by the first cleanup pass.
    pub fn load(slot_path: PathBuf, cooldown_ms: u64) -> DecorStore {
        let entries = match std::fs::read_to_string(&slot_path) {
            Ok(raw) => codec::decode(raw.trim()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!("cooldown slot unreadable, starting empty: {}", e);
                HashMap::new()
            }
        };
        DecorStore {
            slot_path,
            cooldown_ms,
            entries,
        }
    }

    /// True iff an entry exists for `id` and its expiry is strictly in the
    /// future.
    pub fn is_decorated(&self, id: &str, now_ms: u64) -> bool {
        match self.entries.get(id) {
            Some(&exp_ms) => exp_ms > now_ms,
            None => false,
        }
    }

    /// Remaining cooldown in ms. Absent entries are treated as expiry 0, so
    /// the result is at or below zero for them.
    pub fn time_left_ms(&self, id: &str, now_ms: u64) -> i64 {
        let exp_ms = self.entries.get(id).copied().unwrap_or(0);
        exp_ms as i64 - now_ms as i64
    }

    /// Start (or restart) the cooldown for `id` and persist.
    ///
    /// An existing entry is unconditionally overwritten, never extended.
    /// Returns the new expiry timestamp. Never fails; a persistence error
    /// is logged and the in-memory state stays authoritative.
    pub fn decorate(&mut self, id: &str, now_ms: u64) -> u64 {
        let exp_ms = now_ms + self.cooldown_ms;
        self.entries.insert(id.to_string(), exp_ms);
        self.save(now_ms);
        exp_ms
    }

    /// Evict every entry whose expiry is at or before `now_ms`.
    ///
    /// Persists once if anything changed. Returns the evicted ids; callers
    /// read "did anything change" off the emptiness of the result. A
    /// `decorate` ordered after the scan installed a future expiry and is
    /// never evicted here.
    pub fn cleanup_expired(&mut self, now_ms: u64) -> Vec<String> {
        let mut evicted: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, &exp_ms)| exp_ms <= now_ms)
            .map(|(id, _)| id.clone())
            .collect();
        evicted.sort();
        for id in &evicted {
            self.entries.remove(id);
        }
        if !evicted.is_empty() {
            self.save(now_ms);
        }
        evicted
    }

    /// Evict a single entry if its cooldown has lapsed.
    ///
    /// Persists on change and returns whether an entry was evicted. A live
    /// entry (including one re-decorated since the caller last looked) is
    /// never touched, which makes stale expiry fires harmless.
    pub fn evict_lapsed(&mut self, id: &str, now_ms: u64) -> bool {
        match self.entries.get(id) {
            Some(&exp_ms) if exp_ms <= now_ms => {
                self.entries.remove(id);
                self.save(now_ms);
                true
            }
            _ => false,
        }
    }

    /// Drop all entries and erase the slot file entirely.
    ///
    /// Returns the ids that were cleared.
    pub fn reset(&mut self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.sort();
        self.entries.clear();
        match std::fs::remove_file(&self.slot_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("failed to remove cooldown slot: {}", e),
        }
        ids
    }

    /// Ids of all current entries, lapsed or not.
    pub fn active_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn expiry_ms(&self, id: &str) -> Option<u64> {
        self.entries.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    pub fn slot_path(&self) -> &std::path::Path {
        &self.slot_path
    }

    fn save(&self, now_ms: u64) {
        let encoded = codec::encode(&self.entries, now_ms);
        if let Err(e) = std::fs::write(&self.slot_path, encoded) {
            tracing::warn!("failed to persist cooldown slot: {}", e);
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
