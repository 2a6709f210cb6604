//! Persistence adapter: named state slices in a key-value store.
//!
//! In the browser the durable store is `localStorage`, which only the main
//! thread can touch. `MemoryStore` is seeded from the slices the bridge read
//! at startup and queues every write so the bridge can mirror it back.

use std::collections::HashMap;

/// Slice holding the ordered team roster.
pub const TEAMS_KEY: &str = "teams";
/// Slice holding the selected team record, or `null`.
pub const SELECTED_TEAM_KEY: &str = "selectedTeam";
/// Slice holding the game records with completion state.
pub const GAMES_KEY: &str = "games";
/// Slice holding the completed-games counter.
pub const COMPLETED_GAMES_KEY: &str = "completedGames";

pub const ALL_KEYS: [&str; 4] = [TEAMS_KEY, SELECTED_TEAM_KEY, GAMES_KEY, COMPLETED_GAMES_KEY];

/// Durable key-value store for serialized slices.
///
/// `load` returns `None` for a missing key; callers decide what a
/// malformed value means.
pub trait Store {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&mut self, key: &str, value: String);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    pending: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a JSON object of `{key: value}` as read from `localStorage`.
    ///
    /// Values may be strings (raw stored text) or inline JSON. A malformed
    /// object yields an empty store.
    pub fn from_slices(json: &str) -> Self {
        let mut store = Self::new();
        if json.trim().is_empty() {
            return store;
        }
        let map: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(json) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed persisted slices");
                return store;
            }
        };
        for (key, value) in map {
            let raw = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            store.values.insert(key, raw);
        }
        store
    }

    /// Drain queued writes, oldest first.
    pub fn take_pending(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: String) {
        tracing::debug!(key, bytes = value.len(), "persisting slice");
        self.values.insert(key.to_string(), value.clone());
        self.pending.retain(|(k, _)| k != key);
        self.pending.push((key.to_string(), value));
    }
}

/// Render drained writes as a JSON object for the bridge.
pub fn pending_to_json(pending: &[(String, String)]) -> String {
    let map: serde_json::Map<String, serde_json::Value> = pending
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    serde_json::Value::Object(map).to_string()
}
