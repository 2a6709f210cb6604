//! Whole-state snapshot for export and import.
//!
//! Mirrors the four persisted slices. Exported as URL-safe base64 of the
//! JSON so it survives copy/paste and plain-text files.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::HuntError;
use crate::hunt::roster::Game;
use crate::hunt::team::Team;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub teams: Vec<Team>,
    pub selected_team: Option<Team>,
    pub games: Vec<Game>,
    pub completed_games: usize,
}

impl Snapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_json())
    }

    pub fn decode(encoded: &str) -> Result<Self, HuntError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim())
            .map_err(|e| HuntError::Snapshot(format!("base64 decode error: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| HuntError::Snapshot(format!("state decode error: {}", e)))
    }
}
