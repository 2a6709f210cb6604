//! Error taxonomy for the hunt engine.
//!
//! Every rejected operation leaves state untouched, so callers can render
//! the message and carry on.

use thiserror::Error;

/// What kind of record a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Team,
    Game,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Team => f.write_str("team"),
            RecordKind::Game => f.write_str("game"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HuntError {
    /// Malformed team code or blank team name.
    #[error("{0}")]
    Validation(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },

    /// Selected team is not present in the team roster.
    #[error("selected team '{0}' is no longer registered")]
    BrokenReference(String),

    #[error("no team selected")]
    NoTeamSelected,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}

impl HuntError {
    pub fn team_not_found(id: impl Into<String>) -> Self {
        HuntError::NotFound {
            kind: RecordKind::Team,
            id: id.into(),
        }
    }

    pub fn game_not_found(id: u32) -> Self {
        HuntError::NotFound {
            kind: RecordKind::Game,
            id: id.to_string(),
        }
    }
}
