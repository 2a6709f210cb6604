//! Mini-game contract: how a running game reports back to the controller.
//!
//! Each game's internal rules (timers, scoring, attempts) live in the UI.
//! The engine only sees two signals per session: a win, which reveals the
//! team's digit for that game, and a restart, which throws the attempt away.

use crate::error::HuntError;
use crate::hunt::progression::Progression;
use crate::hunt::roster::Completion;
use crate::hunt::store::Store;

/// The playable game behind a roster slot, selected by game id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiniGameKind {
    MemoryMatch,
    QuickMath,
    WordScramble,
    PatternMemory,
    ReactionTest,
    CodeBreaker,
    /// Game id beyond the reference six, for custom rosters.
    Custom(u32),
}

impl MiniGameKind {
    pub fn for_game(game_id: u32) -> Self {
        match game_id {
            1 => MiniGameKind::MemoryMatch,
            2 => MiniGameKind::QuickMath,
            3 => MiniGameKind::WordScramble,
            4 => MiniGameKind::PatternMemory,
            5 => MiniGameKind::ReactionTest,
            6 => MiniGameKind::CodeBreaker,
            other => MiniGameKind::Custom(other),
        }
    }

    /// Stable slug the UI uses to mount the matching component.
    pub fn slug(self) -> &'static str {
        match self {
            MiniGameKind::MemoryMatch => "memory-match",
            MiniGameKind::QuickMath => "quick-math",
            MiniGameKind::WordScramble => "word-scramble",
            MiniGameKind::PatternMemory => "pattern-memory",
            MiniGameKind::ReactionTest => "reaction-test",
            MiniGameKind::CodeBreaker => "code-breaker",
            MiniGameKind::Custom(_) => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinReport {
    /// The game is completed and `digit` is the one on record.
    Revealed { digit: char, hunt_won: bool },
    /// This session already reported its win; nothing changed.
    AlreadyReported,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniGameSession {
    game_id: u32,
    kind: MiniGameKind,
    state: SessionState,
    restarts: u32,
}

impl MiniGameSession {
    /// Start a session for `game_id`. Needs a selected team and a known game.
    pub fn launch<S: Store>(progression: &Progression<S>, game_id: u32) -> Result<Self, HuntError> {
        if progression.selected_team().is_none() {
            return Err(HuntError::NoTeamSelected);
        }
        if progression.game(game_id).is_none() {
            return Err(HuntError::game_not_found(game_id));
        }
        tracing::info!(game = game_id, "mini-game launched");
        Ok(Self {
            game_id,
            kind: MiniGameKind::for_game(game_id),
            state: SessionState::Playing,
            restarts: 0,
        })
    }

    pub fn game_id(&self) -> u32 {
        self.game_id
    }

    pub fn kind(&self) -> MiniGameKind {
        self.kind
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Report the win. Only the first call per session reaches the controller.
    pub fn on_win<S: Store>(
        &mut self,
        progression: &mut Progression<S>,
    ) -> Result<WinReport, HuntError> {
        if self.state == SessionState::Won {
            tracing::warn!(game = self.game_id, "ignoring repeated win signal");
            return Ok(WinReport::AlreadyReported);
        }

        let digit = progression.digit_for(self.game_id)?;
        if progression.complete_game(self.game_id, digit) == Completion::UnknownGame {
            return Err(HuntError::game_not_found(self.game_id));
        }
        self.state = SessionState::Won;

        // A replayed game keeps the digit from its first completion.
        let recorded = progression
            .game(self.game_id)
            .and_then(|g| g.digit)
            .unwrap_or(digit);
        Ok(WinReport::Revealed {
            digit: recorded,
            hunt_won: progression.has_won(),
        })
    }

    /// Discard the in-progress attempt. Returns false once the game is won.
    pub fn on_restart(&mut self) -> bool {
        if self.state == SessionState::Won {
            return false;
        }
        self.restarts += 1;
        tracing::debug!(game = self.game_id, restarts = self.restarts, "mini-game restarted");
        true
    }
}
