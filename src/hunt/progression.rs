//! Progression controller: the single owner of team, game, and session state.
//!
//! Every mutation goes through here and is followed by a write of the
//! slices it touched, so reloading from the store reproduces the same
//! observable state.
//!
//! ```text
//! NoTeamSelected ──select──▶ TeamSelected(0..N-1) ──complete last──▶ Won
//!        ▲                        │  ▲                                │
//!        └──── reset_progress ────┘  └────────── reset_games ─────────┘
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::HuntConfig;
use crate::error::HuntError;
use crate::hunt::roster::{Completion, Game, GameRoster};
use crate::hunt::snapshot::Snapshot;
use crate::hunt::store::{Store, COMPLETED_GAMES_KEY, GAMES_KEY, SELECTED_TEAM_KEY, TEAMS_KEY};
use crate::hunt::team::{Team, TeamId, TeamPatch, TeamRegistry};

/// Maps a team and a game's 1-based ordinal to the digit that game reveals.
pub type DigitPolicy = fn(&Team, u32) -> Option<char>;

/// Game at ordinal `p` reveals the character at index `p - 1` of the team code.
pub fn ordinal_digit(team: &Team, ordinal: u32) -> Option<char> {
    let idx = usize::try_from(ordinal).ok()?.checked_sub(1)?;
    team.code.chars().nth(idx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoTeamSelected,
    TeamSelected { progress: usize },
    Won,
}

pub struct Progression<S: Store> {
    config: HuntConfig,
    teams: TeamRegistry,
    roster: GameRoster,
    selected: Option<TeamId>,
    store: S,
    digit_policy: DigitPolicy,
}

impl<S: Store> Progression<S> {
    /// Fresh seed state. Nothing is read from or written to `store`.
    pub fn seeded(config: HuntConfig, store: S) -> Self {
        let code_len = config.game_count();
        Self {
            teams: TeamRegistry::from_records(config.teams.clone(), code_len),
            roster: GameRoster::new(config.games.clone()),
            selected: None,
            store,
            digit_policy: ordinal_digit,
            config,
        }
    }

    /// Rebuild state from the store, falling back to seed values for any
    /// slice that is missing or unreadable.
    pub fn load(config: HuntConfig, store: S) -> Self {
        let mut progression = Self::seeded(config, store);
        let code_len = progression.config.game_count();

        if let Some(records) = load_slice::<Vec<Team>, S>(&progression.store, TEAMS_KEY) {
            progression.teams = TeamRegistry::from_records(records, code_len);
        }

        if let Some(records) = load_slice::<Vec<Game>, S>(&progression.store, GAMES_KEY) {
            match GameRoster::restore(progression.config.games.clone(), &records) {
                Some(roster) => progression.roster = roster,
                None => tracing::warn!("stored games do not match the roster; using seed games"),
            }
        }

        let stored_selection = load_slice::<Option<Team>, S>(&progression.store, SELECTED_TEAM_KEY);
        if let Some(Some(team)) = stored_selection {
            if progression.teams.get(&team.id).is_some() {
                progression.selected = Some(team.id);
            } else {
                tracing::warn!(id = %team.id, "clearing stale team selection");
                progression.persist_selection();
            }
        }

        if let Some(stored) = load_slice::<usize, S>(&progression.store, COMPLETED_GAMES_KEY) {
            let derived = progression.roster.completed_count();
            if stored != derived {
                tracing::warn!(stored, derived, "completed-games counter disagrees with games");
                progression.persist_games();
            }
        }

        progression
    }

    /// Replace the digit mapping used by `digit_for`.
    pub fn with_digit_policy(mut self, policy: DigitPolicy) -> Self {
        self.digit_policy = policy;
        self
    }

    pub fn config(&self) -> &HuntConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // ── Reads ──────────────────────────────────────────────────────

    pub fn teams(&self) -> &[Team] {
        self.teams.teams()
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.get(id)
    }

    pub fn selected_team(&self) -> Option<&Team> {
        self.selected.as_ref().and_then(|id| self.teams.get(id))
    }

    pub fn games(&self) -> &[Game] {
        self.roster.games()
    }

    pub fn game(&self, game_id: u32) -> Option<&Game> {
        self.roster.get(game_id)
    }

    pub fn game_count(&self) -> usize {
        self.roster.len()
    }

    pub fn completed_count(&self) -> usize {
        self.roster.completed_count()
    }

    pub fn remaining(&self) -> usize {
        self.roster.remaining()
    }

    pub fn is_completed(&self, game_id: u32) -> bool {
        self.roster.is_completed(game_id)
    }

    pub fn collected_digits(&self) -> Vec<Option<char>> {
        self.roster.collected_digits()
    }

    /// The sole win predicate: every game in the roster is completed.
    pub fn has_won(&self) -> bool {
        self.completed_count() == self.game_count()
    }

    pub fn phase(&self) -> Phase {
        if self.selected_team().is_none() {
            Phase::NoTeamSelected
        } else if self.has_won() {
            Phase::Won
        } else {
            Phase::TeamSelected {
                progress: self.completed_count(),
            }
        }
    }

    /// Digit the selected team earns for completing `game_id`.
    pub fn digit_for(&self, game_id: u32) -> Result<char, HuntError> {
        let team = self.selected_team().ok_or(HuntError::NoTeamSelected)?;
        if self.roster.get(game_id).is_none() {
            return Err(HuntError::game_not_found(game_id));
        }
        (self.digit_policy)(team, game_id).ok_or_else(|| HuntError::game_not_found(game_id))
    }

    // ── Team registry ──────────────────────────────────────────────

    pub fn add_team(&mut self, name: &str, code: &str) -> Result<TeamId, HuntError> {
        let id = self.teams.add(name, code)?;
        tracing::info!(id = %id, "team added");
        self.persist_teams();
        Ok(id)
    }

    pub fn update_team(&mut self, id: &TeamId, patch: TeamPatch) -> Result<Team, HuntError> {
        let team = self.teams.update(id, patch)?.clone();
        tracing::info!(id = %id, "team updated");
        self.persist_teams();
        if self.selected.as_ref() == Some(id) {
            self.persist_selection();
        }
        Ok(team)
    }

    /// Delete a team. Deleting the selected team also clears the selection.
    pub fn delete_team(&mut self, id: &TeamId) -> Result<Team, HuntError> {
        let team = self.teams.delete(id)?;
        tracing::info!(id = %id, "team deleted");
        self.persist_teams();
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            tracing::info!(id = %id, "cleared selection of deleted team");
            self.persist_selection();
        }
        Ok(team)
    }

    pub fn select_team(&mut self, id: &TeamId) -> Result<&Team, HuntError> {
        if self.teams.get(id).is_none() {
            return Err(HuntError::team_not_found(id.as_str()));
        }
        self.selected = Some(id.clone());
        tracing::info!(id = %id, "team selected");
        self.persist_selection();
        self.selected_team().ok_or_else(|| HuntError::team_not_found(id.as_str()))
    }

    // ── Completion ─────────────────────────────────────────────────

    /// Record `digit` for `game_id`. Only the first completion of a game
    /// changes state; repeats and unknown ids are logged and ignored.
    pub fn complete_game(&mut self, game_id: u32, digit: char) -> Completion {
        let outcome = self.roster.complete(game_id, digit);
        match outcome {
            Completion::Recorded => {
                tracing::info!(
                    game = game_id,
                    completed = self.completed_count(),
                    total = self.game_count(),
                    "game completed"
                );
                self.persist_games();
                if self.has_won() {
                    tracing::info!("all games completed");
                }
            }
            Completion::AlreadyCompleted => {
                tracing::warn!(game = game_id, "ignoring repeat completion");
            }
            Completion::UnknownGame => {
                tracing::warn!(game = game_id, "ignoring completion for unknown game");
            }
        }
        outcome
    }

    /// Start over: pristine games and no team selected.
    pub fn reset_progress(&mut self) {
        self.roster.reset_all();
        self.selected = None;
        tracing::info!("progress reset");
        self.persist_games();
        self.persist_selection();
    }

    /// Wipe game progress but keep teams and the current selection.
    pub fn reset_games(&mut self) {
        self.roster.reset_all();
        tracing::info!("all games reset");
        self.persist_games();
    }

    // ── Snapshots ──────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            teams: self.teams().to_vec(),
            selected_team: self.selected_team().cloned(),
            games: self.games().to_vec(),
            completed_games: self.completed_count(),
        }
    }

    pub fn export_snapshot(&self) -> String {
        self.snapshot().encode()
    }

    /// Replace all state with a snapshot. Nothing changes unless the whole
    /// snapshot is consistent with the configured roster.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> Result<(), HuntError> {
        let code_len = self.config.game_count();
        let teams = TeamRegistry::from_records(snapshot.teams.clone(), code_len);
        if teams.len() != snapshot.teams.len() {
            return Err(HuntError::Snapshot(
                "snapshot contains invalid or duplicate teams".to_string(),
            ));
        }

        let selected = match snapshot.selected_team {
            Some(team) => match teams.get(&team.id) {
                Some(_) => Some(team.id),
                None => return Err(HuntError::BrokenReference(team.id.to_string())),
            },
            None => None,
        };

        let roster = GameRoster::restore(self.config.games.clone(), &snapshot.games)
            .ok_or_else(|| HuntError::Snapshot("games do not match the roster".to_string()))?;
        if roster.completed_count() != snapshot.completed_games {
            return Err(HuntError::Snapshot(format!(
                "counter {} does not match {} completed games",
                snapshot.completed_games,
                roster.completed_count()
            )));
        }

        self.teams = teams;
        self.selected = selected;
        self.roster = roster;
        tracing::info!("snapshot imported");
        self.persist_all();
        Ok(())
    }

    // ── Persistence ────────────────────────────────────────────────

    fn persist_teams(&mut self) {
        let value = to_json(self.teams.teams());
        self.save(TEAMS_KEY, value);
    }

    fn persist_selection(&mut self) {
        let value = to_json(&self.selected_team());
        self.save(SELECTED_TEAM_KEY, value);
    }

    fn persist_games(&mut self) {
        let games = to_json(self.roster.games());
        let counter = to_json(&self.roster.completed_count());
        self.save(GAMES_KEY, games);
        self.save(COMPLETED_GAMES_KEY, counter);
    }

    pub fn persist_all(&mut self) {
        self.persist_teams();
        self.persist_selection();
        self.persist_games();
    }

    fn save(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            self.store.save(key, value);
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize slice");
            None
        }
    }
}

fn load_slice<T: DeserializeOwned, S: Store>(store: &S, key: &str) -> Option<T> {
    let raw = store.load(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "unreadable slice; using seed value");
            None
        }
    }
}
