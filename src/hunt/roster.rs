//! Game roster and completion tracking.
//!
//! The roster is seeded once from configuration. Only the `completed` /
//! `digit` pair ever changes at runtime, and `digit` is set exactly when
//! `completed` is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Static descriptor for one game, as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSeed {
    /// Ordinal position, 1-based. Doubles as the index into a team code.
    pub id: u32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
}

/// A game plus its completion state. This is also the persisted record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub completed: bool,
    pub digit: Option<char>,
}

impl Game {
    fn pristine(seed: &GameSeed) -> Self {
        Self {
            id: seed.id,
            title: seed.title.clone(),
            description: seed.description.clone(),
            difficulty: seed.difficulty,
            completed: false,
            digit: None,
        }
    }
}

/// Result of asking the tracker to complete a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// First completion; the digit was stored.
    Recorded,
    /// Already completed; the first digit stands.
    AlreadyCompleted,
    UnknownGame,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRoster {
    seeds: Vec<GameSeed>,
    games: Vec<Game>,
}

impl GameRoster {
    pub fn new(seeds: Vec<GameSeed>) -> Self {
        let games = seeds.iter().map(Game::pristine).collect();
        Self { seeds, games }
    }

    /// Seed roster with completion state taken from stored records.
    ///
    /// Static fields always come from the seeds. Returns `None` when the
    /// stored ids do not line up with the seed ids.
    pub fn restore(seeds: Vec<GameSeed>, stored: &[Game]) -> Option<Self> {
        if stored.len() != seeds.len() || stored.iter().zip(&seeds).any(|(g, s)| g.id != s.id) {
            return None;
        }
        let mut roster = Self::new(seeds);
        for (game, record) in roster.games.iter_mut().zip(stored) {
            match (record.completed, record.digit) {
                (true, Some(digit)) => {
                    game.completed = true;
                    game.digit = Some(digit);
                }
                (false, None) => {}
                _ => tracing::warn!(game = record.id, "normalising inconsistent completion record"),
            }
        }
        Some(roster)
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, game_id: u32) -> Option<&Game> {
        self.games.iter().find(|g| g.id == game_id)
    }

    /// Unknown ids read as not completed.
    pub fn is_completed(&self, game_id: u32) -> bool {
        self.get(game_id).is_some_and(|g| g.completed)
    }

    /// One entry per game in roster order, `None` where not yet revealed.
    pub fn collected_digits(&self) -> Vec<Option<char>> {
        self.games.iter().map(|g| g.digit).collect()
    }

    pub fn completed_count(&self) -> usize {
        self.games.iter().filter(|g| g.completed).count()
    }

    pub fn remaining(&self) -> usize {
        self.len() - self.completed_count()
    }

    /// Mark a game completed with `digit`. The first recorded digit is final.
    pub fn complete(&mut self, game_id: u32, digit: char) -> Completion {
        let Some(game) = self.games.iter_mut().find(|g| g.id == game_id) else {
            return Completion::UnknownGame;
        };
        if game.completed {
            return Completion::AlreadyCompleted;
        }
        game.completed = true;
        game.digit = Some(digit);
        Completion::Recorded
    }

    /// Back to the pristine seed roster.
    pub fn reset_all(&mut self) {
        self.games = self.seeds.iter().map(Game::pristine).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds() -> Vec<GameSeed> {
        (1..=3)
            .map(|id| GameSeed {
                id,
                title: format!("Game {id}"),
                description: String::new(),
                difficulty: Difficulty::Easy,
            })
            .collect()
    }

    #[test]
    fn new_roster_is_pristine() {
        let roster = GameRoster::new(seeds());
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.completed_count(), 0);
        assert_eq!(roster.collected_digits(), vec![None, None, None]);
    }

    #[test]
    fn complete_records_digit_once() {
        let mut roster = GameRoster::new(seeds());
        assert_eq!(roster.complete(3, '7'), Completion::Recorded);
        assert_eq!(roster.complete(3, '9'), Completion::AlreadyCompleted);
        let game = roster.get(3).unwrap();
        assert!(game.completed);
        assert_eq!(game.digit, Some('7'));
        assert_eq!(roster.completed_count(), 1);
    }

    #[test]
    fn unknown_game_is_not_completed() {
        let mut roster = GameRoster::new(seeds());
        assert!(!roster.is_completed(42));
        assert_eq!(roster.complete(42, '1'), Completion::UnknownGame);
        assert_eq!(roster.completed_count(), 0);
    }

    #[test]
    fn reset_all_restores_seed_state() {
        let mut roster = GameRoster::new(seeds());
        roster.complete(1, '1');
        roster.complete(2, '2');
        roster.reset_all();
        assert_eq!(roster, GameRoster::new(seeds()));
    }

    #[test]
    fn restore_takes_completion_from_records() {
        let mut played = GameRoster::new(seeds());
        played.complete(2, '5');
        let mut records = played.games().to_vec();
        records[0].title = "Tampered".to_string();

        let restored = GameRoster::restore(seeds(), &records).unwrap();
        assert_eq!(restored.get(1).unwrap().title, "Game 1");
        assert_eq!(restored.collected_digits(), vec![None, Some('5'), None]);
    }

    #[test]
    fn restore_normalises_half_completed_records() {
        let mut records = GameRoster::new(seeds()).games().to_vec();
        records[0].completed = true;
        records[1].digit = Some('4');
        let restored = GameRoster::restore(seeds(), &records).unwrap();
        assert_eq!(restored.completed_count(), 0);
        assert_eq!(restored.collected_digits(), vec![None, None, None]);
    }

    #[test]
    fn restore_rejects_mismatched_ids() {
        let records = GameRoster::new(seeds()).games()[..2].to_vec();
        assert!(GameRoster::restore(seeds(), &records).is_none());
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"medium\"");
    }
}
