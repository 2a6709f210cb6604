//! Hunt configuration: game roster seed, seed teams, and admin credentials.
//!
//! Loaded once from JSON handed over by the JS bridge. An empty string
//! means the reference configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::HuntError;
use crate::hunt::roster::{Difficulty, GameSeed};
use crate::hunt::team::{validate_code, validate_name, Team, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password123".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntConfig {
    pub games: Vec<GameSeed>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub admin: AdminCredentials,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            games: vec![
                seed(1, "Memory Match", "Match all pairs of cards to win", Difficulty::Easy),
                seed(
                    2,
                    "Quick Math",
                    "Solve math problems within the time limit",
                    Difficulty::Medium,
                ),
                seed(
                    3,
                    "Word Scramble",
                    "Unscramble words before time runs out",
                    Difficulty::Medium,
                ),
                seed(
                    4,
                    "Pattern Memory",
                    "Remember and repeat the pattern sequence",
                    Difficulty::Hard,
                ),
                seed(
                    5,
                    "Reaction Test",
                    "Click as fast as you can when the color changes",
                    Difficulty::Easy,
                ),
                seed(6, "Code Breaker", "Guess the correct sequence of colors", Difficulty::Hard),
            ],
            teams: vec![
                team("1", "Team A", "123456"),
                team("2", "Team B", "789012"),
                team("3", "Team C", "345678"),
                team("4", "Team D", "901234"),
            ],
            admin: AdminCredentials::default(),
        }
    }
}

fn seed(id: u32, title: &str, description: &str, difficulty: Difficulty) -> GameSeed {
    GameSeed {
        id,
        title: title.to_string(),
        description: description.to_string(),
        difficulty,
    }
}

fn team(id: &str, name: &str, code: &str) -> Team {
    Team {
        id: TeamId::new(id),
        name: name.to_string(),
        code: code.to_string(),
    }
}

impl HuntConfig {
    /// Parse and validate a JSON config. Blank input yields the default.
    pub fn from_json(json: &str) -> Result<Self, HuntError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_json::from_str(json).map_err(|e| HuntError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Number of games, which is also the required team code length.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn validate(&self) -> Result<(), HuntError> {
        if self.games.is_empty() {
            return Err(HuntError::Config("game roster is empty".to_string()));
        }
        for (idx, game) in self.games.iter().enumerate() {
            let expected = idx as u32 + 1;
            if game.id != expected {
                return Err(HuntError::Config(format!(
                    "game ids must run 1..={} in order; found {} at position {}",
                    self.games.len(),
                    game.id,
                    expected
                )));
            }
        }

        let mut seen = HashSet::new();
        for team in &self.teams {
            if !seen.insert(&team.id) {
                return Err(HuntError::Config(format!("duplicate team id '{}'", team.id)));
            }
            validate_name(&team.name)
                .and_then(|_| validate_code(&team.code, self.game_count()))
                .map_err(|e| HuntError::Config(format!("team '{}': {}", team.id, e)))?;
        }
        Ok(())
    }
}
