//! Team registry: the roster of teams and their secret codes.
//!
//! A team's code always holds exactly one ASCII digit per game in the
//! roster. The rule is re-checked on every create and update, so a stored
//! team can always reveal a digit for every game.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::HuntError;

/// Opaque team identifier. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub code: String,
}

/// Partial edit applied by `TeamRegistry::update`. The id is never editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPatch {
    pub name: Option<String>,
    pub code: Option<String>,
}

/// Check that `code` is exactly `game_count` ASCII digits.
pub fn validate_code(code: &str, game_count: usize) -> Result<(), HuntError> {
    if code.len() == game_count && code.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(HuntError::Validation(format!(
            "Code must be exactly {} digits",
            game_count
        )))
    }
}

/// Trim `name` and reject it if nothing is left.
pub fn validate_name(name: &str) -> Result<String, HuntError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HuntError::Validation("Team name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Ordered team roster. Insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRegistry {
    teams: Vec<Team>,
    code_len: usize,
    /// Highest numeric id handed out or loaded. Only moves forward.
    last_issued: u64,
}

impl TeamRegistry {
    /// Empty registry whose codes must be `code_len` digits long.
    pub fn new(code_len: usize) -> Self {
        Self {
            teams: Vec::new(),
            code_len,
            last_issued: 0,
        }
    }

    /// Build a registry from stored records, dropping any that break the
    /// code/name rules or repeat an id.
    pub fn from_records(records: Vec<Team>, code_len: usize) -> Self {
        let mut registry = Self::new(code_len);
        for team in records {
            if registry.get(&team.id).is_some() {
                tracing::warn!(id = %team.id, "dropping team with duplicate id");
                continue;
            }
            if let Err(e) = validate_code(&team.code, code_len) {
                tracing::warn!(id = %team.id, error = %e, "dropping team with invalid code");
                continue;
            }
            let name = match validate_name(&team.name) {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!(id = %team.id, error = %e, "dropping team with invalid name");
                    continue;
                }
            };
            registry.teams.push(Team { name, ..team });
        }
        registry.last_issued = registry.max_numeric_id();
        registry
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn code_len(&self) -> usize {
        self.code_len
    }

    pub fn get(&self, id: &TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| &t.id == id)
    }

    /// Validate and append a new team. Returns the assigned id.
    pub fn add(&mut self, name: &str, code: &str) -> Result<TeamId, HuntError> {
        let name = validate_name(name)?;
        validate_code(code, self.code_len)?;

        let id = self.next_id();
        self.teams.push(Team {
            id: id.clone(),
            name,
            code: code.to_string(),
        });
        Ok(id)
    }

    /// Apply a partial edit. Nothing changes unless every supplied field is valid.
    pub fn update(&mut self, id: &TeamId, patch: TeamPatch) -> Result<&Team, HuntError> {
        let code_len = self.code_len;
        let idx = self.position(id)?;

        let name = patch.name.as_deref().map(validate_name).transpose()?;
        if let Some(code) = patch.code.as_deref() {
            validate_code(code, code_len)?;
        }

        let team = &mut self.teams[idx];
        if let Some(name) = name {
            team.name = name;
        }
        if let Some(code) = patch.code {
            team.code = code;
        }
        Ok(team)
    }

    /// Remove a team, returning the removed record.
    pub fn delete(&mut self, id: &TeamId) -> Result<Team, HuntError> {
        let idx = self.position(id)?;
        Ok(self.teams.remove(idx))
    }

    fn position(&self, id: &TeamId) -> Result<usize, HuntError> {
        self.teams
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| HuntError::team_not_found(id.as_str()))
    }

    fn max_numeric_id(&self) -> u64 {
        self.teams
            .iter()
            .filter_map(|t| t.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }

    /// One past the largest numeric id ever seen, skipping anything taken.
    /// Ids freed by `delete` are not handed out again.
    fn next_id(&mut self) -> TeamId {
        let mut next = self.last_issued.max(self.max_numeric_id()).saturating_add(1);
        loop {
            let candidate = TeamId(next.to_string());
            if self.get(&candidate).is_none() {
                self.last_issued = next;
                return candidate;
            }
            next = next.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TeamRegistry {
        TeamRegistry::from_records(
            vec![
                team("1", "Team A", "123456"),
                team("2", "Team B", "789012"),
            ],
            6,
        )
    }

    fn team(id: &str, name: &str, code: &str) -> Team {
        Team {
            id: id.into(),
            name: name.into(),
            code: code.into(),
        }
    }

    #[test]
    fn validate_code_accepts_exact_digits() {
        assert!(validate_code("000000", 6).is_ok());
        assert!(validate_code("987654", 6).is_ok());
    }

    #[test]
    fn validate_code_rejects_everything_else() {
        for bad in ["", "12345", "1234567", "12345a", " 12345", "12 456", "١٢٣٤٥٦"] {
            assert!(
                matches!(validate_code(bad, 6), Err(HuntError::Validation(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn add_assigns_fresh_id_and_appends() {
        let mut reg = registry();
        let id = reg.add("  Team E ", "555555").unwrap();
        assert_eq!(id.as_str(), "3");
        assert_eq!(reg.len(), 3);
        let team = reg.get(&id).unwrap();
        assert_eq!(team.name, "Team E");
        assert_eq!(reg.teams().last().unwrap().id, id);
    }

    #[test]
    fn add_short_code_leaves_roster_unchanged() {
        let mut reg = registry();
        let before = reg.clone();
        let err = reg.add("Team E", "12345").unwrap_err();
        assert!(matches!(err, HuntError::Validation(_)));
        assert_eq!(reg, before);
    }

    #[test]
    fn add_blank_name_rejected() {
        let mut reg = registry();
        assert!(matches!(reg.add("   ", "123456"), Err(HuntError::Validation(_))));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn next_id_skips_non_numeric_and_taken_ids() {
        let mut reg = TeamRegistry::from_records(
            vec![team("alpha", "A", "111111")],
            6,
        );
        assert_eq!(reg.add("B", "222222").unwrap().as_str(), "1");
        assert_eq!(reg.add("C", "333333").unwrap().as_str(), "2");
    }

    #[test]
    fn deleted_id_is_not_reissued() {
        let mut reg = registry();
        let first = reg.add("Team E", "555555").unwrap();
        reg.delete(&first).unwrap();
        let second = reg.add("Team F", "666666").unwrap();
        assert_eq!(first.as_str(), "3");
        assert_eq!(second.as_str(), "4");
    }

    #[test]
    fn update_applies_partial_patch() {
        let mut reg = registry();
        let id = TeamId::from("1");
        let patch = TeamPatch {
            name: Some("Renamed".into()),
            code: None,
        };
        reg.update(&id, patch).unwrap();
        let team = reg.get(&id).unwrap();
        assert_eq!(team.name, "Renamed");
        assert_eq!(team.code, "123456");
    }

    #[test]
    fn update_invalid_code_changes_nothing() {
        let mut reg = registry();
        let before = reg.clone();
        let patch = TeamPatch {
            name: Some("Renamed".into()),
            code: Some("12x456".into()),
        };
        assert!(matches!(reg.update(&"1".into(), patch), Err(HuntError::Validation(_))));
        assert_eq!(reg, before);
    }

    #[test]
    fn update_missing_team_is_not_found() {
        let mut reg = registry();
        let err = reg.update(&"99".into(), TeamPatch::default()).unwrap_err();
        assert!(matches!(err, HuntError::NotFound { .. }));
    }

    #[test]
    fn delete_missing_team_is_not_found() {
        let mut reg = registry();
        let err = reg.delete(&"nonexistent".into()).unwrap_err();
        assert_eq!(err, HuntError::team_not_found("nonexistent"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn from_records_drops_invalid_entries() {
        let reg = TeamRegistry::from_records(
            vec![
                team("1", "Ok", "123456"),
                team("2", "Short", "123"),
                team("1", "Dup", "654321"),
                team("3", " ", "654321"),
            ],
            6,
        );
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.teams()[0].name, "Ok");
    }
}
