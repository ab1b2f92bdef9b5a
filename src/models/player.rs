//! Player reference data.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Per-player statistics shown in the picker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kills: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deaths: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assists: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// A player that can be picked into a lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    /// Handle shown in the UI
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,

    /// Team name; must match a match's `team_a`/`team_b` to be eligible
    #[serde(default)]
    pub team: String,

    /// Role tag (awper, lurker, rifler, anchor, igl, ...)
    #[serde(default)]
    pub position: String,

    /// Salary in whole currency units
    pub salary: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PlayerStats>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fantasy_points: Option<f64>,
}

impl Player {
    pub fn new(id: &str, name: &str, team: &str, salary: u32) -> Self {
        Self {
            id: PlayerId::from(id),
            name: name.to_string(),
            real_name: None,
            team: team.to_string(),
            position: String::new(),
            salary,
            avatar_url: None,
            stats: None,
            fantasy_points: None,
        }
    }

    pub fn with_position(mut self, position: &str) -> Self {
        self.position = position.to_string();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.stats.get_or_insert_with(PlayerStats::default).rating = Some(rating);
        self
    }

    pub fn rating(&self) -> Option<f64> {
        self.stats.as_ref().and_then(|s| s.rating)
    }

    /// Case-insensitive substring match on name or team.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term) || self.team.to_lowercase().contains(&term)
    }
}
