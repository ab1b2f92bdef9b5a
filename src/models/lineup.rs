//! Persisted lineup model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LineupId, MatchId, Mode, PlayerId, RoleSlot};

/// Lifecycle status of a saved lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineupStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl std::fmt::Display for LineupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineupStatus::Active => write!(f, "active"),
            LineupStatus::Completed => write!(f, "completed"),
            LineupStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// One player placed in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub player_id: PlayerId,
    pub role: RoleSlot,
    #[serde(default)]
    pub is_captain: bool,
}

/// A finalized lineup. Only created by a successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    pub id: LineupId,

    pub match_id: MatchId,

    pub lineup_name: String,

    /// Entries in role-template order
    pub players: Vec<LineupEntry>,

    /// Captain-weighted salary; may carry a half unit
    pub total_salary: f64,

    pub captain_id: Option<PlayerId>,

    pub entry_fee: u32,

    pub total_points: f64,

    pub status: LineupStatus,

    pub mode: Mode,

    pub created_at: DateTime<Utc>,

    /// Saved over the cap under the lenient budget policy
    #[serde(default)]
    pub over_budget: bool,
}

impl Lineup {
    pub fn captain(&self) -> Option<&LineupEntry> {
        self.players.iter().find(|e| e.is_captain)
    }
}

/// Counts shown on the "my lineups" page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineupSummary {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
}
