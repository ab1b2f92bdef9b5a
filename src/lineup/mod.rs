//! Lineup construction.
//!
//! The [`LineupAssembler`] owns an in-progress selection for one match and
//! enforces the slot, captain and budget rules. Finished lineups go to a
//! [`LineupRepository`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{PlayerId, RoleSlot};

mod assembler;
mod draft;
mod repository;

pub use assembler::*;
pub use draft::*;
pub use repository::*;

/// Errors raised while building or saving a lineup.
#[derive(Debug, Error)]
pub enum LineupError {
    #[error("Role '{role}' is not part of the {mode} template")]
    InvalidRole { role: String, mode: String },

    #[error("Unknown match: {0}")]
    UnknownMatch(String),

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} is not eligible for this match")]
    IneligiblePlayer(PlayerId),

    #[error("Player {player_id} is already assigned to {role}")]
    DuplicateAssignment { player_id: PlayerId, role: RoleSlot },

    #[error("Player {0} must be in the lineup before becoming captain")]
    CaptainNotSelected(PlayerId),

    #[error("Please fill all {required} slots and select a captain ({missing} missing)")]
    IncompleteLineup { missing: usize, required: usize },

    #[error("Lineup is over the {salary_cap} salary cap by {over_by}")]
    OverBudget { salary_cap: u32, over_by: f64 },

    #[error("Failed to save lineup: {0}")]
    Repository(#[from] RepositoryError),
}

/// What happens when a complete lineup exceeds the salary cap at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPolicy {
    /// Reject with [`LineupError::OverBudget`]
    #[default]
    Strict,
    /// Save anyway and flag the lineup as over budget
    Lenient,
}
