//! Lineup drafts submitted in one piece (HTTP body or CLI file).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{BudgetPolicy, LineupAssembler, LineupError};
use crate::models::{MatchId, PlayerId, Scope};
use crate::storage::FixtureStore;

/// A full set of picks to replay through a [`LineupAssembler`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineupDraft {
    pub match_id: MatchId,

    #[serde(default)]
    pub scope: Scope,

    #[serde(default)]
    pub lineup_name: String,

    #[serde(default)]
    pub entry_fee: Option<u32>,

    /// Slot name ("Captain", "Player 1", ...) to player id
    #[serde(default)]
    pub players: BTreeMap<String, PlayerId>,

    /// Overrides the Captain-slot player as captain
    #[serde(default)]
    pub captain_id: Option<PlayerId>,
}

impl LineupDraft {
    /// Replay the draft's picks into a fresh session.
    ///
    /// The Captain slot is filled first so an explicit `captain_id` always
    /// has the final word.
    pub fn assemble(
        &self,
        fixtures: Arc<FixtureStore>,
        policy: BudgetPolicy,
    ) -> Result<LineupAssembler, LineupError> {
        let mut assembler =
            LineupAssembler::new(fixtures, &self.match_id, self.scope)?.with_policy(policy);

        let mut picks = Vec::with_capacity(self.players.len());
        for (name, player_id) in &self.players {
            picks.push((assembler.parse_role(name)?, player_id));
        }
        picks.sort_by_key(|(role, _)| *role);

        for (role, player_id) in picks {
            assembler.assign(role, player_id)?;
        }

        if let Some(captain) = &self.captain_id {
            if assembler.selection().captain_id() != Some(captain) {
                assembler.set_captain(captain)?;
            }
        }

        Ok(assembler)
    }
}
