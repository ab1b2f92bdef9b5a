//! In-progress lineup state and the rules that govern it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{BudgetPolicy, LineupError, LineupRepository};
use crate::calculate::{self, Budget};
use crate::models::{
    EntityId, Lineup, LineupEntry, LineupStatus, Match, MatchId, Mode, Player, PlayerId,
    RoleSlot, Scope,
};
use crate::storage::FixtureStore;

/// Players currently placed in slots, plus the captain.
///
/// Invariants: no player occupies two slots, and `captain_id` (when set)
/// names a player held in some slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionState {
    slots: BTreeMap<RoleSlot, Player>,
    captain_id: Option<PlayerId>,
}

impl SelectionState {
    pub fn get(&self, role: RoleSlot) -> Option<&Player> {
        self.slots.get(&role)
    }

    /// Occupied slots in template order.
    pub fn iter(&self) -> impl Iterator<Item = (RoleSlot, &Player)> {
        self.slots.iter().map(|(role, player)| (*role, player))
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.values()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn captain_id(&self) -> Option<&PlayerId> {
        self.captain_id.as_ref()
    }

    /// Slot currently holding the given player.
    pub fn role_of(&self, player_id: &PlayerId) -> Option<RoleSlot> {
        self.slots
            .iter()
            .find(|(_, p)| &p.id == player_id)
            .map(|(role, _)| *role)
    }

    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.role_of(player_id).is_some()
    }
}

/// A player offered by the picker for a particular slot.
#[derive(Debug, Clone, Serialize)]
pub struct SelectablePlayer {
    #[serde(flatten)]
    pub player: Player,
    pub affordable: bool,
}

/// Builds one lineup for one match.
///
/// Mode, cap and slot template are fixed at construction from the scope.
/// Over-budget selections are allowed while drafting; the budget is only
/// enforced at save time, according to the [`BudgetPolicy`].
pub struct LineupAssembler {
    fixtures: Arc<FixtureStore>,
    active: Match,
    scope: Scope,
    mode: Mode,
    policy: BudgetPolicy,
    selection: SelectionState,
}

impl LineupAssembler {
    pub fn new(
        fixtures: Arc<FixtureStore>,
        match_id: &MatchId,
        scope: Scope,
    ) -> Result<Self, LineupError> {
        let active = fixtures
            .find_match(match_id)
            .cloned()
            .ok_or_else(|| LineupError::UnknownMatch(match_id.to_string()))?;
        let mode = Mode::for_scope(scope);

        debug!(
            "New {} session for match {} ({} vs {}), scope {}",
            mode, active.id, active.team_a, active.team_b, scope
        );

        Ok(Self {
            fixtures,
            active,
            scope,
            mode,
            policy: BudgetPolicy::default(),
            selection: SelectionState::default(),
        })
    }

    pub fn with_policy(mut self, policy: BudgetPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn policy(&self) -> BudgetPolicy {
        self.policy
    }

    pub fn salary_cap(&self) -> u32 {
        self.mode.salary_cap()
    }

    pub fn role_template(&self) -> &'static [RoleSlot] {
        self.mode.role_template()
    }

    pub fn active_match(&self) -> &Match {
        &self.active
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Parse a slot name and check it belongs to this session's template.
    pub fn parse_role(&self, name: &str) -> Result<RoleSlot, LineupError> {
        let role = name.parse::<RoleSlot>().map_err(|raw| LineupError::InvalidRole {
            role: raw,
            mode: self.mode.to_string(),
        })?;
        self.check_role(role)?;
        Ok(role)
    }

    fn check_role(&self, role: RoleSlot) -> Result<(), LineupError> {
        if self.mode.has_slot(role) {
            Ok(())
        } else {
            Err(LineupError::InvalidRole {
                role: role.to_string(),
                mode: self.mode.to_string(),
            })
        }
    }

    /// Players eligible under the current match and scope. Recomputed on
    /// every call.
    pub fn eligible_players(&self) -> Vec<&Player> {
        self.fixtures.eligible_players(&self.active, self.scope)
    }

    pub fn is_eligible(&self, player: &Player) -> bool {
        self.fixtures
            .eligible_teams(&self.active, self.scope)
            .contains(player.team.as_str())
    }

    /// Place a player in a slot.
    ///
    /// Assigning to the Captain slot also makes the player captain.
    /// Replacing the current captain in any other slot clears the captain.
    pub fn assign(
        &mut self,
        role: RoleSlot,
        player_id: &PlayerId,
    ) -> Result<&SelectionState, LineupError> {
        self.check_role(role)?;

        let player = self
            .fixtures
            .player(player_id)
            .ok_or_else(|| LineupError::UnknownPlayer(player_id.clone()))?;

        if !self.is_eligible(player) {
            return Err(LineupError::IneligiblePlayer(player_id.clone()));
        }

        if let Some(held) = self.selection.role_of(player_id) {
            if held != role {
                return Err(LineupError::DuplicateAssignment {
                    player_id: player_id.clone(),
                    role: held,
                });
            }
        }

        let player = player.clone();
        if let Some(previous) = self.selection.slots.insert(role, player) {
            if self.selection.captain_id.as_ref() == Some(&previous.id) && previous.id != *player_id
            {
                self.selection.captain_id = None;
            }
        }
        if role.is_captain() {
            self.selection.captain_id = Some(player_id.clone());
        }

        debug!("Assigned {} to {}", player_id, role);
        Ok(&self.selection)
    }

    /// Empty a slot, returning whoever held it. Clears the captain if the
    /// removed player was captain.
    pub fn unassign(&mut self, role: RoleSlot) -> Result<Option<Player>, LineupError> {
        self.check_role(role)?;

        let removed = self.selection.slots.remove(&role);
        if let Some(player) = &removed {
            if self.selection.captain_id.as_ref() == Some(&player.id) {
                self.selection.captain_id = None;
            }
            debug!("Unassigned {} from {}", player.id, role);
        }
        Ok(removed)
    }

    /// Toggle captaincy on a selected player. Returns the captain afterwards.
    pub fn set_captain(&mut self, player_id: &PlayerId) -> Result<Option<&PlayerId>, LineupError> {
        if !self.selection.contains(player_id) {
            return Err(LineupError::CaptainNotSelected(player_id.clone()));
        }

        if self.selection.captain_id.as_ref() == Some(player_id) {
            self.selection.captain_id = None;
        } else {
            self.selection.captain_id = Some(player_id.clone());
        }

        debug!("Captain is now {:?}", self.selection.captain_id);
        Ok(self.selection.captain_id.as_ref())
    }

    /// Captain-weighted total and remaining budget.
    pub fn cost(&self) -> Budget {
        let total =
            calculate::total_salary(self.selection.players(), self.selection.captain_id());
        Budget::new(self.salary_cap(), total)
    }

    /// Empty slots, plus one when the Captain slot is filled but nobody holds
    /// the captaincy. Never exceeds the mode's slot count.
    pub fn missing_count(&self) -> usize {
        let empty_slots = self.mode.required_players() - self.selection.len();
        let missing_captain = usize::from(
            self.selection.captain_id.is_none()
                && self.selection.get(RoleSlot::Captain).is_some(),
        );
        empty_slots + missing_captain
    }

    pub fn is_complete(&self) -> bool {
        self.selection.len() == self.mode.required_players()
            && self.selection.captain_id.is_some()
    }

    /// Candidates for a slot: eligible, not already picked, matching the
    /// search term, most expensive first.
    pub fn selectable_players(
        &self,
        role: RoleSlot,
        search: &str,
    ) -> Result<Vec<SelectablePlayer>, LineupError> {
        self.check_role(role)?;

        let remaining = self.cost().remaining;
        let freed = self.selection.get(role).map(|p| p.salary).unwrap_or(0);

        let mut candidates: Vec<SelectablePlayer> = self
            .eligible_players()
            .into_iter()
            .filter(|p| !self.selection.contains(&p.id))
            .filter(|p| p.matches_search(search))
            .map(|p| SelectablePlayer {
                affordable: calculate::can_afford(p.salary, remaining, freed),
                player: p.clone(),
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.player
                .salary
                .cmp(&a.player.salary)
                .then_with(|| a.player.name.cmp(&b.player.name))
        });
        Ok(candidates)
    }

    /// Validate the selection and freeze it into a [`Lineup`].
    pub fn build_lineup(&self, name: &str, entry_fee: u32) -> Result<Lineup, LineupError> {
        if !self.is_complete() {
            return Err(LineupError::IncompleteLineup {
                missing: self.missing_count(),
                required: self.mode.required_players(),
            });
        }

        let budget = self.cost();
        let over_budget = budget.is_over_budget();
        if over_budget {
            match self.policy {
                BudgetPolicy::Strict => {
                    return Err(LineupError::OverBudget {
                        salary_cap: budget.salary_cap,
                        over_by: -budget.remaining.as_f64(),
                    });
                }
                BudgetPolicy::Lenient => warn!(
                    "Lineup for match {} is over the {} cap by {}",
                    self.active.id,
                    budget.salary_cap,
                    -budget.remaining.as_f64()
                ),
            }
        }

        let captain_id = self.selection.captain_id.clone();
        let players: Vec<LineupEntry> = self
            .selection
            .iter()
            .map(|(role, player)| LineupEntry {
                player_id: player.id.clone(),
                role,
                is_captain: captain_id.as_ref() == Some(&player.id),
            })
            .collect();

        let lineup_name = match name.trim() {
            "" => format!(
                "{} {} vs {}",
                self.mode, self.active.team_a, self.active.team_b
            ),
            trimmed => trimmed.to_string(),
        };

        let created_at = Utc::now();
        let mut fields: Vec<String> = vec![
            self.active.id.to_string(),
            lineup_name.clone(),
            created_at.to_rfc3339(),
        ];
        fields.extend(players.iter().map(|e| format!("{}={}", e.role, e.player_id)));
        let field_refs: Vec<&str> = fields.iter().map(String::as_str).collect();

        Ok(Lineup {
            id: EntityId::generate(&field_refs),
            match_id: self.active.id.clone(),
            lineup_name,
            players,
            total_salary: budget.total_salary.as_f64(),
            captain_id,
            entry_fee,
            total_points: 0.0,
            status: LineupStatus::Active,
            mode: self.mode,
            created_at,
            over_budget,
        })
    }

    /// Validate, persist and end the session.
    ///
    /// The repository is called once; its error is returned unchanged and
    /// the selection is left intact. On success the selection is cleared.
    pub async fn save(
        &mut self,
        repository: &dyn LineupRepository,
        name: &str,
        entry_fee: u32,
    ) -> Result<Lineup, LineupError> {
        let lineup = self.build_lineup(name, entry_fee)?;
        repository.create(&lineup).await?;

        info!(
            "Saved lineup {} ({}) for match {} via {}: {} salary",
            lineup.id,
            lineup.lineup_name,
            lineup.match_id,
            repository.name(),
            lineup.total_salary
        );
        self.selection = SelectionState::default();
        Ok(lineup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::{InMemoryLineupRepository, RepositoryError};
    use crate::models::Event;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    const SALARIES: [u32; 6] = [9000, 8500, 8000, 7500, 7000, 6500];

    /// m1 (A vs B) and m2 (C vs D) share a day; m3 (E vs F) is the next day.
    fn fixtures() -> Arc<FixtureStore> {
        let event = Event::new(
            "e1",
            "Cup",
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 2).unwrap(),
        );
        let matches = vec![
            Match::new("m1", "e1", "A", "B", "2025-09-01T10:00:00Z"),
            Match::new("m2", "e1", "C", "D", "2025-09-01T21:00:00Z"),
            Match::new("m3", "e1", "E", "F", "2025-09-02T10:00:00Z"),
        ];
        let mut players = Vec::new();
        for team in ["A", "B", "C", "D", "E", "F"] {
            for (i, salary) in SALARIES.iter().enumerate() {
                players.push(Player::new(
                    &format!("{}{}", team.to_lowercase(), i + 1),
                    &format!("{}-{}", team, i + 1),
                    team,
                    *salary,
                ));
            }
        }
        players.push(Player::new("cheap", "Bargain", "B", 500));
        players.push(Player::new("budget", "Budget Pick", "A", 2000));
        Arc::new(FixtureStore::new(vec![event], matches, players))
    }

    fn id(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    fn six_mode() -> LineupAssembler {
        LineupAssembler::new(fixtures(), &MatchId::from("m1"), Scope::Day).unwrap()
    }

    fn four_mode() -> LineupAssembler {
        LineupAssembler::new(fixtures(), &MatchId::from("m1"), Scope::Game).unwrap()
    }

    /// Six slots filled with salaries 9000..6500, captain in the Captain slot.
    fn fill_six(assembler: &mut LineupAssembler) {
        let picks = ["a1", "b2", "c3", "d4", "a5", "b6"];
        for (role, pick) in RoleSlot::ALL.iter().zip(picks) {
            assembler.assign(*role, &id(pick)).unwrap();
        }
    }

    /// Four slots totalling 18 750 with the 6500 captain.
    fn fill_four_affordable(assembler: &mut LineupAssembler) {
        assembler.assign(RoleSlot::Captain, &id("a6")).unwrap();
        assembler.assign(RoleSlot::Player1, &id("b6")).unwrap();
        assembler.assign(RoleSlot::Player2, &id("cheap")).unwrap();
        assembler.assign(RoleSlot::Player3, &id("budget")).unwrap();
    }

    struct FailingRepository;

    #[async_trait]
    impl LineupRepository for FailingRepository {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn create(&self, _lineup: &Lineup) -> Result<EntityId, RepositoryError> {
            Err(RepositoryError::Unavailable("disk full".to_string()))
        }

        async fn list(&self) -> Result<Vec<Lineup>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_mode_from_scope() {
        let six = six_mode();
        assert_eq!(six.mode(), Mode::Six);
        assert_eq!(six.salary_cap(), 50_000);
        assert_eq!(six.role_template().len(), 6);

        let four = four_mode();
        assert_eq!(four.mode(), Mode::Four);
        assert_eq!(four.salary_cap(), 20_000);
        assert_eq!(four.role_template().len(), 4);
    }

    #[test]
    fn test_unknown_match() {
        let result = LineupAssembler::new(fixtures(), &MatchId::from("nope"), Scope::Day);
        assert!(matches!(result, Err(LineupError::UnknownMatch(_))));
    }

    #[test]
    fn test_eligible_players_follow_scope() {
        let store = fixtures();
        let game = LineupAssembler::new(store.clone(), &"m1".into(), Scope::Game).unwrap();
        let day = LineupAssembler::new(store.clone(), &"m1".into(), Scope::Day).unwrap();
        let event = LineupAssembler::new(store, &"m1".into(), Scope::Event).unwrap();

        assert_eq!(game.eligible_players().len(), 14);
        assert_eq!(day.eligible_players().len(), 26);
        assert_eq!(event.eligible_players().len(), 38);
    }

    #[test]
    fn test_assign_captain_slot_sets_captain() {
        let mut assembler = six_mode();
        assembler.assign(RoleSlot::Captain, &id("a1")).unwrap();
        assert_eq!(assembler.selection().captain_id(), Some(&id("a1")));
    }

    #[test]
    fn test_assign_rejects_ineligible_player() {
        let mut assembler = four_mode();
        let err = assembler.assign(RoleSlot::Player1, &id("c1")).unwrap_err();
        assert!(matches!(err, LineupError::IneligiblePlayer(_)));
        assert!(assembler.selection().is_empty());
    }

    #[test]
    fn test_assign_rejects_unknown_player() {
        let mut assembler = six_mode();
        let err = assembler.assign(RoleSlot::Player1, &id("ghost")).unwrap_err();
        assert!(matches!(err, LineupError::UnknownPlayer(_)));
    }

    #[test]
    fn test_assign_rejects_slot_outside_template() {
        let mut assembler = four_mode();
        let err = assembler.assign(RoleSlot::Player4, &id("a1")).unwrap_err();
        assert!(matches!(err, LineupError::InvalidRole { .. }));

        assert!(assembler.parse_role("Player 5").is_err());
        assert!(assembler.parse_role("Coach").is_err());
        assert_eq!(assembler.parse_role("Player 3").unwrap(), RoleSlot::Player3);
    }

    #[test]
    fn test_assign_rejects_duplicate_player() {
        let mut assembler = six_mode();
        assembler.assign(RoleSlot::Player1, &id("a1")).unwrap();
        let err = assembler.assign(RoleSlot::Player2, &id("a1")).unwrap_err();
        match err {
            LineupError::DuplicateAssignment { player_id, role } => {
                assert_eq!(player_id, id("a1"));
                assert_eq!(role, RoleSlot::Player1);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Re-assigning to the same slot is a no-op, not a duplicate.
        assembler.assign(RoleSlot::Player1, &id("a1")).unwrap();
        assert_eq!(assembler.selection().len(), 1);
    }

    #[test]
    fn test_assigned_player_ids_stay_distinct() {
        let mut assembler = six_mode();
        let attempts = [
            (RoleSlot::Captain, "a1"),
            (RoleSlot::Player1, "a1"),
            (RoleSlot::Player1, "b1"),
            (RoleSlot::Player2, "b1"),
            (RoleSlot::Player2, "c1"),
            (RoleSlot::Player3, "a1"),
            (RoleSlot::Player3, "d1"),
        ];
        for (role, pick) in attempts {
            let _ = assembler.assign(role, &id(pick));
            let ids: Vec<_> = assembler.selection().players().map(|p| &p.id).collect();
            let unique: HashSet<_> = ids.iter().collect();
            assert_eq!(ids.len(), unique.len());
        }
        assert_eq!(assembler.selection().len(), 4);
    }

    #[test]
    fn test_over_budget_assignment_is_allowed() {
        let mut assembler = four_mode();
        for (role, pick) in [
            (RoleSlot::Captain, "a1"),
            (RoleSlot::Player1, "a2"),
            (RoleSlot::Player2, "a3"),
        ] {
            assembler.assign(role, &id(pick)).unwrap();
        }
        assert!(assembler.cost().is_over_budget());
    }

    #[test]
    fn test_replacing_captain_in_regular_slot_clears_captain() {
        let mut assembler = six_mode();
        assembler.assign(RoleSlot::Player1, &id("a1")).unwrap();
        assembler.set_captain(&id("a1")).unwrap();

        assembler.assign(RoleSlot::Player1, &id("b1")).unwrap();
        assert!(assembler.selection().captain_id().is_none());
    }

    #[test]
    fn test_replacing_captain_slot_moves_captaincy() {
        let mut assembler = six_mode();
        assembler.assign(RoleSlot::Captain, &id("a1")).unwrap();
        assembler.assign(RoleSlot::Captain, &id("b1")).unwrap();
        assert_eq!(assembler.selection().captain_id(), Some(&id("b1")));
        assert!(!assembler.selection().contains(&id("a1")));
    }

    #[test]
    fn test_unassigning_captain_clears_captain_and_completeness() {
        let mut assembler = six_mode();
        fill_six(&mut assembler);
        assert!(assembler.is_complete());

        let removed = assembler.unassign(RoleSlot::Captain).unwrap();
        assert_eq!(removed.unwrap().id, id("a1"));
        assert!(assembler.selection().captain_id().is_none());
        assert!(!assembler.is_complete());

        // A refilled Captain slot with captaincy toggled off stays incomplete.
        assembler.assign(RoleSlot::Captain, &id("c1")).unwrap();
        assembler.set_captain(&id("c1")).unwrap();
        assert!(!assembler.is_complete());
    }

    #[test]
    fn test_unassigning_toggled_captain_in_regular_slot() {
        let mut assembler = six_mode();
        fill_six(&mut assembler);
        assembler.set_captain(&id("c3")).unwrap();

        assembler.unassign(RoleSlot::Player2).unwrap();
        assert!(assembler.selection().captain_id().is_none());
    }

    #[test]
    fn test_unassign_empty_slot_is_noop() {
        let mut assembler = four_mode();
        assert!(assembler.unassign(RoleSlot::Player2).unwrap().is_none());
        assert!(assembler.unassign(RoleSlot::Player5).is_err());
    }

    #[test]
    fn test_set_captain_requires_selected_player() {
        let mut assembler = six_mode();
        let err = assembler.set_captain(&id("a1")).unwrap_err();
        assert!(matches!(err, LineupError::CaptainNotSelected(_)));
    }

    #[test]
    fn test_set_captain_twice_toggles_back() {
        let mut assembler = six_mode();
        fill_six(&mut assembler);
        assembler.set_captain(&id("b2")).unwrap();
        let before = assembler.selection().clone();

        assert_eq!(assembler.set_captain(&id("c3")).unwrap(), Some(&id("c3")));
        assert_eq!(assembler.set_captain(&id("c3")).unwrap(), None);
        assert!(assembler.selection().captain_id().is_none());
        assembler.set_captain(&id("b2")).unwrap();

        assert_eq!(assembler.selection(), &before);
    }

    #[test]
    fn test_set_captain_same_player_pair_restores_state() {
        let mut assembler = six_mode();
        fill_six(&mut assembler);
        let before = assembler.selection().clone();

        assembler.set_captain(&id("a1")).unwrap();
        assert!(assembler.selection().captain_id().is_none());
        assembler.set_captain(&id("a1")).unwrap();
        assert_eq!(assembler.selection(), &before);
    }

    #[test]
    fn test_cost_monotone_with_fixed_captain() {
        let mut assembler = six_mode();
        let mut last = assembler.cost().total_salary;
        for (role, pick) in RoleSlot::ALL.iter().zip(["a1", "b2", "c3", "d4", "a5", "b6"]) {
            assembler.assign(*role, &id(pick)).unwrap();
            let now = assembler.cost().total_salary;
            assert!(now >= last);
            last = now;
        }
        for role in RoleSlot::ALL.iter().skip(1) {
            assembler.unassign(*role).unwrap();
            let now = assembler.cost().total_salary;
            assert!(now <= last);
            last = now;
        }
    }

    #[test]
    fn test_captain_change_shifts_cost_by_half_difference() {
        let mut assembler = six_mode();
        fill_six(&mut assembler);
        assembler.set_captain(&id("b2")).unwrap();
        let with_b2 = assembler.cost().total_salary.as_f64();
        assembler.set_captain(&id("b6")).unwrap();
        let with_b6 = assembler.cost().total_salary.as_f64();

        assert_eq!(with_b6 - with_b2, 0.5 * (6500.0 - 8500.0));
    }

    #[test]
    fn test_six_mode_scenario_cost() {
        let mut assembler = six_mode();
        fill_six(&mut assembler);

        let budget = assembler.cost();
        assert_eq!(budget.total_salary.as_f64(), 51_000.0);
        assert_eq!(budget.remaining.as_f64(), -1000.0);
        assert!(budget.is_over_budget());
    }

    #[tokio::test]
    async fn test_six_mode_scenario_strict_rejects() {
        let mut assembler = six_mode();
        fill_six(&mut assembler);
        let repo = InMemoryLineupRepository::new();

        let err = assembler.save(&repo, "Too rich", 10).await.unwrap_err();
        match err {
            LineupError::OverBudget {
                salary_cap,
                over_by,
            } => {
                assert_eq!(salary_cap, 50_000);
                assert_eq!(over_by, 1000.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(repo.list().await.unwrap().is_empty());
        assert!(assembler.is_complete());
    }

    #[tokio::test]
    async fn test_six_mode_scenario_lenient_saves_flagged() {
        let mut assembler = six_mode().with_policy(BudgetPolicy::Lenient);
        fill_six(&mut assembler);
        let repo = InMemoryLineupRepository::new();

        let lineup = assembler.save(&repo, "Too rich", 10).await.unwrap();
        assert!(lineup.over_budget);
        assert_eq!(lineup.total_salary, 51_000.0);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[test]
    fn test_is_complete_requires_count_and_captain() {
        let mut assembler = four_mode();
        assert!(!assembler.is_complete());
        assert_eq!(assembler.missing_count(), 4);

        assembler.assign(RoleSlot::Player1, &id("a1")).unwrap();
        assembler.assign(RoleSlot::Player2, &id("a2")).unwrap();
        assembler.assign(RoleSlot::Player3, &id("a3")).unwrap();
        assembler.assign(RoleSlot::Captain, &id("b1")).unwrap();
        assert!(assembler.is_complete());

        assembler.set_captain(&id("b1")).unwrap();
        assert!(!assembler.is_complete());
        assert_eq!(assembler.missing_count(), 1);
    }

    #[test]
    fn test_missing_count_never_exceeds_slot_count() {
        let mut assembler = four_mode();
        assert!(assembler.missing_count() <= assembler.mode().required_players());

        // Captaincy moved off the empty Captain slot onto Player 1.
        assembler.assign(RoleSlot::Player1, &id("a1")).unwrap();
        assembler.set_captain(&id("a1")).unwrap();
        assert_eq!(assembler.missing_count(), 3);

        assembler.set_captain(&id("a1")).unwrap();
        assert_eq!(assembler.missing_count(), 3);

        assembler.assign(RoleSlot::Captain, &id("b1")).unwrap();
        assert_eq!(assembler.missing_count(), 2);

        assembler.assign(RoleSlot::Player2, &id("a2")).unwrap();
        assembler.assign(RoleSlot::Player3, &id("a3")).unwrap();
        assembler.set_captain(&id("b1")).unwrap();
        assert!(!assembler.is_complete());
        assert_eq!(assembler.missing_count(), 1);
        assert_eq!(
            assembler.build_lineup("", 0).unwrap_err().to_string(),
            "Please fill all 4 slots and select a captain (1 missing)"
        );
    }

    #[tokio::test]
    async fn test_save_incomplete_reports_missing() {
        let mut assembler = six_mode();
        assembler.assign(RoleSlot::Player1, &id("a1")).unwrap();
        let repo = InMemoryLineupRepository::new();

        let err = assembler.save(&repo, "", 0).await.unwrap_err();
        match err {
            LineupError::IncompleteLineup { missing, required } => {
                assert_eq!(required, 6);
                assert_eq!(missing, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_save_round_trips_selection() {
        let mut assembler = four_mode();
        fill_four_affordable(&mut assembler);
        assembler.set_captain(&id("b6")).unwrap();
        let before = assembler.selection().clone();
        let repo = InMemoryLineupRepository::new();

        let lineup = assembler.save(&repo, "  Cheap four ", 5).await.unwrap();

        assert_eq!(lineup.lineup_name, "Cheap four");
        assert_eq!(lineup.status, LineupStatus::Active);
        assert_eq!(lineup.total_points, 0.0);
        assert_eq!(lineup.entry_fee, 5);
        assert_eq!(lineup.mode, Mode::Four);
        assert!(!lineup.over_budget);

        let rebuilt: Vec<(RoleSlot, PlayerId)> = lineup
            .players
            .iter()
            .map(|e| (e.role, e.player_id.clone()))
            .collect();
        let expected: Vec<(RoleSlot, PlayerId)> =
            before.iter().map(|(r, p)| (r, p.id.clone())).collect();
        assert_eq!(rebuilt, expected);
        assert_eq!(lineup.captain_id.as_ref(), before.captain_id());
        assert_eq!(lineup.captain().unwrap().player_id, id("b6"));
        assert_eq!(lineup.players.iter().filter(|e| e.is_captain).count(), 1);

        assert!(assembler.selection().is_empty());
        assert_eq!(repo.list().await.unwrap(), vec![lineup]);
    }

    #[tokio::test]
    async fn test_save_default_name() {
        let mut assembler = four_mode();
        fill_four_affordable(&mut assembler);
        let repo = InMemoryLineupRepository::new();

        let lineup = assembler.save(&repo, "   ", 0).await.unwrap();
        assert_eq!(lineup.lineup_name, "Pick4 A vs B");
        assert_eq!(lineup.players[0].role, RoleSlot::Captain);
    }

    #[tokio::test]
    async fn test_repository_failure_propagates_and_keeps_selection() {
        let mut assembler = four_mode();
        fill_four_affordable(&mut assembler);

        let err = assembler.save(&FailingRepository, "x", 0).await.unwrap_err();
        match err {
            LineupError::Repository(RepositoryError::Unavailable(msg)) => {
                assert_eq!(msg, "disk full")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(assembler.is_complete());
    }

    #[test]
    fn test_selectable_players_filters_sorts_and_flags() {
        let mut assembler = four_mode();
        assembler.assign(RoleSlot::Captain, &id("a1")).unwrap();
        assembler.assign(RoleSlot::Player1, &id("b1")).unwrap();
        // 13 500 + 9000 = 22 500 used, remaining -2500.

        let candidates = assembler.selectable_players(RoleSlot::Player2, "").unwrap();
        assert_eq!(candidates.len(), 12);
        assert!(candidates.iter().all(|c| c.player.id != id("a1")));
        assert!(candidates
            .windows(2)
            .all(|w| w[0].player.salary >= w[1].player.salary));
        assert!(candidates.iter().all(|c| !c.affordable));

        // Replacing b1 frees 9000: remaining becomes 6500.
        let for_p1 = assembler.selectable_players(RoleSlot::Player1, "").unwrap();
        let affordable: Vec<u32> = for_p1
            .iter()
            .filter(|c| c.affordable)
            .map(|c| c.player.salary)
            .collect();
        assert!(affordable.iter().all(|s| *s <= 6500));
        assert!(affordable.contains(&6500));
        assert!(affordable.contains(&500));
        assert!(affordable.contains(&2000));
        assert!(!affordable.contains(&7000));
    }

    #[test]
    fn test_selectable_players_search() {
        let assembler = four_mode();
        let found = assembler.selectable_players(RoleSlot::Player1, "bargain").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].player.id, id("cheap"));
        assert!(found[0].affordable);

        let by_team = assembler.selectable_players(RoleSlot::Player1, "b-").unwrap();
        assert_eq!(by_team.len(), 6);
    }

    #[test]
    fn test_lineup_ids_differ_between_saves() {
        let mut assembler = four_mode();
        fill_four_affordable(&mut assembler);
        let first = assembler.build_lineup("same", 0).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = assembler.build_lineup("same", 0).unwrap();
        assert_ne!(first.id, second.id);
    }
}
