use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{resolve_scope, ApiError};
use crate::lineup::{LineupAssembler, SelectablePlayer};
use crate::models::{Event, Match, MatchId, Mode, RoleSlot, Scope};

#[derive(Debug, Deserialize)]
pub struct MatchParams {
    pub scope: Option<String>,
}

/// Everything the builder page needs before the first pick.
#[derive(Debug, Serialize)]
pub struct MatchDetailResponse {
    #[serde(rename = "match")]
    pub matchup: Match,
    pub event: Option<Event>,
    pub scope: Scope,
    pub mode: Mode,
    pub salary_cap: u32,
    pub role_template: Vec<RoleSlot>,
    pub eligible_player_count: usize,
}

pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MatchParams>,
) -> Result<Json<MatchDetailResponse>, ApiError> {
    let scope = resolve_scope(params.scope.as_deref());
    let assembler = LineupAssembler::new(state.fixtures.clone(), &MatchId::from(id), scope)?;
    let matchup = assembler.active_match().clone();

    Ok(Json(MatchDetailResponse {
        event: state.fixtures.event(&matchup.event_id).cloned(),
        scope,
        mode: assembler.mode(),
        salary_cap: assembler.salary_cap(),
        role_template: assembler.role_template().to_vec(),
        eligible_player_count: assembler.eligible_players().len(),
        matchup,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MatchPlayersParams {
    pub scope: Option<String>,
    /// Slot being filled; defaults to Captain
    pub role: Option<String>,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Serialize)]
pub struct MatchPlayersResponse {
    pub match_id: String,
    pub scope: Scope,
    pub role: RoleSlot,
    pub players: Vec<SelectablePlayer>,
}

/// Player picker for an empty lineup: eligible players, most expensive
/// first, flagged by whether they fit under the cap.
pub async fn list_match_players(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<MatchPlayersParams>,
) -> Result<Json<MatchPlayersResponse>, ApiError> {
    let match_id = MatchId::from(id);
    let scope = resolve_scope(params.scope.as_deref());
    let assembler = LineupAssembler::new(state.fixtures.clone(), &match_id, scope)?;

    let role = match params.role.as_deref() {
        Some(raw) => assembler.parse_role(raw)?,
        None => RoleSlot::Captain,
    };
    let players = assembler.selectable_players(role, &params.search)?;

    Ok(Json(MatchPlayersResponse {
        match_id: match_id.to_string(),
        scope,
        role,
        players,
    }))
}
