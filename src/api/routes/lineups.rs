use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Pagination, PaginationMeta};
use crate::calculate::{summarize_lineups, SalaryAmount};
use crate::lineup::{LineupDraft, SelectionState};
use crate::models::{Lineup, LineupStatus, LineupSummary, Mode, RoleSlot, Scope};

/// Validate and persist a lineup in one request.
pub async fn create_lineup(
    State(state): State<AppState>,
    Json(draft): Json<LineupDraft>,
) -> Result<(StatusCode, Json<Lineup>), ApiError> {
    let policy = state.config.lineup.budget_policy;
    let mut assembler = draft.assemble(state.fixtures.clone(), policy)?;
    let entry_fee = draft
        .entry_fee
        .unwrap_or(state.config.lineup.default_entry_fee);

    let lineup = assembler
        .save(state.repository.as_ref(), &draft.lineup_name, entry_fee)
        .await?;

    Ok((StatusCode::CREATED, Json(lineup)))
}

#[derive(Debug, Serialize)]
pub struct BudgetView {
    pub salary_cap: u32,
    pub total_salary: SalaryAmount,
    pub remaining: SalaryAmount,
    pub percent_used: f64,
    pub over_budget: bool,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub scope: Scope,
    pub mode: Mode,
    pub role_template: Vec<RoleSlot>,
    pub selection: SelectionState,
    pub budget: BudgetView,
    pub is_complete: bool,
    pub missing: usize,
}

/// Replay a draft without saving it and report where it stands.
pub async fn preview_lineup(
    State(state): State<AppState>,
    Json(draft): Json<LineupDraft>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let policy = state.config.lineup.budget_policy;
    let assembler = draft.assemble(state.fixtures.clone(), policy)?;
    let budget = assembler.cost();

    Ok(Json(PreviewResponse {
        scope: assembler.scope(),
        mode: assembler.mode(),
        role_template: assembler.role_template().to_vec(),
        selection: assembler.selection().clone(),
        budget: BudgetView {
            salary_cap: budget.salary_cap,
            total_salary: budget.total_salary,
            remaining: budget.remaining,
            percent_used: budget.percent_used(),
            over_budget: budget.is_over_budget(),
        },
        is_complete: assembler.is_complete(),
        missing: assembler.missing_count(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListLineupsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub match_id: Option<String>,
    pub status: Option<LineupStatus>,
}

#[derive(Debug, Serialize)]
pub struct LineupListResponse {
    pub lineups: Vec<Lineup>,
    pub summary: LineupSummary,
    pub pagination: PaginationMeta,
}

/// Saved lineups, newest first. The summary counts every stored lineup,
/// regardless of filters.
pub async fn list_lineups(
    State(state): State<AppState>,
    Query(params): Query<ListLineupsParams>,
) -> Result<Json<LineupListResponse>, ApiError> {
    let all = state
        .repository
        .list()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let summary = summarize_lineups(&all);

    let mut lineups = all;
    if let Some(ref match_id) = params.match_id {
        lineups.retain(|l| l.match_id.as_str() == match_id.as_str());
    }
    if let Some(status) = params.status {
        lineups.retain(|l| l.status == status);
    }
    lineups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let pagination = Pagination::new(params.page, params.page_size);
    let (page, meta) = pagination.apply(&lineups);

    Ok(Json(LineupListResponse {
        lineups: page.to_vec(),
        summary,
        pagination: meta,
    }))
}
