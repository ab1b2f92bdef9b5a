use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub events: usize,
    pub matches: usize,
    pub players: usize,
    pub repository: &'static str,
    pub budget_policy: crate::lineup::BudgetPolicy,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        events: state.fixtures.events().len(),
        matches: state.fixtures.matches().len(),
        players: state.fixtures.players().len(),
        repository: state.repository.name(),
        budget_policy: state.config.lineup.budget_policy,
    })
}
