use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{resolve_scope, ApiError, Pagination, PaginationMeta};
use crate::models::{Event, EventId, Match, Scope};

#[derive(Debug, Deserialize)]
pub struct ListEventsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub game: Option<String>,
    /// Only events still open for lineups
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct EventSummary {
    pub id: String,
    pub name: String,
    pub game: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub active: bool,
    pub match_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventSummary>,
    pub pagination: PaginationMeta,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> Result<Json<EventListResponse>, ApiError> {
    let mut events: Vec<&Event> = state.fixtures.events().iter().collect();

    if let Some(ref game) = params.game {
        events.retain(|e| e.game.eq_ignore_ascii_case(game));
    }
    if let Some(active) = params.active {
        events.retain(|e| e.active == active);
    }

    // Newest first
    events.sort_by(|a, b| {
        b.start_date
            .cmp(&a.start_date)
            .then_with(|| a.name.cmp(&b.name))
    });

    let pagination = Pagination::new(params.page, params.page_size);
    let (page, meta) = pagination.apply(&events);

    let summaries = page
        .iter()
        .map(|event| EventSummary {
            id: event.id.to_string(),
            name: event.name.clone(),
            game: event.game.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            active: event.active,
            match_count: state.fixtures.matches_for_event(&event.id).count(),
        })
        .collect();

    Ok(Json(EventListResponse {
        events: summaries,
        pagination: meta,
    }))
}

#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: Event,
    pub match_days: Vec<NaiveDate>,
    pub match_count: usize,
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventDetailResponse>, ApiError> {
    let event_id = EventId::from(id);
    let event = state
        .fixtures
        .event(&event_id)
        .ok_or_else(|| ApiError::NotFound(format!("Event {}", event_id)))?;

    Ok(Json(EventDetailResponse {
        event: event.clone(),
        match_days: state.fixtures.match_days(&event_id),
        match_count: state.fixtures.matches_for_event(&event_id).count(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct EventMatchesParams {
    pub scope: Option<String>,
    /// `YYYY-MM-DD`; only used by the day scope
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventMatchesResponse {
    pub event_id: String,
    pub scope: Scope,
    /// Day shown under the day scope
    pub date: Option<NaiveDate>,
    pub match_days: Vec<NaiveDate>,
    pub matches: Vec<Match>,
}

/// Matches of an event, optionally narrowed to one day.
///
/// Under the day scope without an explicit `date`, the day of the first
/// listed match is used.
pub async fn list_event_matches(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<EventMatchesParams>,
) -> Result<Json<EventMatchesResponse>, ApiError> {
    let event_id = EventId::from(id);
    if state.fixtures.event(&event_id).is_none() {
        return Err(ApiError::NotFound(format!("Event {}", event_id)));
    }

    let scope = resolve_scope(params.scope.as_deref());
    let mut matches: Vec<Match> = state
        .fixtures
        .matches_for_event(&event_id)
        .cloned()
        .collect();

    let date = match scope {
        Scope::Day => {
            let day = match params.date.as_deref() {
                Some(raw) => Some(raw.parse::<NaiveDate>().map_err(|_| {
                    ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
                })?),
                None => matches.first().map(Match::day),
            };
            if let Some(day) = day {
                matches.retain(|m| m.day() == day);
            }
            day
        }
        Scope::Game | Scope::Event => None,
    };

    matches.sort_by_key(|m| m.match_date);

    Ok(Json(EventMatchesResponse {
        event_id: event_id.to_string(),
        scope,
        date,
        match_days: state.fixtures.match_days(&event_id),
        matches,
    }))
}
