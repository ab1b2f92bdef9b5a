use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::stats::extract_event_id;

/// Relay `{"event_id": ...}` to the statistics service and return its JSON
/// untouched.
pub async fn event_stats(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
    let event_id = extract_event_id(&body)?;
    let data = state.stats.lookup_event(&event_id).await?;
    Ok(Json(data))
}
