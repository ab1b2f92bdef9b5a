use std::sync::Arc;

use crate::config::AppConfig;
use crate::lineup::LineupRepository;
use crate::stats::StatsClient;
use crate::storage::FixtureStore;

/// Shared, read-only handler state. Each request builds its own
/// assembler on top of it.
#[derive(Clone)]
pub struct AppState {
    pub fixtures: Arc<FixtureStore>,
    pub repository: Arc<dyn LineupRepository>,
    pub stats: Arc<StatsClient>,
    pub config: Arc<AppConfig>,
}
