//! Tournament event model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EventId;

/// A tournament event that groups matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,

    pub name: String,

    /// Game title (e.g. "CS2")
    #[serde(default)]
    pub game: String,

    #[serde(default)]
    pub league_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub active: bool,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,
}

impl Event {
    pub fn new(id: &str, name: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: EventId::from(id),
            name: name.to_string(),
            game: String::new(),
            league_id: String::new(),
            organizer: None,
            logo_url: None,
            description: None,
            active: true,
            start_date,
            end_date,
        }
    }

    /// Whether the given day falls inside the event window (inclusive).
    pub fn covers(&self, day: NaiveDate) -> bool {
        day >= self.start_date && day <= self.end_date
    }
}
