//! Match model.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{EventId, MatchId};

/// A scheduled match between two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,

    pub event_id: EventId,

    pub team_a: String,

    pub team_b: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_a_logo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_b_logo: Option<String>,

    /// Scheduled start. Timestamps without an offset are read as UTC.
    #[serde(with = "match_date")]
    pub match_date: DateTime<FixedOffset>,

    #[serde(default)]
    pub stage: String,

    #[serde(default)]
    pub status: String,

    #[serde(default = "default_best_of")]
    pub best_of: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_in: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<u32>,
}

fn default_best_of() -> u32 {
    1
}

impl Match {
    /// Build a match; an unparseable `match_date` falls back to the Unix epoch.
    pub fn new(id: &str, event_id: &str, team_a: &str, team_b: &str, match_date: &str) -> Self {
        Self {
            id: MatchId::from(id),
            event_id: EventId::from(event_id),
            team_a: team_a.to_string(),
            team_b: team_b.to_string(),
            team_a_logo: None,
            team_b_logo: None,
            match_date: parse_match_date(match_date)
                .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH.fixed_offset()),
            stage: String::new(),
            status: "upcoming".to_string(),
            best_of: default_best_of(),
            buy_in: None,
            entries: None,
            max_entries: None,
        }
    }

    /// Calendar day the match is played on, in the timestamp's own offset.
    pub fn day(&self) -> NaiveDate {
        self.match_date.date_naive()
    }

    pub fn teams(&self) -> [&str; 2] {
        [&self.team_a, &self.team_b]
    }
}

/// Parse an ISO-8601 match timestamp.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC), or a
/// bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_match_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

mod match_date {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_match_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid match_date: {}", raw)))
    }
}
