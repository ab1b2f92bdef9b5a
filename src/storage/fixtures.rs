//! Read-only fixture snapshot of events, matches and players.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::{StorageConfig, StorageError};
use crate::models::{EntityId, Event, Match, Player, Scope};

/// Immutable snapshot of the fixture data.
///
/// Loaded once and shared; nothing mutates it after construction, so every
/// session sees a stable view.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    events: Vec<Event>,
    matches: Vec<Match>,
    players: Vec<Player>,
    event_index: HashMap<EntityId, usize>,
    match_index: HashMap<EntityId, usize>,
    player_index: HashMap<EntityId, usize>,
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    if !path.exists() {
        return Err(StorageError::PathNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| StorageError::Fixture {
        path: path.to_path_buf(),
        source,
    })
}

fn index_by_id<T>(
    kind: &str,
    items: &[T],
    id: impl Fn(&T) -> &EntityId,
) -> HashMap<EntityId, usize> {
    let mut index = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let key = id(item);
        if index.contains_key(key) {
            warn!("Duplicate {} id {}, keeping first", kind, key);
            continue;
        }
        index.insert(key.clone(), i);
    }
    index
}

impl FixtureStore {
    pub fn new(events: Vec<Event>, matches: Vec<Match>, players: Vec<Player>) -> Self {
        let event_index = index_by_id("event", &events, |e| &e.id);
        let match_index = index_by_id("match", &matches, |m| &m.id);
        let player_index = index_by_id("player", &players, |p| &p.id);
        Self {
            events,
            matches,
            players,
            event_index,
            match_index,
            player_index,
        }
    }

    /// Load `events.json`, `matches.json` and `players.json`.
    pub fn load(config: &StorageConfig) -> Result<Self, StorageError> {
        let events: Vec<Event> = read_json_array(&config.events_path())?;
        let matches: Vec<Match> = read_json_array(&config.matches_path())?;
        let players: Vec<Player> = read_json_array(&config.players_path())?;

        info!(
            "Loaded fixtures: {} events, {} matches, {} players from {:?}",
            events.len(),
            matches.len(),
            players.len(),
            config.fixtures_dir
        );

        Ok(Self::new(events, matches, players))
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn event(&self, id: &EntityId) -> Option<&Event> {
        self.event_index.get(id).map(|&i| &self.events[i])
    }

    pub fn find_match(&self, id: &EntityId) -> Option<&Match> {
        self.match_index.get(id).map(|&i| &self.matches[i])
    }

    pub fn player(&self, id: &EntityId) -> Option<&Player> {
        self.player_index.get(id).map(|&i| &self.players[i])
    }

    pub fn matches_for_event<'a>(
        &'a self,
        event_id: &'a EntityId,
    ) -> impl Iterator<Item = &'a Match> {
        self.matches.iter().filter(move |m| &m.event_id == event_id)
    }

    /// Distinct calendar days with matches for an event, ascending.
    pub fn match_days(&self, event_id: &EntityId) -> Vec<NaiveDate> {
        self.matches_for_event(event_id)
            .map(Match::day)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Teams whose players are eligible for `active` under `scope`.
    pub fn eligible_teams<'a>(&'a self, active: &'a Match, scope: Scope) -> BTreeSet<&'a str> {
        match scope {
            Scope::Game => active.teams().into_iter().collect(),
            Scope::Day => {
                let day = active.day();
                self.matches
                    .iter()
                    .filter(|m| m.day() == day)
                    .flat_map(|m| m.teams())
                    .collect()
            }
            Scope::Event => self.matches.iter().flat_map(|m| m.teams()).collect(),
        }
    }

    /// Players eligible for `active` under `scope`, in fixture order.
    pub fn eligible_players<'a>(&'a self, active: &'a Match, scope: Scope) -> Vec<&'a Player> {
        let teams = self.eligible_teams(active, scope);
        self.players
            .iter()
            .filter(|p| teams.contains(p.team.as_str()))
            .collect()
    }
}
