//! Game modes, eligibility scopes and role slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which matches contribute eligible players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Only the two teams of the active match
    Game,
    /// Every team playing on the active match's calendar day
    #[default]
    Day,
    /// Every team in the fixture set
    Event,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Game => "game",
            Scope::Day => "day",
            Scope::Event => "event",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    /// Unrecognised values fall back to `Event`, the widest scope.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "game" => Scope::Game,
            "day" => Scope::Day,
            _ => Scope::Event,
        })
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|r| serde::de::Error::custom(format!("unknown scope: {}", r)))
    }
}

/// A named slot in the lineup template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleSlot {
    Captain,
    Player1,
    Player2,
    Player3,
    Player4,
    Player5,
}

impl RoleSlot {
    pub const ALL: [RoleSlot; 6] = [
        RoleSlot::Captain,
        RoleSlot::Player1,
        RoleSlot::Player2,
        RoleSlot::Player3,
        RoleSlot::Player4,
        RoleSlot::Player5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleSlot::Captain => "Captain",
            RoleSlot::Player1 => "Player 1",
            RoleSlot::Player2 => "Player 2",
            RoleSlot::Player3 => "Player 3",
            RoleSlot::Player4 => "Player 4",
            RoleSlot::Player5 => "Player 5",
        }
    }

    pub fn is_captain(&self) -> bool {
        matches!(self, RoleSlot::Captain)
    }
}

impl fmt::Display for RoleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "captain" => Ok(RoleSlot::Captain),
            "player1" => Ok(RoleSlot::Player1),
            "player2" => Ok(RoleSlot::Player2),
            "player3" => Ok(RoleSlot::Player3),
            "player4" => Ok(RoleSlot::Player4),
            "player5" => Ok(RoleSlot::Player5),
            _ => Err(s.to_string()),
        }
    }
}

impl Serialize for RoleSlot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoleSlot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|r| serde::de::Error::custom(format!("unknown role slot: {}", r)))
    }
}

/// Slot-count and salary-cap configuration for a lineup session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Pick6: captain plus five players under a 50 000 cap
    Six,
    /// Pick4: captain plus three players under a 20 000 cap
    Four,
}

const SIX_TEMPLATE: [RoleSlot; 6] = RoleSlot::ALL;

const FOUR_TEMPLATE: [RoleSlot; 4] = [
    RoleSlot::Captain,
    RoleSlot::Player1,
    RoleSlot::Player2,
    RoleSlot::Player3,
];

impl Mode {
    pub fn for_scope(scope: Scope) -> Self {
        match scope {
            Scope::Game => Mode::Four,
            Scope::Day | Scope::Event => Mode::Six,
        }
    }

    pub fn salary_cap(&self) -> u32 {
        match self {
            Mode::Six => 50_000,
            Mode::Four => 20_000,
        }
    }

    /// Ordered slots, Captain first.
    pub fn role_template(&self) -> &'static [RoleSlot] {
        match self {
            Mode::Six => &SIX_TEMPLATE,
            Mode::Four => &FOUR_TEMPLATE,
        }
    }

    /// Total picks including the Captain slot.
    pub fn required_players(&self) -> usize {
        self.role_template().len()
    }

    pub fn has_slot(&self, role: RoleSlot) -> bool {
        self.role_template().contains(&role)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Six => "Pick6",
            Mode::Four => "Pick4",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
