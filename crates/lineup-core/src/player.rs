// Player records and the aggregate helpers used by team balancing.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Lowest allowed skill / fitness level.
pub const MIN_LEVEL: u8 = 1;
/// Highest allowed skill / fitness level.
pub const MAX_LEVEL: u8 = 10;

/// Playing role of a player on the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Position {
    #[default]
    #[serde(rename = "DEF", alias = "Defender")]
    Defender,
    #[serde(rename = "ATT", alias = "Attacker")]
    Attacker,
}

impl Position {
    /// Parse a position label.
    ///
    /// Accepts the short labels used in storage ("DEF", "ATT") as well as the
    /// long names, case-insensitively.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEF" | "D" | "DEFENDER" => Some(Position::Defender),
            "ATT" | "A" | "ATTACKER" => Some(Position::Attacker),
            _ => None,
        }
    }

    /// Return the short display label for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Defender => "DEF",
            Position::Attacker => "ATT",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Clamp a raw level into `[MIN_LEVEL, MAX_LEVEL]`.
pub fn clamp_level(level: i64) -> u8 {
    level.clamp(i64::from(MIN_LEVEL), i64::from(MAX_LEVEL)) as u8
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(clamp_level(raw.round() as i64))
}

/// A known player on the roster.
///
/// Stored as `{"id","name","position","skillLevel","fitnessLevel"}`. Levels are
/// clamped on construction and on deserialization, so a stored record with an
/// out-of-range level is repaired on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(deserialize_with = "deserialize_level")]
    pub skill_level: u8,
    #[serde(deserialize_with = "deserialize_level")]
    pub fitness_level: u8,
}

impl Player {
    /// Build a player with a caller-supplied id. Levels are clamped.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Position,
        skill_level: i64,
        fitness_level: i64,
    ) -> Self {
        Player {
            id: id.into(),
            name: name.into(),
            position,
            skill_level: clamp_level(skill_level),
            fitness_level: clamp_level(fitness_level),
        }
    }

    /// Generate a fresh opaque player id.
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Sum of skill levels across a team.
pub fn total_skill(team: &[Player]) -> u32 {
    team.iter().map(|p| u32::from(p.skill_level)).sum()
}

/// Sum of fitness levels across a team.
pub fn total_fitness(team: &[Player]) -> u32 {
    team.iter().map(|p| u32::from(p.fitness_level)).sum()
}
