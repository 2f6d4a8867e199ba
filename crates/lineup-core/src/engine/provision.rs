// Auto-creation of players for attendance names with no roster match.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::player::{Player, Position};

/// Attributes given to auto-created players.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvisionDefaults {
    pub position: Position,
    pub skill_level: u8,
    pub fitness_level: u8,
}

impl Default for ProvisionDefaults {
    fn default() -> Self {
        ProvisionDefaults {
            position: Position::Defender,
            skill_level: 5,
            fitness_level: 5,
        }
    }
}

/// Turn a typed name into a display name: lowercase, collapse whitespace,
/// capitalize the first letter of each word.
///
/// `"  ana   MARIA "` becomes `"Ana Maria"`.
pub fn title_case(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Create one player per unmatched name, in order.
///
/// Ids are fresh and never collide with `existing_ids` or with each other.
/// Names that are blank after cleanup are skipped.
pub fn provision<'a>(
    unmatched_names: &[String],
    existing_ids: impl IntoIterator<Item = &'a str>,
    defaults: &ProvisionDefaults,
) -> Vec<Player> {
    let mut taken: HashSet<String> = existing_ids.into_iter().map(str::to_string).collect();
    let mut created = Vec::with_capacity(unmatched_names.len());

    for raw in unmatched_names {
        let name = title_case(raw);
        if name.is_empty() {
            debug!("Skipping blank attendance name {raw:?}");
            continue;
        }

        let mut id = Player::generate_id();
        while taken.contains(&id) {
            id = Player::generate_id();
        }
        taken.insert(id.clone());

        created.push(Player::new(
            id,
            name,
            defaults.position,
            i64::from(defaults.skill_level),
            i64::from(defaults.fitness_level),
        ));
    }

    created
}
