// Roster service: the operations a host calls, wired to the store and the
// state sink.
//
// Every mutation writes to the durable store first and only then pushes the
// new list to the sink. Each list is published as soon as its own write
// succeeds, so a failed second write never leaves the first one unpublished.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::clipboard::ClipboardSource;
use crate::config::Config;
use crate::engine::attendance::{extract_candidate_names, AttendanceBuffer};
use crate::engine::matcher::resolve;
use crate::engine::normalize::same_name;
use crate::engine::partition::{partition, TeamPair};
use crate::engine::provision::provision;
use crate::error::RosterError;
use crate::player::{Player, Position};
use crate::sink::StateSink;
use crate::store::{load_players, save_players, KeyValueStore};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Input for manual player creation. Levels are clamped to `[1, 10]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub name: String,
    pub position: Position,
    pub skill_level: i64,
    pub fitness_level: i64,
}

/// Outcome of running attendance text through the resolution pipeline.
#[derive(Debug, Clone, Default)]
pub struct AttendanceReport {
    /// Names extracted from the text, in order.
    pub candidates: Vec<String>,
    /// Existing roster players that matched a candidate.
    pub matched: Vec<Player>,
    /// Players created for unmatched names and appended to the roster.
    pub created: Vec<Player>,
    /// Normalized names listed more than once.
    pub duplicate_names: BTreeSet<String>,
    /// The new participant set: `matched` followed by `created`.
    pub participants: Vec<Player>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub added: Vec<Player>,
    /// Names skipped because the roster (or an earlier row) already had them.
    pub skipped: Vec<String>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct LineupService<S, K> {
    store: S,
    sink: K,
    config: Config,
    rng: StdRng,
}

impl<S: KeyValueStore, K: StateSink> LineupService<S, K> {
    /// Create a service with an entropy-seeded random source.
    pub fn new(store: S, sink: K, config: Config) -> Self {
        LineupService {
            store,
            sink,
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source with a seeded one, for reproducible teams.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn roster(&self) -> Result<Vec<Player>, RosterError> {
        Ok(load_players(&self.store, &self.config.storage.roster_key)?)
    }

    pub fn participants(&self) -> Result<Vec<Player>, RosterError> {
        Ok(load_players(&self.store, &self.config.storage.participants_key)?)
    }

    /// Push the persisted lists to the sink, e.g. once at startup.
    pub fn publish(&mut self) -> Result<(), RosterError> {
        let roster = self.roster()?;
        let participants = self.participants()?;
        self.sink.replace_roster(roster);
        self.sink.replace_participants(participants);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Roster edits
    // ------------------------------------------------------------------

    /// Add a player by hand.
    ///
    /// Fails with [`RosterError::EmptyName`] for a blank name and
    /// [`RosterError::DuplicateName`] when the normalized name is taken.
    pub fn create_player(&mut self, new: NewPlayer) -> Result<Player, RosterError> {
        let mut roster = self.roster()?;
        let name = validate_name(&new.name, &roster, None)?;

        let player = Player::new(
            Player::generate_id(),
            name,
            new.position,
            new.skill_level,
            new.fitness_level,
        );
        roster.push(player.clone());
        self.persist_roster(roster)?;

        info!("Created player {} ({})", player.name, player.id);
        Ok(player)
    }

    /// Replace the player with the same id. The copy in the participant set is
    /// refreshed too.
    pub fn update_player(&mut self, updated: Player) -> Result<Player, RosterError> {
        let mut roster = self.roster()?;
        let idx = roster
            .iter()
            .position(|p| p.id == updated.id)
            .ok_or_else(|| RosterError::UnknownPlayer(updated.id.clone()))?;
        let name = validate_name(&updated.name, &roster, Some(&updated.id))?;

        let player = Player::new(
            updated.id,
            name,
            updated.position,
            i64::from(updated.skill_level),
            i64::from(updated.fitness_level),
        );
        roster[idx] = player.clone();

        let mut participants = self.participants()?;
        let mut in_game = false;
        for p in participants.iter_mut().filter(|p| p.id == player.id) {
            *p = player.clone();
            in_game = true;
        }

        self.persist_roster(roster)?;
        if in_game {
            self.persist_participants(participants)?;
        }

        info!("Updated player {} ({})", player.name, player.id);
        Ok(player)
    }

    /// Remove a player from the roster and from the participant set.
    pub fn delete_player(&mut self, id: &str) -> Result<Player, RosterError> {
        let mut roster = self.roster()?;
        let idx = roster
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RosterError::UnknownPlayer(id.to_string()))?;
        let removed = roster.remove(idx);

        let mut participants = self.participants()?;
        let before = participants.len();
        participants.retain(|p| p.id != id);
        let in_game = participants.len() != before;

        self.persist_roster(roster)?;
        if in_game {
            self.persist_participants(participants)?;
        }

        info!("Deleted player {} ({})", removed.name, removed.id);
        Ok(removed)
    }

    /// Bulk-add players, skipping names already on the roster.
    pub fn import_players(&mut self, rows: Vec<NewPlayer>) -> Result<ImportReport, RosterError> {
        let mut roster = self.roster()?;
        let mut report = ImportReport::default();

        for row in rows {
            match validate_name(&row.name, &roster, None) {
                Ok(name) => {
                    let player = Player::new(
                        Player::generate_id(),
                        name,
                        row.position,
                        row.skill_level,
                        row.fitness_level,
                    );
                    roster.push(player.clone());
                    report.added.push(player);
                }
                Err(RosterError::EmptyName) => debug!("Skipping import row with blank name"),
                Err(RosterError::DuplicateName(name)) => report.skipped.push(name),
                Err(other) => return Err(other),
            }
        }

        if !report.added.is_empty() {
            self.persist_roster(roster)?;
        }
        info!(
            "Imported {} player(s), skipped {} duplicate(s)",
            report.added.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Participant set
    // ------------------------------------------------------------------

    /// Flip a roster player's membership in the participant set.
    ///
    /// Returns `true` if the player is now participating. Removing drops every
    /// entry with that id.
    pub fn toggle_participant(&mut self, id: &str) -> Result<bool, RosterError> {
        let mut participants = self.participants()?;
        let now_in = if participants.iter().any(|p| p.id == id) {
            participants.retain(|p| p.id != id);
            false
        } else {
            let player = self
                .roster()?
                .into_iter()
                .find(|p| p.id == id)
                .ok_or_else(|| RosterError::UnknownPlayer(id.to_string()))?;
            participants.push(player);
            true
        };

        self.persist_participants(participants)?;
        debug!("Toggled participant {id}: now playing = {now_in}");
        Ok(now_in)
    }

    /// Empty the participant set. The roster is untouched.
    pub fn clear_participants(&mut self) -> Result<(), RosterError> {
        self.store.remove(&self.config.storage.participants_key)?;
        self.sink.replace_participants(Vec::new());
        info!("Cleared participant set");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attendance
    // ------------------------------------------------------------------

    /// Start an attendance workflow from the clipboard.
    ///
    /// The clipboard text is applied as a single edit to an empty buffer, so a
    /// pasted numbered list is reduced to its names straight away.
    pub async fn begin_attendance(
        &self,
        clipboard: &dyn ClipboardSource,
    ) -> Result<AttendanceBuffer, RosterError> {
        let text = clipboard.read_text().await?;
        let mut buffer = AttendanceBuffer::new();
        buffer.edit(&text);
        Ok(buffer)
    }

    /// Resolve attendance text into the new participant set.
    ///
    /// Known names are matched (accent- and case-insensitively); unknown names
    /// become new players with default attributes and are appended to the
    /// roster. The participant set is replaced by the matched players followed
    /// by the new ones. Repeated names are reported but not merged.
    pub fn resolve_attendance(&mut self, text: &str) -> Result<AttendanceReport, RosterError> {
        let candidates = extract_candidate_names(text);
        let mut roster = self.roster()?;

        let resolution = resolve(&candidates, &roster);
        if !resolution.duplicate_names.is_empty() {
            warn!(
                "Attendance lists some names more than once: {:?}",
                resolution.duplicate_names
            );
        }

        let created = provision(
            &resolution.unmatched_names,
            roster.iter().map(|p| p.id.as_str()),
            &self.config.provisioning,
        );

        let mut participants = resolution.matched.clone();
        participants.extend(created.iter().cloned());

        if !created.is_empty() {
            roster.extend(created.iter().cloned());
            self.persist_roster(roster)?;
        }
        self.persist_participants(participants.clone())?;

        info!(
            "Resolved attendance: {} candidate(s), {} matched, {} created",
            candidates.len(),
            resolution.matched.len(),
            created.len()
        );

        Ok(AttendanceReport {
            candidates,
            matched: resolution.matched,
            created,
            duplicate_names: resolution.duplicate_names,
            participants,
        })
    }

    // ------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------

    /// Split the current participant set into two teams. Each call may give a
    /// different split.
    pub fn generate_teams(&mut self) -> Result<TeamPair, RosterError> {
        let participants = self.participants()?;
        let teams = partition(&participants, &self.config.balance, &mut self.rng);
        info!(
            "Generated teams for {} participant(s): {} vs {}",
            participants.len(),
            teams.team_a.len(),
            teams.team_b.len()
        );
        Ok(teams)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn persist_roster(&mut self, roster: Vec<Player>) -> Result<(), RosterError> {
        save_players(&self.store, &self.config.storage.roster_key, &roster)?;
        self.sink.replace_roster(roster);
        Ok(())
    }

    fn persist_participants(&mut self, participants: Vec<Player>) -> Result<(), RosterError> {
        save_players(&self.store, &self.config.storage.participants_key, &participants)?;
        self.sink.replace_participants(participants);
        Ok(())
    }
}

/// Clean up a manually entered name and check it against the roster.
///
/// The stored name is trimmed with inner whitespace collapsed; casing is kept
/// as typed. `own_id` excludes the player being edited from the duplicate check.
fn validate_name(
    raw: &str,
    roster: &[Player],
    own_id: Option<&str>,
) -> Result<String, RosterError> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        return Err(RosterError::EmptyName);
    }
    let taken = roster
        .iter()
        .filter(|p| Some(p.id.as_str()) != own_id)
        .any(|p| same_name(&p.name, &name));
    if taken {
        return Err(RosterError::DuplicateName(name));
    }
    Ok(name)
}
