// Shared application state: whole-list replace updates pushed to readers.

use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::debug;

use crate::player::Player;

/// A whole-list replacement pushed after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateUpdate {
    Roster(Vec<Player>),
    Participants(Vec<Player>),
}

/// Receiver of state replacements. Write-only from the service's side.
pub trait StateSink {
    fn replace_roster(&mut self, players: Vec<Player>);
    fn replace_participants(&mut self, players: Vec<Player>);
}

/// Latest roster and participant lists, readable from anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub roster: Vec<Player>,
    pub participants: Vec<Player>,
}

/// Cloneable handle to a shared [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<Snapshot>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current lists.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.read().expect("shared state lock poisoned").clone()
    }
}

impl StateSink for SharedState {
    fn replace_roster(&mut self, players: Vec<Player>) {
        self.inner.write().expect("shared state lock poisoned").roster = players;
    }

    fn replace_participants(&mut self, players: Vec<Player>) {
        self.inner.write().expect("shared state lock poisoned").participants = players;
    }
}

/// Forward updates over a channel to an event-driven host.
impl StateSink for mpsc::UnboundedSender<StateUpdate> {
    fn replace_roster(&mut self, players: Vec<Player>) {
        if self.send(StateUpdate::Roster(players)).is_err() {
            debug!("State receiver dropped; roster update discarded");
        }
    }

    fn replace_participants(&mut self, players: Vec<Player>) {
        if self.send(StateUpdate::Participants(players)).is_err() {
            debug!("State receiver dropped; participant update discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;

    fn ana() -> Player {
        Player::new("1", "Ana", Position::Attacker, 5, 5)
    }

    #[test]
    fn shared_state_clones_see_updates() {
        let state = SharedState::new();
        let mut writer = state.clone();
        writer.replace_roster(vec![ana()]);
        writer.replace_participants(vec![ana(), ana()]);

        let snap = state.snapshot();
        assert_eq!(snap.roster.len(), 1);
        assert_eq!(snap.participants.len(), 2);
    }

    #[tokio::test]
    async fn channel_sink_forwards_updates_in_order() {
        let (mut tx, mut rx) = mpsc::unbounded_channel();
        tx.replace_roster(vec![ana()]);
        tx.replace_participants(Vec::new());

        assert_eq!(rx.recv().await, Some(StateUpdate::Roster(vec![ana()])));
        assert_eq!(rx.recv().await, Some(StateUpdate::Participants(Vec::new())));
    }

    #[test]
    fn channel_sink_tolerates_closed_receiver() {
        let (mut tx, rx) = mpsc::unbounded_channel::<StateUpdate>();
        drop(rx);
        tx.replace_roster(vec![ana()]);
    }
}
