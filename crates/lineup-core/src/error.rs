// Recoverable outcomes reported by roster operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("player name must not be empty")]
    EmptyName,

    #[error("a player named `{0}` already exists")]
    DuplicateName(String),

    #[error("no player with id `{0}`")]
    UnknownPlayer(String),

    /// The durable store or the clipboard failed. Nothing was applied.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
