// Durable key-value persistence for the roster and the participant set.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::warn;

use crate::player::Player;

/// Minimal key-value store holding JSON text.
pub trait KeyValueStore {
    /// Fetch the value under `key`, or `None` if it was never set.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Delete `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// SQLite-backed key-value store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the state table
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS app_state (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM app_state WHERE key = ?1")
            .context("failed to prepare state query")?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query app state")?;

        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read state row")?)),
            None => Ok(None),
        }
    }

    /// Uses INSERT OR REPLACE so repeated saves overwrite the previous value.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .with_context(|| format!("failed to save state for key {key}"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM app_state WHERE key = ?1", params![key])
            .with_context(|| format!("failed to remove state for key {key}"))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().expect("memory store mutex poisoned")
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Player lists
// ---------------------------------------------------------------------------

/// Load a player list stored as a JSON array.
///
/// A missing key or a value that does not parse as a player array yields an
/// empty list; only store failures are returned as errors.
pub fn load_players<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Vec<Player>> {
    let Some(json) = store.get(key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str::<Vec<Player>>(&json) {
        Ok(players) => Ok(players),
        Err(e) => {
            warn!("Stored value for {key} is not a player list, treating as empty: {e}");
            Ok(Vec::new())
        }
    }
}

/// Store a player list as a JSON array under `key`.
pub fn save_players<S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
    players: &[Player],
) -> Result<()> {
    let json = serde_json::to_string(players).context("failed to serialize player list")?;
    store.set(key, &json)
}
