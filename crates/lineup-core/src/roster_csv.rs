// Roster import and export as CSV.
//
// Export writes `id,name,position,skill,fitness`. Import only needs
// `name,skill,fitness`; `position` defaults to DEF and `id` is ignored, since
// imported players always get fresh ids.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::warn;

use crate::player::{Player, Position};
use crate::service::NewPlayer;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("failed to access file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Row structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    name: &'a str,
    position: &'static str,
    skill: u8,
    fitness: u8,
}

#[derive(Debug, Deserialize)]
struct ImportRow {
    name: String,
    #[serde(default)]
    position: String,
    #[serde(alias = "skill_level", alias = "skillLevel")]
    skill: f64,
    #[serde(alias = "fitness_level", alias = "fitnessLevel")]
    fitness: f64,
}

// ---------------------------------------------------------------------------
// Writer / reader based
// ---------------------------------------------------------------------------

/// Write the roster as CSV with a header row.
pub fn write_roster<W: Write>(players: &[Player], wtr: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(wtr);
    for p in players {
        writer.serialize(ExportRow {
            id: &p.id,
            name: &p.name,
            position: p.position.display_str(),
            skill: p.skill_level,
            fitness: p.fitness_level,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Read import rows. Malformed rows and unknown positions are skipped with a
/// warning; the rest are returned in file order.
pub fn read_roster<R: Read>(rdr: R) -> Result<Vec<NewPlayer>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<ImportRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed roster row: {}", e);
                continue;
            }
        };
        if !raw.skill.is_finite() || !raw.fitness.is_finite() {
            warn!("skipping '{}': non-finite level", raw.name);
            continue;
        }
        let position = if raw.position.is_empty() {
            Position::default()
        } else {
            match Position::from_str_pos(&raw.position) {
                Some(pos) => pos,
                None => {
                    warn!("skipping '{}': unknown position '{}'", raw.name, raw.position);
                    continue;
                }
            }
        };
        rows.push(NewPlayer {
            name: raw.name,
            position,
            skill_level: raw.skill.round() as i64,
            fitness_level: raw.fitness.round() as i64,
        });
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Path based
// ---------------------------------------------------------------------------

pub fn export_roster(players: &[Player], path: &Path) -> Result<(), CsvError> {
    let file = std::fs::File::create(path).map_err(|e| CsvError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_roster(players, file).map_err(|e| CsvError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn import_roster(path: &Path) -> Result<Vec<NewPlayer>, CsvError> {
    let file = std::fs::File::open(path).map_err(|e| CsvError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_roster(file).map_err(|e| CsvError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}
