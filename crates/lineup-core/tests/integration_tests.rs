// Integration tests for the lineup engine.
//
// These drive the public API end to end: attendance text through matching and
// provisioning into the participant set, team generation over the result,
// persistence in SQLite, and roster CSV import/export.

use std::collections::BTreeSet;
use std::path::PathBuf;

use lineup_core::clipboard::StaticClipboard;
use lineup_core::config::Config;
use lineup_core::engine::attendance::{extract_candidate_names, AttendanceBuffer};
use lineup_core::engine::matcher::resolve;
use lineup_core::engine::normalize::normalize;
use lineup_core::engine::partition::{partition, BalanceParams};
use lineup_core::player::{Player, Position};
use lineup_core::roster_csv;
use lineup_core::service::{LineupService, NewPlayer};
use lineup_core::sink::{SharedState, StateUpdate};
use lineup_core::store::{Database, MemoryStore};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn memory_service() -> (LineupService<MemoryStore, SharedState>, SharedState) {
    let state = SharedState::new();
    let svc =
        LineupService::new(MemoryStore::new(), state.clone(), Config::default()).with_seed(42);
    (svc, state)
}

fn sorted_ids(players: &[Player]) -> Vec<String> {
    let mut ids: Vec<String> = players.iter().map(|p| p.id.clone()).collect();
    ids.sort();
    ids
}

/// Random roster of `n` players with distinct ids.
fn random_roster(rng: &mut StdRng, n: usize) -> Vec<Player> {
    (0..n)
        .map(|i| {
            Player::new(
                format!("p{i}"),
                format!("Player {i}"),
                Position::Defender,
                rng.gen_range(1..=10),
                rng.gen_range(1..=10),
            )
        })
        .collect()
}

// ===========================================================================
// Attendance pipeline
// ===========================================================================

#[test]
fn repeated_name_on_empty_roster_creates_three_players() {
    let (mut svc, state) = memory_service();

    let report = svc.resolve_attendance("1. Ana\n2. Beto\n1. Ana").unwrap();

    assert_eq!(report.candidates, vec!["Ana", "Beto", "Ana"]);
    assert_eq!(report.duplicate_names, BTreeSet::from(["ana".to_string()]));
    assert!(report.matched.is_empty());
    assert_eq!(report.created.len(), 3);
    for p in &report.created {
        assert_eq!(p.skill_level, 5);
        assert_eq!(p.fitness_level, 5);
        assert_eq!(p.position, Position::Defender);
    }
    let names: Vec<&str> = report.participants.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Ana", "Beto", "Ana"]);

    let ids: BTreeSet<&str> = report.created.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), 3, "provisioned ids must be distinct");

    assert_eq!(svc.roster().unwrap().len(), 3);
    assert_eq!(svc.participants().unwrap().len(), 3);
    assert_eq!(state.snapshot().roster.len(), 3);
    assert_eq!(state.snapshot().participants, report.participants);
}

#[test]
fn typed_edits_then_paste_feed_the_pipeline() {
    let mut buffer = AttendanceBuffer::new();
    buffer.edit("A");
    buffer.edit("An");
    buffer.edit("Ana");
    assert_eq!(buffer.text(), "Ana");

    buffer.edit("Sunday game\n1. Ana\n2) Beto\n3. Caro");
    assert_eq!(buffer.text(), "Ana\nBeto\nCaro");

    assert_eq!(
        extract_candidate_names("1) Ana\nBeto\n3. Caro"),
        vec!["Ana", "Caro"]
    );
}

#[test]
fn every_candidate_lands_in_exactly_one_bucket() {
    let roster = vec![
        Player::new("1", "José", Position::Attacker, 7, 7),
        Player::new("2", "Beto", Position::Defender, 4, 6),
    ];
    let candidates: Vec<String> = ["jose", "BETO ", "Caro", "José", "dani"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let resolution = resolve(&candidates, &roster);
    assert_eq!(
        resolution.matched.len() + resolution.unmatched_names.len(),
        candidates.len()
    );
    assert_eq!(resolution.unmatched_names, vec!["Caro", "dani"]);
    assert_eq!(resolution.duplicate_names, BTreeSet::from(["jose".to_string()]));
}

#[test]
fn matching_ignores_accents_and_case() {
    assert_eq!(normalize("José"), normalize("jose"));
    assert_eq!(normalize("jose"), normalize("  JOSE "));

    let (mut svc, _) = memory_service();
    let jose = svc
        .create_player(NewPlayer {
            name: "José".into(),
            position: Position::Attacker,
            skill_level: 9,
            fitness_level: 4,
        })
        .unwrap();

    let report = svc.resolve_attendance("1.  JOSE \n2. ana maria").unwrap();
    assert_eq!(report.matched, vec![jose]);
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.created[0].name, "Ana Maria");
    assert_eq!(svc.roster().unwrap().len(), 2);
}

#[tokio::test]
async fn clipboard_paste_starts_the_workflow() {
    let (mut svc, _) = memory_service();
    let clipboard = StaticClipboard("Tonight:\n1. Ana\n2. Beto\nsee you".into());

    let buffer = svc.begin_attendance(&clipboard).await.unwrap();
    assert_eq!(buffer.text(), "Ana\nBeto");

    let report = svc.resolve_attendance(&clipboard.0).unwrap();
    assert_eq!(report.participants.len(), 2);
}

// ===========================================================================
// Team generation
// ===========================================================================

#[test]
fn partition_preserves_participants_for_random_rosters() {
    let mut rng = StdRng::seed_from_u64(2024);
    let params = BalanceParams::default();
    for n in 0..=16 {
        let roster = random_roster(&mut rng, n);
        let teams = partition(&roster, &params, &mut rng);
        let mut combined = teams.team_a.clone();
        combined.extend(teams.team_b.iter().cloned());
        assert_eq!(sorted_ids(&combined), sorted_ids(&roster), "n = {n}");
    }
}

#[test]
fn uniform_fitness_even_rosters_are_never_double_dominated() {
    let mut rng = StdRng::seed_from_u64(99);
    let params = BalanceParams::default();
    for round in 0..100 {
        let n = 2 * rng.gen_range(1..=7);
        let roster: Vec<Player> = (0..n)
            .map(|i| {
                Player::new(
                    format!("r{round}-{i}"),
                    format!("P{i}"),
                    Position::Attacker,
                    rng.gen_range(1..=10),
                    6,
                )
            })
            .collect();
        let teams = partition(&roster, &params, &mut rng);
        assert!(
            !teams.is_double_dominated(),
            "round {round}: totals {:?}",
            teams.totals()
        );
    }
}

#[test]
fn generated_teams_cover_the_participant_set() {
    let (mut svc, _) = memory_service();
    svc.resolve_attendance("1. Ana\n2. Beto\n3. Caro\n4. Dani\n5. Eli\n6. Fede\n7. Gabi")
        .unwrap();
    let participants = svc.participants().unwrap();

    let teams = svc.generate_teams().unwrap();
    let mut combined = teams.team_a.clone();
    combined.extend(teams.team_b.iter().cloned());
    assert_eq!(sorted_ids(&combined), sorted_ids(&participants));
    assert!(teams.team_a.len().abs_diff(teams.team_b.len()) <= 1);
}

// ===========================================================================
// Persistence
// ===========================================================================

#[test]
fn sqlite_backed_service_survives_restart() {
    let dir = std::env::temp_dir().join(format!("lineup-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let db_path = dir.join("lineup.db");
    let db_path_str = db_path.to_str().unwrap().to_string();
    let _ = std::fs::remove_file(&db_path);

    {
        let db = Database::open(&db_path_str).unwrap();
        let mut svc = LineupService::new(db, SharedState::new(), Config::default());
        svc.resolve_attendance("1. Ana\n2. Beto").unwrap();
        let ana = svc.roster().unwrap()[0].clone();
        svc.toggle_participant(&ana.id).unwrap();
    }

    let db = Database::open(&db_path_str).unwrap();
    let state = SharedState::new();
    let mut svc = LineupService::new(db, state.clone(), Config::default());
    svc.publish().unwrap();

    let snapshot = state.snapshot();
    assert_eq!(snapshot.roster.len(), 2);
    assert_eq!(snapshot.participants.len(), 1);
    assert_eq!(snapshot.participants[0].name, "Beto");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn channel_sink_receives_whole_list_replacements() {
    let (tx, mut rx) = mpsc::unbounded_channel::<StateUpdate>();
    let mut svc = LineupService::new(Database::open(":memory:").unwrap(), tx, Config::default());

    svc.resolve_attendance("1. Ana").unwrap();

    match rx.try_recv().unwrap() {
        StateUpdate::Roster(players) => assert_eq!(players.len(), 1),
        other => panic!("expected roster update first, got {other:?}"),
    }
    match rx.try_recv().unwrap() {
        StateUpdate::Participants(players) => assert_eq!(players[0].name, "Ana"),
        other => panic!("expected participants update, got {other:?}"),
    }
    assert!(rx.try_recv().is_err());
}

// ===========================================================================
// CSV import / export
// ===========================================================================

#[test]
fn csv_import_loads_fixture_roster() {
    let rows = roster_csv::import_roster(&fixture("roster.csv")).unwrap();
    // The GK row has no valid position and is dropped by the reader.
    assert_eq!(rows.len(), 4);

    let (mut svc, _) = memory_service();
    let report = svc.import_players(rows).unwrap();
    let names: Vec<&str> = report.added.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["José Luis", "Beto", "Caro"]);
    assert_eq!(report.skipped, vec!["jose luis"]);

    let caro = &report.added[2];
    assert_eq!(caro.position, Position::Defender);
    assert_eq!(caro.skill_level, 10);
    assert!(report.added.iter().all(|p| !p.id.starts_with("old-")));
}

#[test]
fn csv_export_then_import_into_fresh_roster() {
    let (mut svc, _) = memory_service();
    svc.resolve_attendance("1. Ana\n2. Beto").unwrap();
    let roster = svc.roster().unwrap();

    let path = std::env::temp_dir().join(format!("lineup-export-{}.csv", std::process::id()));
    roster_csv::export_roster(&roster, &path).unwrap();

    let (mut other, _) = memory_service();
    let report = other
        .import_players(roster_csv::import_roster(&path).unwrap())
        .unwrap();
    assert_eq!(report.added.len(), 2);
    assert_eq!(report.added[0].name, "Ana");
    assert_ne!(report.added[0].id, roster[0].id);

    let _ = std::fs::remove_file(&path);
}
