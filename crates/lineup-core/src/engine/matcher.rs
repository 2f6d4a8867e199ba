// Resolve attendance candidates against the known roster.

use std::collections::{BTreeSet, HashMap};

use crate::player::Player;

use super::normalize::normalize;

/// Result of matching candidate names against the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Roster players found for candidates, in candidate order. A candidate
    /// listed twice yields two entries.
    pub matched: Vec<Player>,
    /// Candidates with no roster match, as originally written.
    pub unmatched_names: Vec<String>,
    /// Normalized names that appear more than once among the candidates.
    /// Advisory only; matching is not affected.
    pub duplicate_names: BTreeSet<String>,
}

/// Normalized names occurring more than once among the non-blank candidates.
pub fn find_duplicates(candidates: &[String]) -> BTreeSet<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in candidates.iter().filter(|n| !n.trim().is_empty()) {
        *counts.entry(normalize(name)).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect()
}

/// Match every candidate against the roster by normalized name.
///
/// The first roster player (in roster order) whose normalized name equals the
/// candidate's wins. Ids play no part in matching.
pub fn resolve(candidates: &[String], roster: &[Player]) -> Resolution {
    let duplicate_names = find_duplicates(candidates);

    // First occurrence wins, so later roster entries never overwrite.
    let mut by_name: HashMap<String, &Player> = HashMap::with_capacity(roster.len());
    for player in roster {
        by_name.entry(normalize(&player.name)).or_insert(player);
    }

    let mut matched = Vec::new();
    let mut unmatched_names = Vec::new();
    for candidate in candidates {
        match by_name.get(&normalize(candidate)) {
            Some(player) => matched.push((*player).clone()),
            None => unmatched_names.push(candidate.clone()),
        }
    }

    Resolution {
        matched,
        unmatched_names,
        duplicate_names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn roster() -> Vec<Player> {
        vec![
            Player::new("1", "José", Position::Attacker, 8, 6),
            Player::new("2", "Beto", Position::Defender, 4, 7),
            Player::new("3", "beto", Position::Attacker, 9, 9),
        ]
    }

    #[test]
    fn duplicates_are_normalized() {
        let dups = find_duplicates(&names(&["Ana", "ana ", "Beto"]));
        assert_eq!(dups, BTreeSet::from(["ana".to_string()]));
    }

    #[test]
    fn blank_candidates_are_not_duplicates() {
        assert!(find_duplicates(&names(&["", "  ", "Ana"])).is_empty());
    }

    #[test]
    fn matches_accent_and_case_insensitively() {
        let res = resolve(&names(&["JOSE", "Caro"]), &roster());
        assert_eq!(res.matched.len(), 1);
        assert_eq!(res.matched[0].id, "1");
        assert_eq!(res.unmatched_names, vec!["Caro"]);
    }

    #[test]
    fn first_roster_match_wins() {
        let res = resolve(&names(&["BETO"]), &roster());
        assert_eq!(res.matched[0].id, "2");
    }

    #[test]
    fn repeated_candidates_match_repeatedly() {
        let res = resolve(&names(&["Beto", "beto", "Caro", "caro"]), &roster());
        assert_eq!(res.matched.len(), 2);
        assert!(res.matched.iter().all(|p| p.id == "2"));
        assert_eq!(res.unmatched_names, vec!["Caro", "caro"]);
        assert_eq!(
            res.duplicate_names,
            BTreeSet::from(["beto".to_string(), "caro".to_string()])
        );
    }

    #[test]
    fn every_candidate_lands_in_exactly_one_bucket() {
        let candidates = names(&["José", "Ana", "Beto", "Ana", "Zoë"]);
        let res = resolve(&candidates, &roster());
        assert_eq!(res.matched.len() + res.unmatched_names.len(), candidates.len());
    }

    #[test]
    fn unmatched_names_keep_original_spelling() {
        let res = resolve(&names(&["  Ána Maria "]), &[]);
        assert_eq!(res.unmatched_names, vec!["  Ána Maria "]);
    }

    #[test]
    fn empty_inputs() {
        assert_eq!(resolve(&[], &roster()), Resolution::default());
    }
}
