// Attendance text handling: paste detection, numbered-list extraction, and
// candidate name extraction.
//
// Attendance lists usually arrive pasted from a group chat:
//
//     1. Ana
//     2) Beto
//     3 Caro
//
// Only numbered lines count. Anything else in the paste (headers, emoji-only
// lines, "see you at 8!") is dropped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Optional indent, an ASCII number, a `.` / `)` / whitespace delimiter,
/// optional whitespace, then the name.
static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[0-9]+[.)\s]\s*(.*)$").expect("numbered-line pattern is valid")
});

/// Edits that change the text length by more than this many characters are
/// treated as a paste.
pub const PASTE_LENGTH_DELTA: usize = 1;

/// How a buffer edit was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Paste,
    Typing,
}

/// Classify an edit by comparing buffer lengths (in characters).
///
/// This is a length heuristic: a single keystroke changes the text by at most
/// one character, anything larger is taken to be a paste or bulk edit. A host
/// that can observe real paste events should prefer those.
pub fn classify_edit(previous_text: &str, new_text: &str) -> EditKind {
    let before = previous_text.chars().count();
    let after = new_text.chars().count();
    if before.abs_diff(after) > PASTE_LENGTH_DELTA {
        EditKind::Paste
    } else {
        EditKind::Typing
    }
}

/// Characters that should never survive at either end of a pasted name:
/// zero-width characters, bidi controls, BOM, variation selectors, soft
/// hyphens, and private-use code points.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{180E}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}

/// Trim whitespace and invisible characters from both ends.
pub fn strict_trim(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || is_invisible(c))
}

/// Extract the name from a numbered list line, or `None` if the line is not
/// numbered or the name is blank.
pub fn extract_numbered_name(line: &str) -> Option<&str> {
    let caps = NUMBERED_LINE.captures(line)?;
    let name = strict_trim(caps.get(1)?.as_str());
    (!name.is_empty()).then_some(name)
}

/// Compute the text to store as the attendance buffer after an edit.
///
/// A paste is reduced to its numbered names, one per line. Typing is stored
/// verbatim so the user can keep editing freely; extraction happens later in
/// [`extract_candidate_names`].
pub fn parse_attendance_input(previous_text: &str, new_text: &str) -> String {
    match classify_edit(previous_text, new_text) {
        EditKind::Typing => new_text.to_string(),
        EditKind::Paste => {
            let names: Vec<&str> = new_text.lines().filter_map(extract_numbered_name).collect();
            debug!(
                "Paste detected: {} line(s) in, {} name(s) kept",
                new_text.lines().count(),
                names.len()
            );
            names.join("\n")
        }
    }
}

/// Split the buffer into candidate names, in input order.
///
/// Lines that are not numbered are dropped silently. Duplicates are kept;
/// duplicate reporting is the matcher's job.
pub fn extract_candidate_names(text: &str) -> Vec<String> {
    text.split('\n')
        .filter_map(extract_numbered_name)
        .map(str::to_string)
        .collect()
}

/// The attendance text being edited before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceBuffer {
    text: String,
}

impl AttendanceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an edit, replacing the stored text per [`parse_attendance_input`].
    pub fn edit(&mut self, new_text: &str) {
        self.text = parse_attendance_input(&self.text, new_text);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn candidates(&self) -> Vec<String> {
        extract_candidate_names(&self.text)
    }
}
