// Name canonicalization for matching and duplicate detection.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a display name for comparison.
///
/// Canonical decomposition, then combining marks are dropped, then the result
/// is trimmed and lowercased. Two names refer to the same player exactly when
/// their normalized forms are equal.
pub fn normalize(name: &str) -> String {
    let stripped: String = name.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.trim().to_lowercase()
}

/// Whether two names are equal after normalization.
pub fn same_name(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}
