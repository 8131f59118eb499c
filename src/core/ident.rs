//! Identifier normalization and matching
//!
//! Zone names arrive in several spellings ("Zone 1", "zone 1", "Z1", "z1")
//! depending on who typed the sheet. Every comparison between a search term
//! and a zone goes through [`canonical_zone`] so the rule lives in one place.
//!
//! Grammar, applied to the lower-cased and trimmed input:
//!
//! ```text
//! zone    := prefix sep* digits letter?
//!          | digits
//! prefix  := "zone" | "z"
//! sep     := whitespace | "-" | "#" | "_" | ":" | "."
//! digits  := [0-9]+
//! letter  := [a-z]
//! ```
//!
//! Input matching the grammar canonicalizes to `z<digits>` with the full
//! digit run, so "Zone 10" never equals "Zone 1". A single trailing letter
//! after a prefixed number names a section of that zone ("Zone 3A" is zone
//! 3). Anything else (valve ids like "V1", lot numbers like "12A", named
//! zones like "Clubhouse") canonicalizes to the lower-cased trimmed input
//! itself.

/// Canonical form of a zone name
pub fn canonical_zone(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();

    let (prefixed, rest) = match lower.strip_prefix("zone").or_else(|| lower.strip_prefix('z')) {
        Some(rest) => (true, rest.trim_start_matches(is_zone_separator)),
        None => (false, lower.as_str()),
    };

    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, suffix) = rest.split_at(end);

    let suffix_ok = suffix.is_empty()
        || (prefixed && suffix.len() == 1 && suffix.bytes().all(|b| b.is_ascii_alphabetic()));

    if !digits.is_empty() && suffix_ok {
        format!("z{}", digits)
    } else {
        lower
    }
}

fn is_zone_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '#' | '_' | ':' | '.')
}

/// Whether two zone names refer to the same zone
pub fn zones_match(a: &str, b: &str) -> bool {
    canonical_zone(a) == canonical_zone(b)
}

/// Case-insensitive full-string equality, used for valve ids and lot numbers
pub fn ids_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Case-insensitive containment for free-text fields
///
/// `needle_lower` must already be lower-cased; an empty haystack never matches.
pub fn text_contains(haystack: &str, needle_lower: &str) -> bool {
    !haystack.is_empty() && haystack.to_lowercase().contains(needle_lower)
}
