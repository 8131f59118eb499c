//! Shared helper functions for CLI commands

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Compare identifiers by their first run of digits, then as strings
///
/// "V2" sorts before "V10"; names without digits count as 0.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    first_number(a)
        .cmp(&first_number(b))
        .then_with(|| a.cmp(b))
}

/// Sort strings in place with [`natural_cmp`]
pub fn natural_sort<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

fn first_number(s: &str) -> u64 {
    let digits: String = s
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        0
    } else {
        digits.parse().unwrap_or(u64::MAX)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Human-readable age such as "just now", "5 min ago", "2 h ago"
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{} min ago", secs / 60),
        3600..=86399 => format!("{} h ago", secs / 3600),
        _ => format!("{} d ago", secs / 86400),
    }
}

/// Split comma-separated terms, dropping blanks
pub fn split_terms<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|t| t.as_ref().split(','))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_natural_sort_orders_numbers_numerically() {
        let mut ids = vec!["V10", "V2", "V1", "Main", "V2a"];
        natural_sort(&mut ids);
        assert_eq!(ids, vec!["Main", "V1", "V2", "V2a", "V10"]);
    }

    #[test]
    fn test_natural_cmp_ties_break_on_string() {
        assert_eq!(natural_cmp("Zone 3", "Z3"), Ordering::Greater);
        assert_eq!(natural_cmp("Z3", "Z3"), Ordering::Equal);
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
    }

    #[test]
    fn test_format_age() {
        let t = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_age(t, t), "just now");
        assert_eq!(format_age(t, t + chrono::Duration::minutes(5)), "5 min ago");
        assert_eq!(format_age(t, t + chrono::Duration::hours(3)), "3 h ago");
        assert_eq!(format_age(t + chrono::Duration::hours(1), t), "just now");
    }

    #[test]
    fn test_split_terms() {
        assert_eq!(split_terms(&["V1, V2", " ", "Z3"]), vec!["V1", "V2", "Z3"]);
    }
}
