//! Search over the relationship graph
//!
//! A search runs in two passes. The exact-match pass compares each term
//! against valve ids, zone names (by canonical form) and lot numbers, and
//! substring-matches the free-text columns. The expansion pass then pulls in
//! every valve sharing a found zone or lot, so staff see the whole circuit.
//!
//! Only the exact-match pass decides scope: `primary_zones` holds the zones
//! the searched entity serves directly and never grows during expansion.

use std::collections::HashSet;

use serde::Serialize;

use crate::core::graph::RelationshipGraph;
use crate::core::ident::{canonical_zone, ids_match, text_contains};
use crate::core::valve::ValveRecord;

/// Everything one search found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The trimmed, non-empty terms searched for
    pub terms: Vec<String>,

    /// Matching and related valves, de-duplicated by id, first match first
    pub valves: Vec<ValveRecord>,

    /// Zone names that matched a term exactly
    pub zones: Vec<String>,

    /// Lot numbers that matched a term exactly
    pub lots: Vec<String>,

    /// Zones the searched entities serve directly
    pub primary_zones: Vec<String>,

    /// Exactly one valve id matched
    pub single_valve_lookup: bool,

    /// Valve ids that matched a term exactly
    pub matched_valve_ids: Vec<String>,

    /// Valves the search asks to close: exact id matches plus every valve
    /// carrying a matched zone or lot, or the free-text matches when nothing
    /// matched exactly
    pub closing_valve_ids: Vec<String>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.valves.is_empty() && self.zones.is_empty() && self.lots.is_empty()
    }
}

/// Insertion-ordered set of strings
#[derive(Default)]
struct Ordered {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl Ordered {
    fn insert(&mut self, value: &str) {
        if self.seen.insert(value.to_string()) {
            self.items.push(value.to_string());
        }
    }

    fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

struct Term {
    raw: String,
    lower: String,
    zone: String,
}

/// Search for a single term
pub fn search(graph: &RelationshipGraph, term: &str) -> SearchResult {
    search_terms(graph, &[term])
}

/// Search for several identifiers at once (e.g., "V1, V2" from a shutoff notice)
///
/// Blank terms are ignored; with no terms left the result is empty.
pub fn search_terms<T: AsRef<str>>(graph: &RelationshipGraph, terms: &[T]) -> SearchResult {
    let terms: Vec<Term> = terms
        .iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .map(|t| Term {
            raw: t.to_string(),
            lower: t.to_lowercase(),
            zone: canonical_zone(t),
        })
        .collect();

    if terms.is_empty() {
        return SearchResult::default();
    }

    let mut matching: Vec<&ValveRecord> = Vec::new();
    let mut found_valve_ids = Ordered::default();
    let mut found_zones = Ordered::default();
    let mut found_lots = Ordered::default();
    let mut matched_zones = Ordered::default();
    let mut matched_lots = Ordered::default();
    let mut primary_zones = Ordered::default();
    let mut closing = Ordered::default();
    let mut text_matches = Ordered::default();

    // Exact-match pass
    for valve in graph.valves() {
        for term in &terms {
            if ids_match(&valve.valve_id, &term.raw) {
                found_valve_ids.insert(&valve.valve_id);
                closing.insert(&valve.valve_id);
                matching.push(valve);
                for zone in &valve.zones {
                    found_zones.insert(zone);
                    primary_zones.insert(zone);
                }
                for lot in &valve.lots {
                    found_lots.insert(lot);
                }
            }

            for zone in &valve.zones {
                if canonical_zone(zone) == term.zone {
                    found_zones.insert(zone);
                    matched_zones.insert(zone);
                    primary_zones.insert(zone);
                    closing.insert(&valve.valve_id);
                }
            }

            for lot in &valve.lots {
                if ids_match(lot, &term.raw) {
                    found_lots.insert(lot);
                    matched_lots.insert(lot);
                    closing.insert(&valve.valve_id);
                }
            }

            if text_contains(&valve.location, &term.lower)
                || text_contains(&valve.location_notes, &term.lower)
                || text_contains(&valve.function, &term.lower)
            {
                matching.push(valve);
                text_matches.insert(&valve.valve_id);
            }
        }
    }

    // Expansion pass
    if !found_valve_ids.is_empty() || !found_zones.is_empty() || !found_lots.is_empty() {
        for valve in graph.valves() {
            if found_valve_ids.contains(&valve.valve_id) {
                continue;
            }
            let shares_zone = valve.zones.iter().any(|z| found_zones.contains(z));
            let shares_lot = valve.lots.iter().any(|l| found_lots.contains(l));
            if shares_zone || shares_lot {
                matching.push(valve);
            }
        }
    }

    let mut seen = HashSet::new();
    let valves: Vec<ValveRecord> = matching
        .into_iter()
        .filter(|v| seen.insert(v.valve_id.as_str()))
        .cloned()
        .collect();

    let single_valve_lookup = found_valve_ids.len() == 1;
    let closing_valve_ids = if closing.is_empty() {
        text_matches.into_vec()
    } else {
        closing.into_vec()
    };

    SearchResult {
        terms: terms.into_iter().map(|t| t.raw).collect(),
        valves,
        zones: matched_zones.into_vec(),
        lots: matched_lots.into_vec(),
        primary_zones: primary_zones.into_vec(),
        single_valve_lookup,
        matched_valve_ids: found_valve_ids.into_vec(),
        closing_valve_ids,
    }
}
