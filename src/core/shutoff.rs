//! Shutoff impact classification
//!
//! Given a search result, decides which zones are in scope and, for each,
//! whether closing the search's valves shuts it off completely or only
//! affects its pressure. Every zone here is fed by two or three valves, so a
//! zone is only completely shut off when all of them are closed.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::core::graph::RelationshipGraph;
use crate::core::search::{search_terms, SearchResult};

/// Where the in-scope zones came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeSource {
    /// Zones the searched valve or zone serves directly
    Primary,
    /// Zones the searched lot belongs to
    LotLookup,
    /// Every zone touched by a result valve
    AllResults,
    /// Nothing to scope
    Empty,
}

/// Result valves serving one in-scope zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneValves {
    pub zone: String,
    pub valves: Vec<String>,
}

/// Shutoff classification derived from one search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutoffReport {
    pub scope_source: ScopeSource,

    /// Zones the search is about, sorted
    pub scope_zones: Vec<String>,

    /// In-scope zones whose every valve is being closed
    pub completely_shut_off: Vec<String>,

    /// In-scope zones with some, but not all, valves closed
    pub affected_zones: Vec<String>,

    /// Zones each matched lot belongs to
    pub lot_zones: Vec<String>,

    /// Lots belonging to a matched zone
    pub lots_in_zone: Vec<String>,

    /// Lots carried by result valves that serve an in-scope zone
    pub lots_in_scope: Vec<String>,

    /// In-scope lots outside the matched zone(s), pressure affected only
    pub affected_lots: Vec<String>,

    /// Result valves grouped by in-scope zone
    pub valves_by_zone: Vec<ZoneValves>,
}

/// A search together with its shutoff classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Impact {
    pub search: SearchResult,
    pub shutoff: ShutoffReport,
}

/// Search and classify in one step
pub fn impact<T: AsRef<str>>(graph: &RelationshipGraph, terms: &[T]) -> Impact {
    let search = search_terms(graph, terms);
    let shutoff = classify(graph, &search);
    Impact { search, shutoff }
}

/// Classify the zones and lots a search touches
pub fn classify(graph: &RelationshipGraph, result: &SearchResult) -> ShutoffReport {
    let lot_zones: BTreeSet<String> = result
        .lots
        .iter()
        .flat_map(|lot| graph.zones_for_lot(lot))
        .collect();

    let (scope_source, scope): (ScopeSource, BTreeSet<String>) = if !result.primary_zones.is_empty()
    {
        (
            ScopeSource::Primary,
            result.primary_zones.iter().cloned().collect(),
        )
    } else if !lot_zones.is_empty() {
        (ScopeSource::LotLookup, lot_zones.clone())
    } else {
        let all: BTreeSet<String> = result
            .valves
            .iter()
            .flat_map(|v| v.zones.iter().cloned())
            .collect();
        if all.is_empty() {
            (ScopeSource::Empty, all)
        } else {
            (ScopeSource::AllResults, all)
        }
    };

    let closing: HashSet<&str> = result.closing_valve_ids.iter().map(String::as_str).collect();
    let multiple_closing = closing.len() > 1;

    let mut completely_shut_off = Vec::new();
    let mut affected_zones = Vec::new();
    for zone in &scope {
        let zone_valves = graph.valves_for_zone(zone);
        if zone_valves.is_empty() {
            continue;
        }
        let closed = zone_valves
            .iter()
            .filter(|v| closing.contains(v.valve_id.as_str()))
            .count();

        // One valve never isolates a zone on its own
        if closed == zone_valves.len() && multiple_closing && !result.single_valve_lookup {
            completely_shut_off.push(zone.clone());
        } else if closed > 0 {
            affected_zones.push(zone.clone());
        }
    }

    let lots_in_zone: BTreeSet<String> = result
        .zones
        .iter()
        .flat_map(|zone| graph.lots_for_zone(zone))
        .collect();

    let lots_in_scope: BTreeSet<String> = result
        .valves
        .iter()
        .filter(|v| v.zones.iter().any(|z| scope.contains(z)))
        .flat_map(|v| v.lots.iter().cloned())
        .collect();

    let in_zone_lower: HashSet<String> = lots_in_zone.iter().map(|l| l.to_lowercase()).collect();
    let affected_lots: Vec<String> = lots_in_scope
        .iter()
        .filter(|lot| !in_zone_lower.contains(&lot.to_lowercase()))
        .cloned()
        .collect();

    let valves_by_zone = scope
        .iter()
        .map(|zone| {
            let mut valves: Vec<String> = result
                .valves
                .iter()
                .filter(|v| v.serves_zone(zone))
                .map(|v| v.valve_id.clone())
                .collect();
            valves.sort();
            ZoneValves {
                zone: zone.clone(),
                valves,
            }
        })
        .collect();

    ShutoffReport {
        scope_source,
        scope_zones: scope.into_iter().collect(),
        completely_shut_off,
        affected_zones,
        lot_zones: lot_zones.into_iter().collect(),
        lots_in_zone: lots_in_zone.into_iter().collect(),
        lots_in_scope: lots_in_scope.into_iter().collect(),
        affected_lots,
        valves_by_zone,
    }
}
