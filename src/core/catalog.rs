//! Query entry points over the cached valve data
//!
//! This is the surface a presentation layer talks to: plain data in, plain
//! data out. Every call goes through the cache, so a call after the TTL
//! transparently refreshes (or falls back to stale data).

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::cache::{Clock, Snapshot, SystemClock, ValveCache};
use crate::core::error::DataError;
use crate::core::ident::zones_match;
use crate::core::search::{self, SearchResult};
use crate::core::shutoff::{self, Impact};
use crate::core::source::TabularSource;
use crate::core::valve::ValveRecord;

/// Every valve with cache metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValveListing {
    pub updated_at: DateTime<Utc>,
    pub stale: bool,
    pub count: usize,
    pub valves: Vec<ValveRecord>,
}

/// When the data behind the latest answer was fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Freshness {
    pub updated_at: DateTime<Utc>,
    pub stale: bool,
}

/// Cached lookup service for valves, zones, and lots
pub struct ValveCatalog<S, C = SystemClock> {
    cache: ValveCache<S, C>,
    last_served: Option<Freshness>,
}

impl<S: TabularSource> ValveCatalog<S, SystemClock> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, SystemClock, ttl)
    }
}

impl<S: TabularSource, C: Clock> ValveCatalog<S, C> {
    pub fn with_clock(source: S, clock: C, ttl: Duration) -> Self {
        Self {
            cache: ValveCache::with_clock(source, clock, ttl),
            last_served: None,
        }
    }

    pub fn cache_mut(&mut self) -> &mut ValveCache<S, C> {
        &mut self.cache
    }

    /// The current graph with its freshness
    pub fn snapshot(&mut self) -> Result<Snapshot, DataError> {
        let snap = self.cache.get()?;
        self.last_served = Some(Freshness {
            updated_at: snap.updated_at,
            stale: snap.stale,
        });
        Ok(snap)
    }

    /// Freshness of the data behind the most recent successful call
    pub fn freshness(&self) -> Option<Freshness> {
        self.last_served
    }

    /// All valves, when they were fetched, and whether they are stale
    pub fn get_all_valves(&mut self) -> Result<ValveListing, DataError> {
        let snap = self.snapshot()?;
        Ok(ValveListing {
            updated_at: snap.updated_at,
            stale: snap.stale,
            count: snap.graph.len(),
            valves: snap.graph.valves().to_vec(),
        })
    }

    /// The valve with exactly this id
    pub fn get_valve_by_id(&mut self, valve_id: &str) -> Result<Option<ValveRecord>, DataError> {
        Ok(self.snapshot()?.graph.valve(valve_id).cloned())
    }

    /// The valve with this id, falling back to a case-insensitive match
    pub fn find_valve(&mut self, valve_id: &str) -> Result<Option<ValveRecord>, DataError> {
        Ok(self.snapshot()?.graph.find_valve(valve_id).cloned())
    }

    /// The zone(s) a lot belongs to
    pub fn get_zones_for_lot(&mut self, lot: &str) -> Result<Vec<String>, DataError> {
        Ok(self.snapshot()?.graph.zones_for_lot(lot))
    }

    /// Every lot that belongs to a zone
    pub fn get_lots_for_zone(&mut self, zone: &str) -> Result<Vec<String>, DataError> {
        Ok(self.snapshot()?.graph.lots_for_zone(zone))
    }

    /// Every valve feeding a zone, in sheet order
    pub fn get_valves_for_zone(&mut self, zone: &str) -> Result<Vec<ValveRecord>, DataError> {
        let snap = self.snapshot()?;
        Ok(snap
            .graph
            .valves()
            .iter()
            .filter(|v| v.zones.iter().any(|z| zones_match(z, zone)))
            .cloned()
            .collect())
    }

    pub fn search(&mut self, term: &str) -> Result<SearchResult, DataError> {
        Ok(search::search(&self.snapshot()?.graph, term))
    }

    pub fn search_terms<T: AsRef<str>>(&mut self, terms: &[T]) -> Result<SearchResult, DataError> {
        Ok(search::search_terms(&self.snapshot()?.graph, terms))
    }

    /// Search and classify shutoff impact
    pub fn impact<T: AsRef<str>>(&mut self, terms: &[T]) -> Result<Impact, DataError> {
        Ok(shutoff::impact(&self.snapshot()?.graph, terms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::tests::{sheets, FlakySource};
    use crate::core::cache::ManualClock;
    use crate::core::cache::DEFAULT_TTL;
    use chrono::TimeZone;

    fn catalog() -> (ValveCatalog<FlakySource, ManualClock>, FlakySource, ManualClock) {
        let source = FlakySource::new(sheets(&["V1", "V2"]));
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap());
        let catalog = ValveCatalog::with_clock(source.clone(), clock.clone(), DEFAULT_TTL);
        (catalog, source, clock)
    }

    #[test]
    fn test_get_all_valves_within_ttl_is_stable() {
        let (mut catalog, _source, clock) = catalog();
        let first = catalog.get_all_valves().unwrap();
        assert_eq!(first.count, 2);
        assert!(!first.stale);

        clock.advance(Duration::from_secs(60));
        let second = catalog.get_all_valves().unwrap();
        assert!(!second.stale);
        assert_eq!(second.updated_at, first.updated_at);
    }

    #[test]
    fn test_stale_listing_after_failed_refresh() {
        let (mut catalog, source, clock) = catalog();
        let first = catalog.get_all_valves().unwrap();

        source.fail(true);
        clock.advance(DEFAULT_TTL + Duration::from_secs(1));
        let stale = catalog.get_all_valves().unwrap();

        assert!(stale.stale);
        assert_eq!(stale.updated_at, first.updated_at);
        assert_eq!(stale.valves, first.valves);
    }

    #[test]
    fn test_lookups() {
        let (mut catalog, _, _) = catalog();
        assert_eq!(catalog.get_valve_by_id("V1").unwrap().unwrap().valve_id, "V1");
        assert!(catalog.get_valve_by_id("V9").unwrap().is_none());
        assert_eq!(catalog.get_zones_for_lot("101").unwrap(), vec!["Z1"]);
        assert_eq!(catalog.get_lots_for_zone("Zone 1").unwrap(), vec!["101"]);
    }

    #[test]
    fn test_search_and_impact() {
        let (mut catalog, _, _) = catalog();
        let result = catalog.search("z1").unwrap();
        assert_eq!(result.valves.len(), 2);

        let impact = catalog.impact(&["V1", "V2"]).unwrap();
        assert_eq!(impact.shutoff.completely_shut_off, vec!["Z1"]);
    }

    #[test]
    fn test_valves_for_zone_and_case_insensitive_find() {
        let (mut catalog, _, _) = catalog();
        let ids: Vec<String> = catalog
            .get_valves_for_zone("zone 1")
            .unwrap()
            .into_iter()
            .map(|v| v.valve_id)
            .collect();
        assert_eq!(ids, vec!["V1", "V2"]);
        assert!(catalog.get_valves_for_zone("Z9").unwrap().is_empty());

        assert!(catalog.get_valve_by_id("v1").unwrap().is_none());
        assert_eq!(catalog.find_valve("v1").unwrap().unwrap().valve_id, "V1");
    }

    #[test]
    fn test_freshness_tracks_latest_answer() {
        let (mut catalog, source, clock) = catalog();
        assert!(catalog.freshness().is_none());

        catalog.get_zones_for_lot("101").unwrap();
        let fresh = catalog.freshness().unwrap();
        assert!(!fresh.stale);

        source.fail(true);
        clock.advance(DEFAULT_TTL + Duration::from_secs(1));
        catalog.impact(&["V1"]).unwrap();
        let stale = catalog.freshness().unwrap();
        assert!(stale.stale);
        assert_eq!(stale.updated_at, fresh.updated_at);
    }

    #[test]
    fn test_listing_serializes_camel_case() {
        let (mut catalog, _, _) = catalog();
        let listing = catalog.get_all_valves().unwrap();
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["stale"], false);
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["valves"][0]["valveId"], "V1");
        assert_eq!(json["valves"][0]["locationNotes"], "");
    }
}
