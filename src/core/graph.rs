//! Relationship graph: the joined Valve Sheet and Zone Sheet
//!
//! Every Zone Sheet row names one (valve, zone, lot) association. The join
//! folds those rows into per-valve zone and lot sets, keeps one record per
//! physical valve (mapped or not), and drops rows that point at valves the
//! Valve Sheet does not list.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::core::error::DataError;
use crate::core::ident::{ids_match, zones_match};
use crate::core::rows::{
    self, NormalizedSheets, COL_FUNCTION, COL_LOCATION, COL_LOCATION_NOTES, COL_LOT, COL_VALVE,
    COL_ZONE,
};
use crate::core::source::{TabularSource, VALVE_SHEET, ZONE_SHEET};
use crate::core::valve::{ValveRecord, ZoneAssignment};

/// Counters gathered while joining the two sheets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinStats {
    /// Valve Sheet data rows read
    pub valve_rows: usize,
    /// Zone Sheet data rows read
    pub zone_rows: usize,
    /// Zone Sheet rows naming a valve missing from the Valve Sheet
    pub orphaned_rows: usize,
    /// Valve Sheet rows repeating an id already seen
    pub duplicate_valves: usize,
}

/// The immutable valve/zone/lot index consulted by every query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipGraph {
    valves: Vec<ValveRecord>,
    #[serde(skip)]
    assignments: Vec<ZoneAssignment>,
    #[serde(skip)]
    stats: JoinStats,
}

#[derive(Default)]
struct Associations {
    zones: BTreeSet<String>,
    lots: BTreeSet<String>,
}

impl RelationshipGraph {
    /// Fetch both sheets from a source and join them
    pub fn load<S: TabularSource + ?Sized>(source: &S) -> Result<Self, DataError> {
        let valve_table = source.fetch_table(VALVE_SHEET).map_err(DataError::Join)?;
        let zone_table = source.fetch_table(ZONE_SHEET).map_err(DataError::Join)?;

        let sheets = rows::normalize(&valve_table, &zone_table)?;
        Ok(Self::build(&sheets))
    }

    /// Join normalized sheets into a graph
    pub fn build(sheets: &NormalizedSheets) -> Self {
        let mut stats = JoinStats {
            valve_rows: sheets.valves.len(),
            zone_rows: sheets.zones.len(),
            ..JoinStats::default()
        };

        // Distinct valve ids in Valve Sheet order
        let mut seen: HashSet<&str> = HashSet::new();
        let mut valve_rows = Vec::new();
        for row in &sheets.valves {
            let id = row.get(COL_VALVE);
            if id.is_empty() {
                continue;
            }
            if seen.insert(id) {
                valve_rows.push(row);
            } else {
                stats.duplicate_valves += 1;
            }
        }

        let mut by_valve: HashMap<&str, Associations> = HashMap::new();
        let mut assignments = Vec::new();

        for row in &sheets.zones {
            let valve_id = row.get(COL_VALVE);
            if valve_id.is_empty() {
                continue;
            }
            if !seen.contains(valve_id) {
                stats.orphaned_rows += 1;
                continue;
            }

            let zone = row.get(COL_ZONE);
            let lot = row.get(COL_LOT);
            let entry = by_valve.entry(valve_id).or_default();
            if !zone.is_empty() {
                entry.zones.insert(zone.to_string());
            }
            if !lot.is_empty() {
                entry.lots.insert(lot.to_string());
            }
            if !zone.is_empty() || !lot.is_empty() {
                assignments.push(ZoneAssignment {
                    valve: valve_id.to_string(),
                    zone: zone.to_string(),
                    lot: lot.to_string(),
                });
            }
        }

        if stats.orphaned_rows > 0 {
            log::warn!(
                "Found {} Zone Sheet rows referencing valves not in Valve Sheet",
                stats.orphaned_rows
            );
        }
        if stats.duplicate_valves > 0 {
            log::warn!(
                "Found {} repeated valve ids in Valve Sheet; keeping the first row of each",
                stats.duplicate_valves
            );
        }

        let valves = valve_rows
            .into_iter()
            .map(|row| {
                let valve_id = row.get(COL_VALVE);
                let assoc = by_valve.remove(valve_id).unwrap_or_default();
                ValveRecord {
                    valve_id: valve_id.to_string(),
                    location: row.get(COL_LOCATION).to_string(),
                    location_notes: row.get(COL_LOCATION_NOTES).to_string(),
                    function: row.get(COL_FUNCTION).to_string(),
                    // BTreeSet iteration is already lexicographic
                    zones: assoc.zones.into_iter().collect(),
                    lots: assoc.lots.into_iter().collect(),
                }
            })
            .collect();

        Self {
            valves,
            assignments,
            stats,
        }
    }

    /// All valves in Valve Sheet order
    pub fn valves(&self) -> &[ValveRecord] {
        &self.valves
    }

    /// Zone Sheet rows that survived the join
    pub fn assignments(&self) -> &[ZoneAssignment] {
        &self.assignments
    }

    pub fn stats(&self) -> &JoinStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.valves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valves.is_empty()
    }

    /// Valve with exactly this id
    pub fn valve(&self, valve_id: &str) -> Option<&ValveRecord> {
        self.valves.iter().find(|v| v.valve_id == valve_id)
    }

    /// Valve with this id, ignoring case and surrounding whitespace
    pub fn find_valve(&self, valve_id: &str) -> Option<&ValveRecord> {
        self.valve(valve_id)
            .or_else(|| self.valves.iter().find(|v| ids_match(&v.valve_id, valve_id)))
    }

    /// Every valve that serves the zone, compared as stored
    pub fn valves_for_zone(&self, zone: &str) -> Vec<&ValveRecord> {
        self.valves.iter().filter(|v| v.serves_zone(zone)).collect()
    }

    /// The zone(s) a lot belongs to, sorted
    pub fn zones_for_lot(&self, lot: &str) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|a| !a.zone.is_empty() && !a.lot.is_empty() && ids_match(&a.lot, lot))
            .map(|a| a.zone.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every lot that belongs to the zone, sorted
    ///
    /// The zone is compared by canonical form, so "Zone 4" finds the lots
    /// recorded under "Z4".
    pub fn lots_for_zone(&self, zone: &str) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|a| !a.zone.is_empty() && !a.lot.is_empty() && zones_match(&a.zone, zone))
            .map(|a| a.lot.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every distinct zone name carried by any valve
    pub fn zone_names(&self) -> BTreeSet<&str> {
        self.valves
            .iter()
            .flat_map(|v| v.zones.iter().map(String::as_str))
            .collect()
    }

    /// Valves that appear in no Zone Sheet row
    pub fn unmapped_valves(&self) -> Vec<&ValveRecord> {
        self.valves
            .iter()
            .filter(|v| v.zones.is_empty() && v.lots.is_empty())
            .collect()
    }
}
