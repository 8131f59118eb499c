//! Valve records and zone assignments

use serde::{Deserialize, Serialize};

/// A physical shutoff valve with the zones and lots it serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValveRecord {
    /// Unique valve identifier (e.g., "V12")
    pub valve_id: String,

    /// Where the valve is
    pub location: String,

    /// Free-text notes about finding or operating the valve
    pub location_notes: String,

    /// What the valve does (e.g., "Main isolation")
    pub function: String,

    /// Zones this valve serves, sorted ascending, no duplicates
    pub zones: Vec<String>,

    /// Lots covered by this valve's zones, sorted ascending, no duplicates
    pub lots: Vec<String>,
}

impl ValveRecord {
    /// Whether this valve serves the zone, compared as stored
    pub fn serves_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|z| z == zone)
    }
}

/// One Zone Sheet row that survived the join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAssignment {
    pub valve: String,
    pub zone: String,
    pub lot: String,
}
