//! Row normalization
//!
//! Turns a raw table (header row first) into header-keyed records and
//! checks that the columns the joiner depends on are present.

use std::collections::HashMap;

use crate::core::error::DataError;
use crate::core::source::{Table, VALVE_SHEET, ZONE_SHEET};

pub const COL_VALVE: &str = "Valve";
pub const COL_LOCATION: &str = "Location";
pub const COL_LOCATION_NOTES: &str = "Location Notes";
pub const COL_FUNCTION: &str = "Function";
pub const COL_ZONE: &str = "Zone";
pub const COL_LOT: &str = "Lot #";

/// Columns the Zone Sheet must carry
pub const ZONE_SHEET_COLUMNS: [&str; 3] = [COL_VALVE, COL_ZONE, COL_LOT];

/// One data row keyed by trimmed header name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: HashMap<String, String>,
}

impl Record {
    /// Value of a column, or "" when the column or cell is missing
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.is_empty())
    }
}

/// Convert a raw table into records using its first row as headers
///
/// Headers and values are trimmed; cells missing from short rows become
/// empty strings and cells beyond the header width are ignored. Rows with
/// no content at all are dropped.
pub fn to_records(table: &Table) -> Vec<Record> {
    let Some((header, rows)) = table.split_first() else {
        return Vec::new();
    };
    let headers: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    rows.iter()
        .map(|row| Record {
            values: headers
                .iter()
                .enumerate()
                .filter(|(_, h)| !h.is_empty())
                .map(|(i, h)| {
                    let value = row.get(i).map(|v| v.trim()).unwrap_or("");
                    (h.clone(), value.to_string())
                })
                .collect(),
        })
        .filter(|r| !r.is_blank())
        .collect()
}

/// Fail with a schema error naming the first required column the table lacks
pub fn require_columns(table: &Table, sheet: &str, required: &[&str]) -> Result<(), DataError> {
    let headers: Vec<&str> = table
        .first()
        .map(|h| h.iter().map(|c| c.trim()).collect())
        .unwrap_or_default();

    match required.iter().find(|col| !headers.contains(col)) {
        Some(missing) => Err(DataError::missing_column(sheet, missing)),
        None => Ok(()),
    }
}

/// Both sheets, normalized and validated
#[derive(Debug, Clone)]
pub struct NormalizedSheets {
    pub valves: Vec<Record>,
    pub zones: Vec<Record>,
}

/// Validate and normalize the Valve Sheet and Zone Sheet together
pub fn normalize(valve_table: &Table, zone_table: &Table) -> Result<NormalizedSheets, DataError> {
    if valve_table.is_empty() {
        return Err(DataError::empty(VALVE_SHEET));
    }
    require_columns(valve_table, VALVE_SHEET, &[COL_VALVE])?;
    require_columns(zone_table, ZONE_SHEET, &ZONE_SHEET_COLUMNS)?;

    let valves = to_records(valve_table);
    if valves.is_empty() {
        return Err(DataError::empty(VALVE_SHEET));
    }

    Ok(NormalizedSheets {
        valves,
        zones: to_records(zone_table),
    })
}
