//! Valve lookup: find the water valves that isolate a zone or lot
//!
//! Reads the "Valve Sheet" and "Zone Sheet" exports, joins them into a
//! relationship graph, and answers which valves must close for a shutoff and
//! which zones and lots lose or keep pressure.

pub mod cli;
pub mod core;
