//! Core module - valve data, joins, search, and shutoff classification

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod ident;
pub mod project;
pub mod rows;
pub mod search;
pub mod shutoff;
pub mod source;
pub mod valve;

pub use cache::{CacheState, Clock, ManualClock, Snapshot, SystemClock, ValveCache, DEFAULT_TTL};
pub use catalog::{Freshness, ValveCatalog, ValveListing};
pub use config::Config;
pub use error::DataError;
pub use graph::{JoinStats, RelationshipGraph};
pub use project::{Project, ProjectError};
pub use search::{search, search_terms, SearchResult};
pub use shutoff::{classify, impact, Impact, ScopeSource, ShutoffReport, ZoneValves};
pub use source::{CsvDirSource, MemorySource, SourceError, TabularSource, VALVE_SHEET, ZONE_SHEET};
pub use valve::{ValveRecord, ZoneAssignment};
