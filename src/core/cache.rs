//! In-memory cache of the relationship graph
//!
//! A single slot holding the most recent successful join. The slot moves
//! through these states:
//!
//! - `Empty`: nothing fetched yet
//! - `Fresh`: fetched less than the TTL ago, served as-is
//! - `Stale`: the last refresh failed, so the previous graph is served with
//!   `stale = true` and the next request tries again
//!
//! There is no background refresh: an expired slot is refreshed by the next
//! request. The clock is injected so expiry can be tested without sleeping.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::error::DataError;
use crate::core::graph::RelationshipGraph;
use crate::core::source::TabularSource;

/// Default time-to-live for a fetched graph
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the cache.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let step = chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
        self.now.set(self.now.get() + step);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Lifecycle state of the cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    graph: Arc<RelationshipGraph>,
    fetched_at: DateTime<Utc>,
}

/// The graph as served to one request
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub graph: Arc<RelationshipGraph>,
    /// When the served graph was fetched
    pub updated_at: DateTime<Utc>,
    /// The graph is older than the TTL because the last refresh failed
    pub stale: bool,
}

/// TTL cache over a tabular source
pub struct ValveCache<S, C = SystemClock> {
    source: S,
    clock: C,
    ttl: Duration,
    entry: Option<CacheEntry>,
    state: CacheState,
}

impl<S: TabularSource, C: Clock> ValveCache<S, C> {
    pub fn with_clock(source: S, clock: C, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            entry: None,
            state: CacheState::Empty,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Serve the cached graph while fresh, otherwise refresh
    pub fn get(&mut self) -> Result<Snapshot, DataError> {
        let now = self.clock.now();

        if self.state == CacheState::Fresh {
            if let Some(entry) = &self.entry {
                if is_younger_than(entry.fetched_at, now, self.ttl) {
                    return Ok(Snapshot {
                        graph: Arc::clone(&entry.graph),
                        updated_at: entry.fetched_at,
                        stale: false,
                    });
                }
                log::debug!("Cached valve data expired (fetched {})", entry.fetched_at);
            }
        }

        self.refresh()
    }

    /// Fetch and join both sheets now, regardless of age
    ///
    /// On failure the previous graph is served as stale when one exists;
    /// otherwise the failure is returned as [`DataError::DataSource`].
    pub fn refresh(&mut self) -> Result<Snapshot, DataError> {
        let now = self.clock.now();

        match RelationshipGraph::load(&self.source) {
            Ok(graph) => {
                log::info!("Loaded {} valves", graph.len());
                let graph = Arc::new(graph);
                self.entry = Some(CacheEntry {
                    graph: Arc::clone(&graph),
                    fetched_at: now,
                });
                self.state = CacheState::Fresh;
                Ok(Snapshot {
                    graph,
                    updated_at: now,
                    stale: false,
                })
            }
            Err(e) => {
                log::error!("Error fetching valve data: {}", e);
                match &self.entry {
                    Some(entry) => {
                        log::warn!(
                            "Returning stale cache from {} due to fetch error",
                            entry.fetched_at
                        );
                        self.state = CacheState::Stale;
                        Ok(Snapshot {
                            graph: Arc::clone(&entry.graph),
                            updated_at: entry.fetched_at,
                            stale: true,
                        })
                    }
                    None => Err(DataError::unavailable(e)),
                }
            }
        }
    }

    /// Force the next `get` to refresh
    ///
    /// The current graph is kept so it can still be served stale if that
    /// refresh fails.
    pub fn invalidate(&mut self) {
        if self.entry.is_some() {
            self.state = CacheState::Stale;
        }
    }
}

fn is_younger_than(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    // A clock that moved backwards yields a negative age; treat it as expired
    (now - fetched_at)
        .to_std()
        .map_or(false, |age| age < ttl)
}
