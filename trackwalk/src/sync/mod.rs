//! Viewer synchronization.
//!
//! Keeps the street-level viewer on the current route position while
//! limiting how often the external imagery lookup runs.
//!
//! # Flow
//!
//! ```text
//! request(pos, heading) ──► SyncCoalescer ──(quiet period)──► take_due()
//!                                                                │
//!                                                     LookupRequest (gen N)
//!                                                                │
//!                          ImageryLookup::find_nearest ◄─────────┘
//!                                     │
//! apply(result) ◄─────────────────────┘
//!     ├── Ok + unavailable before ──► recreate viewer
//!     ├── Ok + available before   ──► reposition viewer
//!     └── Unavailable             ──► "not available" message
//! ```

mod availability;
mod coalescer;
mod synchronizer;

pub use availability::{ViewerAction, ViewerAvailability};
pub use coalescer::{SyncCoalescer, DEFAULT_QUIET_PERIOD};
pub use synchronizer::{SyncOutcome, SyncStats, ViewerSynchronizer};

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::imagery::DEFAULT_SEARCH_RADIUS_M;
use crate::viewer::DEFAULT_PITCH;

/// How lookup results for superseded positions are handled.
///
/// Lookups are never cancelled, so a slow answer for an old position can
/// arrive after the user has moved on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Apply every result as it arrives (last write wins).
    #[default]
    Apply,
    /// Drop results older than the most recently issued lookup.
    Discard,
}

impl StalePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StalePolicy::Apply => "apply",
            StalePolicy::Discard => "discard",
        }
    }
}

impl fmt::Display for StalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "apply" => Ok(StalePolicy::Apply),
            "discard" => Ok(StalePolicy::Discard),
            other => Err(format!("expected 'apply' or 'discard', got '{}'", other)),
        }
    }
}

/// Configuration for the viewer synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Quiet period before a pending sync fires.
    pub quiet_period: Duration,
    /// Search radius for the imagery lookup, in metres.
    pub search_radius_m: f64,
    /// Recenter the map on every successful sync.
    pub follow: bool,
    /// Camera pitch handed to the viewer.
    pub pitch: f64,
    /// Handling of results for superseded lookups.
    pub stale_policy: StalePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            quiet_period: DEFAULT_QUIET_PERIOD,
            search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            follow: true,
            pitch: DEFAULT_PITCH,
            stale_policy: StalePolicy::Apply,
        }
    }
}
