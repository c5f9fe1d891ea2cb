//! Viewer synchronizer: throttled lookups and the availability policy.

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{StalePolicy, SyncCoalescer, SyncConfig, ViewerAction, ViewerAvailability};
use crate::coord::Coordinate;
use crate::imagery::{LookupRequest, LookupResult, LookupStatus};
use crate::viewer::{RenderSurface, ViewerPose, UNAVAILABLE_MESSAGE};

/// Position and heading waiting to be synced.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SyncTarget {
    position: Coordinate,
    heading: f64,
}

/// What applying a lookup result did to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The viewer was torn down and rebuilt.
    Recreated,
    /// The existing viewer was moved.
    Repositioned,
    /// No imagery; the unavailable message is shown.
    Unavailable,
    /// The result belonged to a superseded lookup and was dropped.
    Discarded,
}

/// Counters for sync activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Sync requests received.
    pub requested: u64,
    /// Lookups issued after the quiet period.
    pub issued: u64,
    /// Results that found imagery.
    pub succeeded: u64,
    /// Results without imagery.
    pub unavailable: u64,
    /// Results dropped as stale.
    pub discarded: u64,
}

/// Keeps the street-level viewer consistent with the navigation state.
///
/// The synchronizer does not run lookups itself. The owner polls
/// [`take_due`](Self::take_due) when [`deadline`](Self::deadline) passes,
/// runs the returned request against an `ImageryLookup`, and feeds the
/// result back through [`apply`](Self::apply).
#[derive(Debug)]
pub struct ViewerSynchronizer {
    config: SyncConfig,
    coalescer: SyncCoalescer<SyncTarget>,
    availability: ViewerAvailability,
    /// Generation of the most recently issued lookup (0 = none yet).
    latest_generation: u64,
    stats: SyncStats,
}

impl ViewerSynchronizer {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            coalescer: SyncCoalescer::new(config.quiet_period),
            config,
            availability: ViewerAvailability::new(),
            latest_generation: 0,
            stats: SyncStats::default(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(SyncConfig::default())
    }

    /// Ask for the viewer to show `position` facing `heading`.
    ///
    /// Requests inside the quiet period replace each other; only the last
    /// one is looked up.
    pub fn request(&mut self, position: Coordinate, heading: f64, now: Instant) {
        self.stats.requested += 1;
        self.coalescer.request(SyncTarget { position, heading }, now);
    }

    /// Drop a pending request without looking it up.
    pub fn cancel_pending(&mut self) {
        if self.coalescer.is_pending() {
            debug!("ViewerSynchronizer: pending sync cancelled");
        }
        self.coalescer.cancel();
    }

    /// When the pending request fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.coalescer.deadline()
    }

    /// Returns the lookup to issue if the quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<LookupRequest> {
        let target = self.coalescer.take_due(now)?;

        self.latest_generation += 1;
        self.stats.issued += 1;

        let request = LookupRequest {
            location: target.position,
            radius_m: self.config.search_radius_m,
            heading: target.heading,
            generation: self.latest_generation,
        };

        debug!(
            location = %request.location,
            heading = request.heading,
            generation = request.generation,
            "ViewerSynchronizer: issuing imagery lookup"
        );

        Some(request)
    }

    /// Apply a lookup result to the surface.
    ///
    /// Results are applied in arrival order regardless of which position
    /// they were issued for, unless the stale policy says otherwise.
    pub fn apply<S>(&mut self, result: LookupResult, surface: &mut S) -> SyncOutcome
    where
        S: RenderSurface + ?Sized,
    {
        let request = result.request;

        if self.config.stale_policy == StalePolicy::Discard
            && request.generation < self.latest_generation
        {
            debug!(
                generation = request.generation,
                latest = self.latest_generation,
                "ViewerSynchronizer: discarding stale lookup result"
            );
            self.stats.discarded += 1;
            return SyncOutcome::Discarded;
        }

        match result.status {
            LookupStatus::Ok(data) => {
                self.stats.succeeded += 1;
                let pose = ViewerPose::new(request.location, request.heading, self.config.pitch);

                let outcome = match self.availability.on_success() {
                    ViewerAction::Recreate => {
                        info!(
                            location = %request.location,
                            pano_id = data.pano_id.as_deref().unwrap_or("-"),
                            "Imagery available, recreating viewer"
                        );
                        surface.recreate_viewer(pose);
                        SyncOutcome::Recreated
                    }
                    ViewerAction::Reposition => {
                        debug!(location = %request.location, "Repositioning viewer");
                        surface.reposition_viewer(pose);
                        SyncOutcome::Repositioned
                    }
                };

                surface.show_capture_info(&data);

                if self.config.follow {
                    surface.center_map(request.location);
                }

                outcome
            }
            LookupStatus::Unavailable => {
                self.stats.unavailable += 1;
                self.availability.on_unavailable();
                warn!(
                    location = %request.location,
                    "Street-level imagery is not available for this location"
                );
                surface.show_unavailable(UNAVAILABLE_MESSAGE);
                SyncOutcome::Unavailable
            }
        }
    }

    pub fn availability(&self) -> ViewerAvailability {
        self.availability
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns true if a request is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.coalescer.is_pending()
    }
}
