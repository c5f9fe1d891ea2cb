//! Navigation controller.
//!
//! Turns navigation intents (step, scrub, load, reset) into route store
//! mutations and pushes the results to the render surface and the viewer
//! synchronizer.
//!
//! # Sync Policy
//!
//! | Operation              | Marker | Progress | Viewer sync |
//! |------------------------|--------|----------|-------------|
//! | `step_prev/next`       | yes    | yes      | yes         |
//! | `scrub (live)`         | yes    | no       | no          |
//! | `scrub (commit)`       | yes    | no       | yes         |
//! | `load_route`           | yes    | yes      | yes         |
//!
//! Live scrubbing skips the lookup so dragging never hits the imagery
//! service; releasing the scrub control commits and syncs once.

use tokio::time::Instant;
use tracing::{debug, info};

use crate::coord::Coordinate;
use crate::route::{RouteError, RouteResult, RouteStore};
use crate::sync::ViewerSynchronizer;
use crate::viewer::RenderSurface;

/// Drives a [`RouteStore`] from navigation intents.
#[derive(Debug, Default)]
pub struct NavigationController {
    store: RouteStore,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the route store.
    pub fn store(&self) -> &RouteStore {
        &self.store
    }

    /// Step one point back. Returns false at the start of the route.
    pub fn step_prev<S>(&mut self, surface: &mut S, sync: &mut ViewerSynchronizer, now: Instant) -> bool
    where
        S: RenderSurface + ?Sized,
    {
        match self.store.current_index().checked_sub(1) {
            Some(index) if !self.store.is_empty() => {
                self.move_to_index(index, surface, sync, now);
                true
            }
            _ => false,
        }
    }

    /// Step one point forward. Returns false at the end of the route.
    pub fn step_next<S>(&mut self, surface: &mut S, sync: &mut ViewerSynchronizer, now: Instant) -> bool
    where
        S: RenderSurface + ?Sized,
    {
        match self.store.last_index() {
            Some(last) if self.store.current_index() < last => {
                self.move_to_index(self.store.current_index() + 1, surface, sync, now);
                true
            }
            _ => false,
        }
    }

    /// Jump to `percent` (0-100) of the route.
    ///
    /// Live scrubbing (`commit == false`) only moves the marker; a committed
    /// scrub also requests a viewer sync. Returns the new index, or `None`
    /// on an empty route.
    pub fn scrub_to_percent<S>(
        &mut self,
        percent: f64,
        commit: bool,
        surface: &mut S,
        sync: &mut ViewerSynchronizer,
        now: Instant,
    ) -> Option<usize>
    where
        S: RenderSurface + ?Sized,
    {
        let index = scrub_index(percent, self.store.len())?;

        self.store.set_index(index);
        surface.set_marker(self.store.current_position());

        if commit {
            sync.request(
                self.store.current_position(),
                self.store.current_heading(),
                now,
            );
        }

        Some(self.store.current_index())
    }

    /// Replace the route with `points` and move to its start.
    ///
    /// Empty input fails with [`RouteError::InvalidRoute`] before anything
    /// is touched.
    pub fn load_route<S>(
        &mut self,
        points: Vec<Coordinate>,
        surface: &mut S,
        sync: &mut ViewerSynchronizer,
        now: Instant,
    ) -> RouteResult<()>
    where
        S: RenderSurface + ?Sized,
    {
        if points.is_empty() {
            return Err(RouteError::InvalidRoute(
                "track contains no points".to_string(),
            ));
        }

        self.clear_path(surface);
        self.store.load(points)?;

        surface.show_overlays(self.store.route());
        surface.set_marker(self.store.current_position());
        if let Some(controls) = surface.controls() {
            controls.set_scrub_position(0);
            controls.set_enabled(true);
        }
        surface.center_map(self.store.current_position());

        self.move_to_index(0, surface, sync, now);

        info!("Track loaded with {} points", self.store.len());
        Ok(())
    }

    /// Drop the route and fall back to the default position.
    pub fn reset_route<S>(&mut self, surface: &mut S, sync: &mut ViewerSynchronizer)
    where
        S: RenderSurface + ?Sized,
    {
        self.clear_path(surface);
        sync.cancel_pending();
        info!("Route reset to default position");
    }

    /// Reset the store and hide everything route-related.
    fn clear_path<S>(&mut self, surface: &mut S)
    where
        S: RenderSurface + ?Sized,
    {
        self.store.clear();
        surface.hide_overlays();
        if let Some(controls) = surface.controls() {
            controls.set_enabled(false);
        }
        surface.center_map(self.store.current_position());
    }

    fn move_to_index<S>(
        &mut self,
        index: usize,
        surface: &mut S,
        sync: &mut ViewerSynchronizer,
        now: Instant,
    ) where
        S: RenderSurface + ?Sized,
    {
        if self.store.is_empty() {
            return;
        }

        self.store.set_index(index);
        let position = self.store.current_position();
        let heading = self.store.current_heading();

        debug!(
            index = self.store.current_index(),
            %position,
            heading,
            "Moved along route"
        );

        surface.set_marker(position);
        let progress = self.store.progress_percent();
        if let Some(controls) = surface.controls() {
            controls.set_scrub_position(progress);
        }
        sync.request(position, heading, now);
    }
}

/// Index for a scrub position: `clamp(round(percent * len / 100), 0, len - 1)`.
fn scrub_index(percent: f64, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    // Float-to-int casts saturate: negatives and NaN land on 0
    let index = (percent * len as f64 / 100.0).round() as usize;
    Some(index.min(last))
}
