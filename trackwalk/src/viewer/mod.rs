//! Render surface abstraction.
//!
//! The map, the street-level viewer and the navigation controls are owned by
//! the front end. The core only talks to them through [`RenderSurface`],
//! which lets the same navigation logic drive a browser, a terminal or a
//! test recorder.
//!
//! # Optional Controls
//!
//! Not every front end has navigation controls (buttons, a scrub bar). The
//! surface exposes them through [`RenderSurface::controls`], which returns
//! `None` when they are absent; callers skip the update in that case.
//!
//! # Implementors
//!
//! - `NullSurface` - ignores every call (headless runs)
//! - `RecordingSurface` - records every call for inspection

use crate::coord::Coordinate;
use crate::imagery::ImageryData;

/// Default camera pitch for the street-level viewer, in degrees.
pub const DEFAULT_PITCH: f64 = 10.0;

/// Message shown on the imagery surface when no imagery exists nearby.
pub const UNAVAILABLE_MESSAGE: &str = "Street View is not available for this location.";

/// Position and orientation of the street-level viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerPose {
    /// Where the viewer stands.
    pub position: Coordinate,
    /// Compass heading in degrees.
    pub heading: f64,
    /// Camera pitch in degrees.
    pub pitch: f64,
}

impl ViewerPose {
    pub fn new(position: Coordinate, heading: f64, pitch: f64) -> Self {
        Self {
            position,
            heading,
            pitch,
        }
    }
}

/// Navigation controls exposed by a front end.
pub trait NavigationControls {
    /// Enable or disable previous/next and the scrub control.
    fn set_enabled(&mut self, enabled: bool);

    /// Move the scrub control to `percent` (0-100).
    fn set_scrub_position(&mut self, percent: u8);
}

/// Output side of the front end: map overlays and the street-level viewer.
pub trait RenderSurface {
    /// Move the position marker.
    fn set_marker(&mut self, position: Coordinate);

    /// Show the path line for `route` together with the marker.
    fn show_overlays(&mut self, route: &[Coordinate]);

    /// Hide the path line and the marker.
    fn hide_overlays(&mut self);

    /// Center the map on `position`.
    fn center_map(&mut self, position: Coordinate);

    /// Move and re-orient the existing viewer instance.
    fn reposition_viewer(&mut self, pose: ViewerPose);

    /// Tear down the viewer instance and attach a fresh one at `pose`.
    fn recreate_viewer(&mut self, pose: ViewerPose);

    /// Replace the imagery surface content with `message`.
    fn show_unavailable(&mut self, message: &str);

    /// Describe the imagery the viewer is showing (capture place and date).
    fn show_capture_info(&mut self, _imagery: &ImageryData) {}

    /// Navigation controls, if this front end has any.
    fn controls(&mut self) -> Option<&mut dyn NavigationControls> {
        None
    }
}

/// Surface that ignores every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn set_marker(&mut self, _position: Coordinate) {}
    fn show_overlays(&mut self, _route: &[Coordinate]) {}
    fn hide_overlays(&mut self) {}
    fn center_map(&mut self, _position: Coordinate) {}
    fn reposition_viewer(&mut self, _pose: ViewerPose) {}
    fn recreate_viewer(&mut self, _pose: ViewerPose) {}
    fn show_unavailable(&mut self, _message: &str) {}
}

/// A call received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Marker(Coordinate),
    ShowOverlays(usize),
    HideOverlays,
    Center(Coordinate),
    Reposition(ViewerPose),
    Recreate(ViewerPose),
    Unavailable(String),
    ControlsEnabled(bool),
    ScrubPosition(u8),
}

/// Surface that records every call, with optional navigation controls.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    controls: Option<RecordedControls>,
    captures: Vec<ImageryData>,
}

/// Control state kept by a [`RecordingSurface`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordedControls {
    pub enabled: bool,
    pub scrub_percent: u8,
    calls: Vec<SurfaceCall>,
}

impl NavigationControls for RecordedControls {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.calls.push(SurfaceCall::ControlsEnabled(enabled));
    }

    fn set_scrub_position(&mut self, percent: u8) {
        self.scrub_percent = percent;
        self.calls.push(SurfaceCall::ScrubPosition(percent));
    }
}

impl RecordingSurface {
    /// Surface without navigation controls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface with navigation controls, initially disabled.
    pub fn with_controls() -> Self {
        Self {
            controls: Some(RecordedControls::default()),
            ..Self::default()
        }
    }

    /// Map and viewer calls, in order. Control calls are kept separately.
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Recorded controls, if the surface has any.
    pub fn recorded_controls(&self) -> Option<&RecordedControls> {
        self.controls.as_ref()
    }

    /// Control calls, in order.
    pub fn control_calls(&self) -> &[SurfaceCall] {
        self.controls.as_ref().map_or(&[], |c| c.calls.as_slice())
    }

    /// Capture info shown so far. Kept apart from [`calls`](Self::calls).
    pub fn captures(&self) -> &[ImageryData] {
        &self.captures
    }

    /// Number of viewer recreations.
    pub fn recreate_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Recreate(_)))
            .count()
    }

    /// Number of viewer repositions.
    pub fn reposition_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, SurfaceCall::Reposition(_)))
            .count()
    }

    /// Last marker position, if any.
    pub fn last_marker(&self) -> Option<Coordinate> {
        self.calls.iter().rev().find_map(|c| match c {
            SurfaceCall::Marker(p) => Some(*p),
            _ => None,
        })
    }

    /// Forget all recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
        self.captures.clear();
        if let Some(controls) = self.controls.as_mut() {
            controls.calls.clear();
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn set_marker(&mut self, position: Coordinate) {
        self.calls.push(SurfaceCall::Marker(position));
    }

    fn show_overlays(&mut self, route: &[Coordinate]) {
        self.calls.push(SurfaceCall::ShowOverlays(route.len()));
    }

    fn hide_overlays(&mut self) {
        self.calls.push(SurfaceCall::HideOverlays);
    }

    fn center_map(&mut self, position: Coordinate) {
        self.calls.push(SurfaceCall::Center(position));
    }

    fn reposition_viewer(&mut self, pose: ViewerPose) {
        self.calls.push(SurfaceCall::Reposition(pose));
    }

    fn recreate_viewer(&mut self, pose: ViewerPose) {
        self.calls.push(SurfaceCall::Recreate(pose));
    }

    fn show_unavailable(&mut self, message: &str) {
        self.calls.push(SurfaceCall::Unavailable(message.to_string()));
    }

    fn show_capture_info(&mut self, imagery: &ImageryData) {
        self.captures.push(imagery.clone());
    }

    fn controls(&mut self) -> Option<&mut dyn NavigationControls> {
        self.controls
            .as_mut()
            .map(|c| c as &mut dyn NavigationControls)
    }
}
