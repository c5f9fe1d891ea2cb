//! Route storage and current-position tracking.
//!
//! The [`RouteStore`] owns the ordered list of route points together with
//! the current index, and derives the current position and heading from it.
//!
//! # Heading Rule
//!
//! Whenever the index changes, the heading is recomputed from neighboring
//! points (`n` = route length, `i` = index):
//!
//! - `n == 1`: heading is kept (a single point has no direction)
//! - `i == 0`: bearing from point 0 to point 1
//! - `i == n - 1`: bearing from point `n - 2` to point `n - 1`
//! - otherwise: bearing from point `i - 1` to point `i + 1`
//!
//! Interior points look one step behind and one step ahead, so the heading
//! follows the local trajectory rather than only the next segment.

use thiserror::Error;

use crate::coord::{compute_heading, Coordinate, DEFAULT_POSITION};

/// Errors raised while replacing the route.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// Track input was empty or contained unusable points.
    #[error("Invalid route: {0}")]
    InvalidRoute(String),
}

/// Result type for route operations.
pub type RouteResult<T> = Result<T, RouteError>;

/// Point-in-time copy of the navigation state.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    /// The full route.
    pub route: Vec<Coordinate>,
    /// Index of the current point.
    pub current_index: usize,
    /// The point at `current_index` (or the default position on an empty route).
    pub current_position: Coordinate,
    /// Derived facing direction in degrees.
    pub current_heading: f64,
}

/// Owns the route and the current position within it.
///
/// # Usage
///
/// ```
/// use trackwalk::{Coordinate, RouteStore};
///
/// let mut store = RouteStore::new();
/// store
///     .load(vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0)])
///     .unwrap();
///
/// store.set_index(5); // clamped to the last point
/// assert_eq!(store.current_index(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RouteStore {
    route: Vec<Coordinate>,
    current_index: usize,
    current_position: Coordinate,
    current_heading: f64,
    /// Whether the route came from a real track rather than the default.
    loaded: bool,
}

impl Default for RouteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteStore {
    /// Create an empty store positioned at [`DEFAULT_POSITION`].
    pub fn new() -> Self {
        Self {
            route: Vec::new(),
            current_index: 0,
            current_position: DEFAULT_POSITION,
            current_heading: 0.0,
            loaded: false,
        }
    }

    /// Replace the route and move to its first point.
    ///
    /// Fails with [`RouteError::InvalidRoute`] on empty input, leaving the
    /// store untouched. The heading is not updated here; callers move to
    /// index 0 through [`set_index`](Self::set_index) to derive it.
    pub fn load(&mut self, points: Vec<Coordinate>) -> RouteResult<()> {
        let first = *points
            .first()
            .ok_or_else(|| RouteError::InvalidRoute("track contains no points".to_string()))?;

        self.route = points;
        self.current_index = 0;
        self.current_position = first;
        self.loaded = true;
        Ok(())
    }

    /// Reset to a single-point route at [`DEFAULT_POSITION`].
    pub fn clear(&mut self) {
        self.route = vec![DEFAULT_POSITION];
        self.current_index = 0;
        self.current_position = DEFAULT_POSITION;
        self.loaded = false;
    }

    /// Move to `index`, clamped to the route bounds.
    ///
    /// No-op on an empty route. Recomputes the position and heading.
    pub fn set_index(&mut self, index: usize) {
        let Some(last) = self.route.len().checked_sub(1) else {
            return;
        };

        self.current_index = index.min(last);
        self.current_position = self.route[self.current_index];

        if let Some(heading) = self.derive_heading() {
            self.current_heading = heading;
        }
    }

    /// Heading for the current index, or `None` for single-point routes.
    fn derive_heading(&self) -> Option<f64> {
        let n = self.route.len();
        if n < 2 {
            return None;
        }

        let i = self.current_index;
        let (from, to) = if i == 0 {
            (self.route[0], self.route[1])
        } else if i == n - 1 {
            (self.route[n - 2], self.route[n - 1])
        } else {
            (self.route[i - 1], self.route[i + 1])
        };

        Some(compute_heading(from, to))
    }

    /// The full route.
    pub fn route(&self) -> &[Coordinate] {
        &self.route
    }

    /// Number of points in the route.
    pub fn len(&self) -> usize {
        self.route.len()
    }

    /// Returns true if no route has been set yet.
    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    /// Returns true if the route came from [`load`](Self::load).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_position(&self) -> Coordinate {
        self.current_position
    }

    pub fn current_heading(&self) -> f64 {
        self.current_heading
    }

    /// Index of the last point, or `None` on an empty route.
    pub fn last_index(&self) -> Option<usize> {
        self.route.len().checked_sub(1)
    }

    /// Progress through the route as a whole percentage (`floor(index / len * 100)`).
    pub fn progress_percent(&self) -> u8 {
        if self.route.is_empty() {
            return 0;
        }
        (self.current_index * 100 / self.route.len()) as u8
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> NavigationState {
        NavigationState {
            route: self.route.clone(),
            current_index: self.current_index,
            current_position: self.current_position,
            current_heading: self.current_heading,
        }
    }
}
