//! TrackWalk - Street-level imagery along a recorded track
//!
//! This library steps through an ordered route of coordinates, derives a
//! facing direction at every point, and keeps an external street-level
//! imagery viewer positioned on the current point.
//!
//! # Architecture
//!
//! ```text
//! UI events ──► Session ──► NavigationController ──► RouteStore
//!                  │                 │
//!                  │                 └──► ViewerSynchronizer (throttled)
//!                  │                               │
//!                  └──── ImageryLookup ◄───────────┘
//!                              │
//!                              └──► RenderSurface (reposition / recreate)
//! ```
//!
//! The front end (terminal, web, ...) implements [`viewer::RenderSurface`]
//! and feeds [`session::SessionCommand`]s into a [`session::Session`].

pub mod config;
pub mod coord;
pub mod imagery;
pub mod logging;
pub mod navigation;
pub mod route;
pub mod session;
pub mod sync;
pub mod track;
pub mod viewer;

pub use coord::{compute_heading, Coordinate, DEFAULT_POSITION};
pub use navigation::NavigationController;
pub use route::{NavigationState, RouteError, RouteStore};
pub use session::{Session, SessionCommand};
