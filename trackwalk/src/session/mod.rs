//! Navigation session event loop.
//!
//! A [`Session`] owns everything needed to walk a route: the navigation
//! controller, the viewer synchronizer, the render surface and the imagery
//! lookup. It runs as a single cooperative loop:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Session::run                         │
//! │                                                               │
//! │  SessionCommand ──► handle() ──► NavigationController         │
//! │                                        │                      │
//! │  throttle timer ──► fire_due() ──► ImageryLookup (in flight)  │
//! │                                        │                      │
//! │  lookup done ─────► apply_lookup() ──► RenderSurface          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookups are not cancelled. Several may be in flight when the user keeps
//! moving, and each result is applied when it arrives.
//!
//! # Example
//!
//! ```ignore
//! use trackwalk::session::{Session, SessionCommand};
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! let session = Session::new(SyncConfig::default(), surface, lookup);
//!
//! let shutdown = CancellationToken::new();
//! let handle = tokio::spawn(session.run(rx, shutdown.clone()));
//!
//! tx.send(SessionCommand::StepNext).await?;
//! ```

use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coord::Coordinate;
use crate::imagery::{BoxFuture, ImageryLookup, LookupResult};
use crate::navigation::NavigationController;
use crate::route::RouteResult;
use crate::sync::{SyncConfig, SyncOutcome, ViewerSynchronizer};
use crate::viewer::RenderSurface;

/// Default capacity for the session command channel.
pub const DEFAULT_COMMAND_CHANNEL_CAPACITY: usize = 64;

/// A navigation intent from the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Move one point back.
    StepPrev,
    /// Move one point forward.
    StepNext,
    /// Jump to a percentage of the route.
    Scrub {
        /// Position in percent (0-100).
        percent: f64,
        /// True when the scrub control was released.
        commit: bool,
    },
    /// Replace the route.
    Load(Vec<Coordinate>),
    /// Drop the route and return to the default position.
    Reset,
}

/// Owns the navigation state and its collaborators.
pub struct Session<S, L>
where
    S: RenderSurface,
    L: ImageryLookup + ?Sized,
{
    controller: NavigationController,
    synchronizer: ViewerSynchronizer,
    surface: S,
    lookup: Arc<L>,
    in_flight: FuturesUnordered<BoxFuture<'static, LookupResult>>,
}

impl<S, L> Session<S, L>
where
    S: RenderSurface,
    L: ImageryLookup + ?Sized,
{
    /// Creates a session with an empty route.
    pub fn new(config: SyncConfig, surface: S, lookup: Arc<L>) -> Self {
        Self {
            controller: NavigationController::new(),
            synchronizer: ViewerSynchronizer::new(config),
            surface,
            lookup,
            in_flight: FuturesUnordered::new(),
        }
    }

    /// Apply a navigation command.
    ///
    /// Only [`SessionCommand::Load`] can fail; the session is left unchanged
    /// in that case.
    pub fn handle(&mut self, command: SessionCommand, now: Instant) -> RouteResult<()> {
        let Self {
            controller,
            synchronizer,
            surface,
            ..
        } = self;

        match command {
            SessionCommand::StepPrev => {
                controller.step_prev(surface, synchronizer, now);
            }
            SessionCommand::StepNext => {
                controller.step_next(surface, synchronizer, now);
            }
            SessionCommand::Scrub { percent, commit } => {
                controller.scrub_to_percent(percent, commit, surface, synchronizer, now);
            }
            SessionCommand::Load(points) => {
                controller.load_route(points, surface, synchronizer, now)?;
            }
            SessionCommand::Reset => {
                controller.reset_route(surface, synchronizer);
            }
        }
        Ok(())
    }

    /// Issue the pending lookup if its quiet period has elapsed.
    ///
    /// Returns true if a lookup was started.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.synchronizer.take_due(now) {
            Some(request) => {
                self.in_flight.push(self.lookup.find_nearest(request));
                true
            }
            None => false,
        }
    }

    /// Apply a completed lookup to the surface.
    pub fn apply_lookup(&mut self, result: LookupResult) -> SyncOutcome {
        self.synchronizer.apply(result, &mut self.surface)
    }

    /// Wait for the next in-flight lookup and apply it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_lookup(&mut self) -> Option<SyncOutcome> {
        let result = self.in_flight.next().await?;
        Some(self.apply_lookup(result))
    }

    /// Run the event loop until the command channel closes or `shutdown`
    /// is cancelled, then hand the session back.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        shutdown: CancellationToken,
    ) -> Self {
        info!("Navigation session starting");

        loop {
            let deadline = self.synchronizer.deadline();

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Navigation session shutting down");
                    break;
                }

                Some(result) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    let outcome = self.apply_lookup(result);
                    debug!(?outcome, "Lookup result applied");
                }

                _ = wait_until(deadline) => {
                    self.fire_due(Instant::now());
                }

                command = commands.recv() => {
                    match command {
                        Some(command) => {
                            if let Err(e) = self.handle(command, Instant::now()) {
                                warn!(error = %e, "Navigation command rejected");
                            }
                        }
                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        if !self.in_flight.is_empty() {
            debug!(
                in_flight = self.in_flight.len(),
                "Dropping unfinished lookups"
            );
        }

        info!("Navigation session stopped");
        self
    }

    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    pub fn synchronizer(&self) -> &ViewerSynchronizer {
        &self.synchronizer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Number of lookups started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Sleep until `deadline`, or forever if there is none.
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
