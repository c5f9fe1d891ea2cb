//! Integration tests for route navigation and viewer synchronization.
//!
//! These tests drive a full `Session` through its command channel with a
//! paused tokio clock, so throttle windows and slow lookups are simulated
//! deterministically.
//!
//! Run with: `cargo test --test navigation_integration`

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use trackwalk::imagery::{
    BoxFuture, ImageryData, ImageryLookup, LookupRequest, LookupResult, LookupStatus,
};
use trackwalk::sync::{StalePolicy, SyncConfig, ViewerSynchronizer};
use trackwalk::viewer::{NullSurface, RecordingSurface, SurfaceCall};
use trackwalk::{
    compute_heading, Coordinate, NavigationController, RouteError, Session, SessionCommand,
    DEFAULT_POSITION,
};

// ============================================================================
// Helpers
// ============================================================================

/// Lookup that answers from a script and records every request.
///
/// Each scripted entry is `(available, delay)`. Once the script runs out,
/// lookups succeed immediately.
struct ScriptedLookup {
    script: Mutex<VecDeque<(bool, Duration)>>,
    requests: Mutex<Vec<LookupRequest>>,
}

impl ScriptedLookup {
    fn new(script: Vec<(bool, Duration)>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn always_available() -> Arc<Self> {
        Self::new(Vec::new())
    }

    fn requests(&self) -> Vec<LookupRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ImageryLookup for ScriptedLookup {
    fn find_nearest(&self, request: LookupRequest) -> BoxFuture<'static, LookupResult> {
        self.requests.lock().unwrap().push(request);
        let (available, delay) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((true, Duration::ZERO));

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let status = if available {
                LookupStatus::Ok(ImageryData {
                    pano_id: Some(format!("pano-{}", request.generation)),
                    location: request.location,
                    date: None,
                })
            } else {
                LookupStatus::Unavailable
            };
            LookupResult { request, status }
        })
    }
}

/// Running session plus the handles needed to drive it.
struct Harness {
    tx: mpsc::Sender<SessionCommand>,
    shutdown: CancellationToken,
    handle: tokio::task::JoinHandle<Session<RecordingSurface, ScriptedLookup>>,
}

impl Harness {
    fn start(config: SyncConfig, lookup: Arc<ScriptedLookup>) -> Self {
        let session = Session::new(config, RecordingSurface::with_controls(), lookup);
        let (tx, rx) = mpsc::channel(256);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(session.run(rx, shutdown.clone()));
        Self {
            tx,
            shutdown,
            handle,
        }
    }

    async fn send(&self, command: SessionCommand) {
        self.tx.send(command).await.expect("session should be running");
    }

    async fn finish(self) -> Session<RecordingSurface, ScriptedLookup> {
        self.shutdown.cancel();
        self.handle.await.expect("session task should not panic")
    }
}

fn track(n: usize) -> Vec<Coordinate> {
    (0..n)
        .map(|i| Coordinate::new(48.85 + i as f64 * 0.0005, 2.34 + i as f64 * 0.0003))
        .collect()
}

async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// ============================================================================
// Session Flow
// ============================================================================

/// Loading a track positions the marker and, after the quiet period, builds
/// the viewer at the first point.
#[tokio::test(start_paused = true)]
async fn test_load_then_first_sync_recreates_viewer() {
    let lookup = ScriptedLookup::always_available();
    let harness = Harness::start(SyncConfig::default(), Arc::clone(&lookup));

    harness.send(SessionCommand::Load(track(10))).await;
    wait(600).await;

    let session = harness.finish().await;
    let surface = session.surface();

    assert_eq!(lookup.requests().len(), 1);
    assert_eq!(lookup.requests()[0].location, track(10)[0]);
    assert_eq!(surface.recreate_count(), 1);
    assert_eq!(surface.reposition_count(), 0);
    assert!(surface.recorded_controls().unwrap().enabled);
}

/// Live scrubbing never triggers lookups; a burst of committed scrubs
/// triggers exactly one, for the last position.
#[tokio::test(start_paused = true)]
async fn test_scrub_lookup_counts() {
    let lookup = ScriptedLookup::always_available();
    let harness = Harness::start(SyncConfig::default(), Arc::clone(&lookup));
    let points = track(100);

    harness.send(SessionCommand::Load(points.clone())).await;
    wait(600).await;
    assert_eq!(lookup.requests().len(), 1);

    for percent in 0..=50 {
        harness
            .send(SessionCommand::Scrub {
                percent: percent as f64,
                commit: false,
            })
            .await;
    }
    wait(2000).await;
    assert_eq!(lookup.requests().len(), 1, "live scrubs must not look up");

    for percent in [10.0, 20.0, 30.0, 40.0, 75.0] {
        harness
            .send(SessionCommand::Scrub {
                percent,
                commit: true,
            })
            .await;
        wait(50).await;
    }
    wait(600).await;

    let requests = lookup.requests();
    assert_eq!(requests.len(), 2, "committed burst collapses into one lookup");
    assert_eq!(requests[1].location, points[75]);

    let session = harness.finish().await;
    assert_eq!(session.controller().store().current_index(), 75);
}

/// Rapid stepping collapses into a single lookup at the final position.
#[tokio::test(start_paused = true)]
async fn test_rapid_steps_collapse() {
    let lookup = ScriptedLookup::always_available();
    let harness = Harness::start(SyncConfig::default(), Arc::clone(&lookup));
    let points = track(20);

    harness.send(SessionCommand::Load(points.clone())).await;
    for _ in 0..8 {
        harness.send(SessionCommand::StepNext).await;
        wait(100).await;
    }
    wait(600).await;

    let requests = lookup.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].location, points[8]);
    assert_eq!(
        requests[0].heading,
        compute_heading(points[7], points[9])
    );

    harness.finish().await;
}

/// Unavailable followed by available recreates the viewer; a second
/// available result only repositions it.
#[tokio::test(start_paused = true)]
async fn test_recovery_after_unavailable() {
    let lookup = ScriptedLookup::new(vec![
        (true, Duration::ZERO),
        (false, Duration::ZERO),
        (true, Duration::ZERO),
        (true, Duration::ZERO),
    ]);
    let harness = Harness::start(SyncConfig::default(), Arc::clone(&lookup));

    harness.send(SessionCommand::Load(track(10))).await;
    wait(600).await;
    for _ in 0..3 {
        harness.send(SessionCommand::StepNext).await;
        wait(600).await;
    }

    let session = harness.finish().await;
    let viewer_calls: Vec<&SurfaceCall> = session
        .surface()
        .calls()
        .iter()
        .filter(|c| {
            matches!(
                c,
                SurfaceCall::Recreate(_) | SurfaceCall::Reposition(_) | SurfaceCall::Unavailable(_)
            )
        })
        .collect();

    assert_eq!(viewer_calls.len(), 4);
    assert!(matches!(viewer_calls[0], SurfaceCall::Recreate(_)));
    assert!(matches!(viewer_calls[1], SurfaceCall::Unavailable(_)));
    assert!(matches!(viewer_calls[2], SurfaceCall::Recreate(_)));
    assert!(matches!(viewer_calls[3], SurfaceCall::Reposition(_)));
    assert!(session.synchronizer().availability().is_available());
}

/// A slow lookup for an old position lands after a fast one for the new
/// position and still wins by default.
#[tokio::test(start_paused = true)]
async fn test_stale_result_last_write_wins() {
    let lookup = ScriptedLookup::new(vec![
        (true, Duration::from_secs(3)),
        (true, Duration::from_millis(10)),
    ]);
    let harness = Harness::start(SyncConfig::default(), Arc::clone(&lookup));
    let points = track(5);

    harness.send(SessionCommand::Load(points.clone())).await;
    wait(600).await; // first lookup in flight (slow)
    harness.send(SessionCommand::StepNext).await;
    wait(600).await; // second lookup issued and applied
    wait(3000).await; // slow lookup lands

    let session = harness.finish().await;
    let centers: Vec<Coordinate> = session
        .surface()
        .calls()
        .iter()
        .filter_map(|c| match c {
            SurfaceCall::Center(p) => Some(*p),
            _ => None,
        })
        .collect();

    assert_eq!(lookup.requests().len(), 2);
    assert_eq!(centers.last(), Some(&points[0]));
    assert_eq!(session.controller().store().current_index(), 1);
}

/// With the discard policy, the superseded result is dropped.
#[tokio::test(start_paused = true)]
async fn test_stale_result_discarded_when_configured() {
    let lookup = ScriptedLookup::new(vec![
        (true, Duration::from_secs(3)),
        (true, Duration::from_millis(10)),
    ]);
    let config = SyncConfig {
        stale_policy: StalePolicy::Discard,
        ..Default::default()
    };
    let harness = Harness::start(config, Arc::clone(&lookup));
    let points = track(5);

    harness.send(SessionCommand::Load(points.clone())).await;
    wait(600).await;
    harness.send(SessionCommand::StepNext).await;
    wait(3600).await;

    let session = harness.finish().await;
    let stats = session.synchronizer().stats();

    assert_eq!(stats.issued, 2);
    assert_eq!(stats.discarded, 1);
    assert_eq!(session.surface().recreate_count(), 1);
    assert_eq!(session.surface().reposition_count(), 0);
}

/// An empty load is rejected and the loaded route survives.
#[tokio::test(start_paused = true)]
async fn test_invalid_load_keeps_previous_route() {
    let lookup = ScriptedLookup::always_available();
    let harness = Harness::start(SyncConfig::default(), Arc::clone(&lookup));
    let points = track(4);

    harness.send(SessionCommand::Load(points.clone())).await;
    harness.send(SessionCommand::StepNext).await;
    harness.send(SessionCommand::Load(Vec::new())).await;
    wait(600).await;

    let session = harness.finish().await;
    let store = session.controller().store();

    assert_eq!(store.route(), points.as_slice());
    assert_eq!(store.current_index(), 1);
    assert!(session.surface().recorded_controls().unwrap().enabled);
}

/// Reset leaves a single default point and disables the controls.
#[tokio::test(start_paused = true)]
async fn test_reset_route() {
    let lookup = ScriptedLookup::always_available();
    let harness = Harness::start(SyncConfig::default(), Arc::clone(&lookup));

    harness.send(SessionCommand::Load(track(4))).await;
    harness.send(SessionCommand::StepNext).await;
    harness.send(SessionCommand::Reset).await;
    wait(600).await;

    let session = harness.finish().await;
    let store = session.controller().store();

    assert_eq!(store.route(), &[DEFAULT_POSITION]);
    assert_eq!(store.current_index(), 0);
    assert!(!session.surface().recorded_controls().unwrap().enabled);
    assert!(lookup.requests().is_empty(), "reset cancels the pending sync");
}

/// Direct `handle` calls report load errors to the caller.
#[tokio::test]
async fn test_handle_reports_invalid_route() {
    let mut session = Session::new(
        SyncConfig::default(),
        RecordingSurface::new(),
        ScriptedLookup::always_available(),
    );

    let result = session.handle(SessionCommand::Load(Vec::new()), Instant::now());
    assert!(matches!(result, Err(RouteError::InvalidRoute(_))));
}

// ============================================================================
// Heading
// ============================================================================

#[test]
fn test_three_point_headings() {
    let a = Coordinate::new(53.0, 10.0);
    let b = Coordinate::new(53.1, 10.05);
    let c = Coordinate::new(53.15, 10.2);

    let mut controller = NavigationController::new();
    let mut surface = NullSurface;
    let mut sync = ViewerSynchronizer::with_defaults();
    let now = Instant::now();

    controller
        .load_route(vec![a, b, c], &mut surface, &mut sync, now)
        .unwrap();
    assert_eq!(controller.store().current_heading(), compute_heading(a, b));

    controller.step_next(&mut surface, &mut sync, now);
    assert_eq!(controller.store().current_heading(), compute_heading(a, c));

    controller.step_next(&mut surface, &mut sync, now);
    assert_eq!(controller.store().current_heading(), compute_heading(b, c));
}

// ============================================================================
// Property Tests
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Prev,
    Next,
    Scrub(f64, bool),
    Load(usize),
    Reset,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Prev),
        4 => Just(Op::Next),
        3 => (-20.0f64..150.0, any::<bool>()).prop_map(|(p, c)| Op::Scrub(p, c)),
        1 => (0usize..30).prop_map(Op::Load),
        1 => Just(Op::Reset),
    ]
}

proptest! {
    #[test]
    fn prop_index_stays_in_bounds(
        initial in 1usize..50,
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut controller = NavigationController::new();
        let mut surface = NullSurface;
        let mut sync = ViewerSynchronizer::with_defaults();
        let now = Instant::now();

        controller
            .load_route(track(initial), &mut surface, &mut sync, now)
            .unwrap();

        for op in ops {
            let before = controller.store().snapshot();
            match op {
                Op::Prev => {
                    let moved = controller.step_prev(&mut surface, &mut sync, now);
                    if before.current_index == 0 {
                        prop_assert!(!moved);
                        prop_assert_eq!(&controller.store().snapshot(), &before);
                    }
                }
                Op::Next => {
                    let moved = controller.step_next(&mut surface, &mut sync, now);
                    if before.current_index + 1 == before.route.len() {
                        prop_assert!(!moved);
                        prop_assert_eq!(&controller.store().snapshot(), &before);
                    }
                }
                Op::Scrub(percent, commit) => {
                    controller.scrub_to_percent(percent, commit, &mut surface, &mut sync, now);
                }
                Op::Load(n) => {
                    let result = controller.load_route(track(n), &mut surface, &mut sync, now);
                    if n == 0 {
                        prop_assert!(result.is_err());
                        prop_assert_eq!(&controller.store().snapshot(), &before);
                    } else {
                        prop_assert!(result.is_ok());
                    }
                }
                Op::Reset => controller.reset_route(&mut surface, &mut sync),
            }

            let store = controller.store();
            prop_assert!(!store.is_empty());
            prop_assert!(store.current_index() < store.len());
            prop_assert_eq!(store.current_position(), store.route()[store.current_index()]);
            prop_assert!((0.0..360.0).contains(&store.current_heading()));
        }
    }
}
