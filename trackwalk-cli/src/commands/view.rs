//! View command - step through a GPX track with street-level imagery.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use trackwalk::config::ConfigFile;
use trackwalk::imagery::{ReqwestClient, StreetViewClient};
use trackwalk::session::DEFAULT_COMMAND_CHANNEL_CAPACITY;
use trackwalk::track::{route_from_track, TrackPoint};
use trackwalk::{Coordinate, Session, SessionCommand};

use super::common::{resolve_api_key, resolve_sync_config};
use crate::error::CliError;
use crate::terminal::{spawn_key_reader, ControlState, TerminalSurface};

/// Arguments for the view command.
pub struct ViewArgs {
    pub file: PathBuf,
    pub api_key: Option<String>,
    pub no_follow: bool,
}

/// Run the view command.
pub fn run(args: ViewArgs, config: &ConfigFile) -> Result<(), CliError> {
    let route = load_track(&args.file)?;
    let api_key = resolve_api_key(args.api_key, config)?;
    let sync_config = resolve_sync_config(args.no_follow, config);

    let http_client = ReqwestClient::with_timeout(config.imagery.timeout())?;
    let lookup = Arc::new(StreetViewClient::with_endpoint(
        http_client,
        api_key,
        config.imagery.endpoint.clone(),
    ));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    println!("TrackWalk v{}", env!("CARGO_PKG_VERSION"));
    println!("==============");
    println!();
    println!("Track:  {} ({} points)", args.file.display(), route.len());
    println!("Follow: {}", if sync_config.follow { "on" } else { "off" });
    println!();
    println!("j/← previous   k/→ next   h/l scrub ∓10%   r reset   q quit");
    println!();

    let controls = ControlState::new();
    let surface = TerminalSurface::new(io::stdout(), Arc::clone(&controls));
    let (tx, rx) = mpsc::channel(DEFAULT_COMMAND_CHANNEL_CAPACITY);
    let shutdown = CancellationToken::new();

    let session = runtime.block_on(async {
        let mut session = Session::new(sync_config, surface, lookup);
        session.handle(SessionCommand::Load(route), Instant::now())?;

        let _raw = RawModeGuard::enable()?;
        let reader = spawn_key_reader(tx, controls, shutdown.clone());
        let session = session.run(rx, shutdown.clone()).await;

        shutdown.cancel();
        if reader.join().is_err() {
            tracing::warn!("Key reader thread panicked");
        }
        Ok::<_, CliError>(session)
    })?;

    let stats = session.synchronizer().stats();
    println!();
    println!("Session Summary");
    println!("───────────────");
    println!("  Lookups issued:    {}", stats.issued);
    println!("  Imagery found:     {}", stats.succeeded);
    println!("  Imagery missing:   {}", stats.unavailable);
    if stats.discarded > 0 {
        println!("  Stale discarded:   {}", stats.discarded);
    }

    Ok(())
}

/// Read the first track of a GPX file.
pub fn load_track(path: &Path) -> Result<Vec<Coordinate>, CliError> {
    let file = File::open(path).map_err(|e| CliError::TrackFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_track(BufReader::new(file), path)
}

/// Parse GPX from `reader`, flattening all segments of the first track.
pub fn parse_track<R: Read>(reader: R, path: &Path) -> Result<Vec<Coordinate>, CliError> {
    let track_file = |reason: String| CliError::TrackFile {
        path: path.to_path_buf(),
        reason,
    };

    let gpx = gpx::read(reader).map_err(|e| track_file(e.to_string()))?;
    let track = gpx
        .tracks
        .first()
        .ok_or_else(|| track_file("file contains no tracks".to_string()))?;

    let points = track
        .segments
        .iter()
        .flat_map(|segment| segment.points.iter())
        .map(|waypoint| {
            let point = waypoint.point();
            TrackPoint::new(point.y(), point.x())
        });

    Ok(route_from_track(points)?)
}

/// Keeps the terminal in raw mode until dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
