//! Terminal front end.
//!
//! [`TerminalSurface`] prints navigation and viewer updates as status lines,
//! with a Google Maps panorama link standing in for the street-level viewer.
//! [`spawn_key_reader`] turns key presses into session commands.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use trackwalk::imagery::ImageryData;
use trackwalk::viewer::{NavigationControls, RenderSurface, ViewerPose};
use trackwalk::{Coordinate, SessionCommand};

/// Percentage moved by one scrub key press.
const SCRUB_STEP_PERCENT: f64 = 10.0;

/// How often the key reader checks for shutdown.
const KEY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Panorama link for the viewer pose.
pub fn pano_url(pose: &ViewerPose) -> String {
    format!(
        "https://www.google.com/maps/@?api=1&map_action=pano&viewpoint={:.6},{:.6}&heading={:.0}&pitch={:.0}",
        pose.position.lat, pose.position.lng, pose.heading, pose.pitch
    )
}

/// Navigation control state shared between the surface and the key reader.
///
/// Controls start disabled; the session enables them once a track is
/// loaded and disables them again on reset.
#[derive(Debug, Default)]
pub struct ControlState {
    enabled: AtomicBool,
    progress: AtomicU8,
}

impl ControlState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::Relaxed)
    }
}

/// Surface-side handle on the shared [`ControlState`].
#[derive(Debug, Clone)]
pub struct TerminalControls {
    state: Arc<ControlState>,
}

impl NavigationControls for TerminalControls {
    fn set_enabled(&mut self, enabled: bool) {
        self.state.enabled.store(enabled, Ordering::Relaxed);
    }

    fn set_scrub_position(&mut self, percent: u8) {
        self.state.progress.store(percent, Ordering::Relaxed);
    }
}

/// Render surface writing status lines to a terminal in raw mode.
pub struct TerminalSurface<W: Write> {
    out: W,
    controls: TerminalControls,
    write_failed: bool,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, state: Arc<ControlState>) -> Self {
        Self {
            out,
            controls: TerminalControls { state },
            write_failed: false,
        }
    }

    #[cfg(test)]
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn line(&mut self, text: &str) {
        // Raw mode needs an explicit carriage return
        let result = write!(self.out, "{}\r\n", text).and_then(|_| self.out.flush());

        // Logged once; a broken terminal fails on every line
        if let Err(e) = result {
            if !self.write_failed {
                tracing::debug!(error = %e, "Terminal write failed");
                self.write_failed = true;
            }
        }
    }
}

impl<W: Write> RenderSurface for TerminalSurface<W> {
    fn set_marker(&mut self, position: Coordinate) {
        let text = format!("  at {}", position);
        self.line(&text);
    }

    fn show_overlays(&mut self, route: &[Coordinate]) {
        let text = format!("Track shown: {} points", route.len());
        self.line(&text);
    }

    fn hide_overlays(&mut self) {
        tracing::debug!("Track overlays hidden");
    }

    fn center_map(&mut self, position: Coordinate) {
        tracing::debug!(%position, "Map centered");
    }

    fn reposition_viewer(&mut self, pose: ViewerPose) {
        let text = format!("  view {:>5.1}°  {}", pose.heading, pano_url(&pose));
        self.line(&text);
    }

    fn recreate_viewer(&mut self, pose: ViewerPose) {
        self.line("Street view ready");
        self.reposition_viewer(pose);
    }

    fn show_unavailable(&mut self, message: &str) {
        let text = format!("  {}", message);
        self.line(&text);
    }

    fn show_capture_info(&mut self, imagery: &ImageryData) {
        let text = match &imagery.date {
            Some(date) => format!("  captured {} at {}", date, imagery.location),
            None => format!("  captured at {}", imagery.location),
        };
        self.line(&text);
    }

    fn controls(&mut self) -> Option<&mut dyn NavigationControls> {
        Some(&mut self.controls)
    }
}

/// What a key press asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Command(SessionCommand),
    Quit,
}

/// Map a key press to an action.
///
/// `percent` is the scrub position the relative scrub keys start from.
/// While the controls are disabled the step and scrub keys do nothing.
pub fn action_for_key(key: KeyEvent, percent: f64, enabled: bool) -> Option<KeyAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let navigate = |command: SessionCommand| enabled.then_some(KeyAction::Command(command));

    let scrub = |target: f64| {
        navigate(SessionCommand::Scrub {
            percent: target.clamp(0.0, 100.0),
            commit: true,
        })
    };

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('j') | KeyCode::Left => navigate(SessionCommand::StepPrev),
        KeyCode::Char('k') | KeyCode::Right => navigate(SessionCommand::StepNext),
        KeyCode::Char('h') => scrub(percent - SCRUB_STEP_PERCENT),
        KeyCode::Char('l') => scrub(percent + SCRUB_STEP_PERCENT),
        KeyCode::Char('r') => Some(KeyAction::Command(SessionCommand::Reset)),
        _ => None,
    }
}

/// Read keys on a dedicated thread until quit or `shutdown`.
///
/// Quitting cancels `shutdown`. The scrub keys move relative to the last
/// scrub target, or to the step progress if a step happened since.
pub fn spawn_key_reader(
    commands: mpsc::Sender<SessionCommand>,
    controls: Arc<ControlState>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut scrub_target: Option<f64> = None;

        while !shutdown.is_cancelled() {
            match event::poll(KEY_POLL_INTERVAL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Terminal event poll failed");
                    shutdown.cancel();
                    break;
                }
            }

            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Terminal event read failed");
                    shutdown.cancel();
                    break;
                }
            };

            let base = scrub_target.unwrap_or_else(|| controls.progress() as f64);
            let command = match action_for_key(key, base, controls.is_enabled()) {
                Some(KeyAction::Command(command)) => command,
                Some(KeyAction::Quit) => {
                    shutdown.cancel();
                    break;
                }
                None => continue,
            };

            scrub_target = match &command {
                SessionCommand::Scrub { percent, .. } => Some(*percent),
                SessionCommand::Reset => Some(0.0),
                _ => None,
            };

            if commands.blocking_send(command).is_err() {
                break;
            }
        }
    })
}
