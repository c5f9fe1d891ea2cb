//! Viewer availability tracking.
//!
//! After a lookup reports no imagery, the external viewer is left in a state
//! where it no longer responds to repositioning. The next successful lookup
//! must therefore replace the viewer instead of moving it.
//!
//! ```text
//!              Ok: Recreate             Ok: Reposition
//!   Unavailable ─────────────► Available ────────────┐
//!       ▲  │                     │   ▲               │
//!       │  └─ Unavailable ◄──────┘   └───────────────┘
//!       │      (stay)        Unavailable
//! ```
//!
//! The flag starts out unavailable, so the first successful lookup of a
//! session also builds the viewer fresh.

/// What the viewer must do for a successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    /// Tear down the viewer and attach a new instance.
    Recreate,
    /// Move and re-orient the existing instance.
    Reposition,
}

/// Whether the last imagery lookup succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerAvailability {
    available: bool,
}

impl ViewerAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the last lookup found imagery.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Record a successful lookup and return the action the viewer needs.
    pub fn on_success(&mut self) -> ViewerAction {
        let action = if self.available {
            ViewerAction::Reposition
        } else {
            ViewerAction::Recreate
        };
        self.available = true;
        action
    }

    /// Record a failed lookup.
    pub fn on_unavailable(&mut self) {
        self.available = false;
    }
}
