//! Trailing-edge request coalescing.
//!
//! Rapid navigation produces a stream of viewer sync requests. Only the most
//! recent one matters, and only once the user pauses. The coalescer holds a
//! single pending slot:
//!
//! - Each request overwrites the slot and pushes the deadline out to
//!   `now + quiet_period`
//! - Once `now >= deadline`, [`SyncCoalescer::take_due`] empties the slot
//!   and hands back the latest request
//!
//! Intermediate requests are dropped, not queued.

use std::time::Duration;

use tokio::time::Instant;

/// Default quiet period before a pending request fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// A request waiting for its quiet period to elapse.
#[derive(Debug, Clone)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Single-slot trailing-edge debouncer.
#[derive(Debug)]
pub struct SyncCoalescer<T> {
    quiet_period: Duration,
    pending: Option<Pending<T>>,
    /// Requests folded into the current slot without firing.
    collapsed: u64,
}

impl<T> SyncCoalescer<T> {
    /// Create a coalescer with the given quiet period.
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
            collapsed: 0,
        }
    }

    /// Create a coalescer with [`DEFAULT_QUIET_PERIOD`].
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }

    /// Store `value` as the pending request and re-arm the deadline.
    pub fn request(&mut self, value: T, now: Instant) {
        if self.pending.is_some() {
            self.collapsed += 1;
        }
        self.pending = Some(Pending {
            value,
            deadline: now + self.quiet_period,
        });
    }

    /// Take the pending request if its quiet period has elapsed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => {
                if self.collapsed > 0 {
                    tracing::trace!(
                        collapsed = self.collapsed,
                        "SyncCoalescer: firing after collapsing earlier requests"
                    );
                }
                self.collapsed = 0;
                self.pending.take().map(|p| p.value)
            }
            _ => None,
        }
    }

    /// When the pending request becomes due, if there is one.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Returns true if a request is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop any pending request.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.collapsed = 0;
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }
}

impl<T> Default for SyncCoalescer<T> {
    fn default() -> Self {
        Self::with_defaults()
    }
}
