//! Ready/dead bookkeeping shared by every pipe implementation.

use super::PipeError;
use crate::probe::{EventKind, Probe};

/// Raises `ready` on construction and `dead` on drop, exactly once each.
///
/// Also remembers whether the owning pipe has entered a fatal state.
#[derive(Debug)]
pub struct Lifecycle {
    probe: Probe,
    fatal: bool,
}

impl Lifecycle {
    /// Register a new pipe with `probe`, raising `ready`.
    #[must_use]
    pub fn new(probe: Probe) -> Self {
        probe.throw(EventKind::Ready);
        Self {
            probe,
            fatal: false,
        }
    }

    /// Probe used for every event of this pipe.
    #[must_use]
    pub fn probe(&self) -> &Probe { &self.probe }

    /// Whether a fatal error has been raised.
    #[must_use]
    pub fn is_fatal(&self) -> bool { self.fatal }

    /// Enter the fatal state, raising a single `fatal` event.
    pub fn raise_fatal(&mut self, error: &PipeError) {
        if self.fatal {
            return;
        }
        self.fatal = true;
        crate::metrics::inc_fatal();
        self.probe.throw(EventKind::Fatal(error.to_string()));
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) { self.probe.throw(EventKind::Dead); }
}
