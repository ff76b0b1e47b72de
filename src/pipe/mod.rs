//! Pipe contract and shared-ownership handles.
//!
//! A [`Pipe`] is a stage with one input and one output. Pipes are driven
//! through [`PipeHandle`]s, which provide shared ownership and serialise
//! every callback so no two calls on the same pipe ever overlap. When the last
//! handle is dropped the pipe is torn down through its `Drop` implementation.

pub mod command;
pub mod error;
pub mod lifecycle;

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

pub use command::{Command, Reply};
pub use error::{PipeError, Result};
pub use lifecycle::Lifecycle;

use crate::packet::Packet;

/// A stream-processing stage.
///
/// Implementations run each callback to completion. Suspension, if any,
/// happens only at a transfer queue boundary.
pub trait Pipe: Send + 'static {
    /// Receive a packet from upstream. Ownership of `packet` passes to the pipe.
    fn input(&mut self, packet: Packet);

    /// Apply a control command.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError`] when the command is understood but rejected.
    /// Unknown commands are answered with [`Reply::Unhandled`] instead.
    fn control(&mut self, command: Command) -> Result<Reply>;
}

/// Cloneable, thread-safe handle to a pipe.
#[derive(Clone)]
pub struct PipeHandle {
    inner: Arc<Mutex<Box<dyn Pipe>>>,
}

impl PipeHandle {
    /// Take ownership of `pipe`.
    #[must_use]
    pub fn new(pipe: impl Pipe) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(pipe))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Pipe>> {
        // A panic inside a callback must not wedge the rest of the graph.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `packet` to the pipe.
    pub fn input(&self, packet: Packet) { self.lock().input(packet); }

    /// Send a control command to the pipe.
    ///
    /// # Errors
    ///
    /// Propagates the pipe's [`PipeError`].
    pub fn control(&self, command: Command) -> Result<Reply> { self.lock().control(command) }

    /// Whether both handles refer to the same pipe.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.inner, &other.inner) }

    /// Number of live handles to this pipe.
    #[must_use]
    pub fn ref_count(&self) -> usize { Arc::strong_count(&self.inner) }
}

impl fmt::Debug for PipeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PipeHandle")
            .field(&Arc::as_ptr(&self.inner))
            .finish()
    }
}

#[cfg(test)]
mod tests;
