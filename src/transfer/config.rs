//! Configuration for proxy pipes relocating work onto a worker.

use super::TransferError;

/// Default number of packets a transfer queue may hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Behaviour of [`WorkerSink`](super::WorkerSink) input when its queue is
/// full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackpressurePolicy {
    /// Park the producing thread until space frees or the queue closes.
    ///
    /// The worker must run on another thread.
    #[default]
    Block,
    /// Drop the packet and raise a backpressure event.
    DropAndReport,
}

/// Settings for a transfer queue and its proxy pipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferConfig {
    capacity: usize,
    policy: BackpressurePolicy,
}

impl TransferConfig {
    /// Create a configuration holding at most `capacity` queued items.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, TransferError> {
        if capacity == 0 {
            return Err(TransferError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            policy: BackpressurePolicy::default(),
        })
    }

    /// Replace the queue capacity, keeping the current one on error.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidCapacity`] when `capacity` is zero.
    pub fn with_capacity(self, capacity: usize) -> Result<Self, TransferError> {
        Ok(Self {
            policy: self.policy,
            ..Self::new(capacity)?
        })
    }

    /// Set the full-queue policy.
    #[must_use]
    pub fn with_policy(mut self, policy: BackpressurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn capacity(&self) -> usize { self.capacity }

    #[must_use]
    pub fn policy(&self) -> BackpressurePolicy { self.policy }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            policy: BackpressurePolicy::default(),
        }
    }
}
