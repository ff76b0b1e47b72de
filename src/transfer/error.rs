//! Errors raised by transfer queues and worker relocation.

use thiserror::Error;

/// Errors returned when building or using a transfer queue.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    /// A queue must hold at least one item.
    #[error("invalid transfer queue capacity {0}; must be at least 1")]
    InvalidCapacity(usize),
    /// The queue has been closed; the item was freed.
    #[error("transfer queue closed")]
    Closed,
    /// The queue was full and the item was dropped.
    #[error("transfer queue full; item dropped")]
    Backpressure,
    /// The worker loop is gone and cannot adopt new pipes.
    #[error("transfer worker unavailable")]
    WorkerUnavailable,
}

impl TransferError {
    /// Whether the error prevents the affected pipe from operating.
    #[must_use]
    pub fn is_fatal(self) -> bool { matches!(self, Self::WorkerUnavailable) }
}

/// Errors returned by non-blocking enqueue attempts.
///
/// Both variants hand the item back so the caller can retry or drop it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The queue is at capacity.
    #[error("transfer queue full")]
    Backpressure(T),
    /// The queue has been closed.
    #[error("transfer queue closed")]
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Recover the item that could not be enqueued.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Backpressure(item) | Self::Closed(item) => item,
        }
    }

    /// Whether the failure was caused by a full queue.
    #[must_use]
    pub fn is_backpressure(&self) -> bool { matches!(self, Self::Backpressure(_)) }
}
