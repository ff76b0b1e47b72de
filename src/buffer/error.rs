//! Error types raised by buffer views and allocators.

use thiserror::Error;

/// Errors produced when addressing bytes outside a [`Buffer`](super::Buffer).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// The requested window does not fit inside the buffer.
    #[error("range {offset}+{len} exceeds buffer of {available} bytes")]
    OutOfRange {
        offset: usize,
        len: usize,
        available: usize,
    },
}

/// Errors reported by a [`BufferAllocator`](super::BufferAllocator).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator could not provide the requested resources.
    #[error("allocator exhausted while requesting {requested} bytes")]
    Exhausted { requested: usize },
    /// A slice or split addressed bytes outside the source buffer.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
