//! Allocator seam used by stages that create or carve buffers.
//!
//! Stages never construct buffer views directly on their hot path; they go
//! through a [`BufferAllocator`] so the embedding application can account for
//! (and refuse) the resources each view needs. [`HeapAllocator`] never fails;
//! [`BudgetAllocator`] enforces a byte budget and is how exhaustion is
//! modelled.

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use bytes::BytesMut;

use super::{AllocError, Buffer};

/// Provides storage and views for [`Buffer`]s.
pub trait BufferAllocator: Send + Sync + fmt::Debug {
    /// Allocate a zeroed, writable region of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::Exhausted`] when the allocator cannot satisfy
    /// the request.
    fn allocate(&self, len: usize) -> Result<BytesMut, AllocError>;

    /// Produce a zero-copy view of `len` bytes of `buffer` from `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when the window is invalid or the allocator
    /// refuses the view.
    fn slice(&self, buffer: &Buffer, offset: usize, len: usize) -> Result<Buffer, AllocError> {
        Ok(buffer.slice(offset, len)?)
    }

    /// Split `buffer` at `offset` into `(head, tail)`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] when `offset` is out of range or the allocator
    /// refuses the view.
    fn split(&self, buffer: Buffer, offset: usize) -> Result<(Buffer, Buffer), AllocError> {
        Ok(buffer.split_at(offset)?)
    }
}

/// Allocator backed by the global heap.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapAllocator;

impl BufferAllocator for HeapAllocator {
    fn allocate(&self, len: usize) -> Result<BytesMut, AllocError> { Ok(BytesMut::zeroed(len)) }
}

/// Allocator that charges every request against a fixed byte budget.
///
/// Allocations, slices and splits all consume budget equal to the number of
/// bytes they describe. Once the budget is spent every request fails with
/// [`AllocError::Exhausted`]. The budget is never refilled.
#[derive(Debug)]
pub struct BudgetAllocator {
    remaining: AtomicUsize,
}

impl BudgetAllocator {
    /// Create an allocator allowing `budget` bytes in total.
    #[must_use]
    pub const fn new(budget: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(budget),
        }
    }

    /// Bytes that can still be charged.
    #[must_use]
    pub fn remaining(&self) -> usize { self.remaining.load(Ordering::Acquire) }

    fn charge(&self, requested: usize) -> Result<(), AllocError> {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_sub(requested)
            })
            .map(|_| ())
            .map_err(|_| AllocError::Exhausted { requested })
    }
}

impl BufferAllocator for BudgetAllocator {
    fn allocate(&self, len: usize) -> Result<BytesMut, AllocError> {
        self.charge(len)?;
        Ok(BytesMut::zeroed(len))
    }

    fn slice(&self, buffer: &Buffer, offset: usize, len: usize) -> Result<Buffer, AllocError> {
        self.charge(len)?;
        Ok(buffer.slice(offset, len)?)
    }

    fn split(&self, buffer: Buffer, offset: usize) -> Result<(Buffer, Buffer), AllocError> {
        self.charge(offset)?;
        Ok(buffer.split_at(offset)?)
    }
}
