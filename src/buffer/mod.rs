//! Reference-counted, zero-copy payload buffers.
//!
//! A [`Buffer`] is an immutable chain of [`Bytes`] segments. Slicing and
//! splitting produce new views over the same storage; the storage itself is
//! released once the last view referencing it is dropped. Because
//! [`Bytes`] uses atomic reference counting, buffers can be handed to pipes
//! running on other threads without copying.

pub mod allocator;
pub mod error;

use std::{collections::VecDeque, fmt};

use bytes::{Bytes, BytesMut};

pub use allocator::{BudgetAllocator, BufferAllocator, HeapAllocator};
pub use error::{AllocError, BufferError};

/// Immutable view over one or more shared storage segments.
#[derive(Clone, Default)]
pub struct Buffer {
    segments: VecDeque<Bytes>,
    len: usize,
}

impl Buffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Build a buffer from a sequence of segments, skipping empty ones.
    #[must_use]
    pub fn from_segments<I>(segments: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        let mut buffer = Self::new();
        for segment in segments {
            buffer.push_segment(segment);
        }
        buffer
    }

    /// Total number of payload bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    /// Whether the buffer carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Number of storage segments backing this view.
    #[must_use]
    pub fn segment_count(&self) -> usize { self.segments.len() }

    /// Iterate over the storage segments in payload order.
    pub fn segments(&self) -> impl Iterator<Item = &Bytes> { self.segments.iter() }

    /// Append `other` to the end of this buffer without copying.
    pub fn append(&mut self, other: Buffer) {
        for segment in other.segments {
            self.push_segment(segment);
        }
    }

    fn push_segment(&mut self, segment: Bytes) {
        if segment.is_empty() {
            return;
        }
        self.len += segment.len();
        self.segments.push_back(segment);
    }

    /// Return a zero-copy view of `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] when the requested window exceeds
    /// the buffer.
    pub fn slice(&self, offset: usize, len: usize) -> Result<Buffer, BufferError> {
        let end = offset
            .checked_add(len)
            .filter(|end| *end <= self.len)
            .ok_or(BufferError::OutOfRange {
                offset,
                len,
                available: self.len,
            })?;

        let mut out = Buffer::new();
        let mut position = 0usize;
        for segment in &self.segments {
            let seg_start = position;
            let seg_end = position + segment.len();
            position = seg_end;
            if seg_end <= offset {
                continue;
            }
            if seg_start >= end {
                break;
            }
            let from = offset.saturating_sub(seg_start);
            let to = end.min(seg_end) - seg_start;
            out.push_segment(segment.slice(from..to));
        }
        Ok(out)
    }

    /// Split the buffer at `at`, returning `(head, tail)`.
    ///
    /// Only the segment straddling `at` is divided; every other segment
    /// moves to one side untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] when `at` exceeds the length.
    pub fn split_at(mut self, at: usize) -> Result<(Buffer, Buffer), BufferError> {
        if at > self.len {
            return Err(BufferError::OutOfRange {
                offset: at,
                len: 0,
                available: self.len,
            });
        }

        let mut head = Buffer::new();
        let mut needed = at;
        while needed > 0 {
            let Some(mut segment) = self.segments.pop_front() else {
                break;
            };
            if segment.len() <= needed {
                needed -= segment.len();
                head.push_segment(segment);
            } else {
                let front = segment.split_to(needed);
                needed = 0;
                head.push_segment(front);
                self.segments.push_front(segment);
            }
        }
        self.len -= head.len;
        Ok((head, self))
    }

    /// Drop the first `count` bytes, keeping the remainder as a view.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfRange`] when `count` exceeds the length.
    pub fn advance(self, count: usize) -> Result<Buffer, BufferError> {
        let (_, tail) = self.split_at(count)?;
        Ok(tail)
    }

    /// Return the payload as one contiguous [`Bytes`].
    ///
    /// Single-segment buffers are returned without copying.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        match self.segments.len() {
            0 => Bytes::new(),
            1 => self.segments[0].clone(),
            _ => {
                let mut out = BytesMut::with_capacity(self.len);
                for segment in &self.segments {
                    out.extend_from_slice(segment);
                }
                out.freeze()
            }
        }
    }

    /// Copy the payload into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> { self.to_bytes().to_vec() }
}

impl From<Bytes> for Buffer {
    fn from(bytes: Bytes) -> Self { Self::from_segments([bytes]) }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self { Self::from(Bytes::from(bytes)) }
}

impl From<&'static [u8]> for Buffer {
    fn from(bytes: &'static [u8]) -> Self { Self::from(Bytes::from_static(bytes)) }
}

impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.to_bytes() == other.to_bytes()
    }
}

impl Eq for Buffer {}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("len", &self.len)
            .field("segments", &self.segments.len())
            .finish()
    }
}
