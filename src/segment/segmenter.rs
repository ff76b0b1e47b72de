//! Fixed-size, aligned re-chunking of a byte stream.
//!
//! [`Segmenter`] queues incoming payload fragments and cuts exact
//! `chunk_size` slices from the front of the queue. Whole fragments are moved
//! into the output without copying; only the fragment straddling a chunk
//! boundary is split, and its tail becomes the new head of the queue.

use std::{collections::VecDeque, sync::Arc};

use tracing::{debug, trace};

use super::{ChunkConfig, ChunkConfigError, SegmentError};
use crate::{
    buffer::{Buffer, BufferAllocator, HeapAllocator},
    packet::Packet,
};

/// Outcome of [`Segmenter::flush`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Number of chunks emitted by the flush.
    pub emitted: usize,
    /// Trailing bytes discarded because they were shorter than `align`.
    pub dropped: usize,
}

/// Accumulates fragments and emits aligned chunks.
#[derive(Debug)]
pub struct Segmenter {
    config: ChunkConfig,
    pending: VecDeque<Buffer>,
    pending_len: usize,
    allocator: Arc<dyn BufferAllocator>,
}

impl Segmenter {
    /// Create a segmenter using the heap allocator.
    #[must_use]
    pub fn new(config: ChunkConfig) -> Self { Self::with_allocator(config, Arc::new(HeapAllocator)) }

    /// Create a segmenter carving chunks through `allocator`.
    #[must_use]
    pub fn with_allocator(config: ChunkConfig, allocator: Arc<dyn BufferAllocator>) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
            pending_len: 0,
            allocator,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> ChunkConfig { self.config }

    /// Size of every full chunk.
    #[must_use]
    pub fn chunk_size(&self) -> usize { self.config.chunk_size() as usize }

    /// Bytes waiting for a full chunk.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.pending_len }

    /// Number of queued fragments.
    #[must_use]
    pub fn pending_fragments(&self) -> usize { self.pending.len() }

    /// Replace the MTU and alignment.
    ///
    /// Pending bytes are kept; the new chunk size applies from the next call
    /// to [`accept`](Self::accept) or [`flush`](Self::flush).
    ///
    /// # Errors
    ///
    /// Returns [`ChunkConfigError`] and keeps the previous settings when the
    /// pair is invalid.
    pub fn configure(&mut self, mtu: u32, align: u32) -> Result<(), ChunkConfigError> {
        self.config = ChunkConfig::new(mtu, align)?;
        debug!(mtu, align, chunk_size = self.chunk_size(), "segmenter configured");
        Ok(())
    }

    /// Feed `packet` and push every completed chunk onto `out`.
    ///
    /// Control packets are pushed onto `out` unchanged. Emitted chunks carry
    /// no attributes from their source packets.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError`] when the allocator refuses a view. Chunks
    /// completed before the failure remain in `out`; pending bytes are
    /// discarded.
    pub fn accept(&mut self, mut packet: Packet, out: &mut Vec<Packet>) -> Result<(), SegmentError> {
        let Some(buffer) = packet.take_buffer() else {
            out.push(packet);
            return Ok(());
        };

        self.pending_len += buffer.len();
        if !buffer.is_empty() {
            self.pending.push_back(buffer);
        }

        let size = self.chunk_size();
        while self.pending_len >= size {
            let chunk = self.extract(size)?;
            out.push(Packet::data(chunk));
        }
        trace!(pending = self.pending_len, "segmenter accepted fragment");
        Ok(())
    }

    /// Emit every remaining aligned byte and reset the pending state.
    ///
    /// Full chunks are emitted first, then one shorter chunk rounded down to
    /// a multiple of `align`. Bytes below one alignment unit are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError`] when the allocator refuses a view. The pending
    /// state is reset either way.
    pub fn flush(&mut self, out: &mut Vec<Packet>) -> Result<FlushReport, SegmentError> {
        let size = self.chunk_size();
        let align = self.config.align() as usize;
        let mut report = FlushReport::default();

        while self.pending_len > 0 {
            let take = if self.pending_len >= size {
                size
            } else {
                (self.pending_len / align) * align
            };
            if take == 0 {
                break;
            }
            let chunk = self.extract(take)?;
            out.push(Packet::data(chunk));
            report.emitted += 1;
        }

        report.dropped = self.pending_len;
        self.reset();
        Ok(report)
    }

    /// Discard every pending fragment.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.pending_len = 0;
    }

    fn extract(&mut self, size: usize) -> Result<Buffer, SegmentError> {
        debug_assert!(size <= self.pending_len, "extract beyond pending bytes");
        let mut chunk = Buffer::new();
        let mut needed = size;

        while needed > 0 {
            let Some(front) = self.pending.pop_front() else {
                break;
            };
            if front.len() <= needed {
                needed -= front.len();
                chunk.append(front);
                continue;
            }
            match self.allocator.split(front, needed) {
                Ok((head, tail)) => {
                    chunk.append(head);
                    self.pending.push_front(tail);
                    needed = 0;
                }
                Err(source) => {
                    self.reset();
                    return Err(SegmentError::Extract { size, source });
                }
            }
        }

        self.pending_len -= size;
        Ok(chunk)
    }
}
