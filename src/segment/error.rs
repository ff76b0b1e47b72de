//! Errors raised while configuring or running the segmenter.

use thiserror::Error;

use crate::buffer::AllocError;

/// Rejected MTU/alignment combination.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ChunkConfigError {
    #[error("invalid mtu ({mtu}) or alignment ({align})")]
    Invalid { mtu: u32, align: u32 },
}

/// Failure while extracting a chunk from the pending fragments.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    /// The allocator refused a view needed for the chunk.
    #[error("failed to extract {size} byte chunk: {source}")]
    Extract {
        size: usize,
        #[source]
        source: AllocError,
    },
}
