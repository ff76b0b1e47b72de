//! Metric helpers for `flowpipe`.
//!
//! This module defines metric names and small helpers wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! every helper is a no-op.

/// Name of the counter tracking chunks emitted by segmenting stages.
pub const CHUNKS_EMITTED: &str = "flowpipe_chunks_emitted_total";
/// Name of the counter tracking unaligned tail bytes discarded on flush.
pub const TAIL_BYTES_DROPPED: &str = "flowpipe_tail_bytes_dropped_total";
/// Name of the counter tracking full-queue events.
pub const BACKPRESSURE_TOTAL: &str = "flowpipe_backpressure_total";
/// Name of the counter tracking pipes entering the fatal state.
pub const FATAL_TOTAL: &str = "flowpipe_fatal_errors_total";
/// Name of the counter tracking packets delivered across a transfer queue.
pub const TRANSFERRED_TOTAL: &str = "flowpipe_transferred_packets_total";

#[cfg(feature = "metrics")]
mod enabled {
    use metrics::counter;

    use super::{
        BACKPRESSURE_TOTAL,
        CHUNKS_EMITTED,
        FATAL_TOTAL,
        TAIL_BYTES_DROPPED,
        TRANSFERRED_TOTAL,
    };

    /// Record an emitted chunk.
    pub fn inc_chunks() { counter!(CHUNKS_EMITTED).increment(1); }

    /// Record discarded tail bytes.
    pub fn add_tail_dropped(bytes: usize) {
        counter!(TAIL_BYTES_DROPPED).increment(u64::try_from(bytes).unwrap_or(u64::MAX));
    }

    /// Record a full-queue event.
    pub fn inc_backpressure() { counter!(BACKPRESSURE_TOTAL).increment(1); }

    /// Record a pipe entering the fatal state.
    pub fn inc_fatal() { counter!(FATAL_TOTAL).increment(1); }

    /// Record a packet delivered on a worker.
    pub fn inc_transferred() { counter!(TRANSFERRED_TOTAL).increment(1); }
}

#[cfg(not(feature = "metrics"))]
mod enabled {
    pub fn inc_chunks() {}

    pub fn add_tail_dropped(_bytes: usize) {}

    pub fn inc_backpressure() {}

    pub fn inc_fatal() {}

    pub fn inc_transferred() {}
}

pub use enabled::{add_tail_dropped, inc_backpressure, inc_chunks, inc_fatal, inc_transferred};
