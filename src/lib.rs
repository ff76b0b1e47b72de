#![doc(html_root_url = "https://docs.rs/flowpipe/latest")]
//! Public API for the `flowpipe` library.
//!
//! This crate provides the data-plane core of a push-based stream pipeline:
//! reference-counted buffers and packets, the flow definition handshake,
//! aligned segmentation, and relocation of pipes onto worker threads through
//! bounded transfer queues.

pub mod buffer;
pub mod config;
pub mod flow;
pub mod metrics;
pub mod packet;
pub mod panic;
pub mod pipe;
pub mod probe;
pub mod segment;
pub mod stages;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod transfer;

pub use buffer::{Buffer, BufferAllocator};
pub use config::PipelineConfig;
pub use flow::{FlowError, FlowOutput};
pub use metrics::{
    BACKPRESSURE_TOTAL,
    CHUNKS_EMITTED,
    FATAL_TOTAL,
    TAIL_BYTES_DROPPED,
    TRANSFERRED_TOTAL,
};
pub use packet::{Attributes, Packet};
pub use pipe::{Command, Pipe, PipeError, PipeHandle, Reply, Result};
pub use probe::{EventKind, Probe, ProbeEvent};
pub use segment::{ChunkConfig, Segmenter};
pub use stages::{BLOCK_FLOW, ChunkStream, MatchAttr, SkipPipe};
pub use transfer::{Scheduler, TransferConfig, TransferManager, TransferWorker, WorkerSink};
