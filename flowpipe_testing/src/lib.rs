//! Utilities for driving `flowpipe` pipes in tests.
//!
//! These helpers feed fragments through a segmenter, relocate pipes onto a
//! worker thread and collect probe events for assertions.
//!
//! ```rust
//! use flowpipe::ChunkConfig;
//! use flowpipe_testing::segment_all;
//!
//! let config = ChunkConfig::new(10, 4).unwrap();
//! let (chunks, report) = segment_all(config, [vec![0u8; 9]]).unwrap();
//! assert_eq!(chunks, vec![8]);
//! assert_eq!(report.dropped, 1);
//! ```

pub mod helpers;
pub mod logging;
pub mod macros;

pub use flowpipe::test_helpers::{CaptureLog, CaptureSink, Captured};
pub use helpers::{
    RelocatedPipe,
    WORKER_THREAD,
    drain_events,
    relocate,
    segment_all,
    segment_packets,
};
pub use logging::{LoggerHandle, logger};
