//! Stream segmentation into fixed, aligned chunks.
//!
//! [`ChunkConfig`] validates the MTU/alignment pair and [`Segmenter`] turns a
//! stream of arbitrarily sized fragments into chunks of exactly
//! `chunk_size` bytes, plus one aligned remainder on flush.

pub mod config;
pub mod error;
pub mod segmenter;

pub use config::{ChunkConfig, DEFAULT_ALIGN, DEFAULT_MTU};
pub use error::{ChunkConfigError, SegmentError};
pub use segmenter::{FlushReport, Segmenter};

#[cfg(test)]
mod tests;
