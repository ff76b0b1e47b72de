//! Pipeline configuration combining the segmenter and transfer settings.

use thiserror::Error;

use crate::{
    segment::{ChunkConfig, ChunkConfigError},
    transfer::{BackpressurePolicy, DEFAULT_DIRECTIVE_CAPACITY, TransferConfig, TransferError},
};

/// Default number of bytes read from the source per fragment.
pub const DEFAULT_READ_SIZE: usize = 500;

/// Errors raised while assembling a [`PipelineConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Chunk(#[from] ChunkConfigError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    /// Fragments must carry at least one byte.
    #[error("read size must be at least 1")]
    ReadSize,
}

/// Settings for a source → chunker → relocated sink pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    chunk: ChunkConfig,
    transfer: TransferConfig,
    read_size: usize,
}

impl PipelineConfig {
    /// Segmenter settings.
    #[must_use]
    pub fn chunk(&self) -> ChunkConfig { self.chunk }

    /// Transfer queue settings.
    #[must_use]
    pub fn transfer(&self) -> TransferConfig { self.transfer }

    /// Fragment size used when reading the source.
    #[must_use]
    pub fn read_size(&self) -> usize { self.read_size }

    /// Attach requests that may wait for the worker.
    #[must_use]
    pub fn directive_capacity(&self) -> usize { DEFAULT_DIRECTIVE_CAPACITY }

    /// Replace the MTU and alignment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Chunk`] for an invalid pair.
    pub fn with_mtu(mut self, mtu: u32, align: u32) -> Result<Self, ConfigError> {
        self.chunk = ChunkConfig::new(mtu, align)?;
        Ok(self)
    }

    /// Replace the transfer queue capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Transfer`] when `capacity` is zero.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Result<Self, ConfigError> {
        self.transfer = self.transfer.with_capacity(capacity)?;
        Ok(self)
    }

    /// Replace the full-queue policy.
    #[must_use]
    pub fn with_policy(mut self, policy: BackpressurePolicy) -> Self {
        self.transfer = self.transfer.with_policy(policy);
        self
    }

    /// Replace the source fragment size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadSize`] when `read_size` is zero.
    pub fn with_read_size(mut self, read_size: usize) -> Result<Self, ConfigError> {
        if read_size == 0 {
            return Err(ConfigError::ReadSize);
        }
        self.read_size = read_size;
        Ok(self)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk: ChunkConfig::default(),
            transfer: TransferConfig::default(),
            read_size: DEFAULT_READ_SIZE,
        }
    }
}
