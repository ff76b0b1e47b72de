//! Errors surfaced by pipes and their control interface.

use thiserror::Error;

use crate::{
    flow::FlowError,
    segment::{ChunkConfigError, SegmentError},
    transfer::TransferError,
};

/// Aggregate error type for pipe operations.
#[derive(Debug, Error)]
pub enum PipeError {
    /// The requested configuration was rejected; prior settings remain.
    #[error(transparent)]
    Config(#[from] ChunkConfigError),
    /// A flow definition was not acceptable to the pipe.
    #[error("incompatible flow definition {def:?}")]
    FlowDefIncompatible { def: Option<String> },
    /// The output handshake refused a packet.
    #[error(transparent)]
    Flow(#[from] FlowError),
    /// Segmentation failed and the pipe can no longer process input.
    #[error(transparent)]
    Segment(#[from] SegmentError),
    /// Cross-thread transfer failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl PipeError {
    /// Whether the error leaves the pipe unable to process further input.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Config(_) | Self::FlowDefIncompatible { .. } | Self::Flow(_) => false,
            Self::Segment(_) => true,
            Self::Transfer(err) => err.is_fatal(),
        }
    }
}

/// Result alias for pipe operations.
pub type Result<T> = std::result::Result<T, PipeError>;
