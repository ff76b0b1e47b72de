//! Reference stages built on the pipe contract.
//!
//! - [`ChunkStream`] re-chunks a block stream into aligned, MTU-sized packets.
//! - [`SkipPipe`] drops a fixed number of leading bytes from every packet.
//! - [`MatchAttr`] forwards or drops packets according to a numeric matcher.
//! - [`NullSink`] swallows everything it receives while counting it.

pub mod chunk_stream;
pub mod match_attr;
pub mod null;
pub mod skip;

pub use chunk_stream::ChunkStream;
pub use match_attr::{MatchAttr, MatchFn, Matcher};
pub use null::{NullSink, SinkStats};
pub use skip::SkipPipe;

use crate::{packet::Packet, pipe::PipeError};

/// Flow definition prefix accepted by block-oriented stages.
pub const BLOCK_FLOW: &str = "block.";

/// Check that `flow_def` describes a block stream.
///
/// # Errors
///
/// Returns [`PipeError::FlowDefIncompatible`] naming the offending definition.
pub fn check_block_flow(flow_def: &Packet) -> Result<(), PipeError> {
    match flow_def.attributes().flow_def() {
        Some(def) if def.starts_with(BLOCK_FLOW) => Ok(()),
        def => Err(PipeError::FlowDefIncompatible {
            def: def.map(str::to_owned),
        }),
    }
}
