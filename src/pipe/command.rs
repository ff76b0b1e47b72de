//! Typed control commands and their replies.

use crate::{packet::Packet, stages::match_attr::Matcher, transfer::Scheduler};

use super::PipeHandle;

/// Control command sent to a pipe.
///
/// Each variant carries its own typed payload. Pipes answer commands they do
/// not understand with [`Reply::Unhandled`].
#[non_exhaustive]
#[derive(Debug)]
pub enum Command {
    /// Ask for the current downstream pipe.
    GetOutput,
    /// Replace the downstream pipe.
    SetOutput(Option<PipeHandle>),
    /// Ask for the stored flow definition.
    GetFlowDef,
    /// Register a flow definition to announce before the next data packet.
    SetFlowDef(Packet),
    /// Bind the pipe to the scheduler of the thread it now runs on.
    AttachScheduler(Scheduler),
    /// Ask for the segmenter MTU and alignment.
    GetMtu,
    /// Reconfigure the segmenter MTU and alignment.
    SetMtu { mtu: u32, align: u32 },
    /// Ask for the number of leading bytes skipped per packet.
    GetSkipOffset,
    /// Set the number of leading bytes skipped per packet.
    SetSkipOffset(usize),
    /// Install the attribute matcher.
    SetMatcher(Matcher),
    /// Set inclusive bounds handed to the matcher.
    SetBoundaries { min: u64, max: u64 },
}

impl Command {
    /// Whether the command only reads state.
    #[must_use]
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::GetOutput | Self::GetFlowDef | Self::GetMtu | Self::GetSkipOffset
        )
    }
}

/// Successful outcome of a control command.
#[derive(Debug)]
pub enum Reply {
    /// The command was applied.
    Done,
    /// The pipe does not handle this command; callers treat it as a no-op.
    Unhandled,
    /// Current output pipe, if any.
    Output(Option<PipeHandle>),
    /// Flow definition the pipe currently announces.
    FlowDef(Option<Packet>),
    /// Configured maximum chunk size and alignment.
    Mtu { mtu: u32, align: u32 },
    /// Bytes dropped from the front of each packet.
    SkipOffset(usize),
}

impl Reply {
    /// Whether the pipe declined the command.
    #[must_use]
    pub fn is_unhandled(&self) -> bool { matches!(self, Self::Unhandled) }
}
