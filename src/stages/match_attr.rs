//! Stage filtering packets with a numeric attribute matcher.

use std::{fmt, sync::Arc};

use tracing::trace;

use crate::{
    flow::FlowOutput,
    packet::Packet,
    pipe::{Command, Lifecycle, Pipe, Reply, Result},
    probe::Probe,
};

/// Predicate deciding whether a packet lies within `[min, max]`.
pub type MatchFn<T> = dyn Fn(&Packet, T, T) -> bool + Send + Sync;

/// Matcher installed on a [`MatchAttr`] stage.
#[derive(Clone, Default)]
pub enum Matcher {
    /// Forward everything.
    #[default]
    None,
    /// Compare against bounds narrowed to `u8`.
    U8(Arc<MatchFn<u8>>),
    /// Compare against the full `u64` bounds.
    U64(Arc<MatchFn<u64>>),
}

impl Matcher {
    /// Build a `u8` matcher from a closure.
    pub fn u8(f: impl Fn(&Packet, u8, u8) -> bool + Send + Sync + 'static) -> Self {
        Self::U8(Arc::new(f))
    }

    /// Build a `u64` matcher from a closure.
    pub fn u64(f: impl Fn(&Packet, u64, u64) -> bool + Send + Sync + 'static) -> Self {
        Self::U64(Arc::new(f))
    }

    /// Matcher forwarding packets whose `u8` attribute `key` lies in bounds.
    #[must_use]
    pub fn u8_attr(key: &'static str) -> Self {
        Self::u8(move |packet, min, max| {
            packet
                .attributes()
                .get_u8(key)
                .is_some_and(|value| (min..=max).contains(&value))
        })
    }

    /// Matcher forwarding packets whose `u64` attribute `key` lies in bounds.
    #[must_use]
    pub fn u64_attr(key: &'static str) -> Self {
        Self::u64(move |packet, min, max| {
            packet
                .attributes()
                .get_u64(key)
                .is_some_and(|value| (min..=max).contains(&value))
        })
    }

    fn matches(&self, packet: &Packet, min: u64, max: u64) -> bool {
        match self {
            Self::None => true,
            Self::U8(f) => f(packet, clamp_u8(min), clamp_u8(max)),
            Self::U64(f) => f(packet, min, max),
        }
    }
}

fn clamp_u8(bound: u64) -> u8 { u8::try_from(bound).unwrap_or(u8::MAX) }

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "Matcher::None",
            Self::U8(_) => "Matcher::U8(..)",
            Self::U64(_) => "Matcher::U64(..)",
        })
    }
}

/// Forwards packets accepted by its [`Matcher`] and drops the rest.
#[derive(Debug)]
pub struct MatchAttr {
    matcher: Matcher,
    min: u64,
    max: u64,
    flow: FlowOutput,
    lifecycle: Lifecycle,
}

impl MatchAttr {
    /// Create a stage forwarding everything until a matcher is installed.
    #[must_use]
    pub fn new(probe: Probe, flow_def: Option<Packet>) -> Self {
        let mut flow = FlowOutput::new();
        if let Some(def) = flow_def.filter(Packet::is_flow_def) {
            flow.store_flow_def(def);
        }
        Self {
            matcher: Matcher::None,
            min: 0,
            max: 0,
            flow,
            lifecycle: Lifecycle::new(probe),
        }
    }

    /// Current inclusive bounds.
    #[must_use]
    pub fn boundaries(&self) -> (u64, u64) { (self.min, self.max) }
}

impl Pipe for MatchAttr {
    fn input(&mut self, packet: Packet) {
        if packet.has_buffer() && !self.matcher.matches(&packet, self.min, self.max) {
            trace!(pipe = self.lifecycle.probe().name(), "packet filtered out");
            return;
        }
        self.flow.emit(packet, self.lifecycle.probe());
    }

    fn control(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::GetFlowDef => Ok(Reply::FlowDef(self.flow.flow_def().cloned())),
            Command::GetOutput => Ok(Reply::Output(self.flow.output().cloned())),
            Command::SetOutput(output) => {
                self.flow.set_output(output);
                Ok(Reply::Done)
            }
            Command::SetMatcher(matcher) => {
                self.matcher = matcher;
                Ok(Reply::Done)
            }
            Command::SetBoundaries { min, max } => {
                self.min = min;
                self.max = max;
                Ok(Reply::Done)
            }
            _ => Ok(Reply::Unhandled),
        }
    }
}
