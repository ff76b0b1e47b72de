//! Supervisor event channel shared by every pipe.
//!
//! Pipes report lifecycle and error conditions through a [`Probe`]. Each
//! event is logged with `tracing` and, when a listener is attached, also sent
//! on an unbounded channel so reporting never blocks the pipe. Probes are
//! cheap to clone and carry a name prefix identifying the pipe.

use std::{fmt, sync::Arc};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Kind of event raised by a pipe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// The pipe finished construction.
    Ready,
    /// The pipe was torn down.
    Dead,
    /// The pipe hit an unrecoverable error and stopped processing input.
    Fatal(String),
    /// A data packet arrived before any flow definition and was dropped.
    FlowDefMissing,
    /// A flow definition was incompatible with the pipe and was dropped.
    FlowDefError(String),
    /// A bounded queue was full when a producer tried to enqueue.
    Backpressure,
    /// Output was attempted without a downstream pipe.
    NeedOutput,
    /// The upstream signalled end of stream.
    NeedInput,
    /// The pipe was bound to a worker scheduler.
    Attached { thread: String },
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => f.write_str("ready"),
            Self::Dead => f.write_str("dead"),
            Self::Fatal(reason) => write!(f, "fatal: {reason}"),
            Self::FlowDefMissing => f.write_str("flow definition missing"),
            Self::FlowDefError(def) => write!(f, "incompatible flow definition {def}"),
            Self::Backpressure => f.write_str("backpressure"),
            Self::NeedOutput => f.write_str("need output"),
            Self::NeedInput => f.write_str("need input"),
            Self::Attached { thread } => write!(f, "attached to {thread}"),
        }
    }
}

/// Event delivered to a probe listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeEvent {
    /// Name of the pipe that raised the event.
    pub pipe: Arc<str>,
    pub kind: EventKind,
}

/// Receiving half of a probe listener.
pub type ProbeReceiver = mpsc::UnboundedReceiver<ProbeEvent>;

/// Cloneable event reporter attached to a pipe.
#[derive(Clone, Debug)]
pub struct Probe {
    name: Arc<str>,
    tx: Option<mpsc::UnboundedSender<ProbeEvent>>,
}

impl Probe {
    /// Create a probe that only logs.
    #[must_use]
    pub fn logging(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            tx: None,
        }
    }

    /// Create a probe that logs and forwards events to the returned receiver.
    #[must_use]
    pub fn channel(name: impl Into<Arc<str>>) -> (Self, ProbeReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                tx: Some(tx),
            },
            rx,
        )
    }

    /// Derive a probe for a sub-pipe, sharing the same listener.
    #[must_use]
    pub fn prefixed(&self, suffix: &str) -> Self {
        Self {
            name: format!("{}.{suffix}", self.name).into(),
            tx: self.tx.clone(),
        }
    }

    /// Name reported with every event.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Log and publish `kind`.
    pub fn throw(&self, kind: EventKind) {
        let pipe = &*self.name;
        match &kind {
            EventKind::Ready | EventKind::Dead | EventKind::NeedInput => {
                debug!(pipe, event = %kind, "pipe event");
            }
            EventKind::Attached { thread } => info!(pipe, thread = %thread, "pipe attached"),
            EventKind::Fatal(reason) => error!(pipe, reason = %reason, "pipe fatal error"),
            EventKind::FlowDefMissing
            | EventKind::FlowDefError(_)
            | EventKind::Backpressure
            | EventKind::NeedOutput => warn!(pipe, event = %kind, "pipe event"),
        }
        if let Some(tx) = &self.tx {
            // Listener may have gone away.
            let _ = tx.send(ProbeEvent {
                pipe: Arc::clone(&self.name),
                kind,
            });
        }
    }
}
