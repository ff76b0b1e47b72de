#![cfg(any(test, feature = "test-helpers"))]
//! Test-only pipes shared by unit and integration tests.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
};

use crate::{
    packet::Packet,
    pipe::{Command, Lifecycle, Pipe, PipeHandle, Reply, Result},
    probe::Probe,
    transfer::Scheduler,
};

/// Everything a [`CaptureSink`] observed.
#[derive(Debug, Default)]
pub struct CaptureLog {
    /// Packets received, in arrival order.
    pub packets: Vec<Packet>,
    /// Thread each packet was received on.
    pub input_threads: Vec<ThreadId>,
    /// Names of the control commands received, in arrival order.
    pub commands: Vec<&'static str>,
    /// Scheduler bound through [`Command::AttachScheduler`].
    pub scheduler: Option<Scheduler>,
    /// Whether the sink has been torn down.
    pub released: bool,
}

/// Shared view over a [`CaptureSink`]'s log.
#[derive(Clone, Debug, Default)]
pub struct Captured(Arc<Mutex<CaptureLog>>);

impl Captured {
    /// Lock the log for inspection.
    pub fn lock(&self) -> MutexGuard<'_, CaptureLog> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of every packet received so far.
    #[must_use]
    pub fn packets(&self) -> Vec<Packet> { self.lock().packets.clone() }

    /// Payload lengths of the data packets received so far.
    #[must_use]
    pub fn data_lengths(&self) -> Vec<usize> {
        self.lock()
            .packets
            .iter()
            .filter(|packet| packet.has_buffer())
            .map(Packet::payload_len)
            .collect()
    }

    /// Number of packets received so far.
    #[must_use]
    pub fn len(&self) -> usize { self.lock().packets.len() }

    /// Whether nothing has been received.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Whether the sink has been dropped.
    #[must_use]
    pub fn is_released(&self) -> bool { self.lock().released }
}

/// Terminal pipe recording every packet and command it receives.
#[derive(Debug)]
pub struct CaptureSink {
    log: Captured,
    _lifecycle: Option<Lifecycle>,
}

impl CaptureSink {
    /// Create a sink and the shared view over its log.
    #[must_use]
    pub fn new() -> (Self, Captured) { Self::build(None) }

    /// Create a sink that reports ready/dead through `probe`.
    #[must_use]
    pub fn with_probe(probe: Probe) -> (Self, Captured) { Self::build(Some(Lifecycle::new(probe))) }

    fn build(lifecycle: Option<Lifecycle>) -> (Self, Captured) {
        let log = Captured::default();
        (
            Self {
                log: log.clone(),
                _lifecycle: lifecycle,
            },
            log,
        )
    }

    /// Create a sink wrapped in a [`PipeHandle`].
    #[must_use]
    pub fn handle() -> (PipeHandle, Captured) {
        let (sink, log) = Self::new();
        (PipeHandle::new(sink), log)
    }
}

impl Pipe for CaptureSink {
    fn input(&mut self, packet: Packet) {
        let mut log = self.log.lock();
        log.packets.push(packet);
        log.input_threads.push(thread::current().id());
    }

    fn control(&mut self, command: Command) -> Result<Reply> {
        let mut log = self.log.lock();
        let name = match command {
            Command::AttachScheduler(scheduler) => {
                log.scheduler = Some(scheduler);
                "attach_scheduler"
            }
            Command::SetFlowDef(_) => "set_flow_def",
            Command::SetOutput(_) => "set_output",
            Command::SetMtu { .. } => "set_mtu",
            _ => return Ok(Reply::Unhandled),
        };
        log.commands.push(name);
        Ok(Reply::Done)
    }
}

impl Drop for CaptureSink {
    fn drop(&mut self) { self.log.lock().released = true; }
}
