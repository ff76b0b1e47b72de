//! Caller-side proxy for a pipe relocated onto a worker.

use tracing::{debug, warn};

use super::{
    AttachDirective,
    BackpressurePolicy,
    TransferConfig,
    TransferError,
    TransferManager,
    TransferSender,
    TrySendError,
    transfer_queue,
};
use crate::{
    packet::Packet,
    pipe::{Command, Lifecycle, Pipe, PipeError, PipeHandle, Reply, Result},
    probe::{EventKind, Probe},
};

/// Item carried by a transfer queue.
#[derive(Debug)]
pub enum Transfer {
    /// Packet for the inner pipe's input.
    Input(Packet),
    /// Command for the inner pipe's control.
    Control(Command),
}

/// Proxy pipe forwarding every packet and command to a pipe on a worker.
///
/// The proxy lives with the producer. Dropping it closes the queue; the
/// worker drains what is left and then releases the inner pipe.
///
/// A command the queue refuses is answered with
/// [`TransferError::Backpressure`] instead of `Done`. If the worker goes away
/// the proxy turns fatal and refuses everything after.
#[derive(Debug)]
pub struct WorkerSink {
    queue: TransferSender<Transfer>,
    policy: BackpressurePolicy,
    lifecycle: Lifecycle,
}

impl WorkerSink {
    /// Hand `inner` to the worker behind `manager` and return its proxy.
    ///
    /// The inner pipe reports through `probe.prefixed("x")`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::WorkerUnavailable`] when the worker loop is
    /// gone. The proxy raises a fatal event before it is discarded.
    pub fn new(
        manager: &TransferManager,
        inner: PipeHandle,
        config: TransferConfig,
        probe: Probe,
    ) -> std::result::Result<Self, TransferError> {
        let mut lifecycle = Lifecycle::new(probe);
        let (queue, rx) = transfer_queue(config.capacity())?;
        let directive = AttachDirective {
            pipe: inner,
            queue: rx,
            probe: lifecycle.probe().prefixed("x"),
        };
        if let Err(err) = manager.attach(directive) {
            lifecycle.raise_fatal(&PipeError::from(err));
            return Err(err);
        }
        debug!(
            pipe = lifecycle.probe().name(),
            capacity = config.capacity(),
            policy = ?config.policy(),
            "pipe relocated to worker"
        );
        Ok(Self {
            queue,
            policy: config.policy(),
            lifecycle,
        })
    }

    /// Enqueue `packet` without waiting.
    ///
    /// # Errors
    ///
    /// Returns the packet inside [`TrySendError::Backpressure`] when the
    /// queue is full and [`TrySendError::Closed`] when it is closed.
    pub fn try_input(&self, packet: Packet) -> std::result::Result<(), TrySendError<Packet>> {
        self.queue
            .try_send_with(packet, Transfer::Input)
            .inspect_err(|err| {
                if err.is_backpressure() {
                    self.report_backpressure();
                }
            })
    }

    /// Enqueue `packet`, awaiting free space.
    ///
    /// Dropping the future before completion frees the packet.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Closed`] if the queue closes while waiting.
    pub async fn send(&self, packet: Packet) -> std::result::Result<(), TransferError> {
        let item = match self.queue.try_send(Transfer::Input(packet)) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Closed(_)) => return Err(TransferError::Closed),
            Err(TrySendError::Backpressure(item)) => item,
        };
        self.report_backpressure();
        self.queue.send(item).await
    }

    /// Number of items waiting for the worker.
    #[must_use]
    pub fn queued(&self) -> usize { self.queue.len() }

    /// Maximum number of items the queue holds.
    #[must_use]
    pub fn capacity(&self) -> usize { self.queue.capacity() }

    fn report_backpressure(&self) {
        crate::metrics::inc_backpressure();
        self.lifecycle.probe().throw(EventKind::Backpressure);
    }

    fn enqueue(&mut self, item: Transfer) -> std::result::Result<(), TransferError> {
        let item = match self.queue.try_send(item) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Closed(_)) => return Err(self.worker_lost()),
            Err(TrySendError::Backpressure(item)) => item,
        };
        self.report_backpressure();
        match self.policy {
            BackpressurePolicy::Block => {
                if self.queue.send_blocking(item).is_err() {
                    return Err(self.worker_lost());
                }
                Ok(())
            }
            BackpressurePolicy::DropAndReport => {
                debug!(pipe = self.lifecycle.probe().name(), "queue full; item dropped");
                Err(TransferError::Backpressure)
            }
        }
    }

    fn worker_lost(&mut self) -> TransferError {
        let err = TransferError::WorkerUnavailable;
        warn!(pipe = self.lifecycle.probe().name(), "transfer queue closed by worker");
        self.lifecycle.raise_fatal(&PipeError::from(err));
        err
    }
}

impl Pipe for WorkerSink {
    fn input(&mut self, packet: Packet) {
        if self.lifecycle.is_fatal() {
            return;
        }
        // Backpressure and worker loss are reported by `enqueue`.
        let _ = self.enqueue(Transfer::Input(packet));
    }

    fn control(&mut self, command: Command) -> Result<Reply> {
        if command.is_query() || matches!(command, Command::AttachScheduler(_)) {
            return Ok(Reply::Unhandled);
        }
        if self.lifecycle.is_fatal() {
            return Err(TransferError::WorkerUnavailable.into());
        }
        self.enqueue(Transfer::Control(command))?;
        Ok(Reply::Done)
    }
}

impl Drop for WorkerSink {
    fn drop(&mut self) { self.queue.close(); }
}
