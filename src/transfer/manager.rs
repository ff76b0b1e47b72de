//! Worker-side event loop adopting relocated pipes.
//!
//! A [`TransferManager`] is the caller-side factory through which pipes are
//! handed to a worker thread. The matching [`TransferWorker`] runs on that
//! thread: for every attach directive it binds the pipe to the worker's
//! [`Scheduler`] and spawns a drain task feeding the pipe from its transfer
//! queue. The worker exits once every manager handle is dropped and every
//! drain task has finished.

use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle, ThreadId},
};

use tokio::{runtime, sync::mpsc};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use super::{TransferError, TransferReceiver, sink::Transfer};
use crate::{
    panic::panic_message,
    pipe::{Command, PipeHandle, Reply},
    probe::{EventKind, Probe},
};

/// Default number of attach directives that may wait for the worker.
pub const DEFAULT_DIRECTIVE_CAPACITY: usize = 255;

/// Identity of the event loop a pipe runs on.
#[derive(Clone, Debug)]
pub struct Scheduler {
    thread_id: ThreadId,
    thread_name: Arc<str>,
    runtime: Option<runtime::Handle>,
}

impl Scheduler {
    /// Capture the calling thread and its tokio runtime, if any.
    #[must_use]
    pub fn current() -> Self {
        let thread = thread::current();
        let thread_name = thread
            .name()
            .map_or_else(|| format!("{:?}", thread.id()), str::to_owned);
        Self {
            thread_id: thread.id(),
            thread_name: thread_name.into(),
            runtime: runtime::Handle::try_current().ok(),
        }
    }

    /// Thread the scheduler runs on.
    #[must_use]
    pub fn thread_id(&self) -> ThreadId { self.thread_id }

    /// Human-readable thread name.
    #[must_use]
    pub fn thread_name(&self) -> &str { &self.thread_name }

    /// Runtime handle for spawning timers or tasks on this loop.
    #[must_use]
    pub fn runtime(&self) -> Option<&runtime::Handle> { self.runtime.as_ref() }

    /// Whether the caller is running on this scheduler's thread.
    #[must_use]
    pub fn is_current_thread(&self) -> bool { thread::current().id() == self.thread_id }
}

/// Request for the worker to adopt a pipe.
pub(crate) struct AttachDirective {
    pub(crate) pipe: PipeHandle,
    pub(crate) queue: TransferReceiver<Transfer>,
    pub(crate) probe: Probe,
}

/// Caller-side factory handing pipes to a worker loop.
#[derive(Clone, Debug)]
pub struct TransferManager {
    directives: mpsc::Sender<AttachDirective>,
}

impl TransferManager {
    /// Create a manager and the worker that serves it.
    ///
    /// `directive_capacity` bounds how many attach requests may wait for the
    /// worker.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::InvalidCapacity`] when `directive_capacity` is
    /// zero.
    pub fn new(directive_capacity: usize) -> Result<(Self, TransferWorker), TransferError> {
        if directive_capacity == 0 {
            return Err(TransferError::InvalidCapacity(directive_capacity));
        }
        let (tx, rx) = mpsc::channel(directive_capacity);
        Ok((Self { directives: tx }, TransferWorker { directives: rx }))
    }

    /// Whether the worker is still accepting pipes.
    #[must_use]
    pub fn is_available(&self) -> bool { !self.directives.is_closed() }

    pub(crate) fn attach(&self, directive: AttachDirective) -> Result<(), TransferError> {
        match self.directives.try_send(directive) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(directive)) => {
                futures::executor::block_on(self.directives.send(directive))
                    .map_err(|_| TransferError::WorkerUnavailable)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(TransferError::WorkerUnavailable),
        }
    }
}

/// Event loop adopting pipes relocated through a [`TransferManager`].
#[derive(Debug)]
pub struct TransferWorker {
    directives: mpsc::Receiver<AttachDirective>,
}

impl TransferWorker {
    /// Serve attach directives on the current runtime until every manager
    /// handle is dropped and every adopted pipe has been released.
    pub async fn run(mut self) {
        let tracker = TaskTracker::new();
        let scheduler = Scheduler::current();
        debug!(thread = scheduler.thread_name(), "transfer worker started");

        while let Some(directive) = self.directives.recv().await {
            tracker.spawn(drain(directive, scheduler.clone()));
        }

        tracker.close();
        tracker.wait().await;
        debug!(thread = scheduler.thread_name(), "transfer worker finished");
    }

    /// Run the worker on a new current-thread runtime, blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the runtime cannot be built.
    pub fn run_blocking(self) -> io::Result<()> {
        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        rt.block_on(self.run());
        Ok(())
    }

    /// Run the worker on a dedicated, named thread.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn spawn_thread(self, name: impl Into<String>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new().name(name.into()).spawn(move || {
            if let Err(err) = self.run_blocking() {
                error!(error = %err, "transfer worker failed to start");
            }
        })
    }
}

/// Bind `pipe` to the worker and feed it every queued item in order.
async fn drain(directive: AttachDirective, scheduler: Scheduler) {
    let AttachDirective {
        pipe,
        mut queue,
        probe,
    } = directive;

    match pipe.control(Command::AttachScheduler(scheduler.clone())) {
        Ok(Reply::Unhandled) => debug!(pipe = probe.name(), "pipe ignores scheduler binding"),
        Ok(_) => probe.throw(EventKind::Attached {
            thread: scheduler.thread_name().to_owned(),
        }),
        Err(err) => warn!(pipe = probe.name(), error = %err, "scheduler binding rejected"),
    }

    let mut delivered = 0usize;
    while let Some(item) = queue.recv().await {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| deliver(&pipe, item, &probe)));
        if let Err(payload) = outcome {
            error!(
                pipe = probe.name(),
                panic = panic_message(payload.as_ref()),
                "pipe panicked during transfer"
            );
        }
        delivered += 1;
    }

    debug!(pipe = probe.name(), delivered, "transfer queue drained; releasing pipe");
    drop(pipe);
}

fn deliver(pipe: &PipeHandle, item: Transfer, probe: &Probe) {
    match item {
        Transfer::Input(packet) => {
            pipe.input(packet);
            crate::metrics::inc_transferred();
        }
        Transfer::Control(command) => match pipe.control(command) {
            Ok(reply) if reply.is_unhandled() => {
                debug!(pipe = probe.name(), "transferred command unhandled");
            }
            Ok(_) => {}
            Err(err) => warn!(pipe = probe.name(), error = %err, "transferred command failed"),
        },
    }
}
