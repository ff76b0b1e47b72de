//! Cross-thread pipe relocation.
//!
//! A pipe handed to a [`TransferManager`] keeps running on the manager's
//! worker thread while producers talk to it through a [`WorkerSink`] proxy.
//! Packets and commands travel through a bounded [`transfer_queue`] and are
//! delivered in the order they were enqueued.

pub mod config;
pub mod error;
pub mod manager;
pub mod queue;
pub mod sink;

pub use config::{BackpressurePolicy, DEFAULT_QUEUE_CAPACITY, TransferConfig};
pub use error::{TransferError, TrySendError};
pub(crate) use manager::AttachDirective;
pub use manager::{DEFAULT_DIRECTIVE_CAPACITY, Scheduler, TransferManager, TransferWorker};
pub use queue::{TransferReceiver, TransferSender, transfer_queue};
pub use sink::{Transfer, WorkerSink};
