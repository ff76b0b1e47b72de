//! Bounded, ordered single-producer hand-off queue.
//!
//! [`transfer_queue`] returns the two halves of a FIFO channel holding at most
//! `capacity` items. Producers either await free space with
//! [`TransferSender::send`], park the calling thread with
//! [`TransferSender::send_blocking`], or receive the item back with
//! [`TransferSender::try_send`]. Closing the queue stops new enqueues while
//! the receiver keeps draining whatever was already queued.

use tokio::sync::mpsc;

use super::{TransferError, TrySendError};

/// Create a bounded transfer queue.
///
/// # Errors
///
/// Returns [`TransferError::InvalidCapacity`] when `capacity` is zero.
pub fn transfer_queue<T>(
    capacity: usize,
) -> Result<(TransferSender<T>, TransferReceiver<T>), TransferError> {
    if capacity == 0 {
        return Err(TransferError::InvalidCapacity(capacity));
    }
    let (tx, rx) = mpsc::channel(capacity);
    Ok((TransferSender { tx: Some(tx) }, TransferReceiver { rx }))
}

/// Producing half of a transfer queue.
#[derive(Debug)]
pub struct TransferSender<T> {
    tx: Option<mpsc::Sender<T>>,
}

impl<T> TransferSender<T> {
    /// Enqueue `item`, waiting for free space.
    ///
    /// Dropping the returned future before it completes frees `item`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Closed`] if the queue is closed before space
    /// frees. The item is freed.
    pub async fn send(&self, item: T) -> Result<(), TransferError> {
        let tx = self.tx.as_ref().ok_or(TransferError::Closed)?;
        tx.send(item).await.map_err(|_| TransferError::Closed)
    }

    /// Enqueue `item`, parking the calling thread while the queue is full.
    ///
    /// The consumer must run on a different thread, otherwise this call never
    /// returns once the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Closed`] if the queue is closed before space
    /// frees. The item is freed.
    pub fn send_blocking(&self, item: T) -> Result<(), TransferError> {
        futures::executor::block_on(self.send(item))
    }

    /// Enqueue `item` only if space is available right now.
    ///
    /// # Errors
    ///
    /// Returns [`TrySendError::Backpressure`] when the queue is full and
    /// [`TrySendError::Closed`] when it is closed, handing `item` back.
    pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(TrySendError::Closed(item));
        };
        tx.try_send(item).map_err(|err| match err {
            mpsc::error::TrySendError::Full(item) => TrySendError::Backpressure(item),
            mpsc::error::TrySendError::Closed(item) => TrySendError::Closed(item),
        })
    }

    /// Enqueue `wrap(value)` only if space is available right now.
    ///
    /// A refused `value` is handed back before it is wrapped.
    ///
    /// # Errors
    ///
    /// Returns [`TrySendError::Backpressure`] when the queue is full and
    /// [`TrySendError::Closed`] when it is closed.
    pub fn try_send_with<U>(
        &self,
        value: U,
        wrap: impl FnOnce(U) -> T,
    ) -> Result<(), TrySendError<U>> {
        let Some(tx) = self.tx.as_ref() else {
            return Err(TrySendError::Closed(value));
        };
        match tx.try_reserve() {
            Ok(permit) => {
                permit.send(wrap(value));
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(())) => Err(TrySendError::Backpressure(value)),
            Err(mpsc::error::TrySendError::Closed(())) => Err(TrySendError::Closed(value)),
        }
    }

    /// Close the queue for new items. Queued items still drain.
    pub fn close(&mut self) { self.tx = None; }

    /// Whether no further item can be enqueued.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.as_ref().is_none_or(mpsc::Sender::is_closed) }

    /// Maximum number of outstanding items.
    #[must_use]
    pub fn capacity(&self) -> usize { self.tx.as_ref().map_or(0, mpsc::Sender::max_capacity) }

    /// Number of items currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tx
            .as_ref()
            .map_or(0, |tx| tx.max_capacity() - tx.capacity())
    }

    /// Whether the queue currently holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Consuming half of a transfer queue.
#[derive(Debug)]
pub struct TransferReceiver<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> TransferReceiver<T> {
    /// Receive the next item in FIFO order.
    ///
    /// Returns `None` once the queue is closed and empty.
    pub async fn recv(&mut self) -> Option<T> { self.rx.recv().await }

    /// Receive the next item if one is queued.
    pub fn try_recv(&mut self) -> Option<T> { self.rx.try_recv().ok() }

    /// Refuse further items from the producer; queued items still drain.
    pub fn close(&mut self) { self.rx.close(); }

    /// Number of items currently queued.
    #[must_use]
    pub fn len(&self) -> usize { self.rx.len() }

    /// Whether the queue currently holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.rx.is_empty() }
}
