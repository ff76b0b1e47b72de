//! Pipeline drivers shared by integration tests.

use std::{io, thread::JoinHandle};

use bytes::Bytes;
use flowpipe::{
    ChunkConfig,
    EventKind,
    Packet,
    PipeHandle,
    Probe,
    Segmenter,
    TransferConfig,
    TransferManager,
    WorkerSink,
    probe::ProbeReceiver,
    segment::{FlushReport, SegmentError},
};

/// Name given to worker threads spawned by [`relocate`].
pub const WORKER_THREAD: &str = "flowpipe-test-worker";

/// Feed `fragments` through a fresh segmenter and flush it.
///
/// Returns every emitted packet, in order, with the flush report.
///
/// # Errors
///
/// Propagates [`SegmentError`] from the segmenter.
pub fn segment_packets<I, B>(
    config: ChunkConfig,
    fragments: I,
) -> Result<(Vec<Packet>, FlushReport), SegmentError>
where
    I: IntoIterator<Item = B>,
    B: Into<Bytes>,
{
    let mut segmenter = Segmenter::new(config);
    let mut out = Vec::new();
    for fragment in fragments {
        segmenter.accept(Packet::data(fragment.into()), &mut out)?;
    }
    let report = segmenter.flush(&mut out)?;
    Ok((out, report))
}

/// Like [`segment_packets`] but returns only the payload lengths.
///
/// # Errors
///
/// Propagates [`SegmentError`] from the segmenter.
pub fn segment_all<I, B>(
    config: ChunkConfig,
    fragments: I,
) -> Result<(Vec<usize>, FlushReport), SegmentError>
where
    I: IntoIterator<Item = B>,
    B: Into<Bytes>,
{
    let (packets, report) = segment_packets(config, fragments)?;
    Ok((packets.iter().map(Packet::payload_len).collect(), report))
}

/// Drain every event currently queued on `events`.
pub fn drain_events(events: &mut ProbeReceiver) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event.kind);
    }
    kinds
}

/// A pipe running on its own worker thread, driven through a proxy.
pub struct RelocatedPipe {
    /// Proxy accepting input on the caller's thread.
    pub proxy: PipeHandle,
    manager: TransferManager,
    worker: JoinHandle<()>,
}

impl RelocatedPipe {
    /// Drop the proxy and manager, then wait for the worker to drain.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the worker thread panicked.
    pub fn finish(self) -> io::Result<()> {
        let Self {
            proxy,
            manager,
            worker,
        } = self;
        drop(proxy);
        drop(manager);
        worker
            .join()
            .map_err(|_| io::Error::other("transfer worker panicked"))
    }
}

/// Spawn a worker thread and relocate `inner` onto it.
///
/// # Errors
///
/// Returns an I/O error if the worker cannot be spawned or adopt the pipe.
pub fn relocate(
    inner: PipeHandle,
    config: TransferConfig,
    probe: Probe,
) -> io::Result<RelocatedPipe> {
    let (manager, worker) = TransferManager::new(1).map_err(io::Error::other)?;
    let worker = worker.spawn_thread(WORKER_THREAD)?;
    let proxy = WorkerSink::new(&manager, inner, config, probe).map_err(io::Error::other)?;
    Ok(RelocatedPipe {
        proxy: PipeHandle::new(proxy),
        manager,
        worker,
    })
}
