//! Terminal stage discarding everything it receives.

use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};

use tracing::{debug, trace};

use crate::{
    packet::Packet,
    pipe::{Command, Lifecycle, Pipe, Reply, Result},
    probe::{EventKind, Probe},
};

/// Counters shared between a [`NullSink`] and its observers.
#[derive(Debug, Default)]
pub struct SinkStats {
    packets: AtomicUsize,
    bytes: AtomicU64,
    ended: AtomicUsize,
}

impl SinkStats {
    /// Data packets received.
    #[must_use]
    pub fn packets(&self) -> usize { self.packets.load(Ordering::Relaxed) }

    /// Payload bytes received.
    #[must_use]
    pub fn bytes(&self) -> u64 { self.bytes.load(Ordering::Relaxed) }

    /// End-of-stream markers received.
    #[must_use]
    pub fn ended(&self) -> usize { self.ended.load(Ordering::Relaxed) }
}

/// Sink counting and dropping packets.
#[derive(Debug)]
pub struct NullSink {
    stats: Arc<SinkStats>,
    lifecycle: Lifecycle,
}

impl NullSink {
    /// Create a sink and a handle on its counters.
    #[must_use]
    pub fn new(probe: Probe) -> (Self, Arc<SinkStats>) {
        let stats = Arc::new(SinkStats::default());
        (
            Self {
                stats: Arc::clone(&stats),
                lifecycle: Lifecycle::new(probe),
            },
            stats,
        )
    }
}

impl Pipe for NullSink {
    fn input(&mut self, packet: Packet) {
        if packet.is_end_of_stream() {
            self.stats.ended.fetch_add(1, Ordering::Relaxed);
            self.lifecycle.probe().throw(EventKind::NeedInput);
            return;
        }
        if packet.has_buffer() {
            self.stats.packets.fetch_add(1, Ordering::Relaxed);
            self.stats
                .bytes
                .fetch_add(packet.payload_len() as u64, Ordering::Relaxed);
        }
        trace!(pipe = self.lifecycle.probe().name(), "packet dropped");
    }

    fn control(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::AttachScheduler(scheduler) => {
                debug!(
                    pipe = self.lifecycle.probe().name(),
                    thread = scheduler.thread_name(),
                    "sink bound to scheduler"
                );
                Ok(Reply::Done)
            }
            Command::SetFlowDef(_) => Ok(Reply::Done),
            _ => Ok(Reply::Unhandled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NullSink;
    use crate::{
        packet::Packet,
        pipe::{Command, Pipe},
        probe::{EventKind, Probe},
    };

    #[test]
    fn counts_data_and_end_of_stream() {
        let (probe, mut events) = Probe::channel("null");
        let (mut sink, stats) = NullSink::new(probe);
        sink.input(Packet::flow_def("block."));
        sink.input(Packet::data(vec![0u8; 10]));
        sink.input(Packet::data(vec![0u8; 6]));
        sink.input(Packet::end_of_stream());

        assert_eq!(stats.packets(), 2);
        assert_eq!(stats.bytes(), 16);
        assert_eq!(stats.ended(), 1);
        drop(sink);

        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(event.kind);
        }
        assert_eq!(
            kinds,
            vec![EventKind::Ready, EventKind::NeedInput, EventKind::Dead]
        );
    }

    #[test]
    fn queries_are_unhandled() {
        let (mut sink, _stats) = NullSink::new(Probe::logging("null"));
        assert!(sink.control(Command::GetOutput).expect("query").is_unhandled());
    }
}
