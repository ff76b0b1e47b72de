//! Stage cutting a block stream into aligned, MTU-sized packets.
//!
//! Data packets are fed to a [`Segmenter`]; every completed chunk is
//! forwarded through the flow handshake. End of stream flushes the aligned
//! remainder before the marker itself is forwarded, and so does teardown.

use std::{mem, sync::Arc};

use tracing::{debug, trace, warn};

use super::check_block_flow;
use crate::{
    buffer::BufferAllocator,
    flow::FlowOutput,
    packet::Packet,
    pipe::{Command, Lifecycle, Pipe, PipeError, Reply, Result},
    probe::{EventKind, Probe},
    segment::{ChunkConfig, Segmenter},
};

/// Re-chunking stage.
#[derive(Debug)]
pub struct ChunkStream {
    segmenter: Segmenter,
    flow: FlowOutput,
    scratch: Vec<Packet>,
    lifecycle: Lifecycle,
}

impl ChunkStream {
    /// Create a stage with the default MTU and alignment.
    ///
    /// `flow_def`, when it carries a flow definition, is stored for
    /// announcement before the first chunk.
    #[must_use]
    pub fn new(probe: Probe, flow_def: Option<Packet>) -> Self {
        Self::with_segmenter(probe, flow_def, Segmenter::new(ChunkConfig::default()))
    }

    /// Create a stage carving chunks through `allocator`.
    #[must_use]
    pub fn with_allocator(
        probe: Probe,
        flow_def: Option<Packet>,
        config: ChunkConfig,
        allocator: Arc<dyn BufferAllocator>,
    ) -> Self {
        Self::with_segmenter(probe, flow_def, Segmenter::with_allocator(config, allocator))
    }

    fn with_segmenter(probe: Probe, flow_def: Option<Packet>, segmenter: Segmenter) -> Self {
        let mut flow = FlowOutput::new();
        if let Some(def) = flow_def.filter(Packet::is_flow_def) {
            flow.store_flow_def(def);
        }
        Self {
            segmenter,
            flow,
            scratch: Vec::new(),
            lifecycle: Lifecycle::new(probe),
        }
    }

    /// Bytes waiting for a complete chunk.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.segmenter.pending_len() }

    fn accept_flow_def(&mut self, flow_def: Packet) -> Result<()> {
        check_block_flow(&flow_def)?;
        debug!(
            pipe = self.lifecycle.probe().name(),
            def = flow_def.attributes().flow_def(),
            "flow definition"
        );
        self.flow.store_flow_def(flow_def);
        Ok(())
    }

    fn emit_scratch(&mut self) {
        let chunks = mem::take(&mut self.scratch);
        for packet in chunks {
            if packet.has_buffer() {
                crate::metrics::inc_chunks();
            }
            self.flow.emit(packet, self.lifecycle.probe());
        }
    }

    fn flush(&mut self) {
        if self.segmenter.pending_len() == 0 {
            return;
        }
        let result = self.segmenter.flush(&mut self.scratch);
        self.emit_scratch();
        match result {
            Ok(report) => {
                if report.dropped > 0 {
                    warn!(
                        pipe = self.lifecycle.probe().name(),
                        dropped = report.dropped,
                        align = self.segmenter.config().align(),
                        "discarding unaligned tail"
                    );
                    crate::metrics::add_tail_dropped(report.dropped);
                }
            }
            Err(err) => self.lifecycle.raise_fatal(&err.into()),
        }
    }
}

impl Pipe for ChunkStream {
    fn input(&mut self, packet: Packet) {
        if self.lifecycle.is_fatal() {
            trace!(pipe = self.lifecycle.probe().name(), "fatal pipe dropped packet");
            return;
        }

        if packet.is_flow_def() {
            if let Err(err) = self.accept_flow_def(packet) {
                self.lifecycle
                    .probe()
                    .throw(EventKind::FlowDefError(err.to_string()));
            }
            return;
        }

        if packet.is_end_of_stream() {
            self.flush();
            self.flow.emit(packet, self.lifecycle.probe());
            return;
        }

        let result = self.segmenter.accept(packet, &mut self.scratch);
        self.emit_scratch();
        if let Err(err) = result {
            self.lifecycle.raise_fatal(&err.into());
        }
    }

    fn control(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::GetFlowDef => Ok(Reply::FlowDef(self.flow.flow_def().cloned())),
            Command::SetFlowDef(flow_def) => {
                self.accept_flow_def(flow_def)?;
                Ok(Reply::Done)
            }
            Command::GetOutput => Ok(Reply::Output(self.flow.output().cloned())),
            Command::SetOutput(output) => {
                self.flow.set_output(output);
                Ok(Reply::Done)
            }
            Command::GetMtu => {
                let config = self.segmenter.config();
                Ok(Reply::Mtu {
                    mtu: config.mtu(),
                    align: config.align(),
                })
            }
            Command::SetMtu { mtu, align } => {
                self.segmenter.configure(mtu, align).map_err(|err| {
                    warn!(pipe = self.lifecycle.probe().name(), mtu, align, "invalid mtu or alignment");
                    PipeError::from(err)
                })?;
                Ok(Reply::Done)
            }
            _ => Ok(Reply::Unhandled),
        }
    }
}

impl Drop for ChunkStream {
    fn drop(&mut self) {
        if !self.lifecycle.is_fatal() {
            self.flush();
        }
    }
}

#[cfg(test)]
mod tests;
