//! Stage dropping a fixed number of leading payload bytes.

use tracing::{debug, trace};

use super::{BLOCK_FLOW, check_block_flow};
use crate::{
    flow::FlowOutput,
    packet::Packet,
    pipe::{Command, Lifecycle, Pipe, Reply, Result},
    probe::{EventKind, Probe},
};

/// Removes `offset` bytes from the front of every data packet.
///
/// The remaining payload shares storage with the input; attributes are kept.
#[derive(Debug)]
pub struct SkipPipe {
    offset: usize,
    flow: FlowOutput,
    lifecycle: Lifecycle,
}

impl SkipPipe {
    /// Create a stage skipping nothing until configured.
    #[must_use]
    pub fn new(probe: Probe) -> Self {
        Self {
            offset: 0,
            flow: FlowOutput::new(),
            lifecycle: Lifecycle::new(probe),
        }
    }

    #[must_use]
    pub fn offset(&self) -> usize { self.offset }

    fn accept_flow_def(&mut self, mut flow_def: Packet) -> Result<()> {
        check_block_flow(&flow_def)?;
        debug!(
            pipe = self.lifecycle.probe().name(),
            def = flow_def.attributes().flow_def(),
            "flow definition"
        );
        // Output is a plain block stream whatever the input subtype.
        flow_def.attributes_mut().set_flow_def(BLOCK_FLOW);
        self.flow.store_flow_def(flow_def);
        Ok(())
    }
}

impl Pipe for SkipPipe {
    fn input(&mut self, mut packet: Packet) {
        let probe = self.lifecycle.probe();
        if packet.is_flow_def() {
            if let Err(err) = self.accept_flow_def(packet) {
                self.lifecycle
                    .probe()
                    .throw(EventKind::FlowDefError(err.to_string()));
            }
            return;
        }
        if packet.is_end_of_stream() {
            probe.throw(EventKind::NeedInput);
            return;
        }
        let Some(buffer) = packet.take_buffer() else {
            trace!(pipe = probe.name(), "control packet dropped");
            return;
        };
        match buffer.advance(self.offset) {
            Ok(rest) => {
                packet.set_buffer(rest);
                self.flow.emit(packet, self.lifecycle.probe());
            }
            Err(err) => {
                debug!(pipe = probe.name(), error = %err, "packet shorter than skip offset dropped");
            }
        }
    }

    fn control(&mut self, command: Command) -> Result<Reply> {
        match command {
            Command::GetOutput => Ok(Reply::Output(self.flow.output().cloned())),
            Command::SetOutput(output) => {
                self.flow.set_output(output);
                Ok(Reply::Done)
            }
            Command::GetFlowDef => Ok(Reply::FlowDef(self.flow.flow_def().cloned())),
            Command::SetFlowDef(flow_def) => {
                self.accept_flow_def(flow_def)?;
                Ok(Reply::Done)
            }
            Command::GetSkipOffset => Ok(Reply::SkipOffset(self.offset)),
            Command::SetSkipOffset(offset) => {
                self.offset = offset;
                Ok(Reply::Done)
            }
            _ => Ok(Reply::Unhandled),
        }
    }
}
