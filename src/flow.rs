//! Output slot and flow definition handshake.
//!
//! [`FlowOutput`] owns a pipe's downstream handle together with the flow
//! definition the pipe announces. Registering a definition does not send it;
//! the definition is forwarded lazily, immediately before the first data
//! packet that follows, and again only after it changes or the output is
//! replaced.

use thiserror::Error;

use crate::{
    packet::Packet,
    pipe::PipeHandle,
    probe::{EventKind, Probe},
};

/// Reasons the handshake refused to forward a packet.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// Data arrived before any flow definition was registered.
    #[error("data packet received before a flow definition")]
    FlowDefMissing,
    /// No downstream pipe is attached.
    #[error("no output pipe attached")]
    NoOutput,
}

impl FlowError {
    fn event(self) -> EventKind {
        match self {
            Self::FlowDefMissing => EventKind::FlowDefMissing,
            Self::NoOutput => EventKind::NeedOutput,
        }
    }
}

/// Downstream handle plus the per-pipe flow definition state.
#[derive(Debug, Default)]
pub struct FlowOutput {
    output: Option<PipeHandle>,
    flow_def: Option<Packet>,
    sent: bool,
}

impl FlowOutput {
    /// Create an output slot with no target and no definition.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Current downstream pipe.
    #[must_use]
    pub fn output(&self) -> Option<&PipeHandle> { self.output.as_ref() }

    /// Replace the downstream pipe.
    ///
    /// The new target has not seen the definition yet, so it is announced
    /// again before the next data packet.
    pub fn set_output(&mut self, output: Option<PipeHandle>) {
        self.output = output;
        self.sent = false;
    }

    /// Stored flow definition, if any.
    #[must_use]
    pub fn flow_def(&self) -> Option<&Packet> { self.flow_def.as_ref() }

    /// Whether the stored definition has been forwarded to the current output.
    #[must_use]
    pub fn is_sent(&self) -> bool { self.sent }

    /// Register `flow_def` for announcement before the next data packet.
    ///
    /// Re-registering an identical definition keeps the current state.
    pub fn store_flow_def(&mut self, flow_def: Packet) {
        if self.flow_def.as_ref() == Some(&flow_def) {
            return;
        }
        self.flow_def = Some(flow_def);
        self.sent = false;
    }

    /// Forward `packet` downstream, announcing the flow definition first when
    /// required.
    ///
    /// Flow definition packets are stored rather than forwarded. Other
    /// control packets bypass the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::FlowDefMissing`] for data arriving before a
    /// definition and [`FlowError::NoOutput`] when no output is attached. The
    /// packet is dropped in both cases.
    pub fn forward(&mut self, packet: Packet) -> Result<(), FlowError> {
        if packet.is_flow_def() {
            self.store_flow_def(packet);
            return Ok(());
        }

        if packet.has_buffer() && self.flow_def.is_none() {
            return Err(FlowError::FlowDefMissing);
        }
        let output = self.output.as_ref().ok_or(FlowError::NoOutput)?;

        if packet.has_buffer()
            && !self.sent
            && let Some(flow_def) = &self.flow_def
        {
            output.input(flow_def.clone());
            self.sent = true;
        }
        output.input(packet);
        Ok(())
    }

    /// Forward `packet`, reporting any refusal through `probe`.
    pub fn emit(&mut self, packet: Packet, probe: &Probe) {
        if let Err(err) = self.forward(packet) {
            probe.throw(err.event());
        }
    }
}

#[cfg(test)]
mod tests;
