//! Packets exchanged between pipes.
//!
//! A [`Packet`] is an envelope holding an optional payload [`Buffer`] and an
//! [`Attributes`] store. Packets without a payload are control packets: flow
//! definitions, end-of-stream markers and other out-of-band events. They are
//! moved from stage to stage and never duplicated, apart from the stored flow
//! definition each stage keeps for renegotiation.

pub mod attributes;

pub use attributes::{AttrValue, Attributes, FLOW_DEF_KEY, FLOW_END_KEY};

use crate::buffer::Buffer;

/// Envelope carrying an optional payload and its metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packet {
    buffer: Option<Buffer>,
    attributes: Attributes,
}

impl Packet {
    /// Create a data packet carrying `buffer` and no attributes.
    #[must_use]
    pub fn data(buffer: impl Into<Buffer>) -> Self {
        Self {
            buffer: Some(buffer.into()),
            attributes: Attributes::new(),
        }
    }

    /// Create a flow definition packet announcing `def`.
    #[must_use]
    pub fn flow_def(def: impl Into<String>) -> Self {
        let mut attributes = Attributes::new();
        attributes.set_flow_def(def);
        Self {
            buffer: None,
            attributes,
        }
    }

    /// Create an end-of-stream control packet.
    #[must_use]
    pub fn end_of_stream() -> Self {
        let mut attributes = Attributes::new();
        attributes.set_end();
        Self {
            buffer: None,
            attributes,
        }
    }

    /// Create a packet from explicit parts.
    #[must_use]
    pub fn from_parts(buffer: Option<Buffer>, attributes: Attributes) -> Self {
        Self { buffer, attributes }
    }

    /// Borrow the payload, if any.
    #[must_use]
    pub fn buffer(&self) -> Option<&Buffer> { self.buffer.as_ref() }

    /// Detach the payload, leaving a control packet behind.
    pub fn take_buffer(&mut self) -> Option<Buffer> { self.buffer.take() }

    /// Replace the payload.
    pub fn set_buffer(&mut self, buffer: Buffer) { self.buffer = Some(buffer); }

    /// Whether the packet carries a payload buffer.
    #[must_use]
    pub fn has_buffer(&self) -> bool { self.buffer.is_some() }

    /// Payload length, zero for control packets.
    #[must_use]
    pub fn payload_len(&self) -> usize { self.buffer.as_ref().map_or(0, Buffer::len) }

    /// Whether the packet announces a flow definition.
    #[must_use]
    pub fn is_flow_def(&self) -> bool { self.attributes.flow_def().is_some() }

    /// Whether the packet marks the end of the stream.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool { self.attributes.is_end() }

    /// Borrow the metadata store.
    #[must_use]
    pub fn attributes(&self) -> &Attributes { &self.attributes }

    /// Mutably borrow the metadata store.
    pub fn attributes_mut(&mut self) -> &mut Attributes { &mut self.attributes }

    /// Consume the packet, returning its components.
    #[must_use]
    pub fn into_parts(self) -> (Option<Buffer>, Attributes) { (self.buffer, self.attributes) }
}
