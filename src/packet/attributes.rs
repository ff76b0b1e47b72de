//! Opaque metadata carried alongside a packet payload.
//!
//! The pipeline core only ever asks two questions of a packet's attributes:
//! does it carry a flow definition, and does it mark the end of a stream.
//! Everything else is stage-specific and stored as untyped [`AttrValue`]s.

use std::{borrow::Cow, collections::BTreeMap};

/// Attribute key holding the flow definition string.
pub const FLOW_DEF_KEY: &str = "f.def";
/// Attribute key flagging the end of a stream.
pub const FLOW_END_KEY: &str = "f.end";

/// A single metadata value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    /// Presence-only marker.
    Void,
    Bool(bool),
    U8(u8),
    U64(u64),
    String(String),
}

/// Ordered key/value metadata store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: BTreeMap<Cow<'static, str>, AttrValue>,
}

impl Attributes {
    /// Create an empty attribute store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<Cow<'static, str>>, value: AttrValue) {
        self.entries.insert(key.into(), value);
    }

    /// Look up `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> { self.entries.get(key) }

    /// Remove `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<AttrValue> { self.entries.remove(key) }

    /// Number of stored attributes.
    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Whether no attributes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Read `key` as a `u8`.
    #[must_use]
    pub fn get_u8(&self, key: &str) -> Option<u8> {
        match self.get(key) {
            Some(AttrValue::U8(value)) => Some(*value),
            _ => None,
        }
    }

    /// Read `key` as a `u64`.
    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.get(key) {
            Some(AttrValue::U64(value)) => Some(*value),
            _ => None,
        }
    }

    /// Read `key` as a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(AttrValue::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Flow definition string, if any.
    #[must_use]
    pub fn flow_def(&self) -> Option<&str> { self.get_str(FLOW_DEF_KEY) }

    /// Set the flow definition string.
    pub fn set_flow_def(&mut self, def: impl Into<String>) {
        self.set(FLOW_DEF_KEY, AttrValue::String(def.into()));
    }

    /// Remove the flow definition string.
    pub fn delete_flow_def(&mut self) { self.remove(FLOW_DEF_KEY); }

    /// Whether the end-of-stream marker is present.
    #[must_use]
    pub fn is_end(&self) -> bool { self.get(FLOW_END_KEY).is_some() }

    /// Set the end-of-stream marker.
    pub fn set_end(&mut self) { self.set(FLOW_END_KEY, AttrValue::Void); }
}
