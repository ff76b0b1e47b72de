//! Panic payload inspection.
//!
//! Transfer workers catch panics raised by relocated pipes and log the
//! payload before moving on to the next queued item.

use std::any::Any;

/// Placeholder used when a payload is neither `String` nor `&'static str`.
pub const OPAQUE_PANIC: &str = "<non-string panic payload>";

/// Borrow the message carried by a panic payload.
///
/// ```
/// use flowpipe::panic::{OPAQUE_PANIC, panic_message};
///
/// let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
/// assert_eq!(panic_message(payload.as_ref()), "boom");
/// let payload: Box<dyn std::any::Any + Send> = Box::new(5_u32);
/// assert_eq!(panic_message(payload.as_ref()), OPAQUE_PANIC);
/// ```
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&'static str>().copied())
        .unwrap_or(OPAQUE_PANIC)
}
