//! Assertion macros shared by integration tests.

/// Assert that a probe event matching `$pattern` was raised.
#[macro_export]
macro_rules! assert_event {
    ($events:expr, $pattern:pat) => {{
        let kinds = $crate::drain_events(&mut $events);
        assert!(
            kinds.iter().any(|kind| matches!(kind, $pattern)),
            "expected {} in {kinds:?}",
            stringify!($pattern)
        );
    }};
}

pub use crate::assert_event;
