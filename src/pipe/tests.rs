//! Tests for pipe handles and lifecycle bookkeeping.

use std::panic::{self, AssertUnwindSafe};

use rstest::rstest;

use super::{Command, Lifecycle, Pipe, PipeError, PipeHandle, Reply, Result};
use crate::{
    flow::FlowError,
    packet::Packet,
    probe::{EventKind, Probe, ProbeReceiver},
    test_helpers::CaptureSink,
};

fn kinds(events: &mut ProbeReceiver) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Ok(event) = events.try_recv() {
        kinds.push(event.kind);
    }
    kinds
}

#[test]
fn last_handle_drop_tears_the_pipe_down() {
    let (probe, mut events) = Probe::channel("sink");
    let (sink, log) = CaptureSink::with_probe(probe);
    let first = PipeHandle::new(sink);
    let second = first.clone();
    assert!(first.ptr_eq(&second));
    assert_eq!(first.ref_count(), 2);

    drop(first);
    assert!(!log.is_released());
    second.input(Packet::data(vec![1]));
    drop(second);

    assert!(log.is_released());
    assert_eq!(log.len(), 1);
    assert_eq!(kinds(&mut events), vec![EventKind::Ready, EventKind::Dead]);
}

#[test]
fn fatal_is_raised_once() {
    let (probe, mut events) = Probe::channel("stage");
    let mut lifecycle = Lifecycle::new(probe);
    let err = PipeError::from(FlowError::NoOutput);
    lifecycle.raise_fatal(&err);
    lifecycle.raise_fatal(&err);
    assert!(lifecycle.is_fatal());
    drop(lifecycle);

    let kinds = kinds(&mut events);
    assert_eq!(kinds.len(), 3);
    assert!(matches!(kinds[1], EventKind::Fatal(_)));
}

#[rstest]
#[case(Command::GetOutput, true)]
#[case(Command::GetFlowDef, true)]
#[case(Command::GetMtu, true)]
#[case(Command::GetSkipOffset, true)]
#[case(Command::SetSkipOffset(1), false)]
#[case(Command::SetOutput(None), false)]
fn query_commands(#[case] command: Command, #[case] query: bool) {
    assert_eq!(command.is_query(), query);
}

#[test]
fn unknown_commands_are_unhandled() {
    let (handle, log) = CaptureSink::handle();
    let reply = handle.control(Command::GetMtu).expect("no error");
    assert!(reply.is_unhandled());
    assert!(log.lock().commands.is_empty());
}

struct Explosive;

impl Pipe for Explosive {
    fn input(&mut self, _packet: Packet) { panic!("explosive pipe"); }

    fn control(&mut self, _command: Command) -> Result<Reply> { Ok(Reply::Done) }
}

#[test]
fn handle_survives_a_panicking_callback() {
    let handle = PipeHandle::new(Explosive);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| handle.input(Packet::data(vec![1]))));
    assert!(outcome.is_err());
    assert!(matches!(
        handle.control(Command::GetOutput).expect("still usable"),
        Reply::Done
    ));
}
