//! Tests for the re-chunking stage.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::ChunkStream;
use crate::{
    buffer::BudgetAllocator,
    packet::Packet,
    pipe::{Command, Pipe, PipeError, PipeHandle, Reply},
    probe::{EventKind, Probe, ProbeReceiver},
    segment::ChunkConfig,
    test_helpers::{CaptureSink, Captured},
};

struct Harness {
    stage: ChunkStream,
    log: Captured,
    events: ProbeReceiver,
}

impl Harness {
    fn kinds(&mut self) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            kinds.push(event.kind);
        }
        kinds
    }
}

fn wire(mut stage: ChunkStream, events: ProbeReceiver) -> Harness {
    let (sink, log) = CaptureSink::handle();
    stage
        .control(Command::SetOutput(Some(sink)))
        .expect("set output");
    Harness { stage, log, events }
}

#[fixture]
fn harness() -> Harness {
    let (probe, events) = Probe::channel("chunk");
    wire(ChunkStream::new(probe, Some(Packet::flow_def("block."))), events)
}

#[rstest]
fn default_mtu_chunks_then_flushes_on_end_of_stream(mut harness: Harness) {
    for _ in 0..3 {
        harness.stage.input(Packet::data(vec![0u8; 500]));
    }
    assert_eq!(harness.log.data_lengths(), vec![1460]);
    assert_eq!(harness.stage.pending_len(), 40);

    harness.stage.input(Packet::end_of_stream());
    assert_eq!(harness.log.data_lengths(), vec![1460, 40]);

    let packets = harness.log.packets();
    assert!(packets[0].is_flow_def(), "definition precedes the first chunk");
    assert!(packets.last().is_some_and(Packet::is_end_of_stream));
}

#[rstest]
fn small_mtu_drops_sub_alignment_tail(mut harness: Harness) {
    let reply = harness
        .stage
        .control(Command::SetMtu { mtu: 10, align: 4 })
        .expect("valid mtu");
    assert!(matches!(reply, Reply::Done));

    harness.stage.input(Packet::data(vec![7u8; 9]));
    assert_eq!(harness.log.data_lengths(), vec![8]);
    harness.stage.input(Packet::end_of_stream());
    assert_eq!(harness.log.data_lengths(), vec![8]);
    assert_eq!(harness.stage.pending_len(), 0);
}

#[rstest]
#[case(0, 4)]
#[case(10, 0)]
#[case(4, 4)]
#[case(4, 8)]
fn invalid_mtu_keeps_previous_settings(mut harness: Harness, #[case] mtu: u32, #[case] align: u32) {
    let err = harness
        .stage
        .control(Command::SetMtu { mtu, align })
        .expect_err("invalid pair");
    assert!(matches!(err, PipeError::Config(_)));

    let reply = harness.stage.control(Command::GetMtu).expect("get mtu");
    assert!(matches!(reply, Reply::Mtu { mtu: 1460, align: 4 }));
}

#[rstest]
fn incompatible_flow_def_is_reported(mut harness: Harness) {
    harness.stage.input(Packet::flow_def("pic."));
    assert!(
        harness
            .kinds()
            .iter()
            .any(|kind| matches!(kind, EventKind::FlowDefError(_)))
    );

    let err = harness
        .stage
        .control(Command::SetFlowDef(Packet::flow_def("sound.")))
        .expect_err("rejected");
    assert!(matches!(err, PipeError::FlowDefIncompatible { .. }));

    let Reply::FlowDef(Some(def)) = harness.stage.control(Command::GetFlowDef).expect("query")
    else {
        panic!("flow definition should be kept");
    };
    assert_eq!(def.attributes().flow_def(), Some("block."));
}

#[test]
fn data_without_flow_def_is_dropped_and_signalled() {
    let (probe, events) = Probe::channel("chunk");
    let mut harness = wire(ChunkStream::new(probe, None), events);
    harness.stage.input(Packet::data(vec![0u8; 1460]));

    assert!(harness.log.is_empty());
    assert!(harness.kinds().contains(&EventKind::FlowDefMissing));
}

#[test]
fn teardown_flushes_pending_bytes() {
    let (probe, events) = Probe::channel("chunk");
    let harness = wire(ChunkStream::new(probe, Some(Packet::flow_def("block."))), events);
    let Harness {
        mut stage,
        log,
        mut events,
    } = harness;
    stage.input(Packet::data(vec![1u8; 10]));
    assert!(log.data_lengths().is_empty());
    drop(stage);

    assert_eq!(log.data_lengths(), vec![8]);
    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event.kind);
    }
    assert_eq!(last, Some(EventKind::Dead));
}

#[test]
fn allocator_exhaustion_is_fatal_and_sticky() {
    let (probe, events) = Probe::channel("chunk");
    let config = ChunkConfig::new(10, 4).expect("config");
    let stage = ChunkStream::with_allocator(
        probe,
        Some(Packet::flow_def("block.")),
        config,
        Arc::new(BudgetAllocator::new(0)),
    );
    let mut harness = wire(stage, events);

    // A single 12-byte fragment must be split to yield an 8-byte chunk.
    harness.stage.input(Packet::data(vec![0u8; 12]));
    harness.stage.input(Packet::data(vec![0u8; 8]));

    assert!(harness.log.data_lengths().is_empty());
    let fatal = harness
        .kinds()
        .into_iter()
        .filter(|kind| matches!(kind, EventKind::Fatal(_)))
        .count();
    assert_eq!(fatal, 1);
}

#[test]
fn stage_runs_behind_a_handle() {
    let (sink, log) = CaptureSink::handle();
    let stage = PipeHandle::new(ChunkStream::new(
        Probe::logging("chunk"),
        Some(Packet::flow_def("block.")),
    ));
    stage
        .control(Command::SetOutput(Some(sink.clone())))
        .expect("set output");
    let Reply::Output(Some(output)) = stage.control(Command::GetOutput).expect("query") else {
        panic!("output should be set");
    };
    assert!(output.ptr_eq(&sink));

    stage.input(Packet::data(vec![0u8; 2920]));
    assert_eq!(log.data_lengths(), vec![1460, 1460]);
}
