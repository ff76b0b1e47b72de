//! Tests for the flow definition handshake.

use rstest::{fixture, rstest};

use super::{FlowError, FlowOutput};
use crate::{
    packet::Packet,
    probe::{EventKind, Probe},
    test_helpers::{CaptureSink, Captured},
};

#[fixture]
fn wired() -> (FlowOutput, Captured) {
    let (sink, log) = CaptureSink::handle();
    let mut flow = FlowOutput::new();
    flow.set_output(Some(sink));
    (flow, log)
}

fn kinds(log: &Captured) -> Vec<&'static str> {
    log.packets()
        .iter()
        .map(|packet| {
            if packet.is_flow_def() {
                "def"
            } else if packet.has_buffer() {
                "data"
            } else {
                "control"
            }
        })
        .collect()
}

#[rstest]
fn definition_precedes_first_data_only(wired: (FlowOutput, Captured)) {
    let (mut flow, log) = wired;
    flow.store_flow_def(Packet::flow_def("block."));
    assert!(log.is_empty(), "definition is deferred");

    flow.forward(Packet::data(vec![1, 2])).expect("forward data");
    flow.forward(Packet::data(vec![3])).expect("forward data");
    assert_eq!(kinds(&log), vec!["def", "data", "data"]);
    assert!(flow.is_sent());
}

#[rstest]
fn data_without_definition_is_dropped(wired: (FlowOutput, Captured)) {
    let (mut flow, log) = wired;
    let err = flow
        .forward(Packet::data(vec![1]))
        .expect_err("no definition stored");
    assert_eq!(err, FlowError::FlowDefMissing);
    assert!(log.is_empty());

    flow.store_flow_def(Packet::flow_def("block."));
    flow.forward(Packet::data(vec![2])).expect("pipe remains usable");
    assert_eq!(kinds(&log), vec!["def", "data"]);
}

#[rstest]
fn changing_definition_renegotiates(wired: (FlowOutput, Captured)) {
    let (mut flow, log) = wired;
    flow.store_flow_def(Packet::flow_def("block.a."));
    flow.forward(Packet::data(vec![1])).expect("forward");
    flow.store_flow_def(Packet::flow_def("block.a."));
    flow.forward(Packet::data(vec![2])).expect("forward");
    assert!(flow.is_sent(), "identical definition is not re-announced");

    flow.store_flow_def(Packet::flow_def("block.b."));
    assert!(!flow.is_sent());
    flow.forward(Packet::data(vec![3])).expect("forward");

    let defs: Vec<String> = log
        .packets()
        .iter()
        .filter_map(|packet| packet.attributes().flow_def().map(str::to_owned))
        .collect();
    assert_eq!(defs, vec!["block.a.", "block.b."]);
    assert_eq!(kinds(&log), vec!["def", "data", "data", "def", "data"]);
}

#[rstest]
fn flow_def_packets_are_stored_not_forwarded(wired: (FlowOutput, Captured)) {
    let (mut flow, log) = wired;
    flow.forward(Packet::flow_def("block."))
        .expect("store definition");
    assert!(log.is_empty());
    assert!(flow.flow_def().is_some());
}

#[rstest]
fn control_packets_bypass_the_handshake(wired: (FlowOutput, Captured)) {
    let (mut flow, log) = wired;
    flow.forward(Packet::end_of_stream())
        .expect("control needs no definition");
    assert_eq!(kinds(&log), vec!["control"]);
}

#[test]
fn new_output_receives_the_definition_again() {
    let (first, first_log) = CaptureSink::handle();
    let (second, second_log) = CaptureSink::handle();
    let mut flow = FlowOutput::new();
    flow.store_flow_def(Packet::flow_def("block."));

    flow.set_output(Some(first));
    flow.forward(Packet::data(vec![1])).expect("forward");
    flow.set_output(Some(second));
    flow.forward(Packet::data(vec![2])).expect("forward");

    assert_eq!(kinds(&first_log), vec!["def", "data"]);
    assert_eq!(kinds(&second_log), vec!["def", "data"]);
}

#[test]
fn emit_reports_refusals_through_the_probe() {
    let (probe, mut events) = Probe::channel("flow");
    let mut flow = FlowOutput::new();

    flow.emit(Packet::end_of_stream(), &probe);
    flow.emit(Packet::data(vec![1]), &probe);

    let first = events.try_recv().expect("need output event");
    assert_eq!(first.kind, EventKind::NeedOutput);
    let second = events.try_recv().expect("missing definition event");
    assert_eq!(second.kind, EventKind::FlowDefMissing);
}
