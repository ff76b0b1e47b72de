//! Unit tests for chunk configuration and the segmenter.

use std::sync::Arc;

use bytes::Bytes;
use rstest::{fixture, rstest};

use super::{ChunkConfig, ChunkConfigError, FlushReport, SegmentError, Segmenter};
use crate::{
    buffer::{AllocError, BudgetAllocator, Buffer},
    packet::Packet,
};

fn fragment(len: usize, seed: u8) -> Packet {
    let payload: Vec<u8> = (0..len).map(|i| seed.wrapping_add(i as u8)).collect();
    Packet::data(payload)
}

fn lengths(packets: &[Packet]) -> Vec<usize> { packets.iter().map(Packet::payload_len).collect() }

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
fn segmenter() -> Segmenter { Segmenter::new(ChunkConfig::default()) }

#[rstest]
#[case::zero_mtu(0, 4)]
#[case::zero_align(1460, 0)]
#[case::align_equals_mtu(8, 8)]
#[case::align_exceeds_mtu(4, 8)]
fn invalid_config_is_rejected(#[case] mtu: u32, #[case] align: u32) {
    assert_eq!(
        ChunkConfig::new(mtu, align),
        Err(ChunkConfigError::Invalid { mtu, align })
    );
}

#[rstest]
#[case(1460, 4, 1460)]
#[case(10, 4, 8)]
#[case(1500, 188, 1316)]
#[case(2, 1, 2)]
fn chunk_size_is_largest_aligned_multiple(
    #[case] mtu: u32,
    #[case] align: u32,
    #[case] expected: u32,
) {
    let config = ChunkConfig::new(mtu, align).expect("valid config");
    assert_eq!(config.chunk_size(), expected);
    assert_eq!(config.chunk_size() % align, 0);
}

#[rstest]
fn failed_configure_keeps_previous_settings(mut segmenter: Segmenter) {
    segmenter.configure(10, 4).expect("valid config");
    let err = segmenter.configure(4, 4).expect_err("align == mtu");
    assert_eq!(err, ChunkConfigError::Invalid { mtu: 4, align: 4 });
    assert_eq!(segmenter.config().mtu(), 10);
    assert_eq!(segmenter.chunk_size(), 8);
}

#[rstest]
fn three_fragments_fill_one_mtu_chunk(mut segmenter: Segmenter) {
    let mut out = Vec::new();
    for seed in 0..3 {
        segmenter
            .accept(fragment(500, seed), &mut out)
            .expect("accept fragment");
    }
    assert_eq!(lengths(&out), vec![1460]);
    assert_eq!(segmenter.pending_len(), 40);

    let mut tail = Vec::new();
    let report = segmenter.flush(&mut tail).expect("flush");
    assert_eq!(lengths(&tail), vec![40]);
    assert_eq!(
        report,
        FlushReport {
            emitted: 1,
            dropped: 0,
        }
    );
    assert_eq!(segmenter.pending_len(), 0);
}

#[test]
fn flush_drops_sub_alignment_tail() {
    let mut segmenter = Segmenter::new(ChunkConfig::new(10, 4).expect("valid config"));
    let mut out = Vec::new();
    segmenter.accept(fragment(9, 0), &mut out).expect("accept");
    assert_eq!(lengths(&out), vec![8]);
    assert_eq!(segmenter.pending_len(), 1);

    let mut tail = Vec::new();
    let report = segmenter.flush(&mut tail).expect("flush");
    assert!(tail.is_empty());
    assert_eq!(report.dropped, 1);
    assert_eq!(segmenter.pending_len(), 0);
    assert_eq!(segmenter.pending_fragments(), 0);
}

#[test]
fn flush_rounds_remainder_down_to_alignment() {
    let mut segmenter = Segmenter::new(ChunkConfig::new(16, 4).expect("valid config"));
    let mut out = Vec::new();
    segmenter.accept(fragment(7, 0), &mut out).expect("accept");
    segmenter.accept(fragment(7, 7), &mut out).expect("accept");
    assert!(out.is_empty());

    segmenter.flush(&mut out).expect("flush");
    assert_eq!(lengths(&out), vec![12]);
    let expected: Vec<u8> = (0..12).collect();
    assert_eq!(out[0].buffer().expect("payload").to_vec(), expected);
}

#[rstest]
fn control_packets_bypass_accumulation(mut segmenter: Segmenter) {
    let mut out = Vec::new();
    segmenter.accept(fragment(100, 0), &mut out).expect("accept");
    segmenter
        .accept(Packet::end_of_stream(), &mut out)
        .expect("accept control");
    assert_eq!(out.len(), 1);
    assert!(out[0].is_end_of_stream());
    assert_eq!(segmenter.pending_len(), 100);
}

#[test]
fn chunks_do_not_inherit_source_attributes() {
    let mut segmenter = Segmenter::new(ChunkConfig::new(8, 2).expect("valid config"));
    let mut source = fragment(8, 0);
    source.attributes_mut().set_flow_def("block.");
    let mut out = Vec::new();
    segmenter.accept(source, &mut out).expect("accept");
    assert_eq!(out.len(), 1);
    assert!(out[0].attributes().is_empty());
}

#[test]
fn large_fragment_yields_several_chunks_without_copying() {
    let mut segmenter = Segmenter::new(ChunkConfig::new(10, 4).expect("valid config"));
    let storage = Bytes::from(vec![9_u8; 30]);
    let base = storage.as_ptr();
    let mut out = Vec::new();
    segmenter
        .accept(Packet::data(Buffer::from(storage)), &mut out)
        .expect("accept");

    assert_eq!(lengths(&out), vec![8, 8, 8]);
    for (index, chunk) in out.iter().enumerate() {
        let segment = chunk
            .buffer()
            .and_then(|buffer| buffer.segments().next())
            .expect("chunk segment");
        assert_eq!(segment.as_ptr(), base.wrapping_add(index * 8));
    }
    assert_eq!(segmenter.pending_len(), 6);
}

#[test]
fn allocator_exhaustion_is_reported_and_clears_pending() {
    let allocator = Arc::new(BudgetAllocator::new(4));
    let mut segmenter =
        Segmenter::with_allocator(ChunkConfig::new(10, 2).expect("valid config"), allocator);
    let mut out = Vec::new();

    let err = segmenter
        .accept(fragment(25, 0), &mut out)
        .expect_err("split exceeds budget");
    assert_eq!(
        err,
        SegmentError::Extract {
            size: 10,
            source: AllocError::Exhausted { requested: 10 },
        }
    );
    assert!(out.is_empty());
    assert_eq!(segmenter.pending_len(), 0);
}

#[test]
fn reconfigure_applies_to_pending_bytes() {
    let mut segmenter = Segmenter::new(ChunkConfig::new(100, 4).expect("valid config"));
    let mut out = Vec::new();
    segmenter.accept(fragment(30, 0), &mut out).expect("accept");
    assert!(out.is_empty());

    segmenter.configure(12, 4).expect("valid config");
    segmenter.accept(fragment(0, 0), &mut out).expect("accept empty");
    assert_eq!(lengths(&out), vec![12, 12]);
    assert_eq!(segmenter.pending_len(), 6);
}
