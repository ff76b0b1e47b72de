//! Integration coverage for `flowpipe_testing` helpers.

use flowpipe::{ChunkConfig, Packet, Probe, TransferConfig};
use flowpipe_testing::{CaptureSink, WORKER_THREAD, relocate, segment_all};

#[test]
fn segment_all_reports_lengths_and_tail() {
    let config = ChunkConfig::new(1460, 4).expect("config");
    let (lengths, report) =
        segment_all(config, [vec![0u8; 500], vec![0u8; 500], vec![0u8; 500]]).expect("segment");
    assert_eq!(lengths, vec![1460, 40]);
    assert_eq!(report.emitted, 1);
    assert_eq!(report.dropped, 0);
}

#[test]
fn relocate_runs_the_pipe_on_the_worker() {
    let (sink, log) = CaptureSink::handle();
    let relocated =
        relocate(sink, TransferConfig::default(), Probe::logging("helper")).expect("relocate");
    relocated.proxy.input(Packet::data(vec![1, 2]));
    relocated.finish().expect("worker finished");

    let log = log.lock();
    assert_eq!(log.packets.len(), 1);
    let scheduler = log.scheduler.as_ref().expect("attached");
    assert_eq!(scheduler.thread_name(), WORKER_THREAD);
}
