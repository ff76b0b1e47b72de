//! Demo binary driving a `flowpipe` pipeline.
//!
//! Reads a file in fragments, re-chunks it with [`ChunkStream`] and hands the
//! chunks to a [`NullSink`] relocated onto a worker thread.

mod cli;

use std::{error::Error, fs::File, io::Read, sync::Arc};

use bytes::Bytes;
use clap::Parser;
use flowpipe::{
    BLOCK_FLOW,
    ChunkStream,
    Command,
    Packet,
    PipeHandle,
    PipelineConfig,
    Probe,
    TransferManager,
    WorkerSink,
    buffer::HeapAllocator,
    stages::NullSink,
    transfer::BackpressurePolicy,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    // Applications embedding the library install their own subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = cli::Cli::parse();
    let policy = match cli.policy {
        cli::Policy::Block => BackpressurePolicy::Block,
        cli::Policy::Drop => BackpressurePolicy::DropAndReport,
    };
    let config = PipelineConfig::default()
        .with_mtu(cli.mtu, cli.align)?
        .with_queue_capacity(cli.queue)?
        .with_read_size(cli.read_size)?
        .with_policy(policy);

    #[cfg(feature = "metrics")]
    if let Some(addr) = cli.metrics_listen {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!(%addr, "serving metrics");
    }

    let (manager, worker) = TransferManager::new(config.directive_capacity())?;
    let worker = worker.spawn_thread("flowpipe-worker")?;

    let (sink, stats) = NullSink::new(Probe::logging("sink"));
    let proxy = WorkerSink::new(
        &manager,
        PipeHandle::new(sink),
        config.transfer(),
        Probe::logging("worker"),
    )?;
    let chunker = PipeHandle::new(ChunkStream::with_allocator(
        Probe::logging("chunk"),
        Some(Packet::flow_def(BLOCK_FLOW)),
        config.chunk(),
        Arc::new(HeapAllocator),
    ));
    chunker.control(Command::SetOutput(Some(PipeHandle::new(proxy))))?;

    let mut input = File::open(&cli.input)?;
    let mut fragment = vec![0u8; config.read_size()];
    let mut read_total = 0usize;
    loop {
        let n = input.read(&mut fragment)?;
        if n == 0 {
            break;
        }
        read_total += n;
        chunker.input(Packet::data(Bytes::copy_from_slice(&fragment[..n])));
    }
    chunker.input(Packet::end_of_stream());

    drop(chunker);
    drop(manager);
    worker
        .join()
        .map_err(|_| "worker thread panicked")?;

    info!(
        read = read_total,
        chunks = stats.packets(),
        delivered = stats.bytes(),
        "pipeline finished"
    );
    println!(
        "read {read_total} bytes, delivered {} chunks ({} bytes)",
        stats.packets(),
        stats.bytes()
    );
    Ok(())
}
