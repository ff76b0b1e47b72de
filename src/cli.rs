//! Command line interface for the `flowpipe` demo binary.
//!
//! The binary reads a file in fixed-size fragments, re-chunks it and hands
//! the chunks to a sink running on a worker thread.

use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, ValueEnum};

/// Behaviour when the worker's queue is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Wait for the worker to catch up.
    #[default]
    Block,
    /// Drop the chunk and report backpressure.
    Drop,
}

/// Command line arguments for the `flowpipe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "flowpipe",
    version,
    about = "Re-chunk a file into aligned packets and deliver them on a worker thread"
)]
pub struct Cli {
    /// File to read.
    pub input: PathBuf,

    /// Maximum chunk size in bytes.
    #[arg(long, default_value_t = 1460)]
    pub mtu: u32,

    /// Chunk alignment in bytes.
    #[arg(long, default_value_t = 4)]
    pub align: u32,

    /// Capacity of the queue feeding the worker.
    #[arg(short, long, default_value_t = 1024)]
    pub queue: usize,

    /// Size of the fragments read from the input.
    #[arg(long, default_value_t = 500)]
    pub read_size: usize,

    /// Full-queue policy.
    #[arg(long, value_enum, default_value_t)]
    pub policy: Policy,

    /// Serve Prometheus metrics on this address while running.
    #[arg(long)]
    pub metrics_listen: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Policy};

    #[test]
    fn defaults_match_the_library() {
        let cli = Cli::parse_from(["flowpipe", "in.bin"]);
        assert_eq!((cli.mtu, cli.align, cli.queue), (1460, 4, 1024));
        assert_eq!(cli.policy, Policy::Block);
        assert!(cli.metrics_listen.is_none());
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from([
            "flowpipe",
            "in.bin",
            "--mtu",
            "188",
            "--align",
            "2",
            "-q",
            "8",
            "--policy",
            "drop",
        ]);
        assert_eq!(cli.mtu, 188);
        assert_eq!(cli.align, 2);
        assert_eq!(cli.queue, 8);
        assert_eq!(cli.policy, Policy::Drop);
    }
}
