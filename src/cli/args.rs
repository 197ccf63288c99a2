use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "worker_dispatch")]
#[command(about = "Demonstrates fan-out and single-consumer work dispatch")]
#[command(version)]
pub struct Cli {
    /// JSON configuration file (worker_count, shutdown_timeout_ms)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Spread a batch of numbered items across concurrent workers
    FanOut {
        /// Number of items to process
        #[arg(short, long, default_value = "100")]
        items: u32,

        /// Number of workers (1-20); defaults to the configured worker count
        #[arg(short, long)]
        workers: Option<usize>,

        /// Fail every Nth item to exercise the error handler
        #[arg(long)]
        fail_every: Option<u32>,

        /// Simulated per-item work in milliseconds
        #[arg(long, default_value = "0")]
        item_delay_ms: u64,

        /// Cancel the run after this many milliseconds
        #[arg(long)]
        cancel_after_ms: Option<u64>,
    },

    /// Post items from several producers to one serial consumer
    FanIn {
        /// Number of concurrent producers
        #[arg(short, long, default_value = "4")]
        producers: usize,

        /// Items posted by each producer
        #[arg(short, long, default_value = "1000")]
        items: usize,

        /// Maximum time to wait for the consumer to drain on shutdown
        #[arg(long)]
        shutdown_timeout_ms: Option<u64>,
    },
}
