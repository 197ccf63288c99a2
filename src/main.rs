use anyhow::Result;
use clap::Parser;

use worker_dispatch::{
    cli::{execute_fan_in, execute_fan_out, Cli, Commands, FanInOptions, FanOutOptions},
    core::ShutdownOutcome,
    services::{init_tracing, DefaultDispatchConfig},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 1. 設定読み込み
    let config = match &cli.config {
        Some(path) => DefaultDispatchConfig::load_from_path(path)?,
        None => DefaultDispatchConfig::default(),
    };
    tracing::debug!(?config, "設定");

    // 2. コマンド実行
    match cli.command {
        Commands::FanOut {
            items,
            workers,
            fail_every,
            item_delay_ms,
            cancel_after_ms,
        } => {
            let options = FanOutOptions {
                items,
                workers,
                fail_every,
                item_delay_ms,
                cancel_after_ms,
            };
            execute_fan_out(options, &config).await?;
        }
        Commands::FanIn {
            producers,
            items,
            shutdown_timeout_ms,
        } => {
            let options = FanInOptions {
                producers,
                items,
                shutdown_timeout_ms,
            };
            if let ShutdownOutcome::TimedOut = execute_fan_in(options, &config).await? {
                eprintln!("⚠️  consumer did not drain before the shutdown timeout");
                std::process::exit(2);
            }
        }
    }

    Ok(())
}
