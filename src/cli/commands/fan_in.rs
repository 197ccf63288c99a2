use crate::core::{ConsumeHandler, DispatchConfig, DispatchError, ShutdownOutcome};
use crate::engine::SingleConsumer;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Options for the fan-in command
#[derive(Debug, Clone)]
pub struct FanInOptions {
    pub producers: usize,
    pub items: usize,
    pub shutdown_timeout_ms: Option<u64>,
}

/// Demo handler: keeps a running total of everything consumed
#[derive(Default)]
pub struct SummingHandler {
    total: AtomicU64,
}

impl SummingHandler {
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsumeHandler<u64> for SummingHandler {
    async fn handle_item(&self, item: u64) -> Result<()> {
        self.total.fetch_add(item, Ordering::SeqCst);
        Ok(())
    }
}

/// Execute the fan-in command
///
/// Each producer runs on a blocking thread and posts `1..=items`.
pub async fn execute_fan_in<C>(options: FanInOptions, config: &C) -> Result<ShutdownOutcome>
where
    C: DispatchConfig + ?Sized,
{
    let timeout = options
        .shutdown_timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.shutdown_timeout());

    let summer = Arc::new(SummingHandler::default());
    let mut consumer: SingleConsumer<u64> =
        SingleConsumer::with_handler(Arc::clone(&summer), timeout)?;

    let producers: Vec<_> = (0..options.producers)
        .map(|_| {
            let poster = consumer.poster();
            let items = options.items as u64;
            tokio::task::spawn_blocking(move || -> Result<(), DispatchError> {
                for item in 1..=items {
                    poster.post(item)?;
                }
                Ok(())
            })
        })
        .collect();

    let mut post_error = None;
    for producer in producers {
        if let Err(error) = producer.await? {
            post_error.get_or_insert(error);
        }
    }

    // 投入エラーがあっても必ず停止させる
    let outcome = consumer.shutdown().await;
    if let Some(error) = post_error {
        return Err(error.into());
    }

    let per_producer = options.items as u64 * (options.items as u64 + 1) / 2;
    match &outcome {
        ShutdownOutcome::Drained(stats) => println!(
            "fan-in: {} producers x {} items -> consumed {}, total {} (expected {})",
            options.producers,
            options.items,
            stats.handled,
            summer.total(),
            per_producer * options.producers as u64,
        ),
        other => println!("fan-in: shutdown ended with {other:?}"),
    }

    Ok(outcome)
}
