use crate::core::{DispatchConfig, RunSummary, WorkHandler};
use crate::engine::{CancellationToken, FanOutRunner};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Options for the fan-out command
#[derive(Debug, Clone)]
pub struct FanOutOptions {
    pub items: u32,
    pub workers: Option<usize>,
    pub fail_every: Option<u32>,
    pub item_delay_ms: u64,
    pub cancel_after_ms: Option<u64>,
}

/// Demo handler: sleeps per item and fails every Nth item
pub struct DemoWorkHandler {
    fail_every: Option<u32>,
    delay: Duration,
}

impl DemoWorkHandler {
    pub fn new(fail_every: Option<u32>, delay: Duration) -> Self {
        Self { fail_every, delay }
    }
}

#[async_trait]
impl WorkHandler<u32> for DemoWorkHandler {
    async fn handle_item(&self, item: &u32, worker_id: usize) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(n) = self.fail_every.filter(|n| *n > 0) {
            if (item + 1) % n == 0 {
                anyhow::bail!("item {item} rejected by worker {worker_id}");
            }
        }
        tracing::trace!(item, worker_id, "handled");
        Ok(())
    }
}

/// Execute the fan-out command
pub async fn execute_fan_out<C>(options: FanOutOptions, config: &C) -> Result<RunSummary>
where
    C: DispatchConfig + ?Sized,
{
    let task_count = options.workers.unwrap_or_else(|| config.worker_count());
    let handler = Arc::new(DemoWorkHandler::new(
        options.fail_every,
        Duration::from_millis(options.item_delay_ms),
    ));
    let runner = FanOutRunner::with_handler(0..options.items, task_count, handler)?;

    let cancel = CancellationToken::new();
    if let Some(after) = options.cancel_after_ms {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(after)).await;
            cancel.cancel();
        });
    }

    let summary = runner.start(cancel).await?;

    println!(
        "fan-out: {} items, {} workers -> handled {}, failed {}, skipped {}{} in {:.2?}",
        summary.total_items,
        runner.task_count(),
        summary.handled,
        summary.failed,
        summary.total_items - summary.processed(),
        if summary.cancelled { " (cancelled)" } else { "" },
        summary.elapsed,
    );
    for report in &summary.workers {
        println!(
            "  worker {:>2}: handled {}, failed {}",
            report.worker_id, report.handled, report.failed
        );
    }

    Ok(summary)
}
