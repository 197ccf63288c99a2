// Worker - ファンアウトの並列ワーカー機能

use super::guard::{guarded, guarded_report};
use crate::core::{WorkHandler, WorkerReport};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// 全ワーカーが取り合う共有キュー
pub(crate) type SharedQueue<T> = Arc<Mutex<mpsc::UnboundedReceiver<T>>>;

/// 単一ワーカー
///
/// キューが空になるか、キャンセルを観測するまでアイテムを取り出して処理する。
/// 取り出し済みのアイテムはキャンセル後も最後まで処理される。
pub fn spawn_worker<T, H>(
    worker_id: usize,
    handler: Arc<H>,
    queue: SharedQueue<T>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<WorkerReport>
where
    T: Send + Sync + Debug + 'static,
    H: WorkHandler<T> + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut report = WorkerReport::new(worker_id);
        tracing::debug!(worker_id, "ワーカー開始");

        loop {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            // 次のアイテムを取得（ブロックしない）
            let item = {
                let mut rx = queue.lock().await;
                match rx.try_recv() {
                    Ok(item) => item,
                    Err(_) => break, // キュー終了
                }
            };

            let outcome = guarded(handler.handle_item(&item, worker_id)).await;
            match outcome {
                Ok(()) => report.handled += 1,
                Err(error) => {
                    report.failed += 1;
                    guarded_report(handler.handle_error(item, error), "fan_out").await;
                }
            }

            tokio::task::yield_now().await;
        }

        tracing::debug!(
            worker_id,
            handled = report.handled,
            failed = report.failed,
            cancelled = report.cancelled,
            "ワーカー終了"
        );
        report
    })
}

/// Workers: 並列ワーカープール
pub fn spawn_workers<T, H>(
    handler: Arc<H>,
    queue: SharedQueue<T>,
    cancel: CancellationToken,
    worker_count: usize,
) -> Vec<tokio::task::JoinHandle<WorkerReport>>
where
    T: Send + Sync + Debug + 'static,
    H: WorkHandler<T> + ?Sized + 'static,
{
    (0..worker_count)
        .map(|worker_id| {
            spawn_worker(
                worker_id,
                Arc::clone(&handler),
                Arc::clone(&queue),
                cancel.clone(),
            )
        })
        .collect()
}
