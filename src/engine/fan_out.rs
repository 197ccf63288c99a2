// FanOutRunner - 固定アイテム集合を複数ワーカーに分散処理

use super::worker::{spawn_workers, SharedQueue};
use crate::core::{
    DispatchConfig, DispatchError, DispatchResult, RunSummary, WorkHandler, MAX_TASK_COUNT,
    MIN_TASK_COUNT,
};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// ファンアウトランナー
///
/// 構築時に全アイテムを共有キューへ積み、`start` で `task_count` 個のワーカーを起動する。
/// ワーカーは事前分割ではなく同じキューから取り合うため、重いアイテムがあっても
/// 他のワーカーが遊ぶことはない。
///
/// キューは一度きりで、再投入はできない。処理済みのランナーを再度 `start` しても
/// 何も処理せずに完了する。
pub struct FanOutRunner<T, H: ?Sized> {
    queue: SharedQueue<T>,
    total_items: usize,
    task_count: usize,
    handler: Arc<H>,
}

impl<T, H> FanOutRunner<T, H>
where
    T: Send + Sync + Debug + 'static,
    H: WorkHandler<T> + ?Sized + 'static,
{
    /// 新しいランナーを作成
    ///
    /// `items` が空の場合は `EmptyInput`、`task_count` が `1..=20` の範囲外なら
    /// `OutOfRange` を返す。
    pub fn new<I>(items: I, task_count: usize, handler: H) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = T>,
        H: Sized,
    {
        Self::with_handler(items, task_count, Arc::new(handler))
    }

    /// 共有済みのハンドラ（`Arc<dyn WorkHandler<T>>` を含む）でランナーを作成
    pub fn with_handler<I>(items: I, task_count: usize, handler: Arc<H>) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        if items.is_empty() {
            return Err(DispatchError::EmptyInput);
        }

        if !(MIN_TASK_COUNT..=MAX_TASK_COUNT).contains(&task_count) {
            return Err(DispatchError::task_count_out_of_range(task_count));
        }

        // ワーカー起動前に全アイテムを積み、送信側は閉じる
        let total_items = items.len();
        let (tx, rx) = mpsc::unbounded_channel();
        for item in items {
            tx.send(item).map_err(|_| {
                DispatchError::internal(anyhow::anyhow!("キューへの投入に失敗しました"))
            })?;
        }
        drop(tx);

        Ok(Self {
            queue: Arc::new(Mutex::new(rx)),
            total_items,
            task_count,
            handler,
        })
    }

    /// 設定からワーカー数を決めてランナーを作成
    pub fn from_config<I, C>(items: I, config: &C, handler: Arc<H>) -> DispatchResult<Self>
    where
        I: IntoIterator<Item = T>,
        C: DispatchConfig + ?Sized,
    {
        Self::with_handler(items, config.worker_count(), handler)
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    /// まだ誰にも取り出されていないアイテム数
    pub async fn remaining(&self) -> usize {
        self.queue.lock().await.len()
    }

    /// 外部キャンセルなしで最後まで処理
    pub async fn run(&self) -> DispatchResult<RunSummary> {
        self.start(CancellationToken::new()).await
    }

    /// ワーカーを起動し、全ワーカーが停止するまで待つ
    ///
    /// キャンセルは新しいアイテムの取り出しだけを止め、実行中のハンドラは中断しない。
    /// ハンドラの失敗は `handle_error` に渡されるだけで、ここには伝播しない。
    pub async fn start(&self, cancel: CancellationToken) -> DispatchResult<RunSummary> {
        let start_time = Instant::now();
        tracing::info!(
            total_items = self.total_items,
            task_count = self.task_count,
            "ファンアウト開始"
        );

        let handles = spawn_workers(
            Arc::clone(&self.handler),
            Arc::clone(&self.queue),
            cancel,
            self.task_count,
        );

        // 失敗したワーカーがあっても残り全員の停止を待つ
        let mut reports = Vec::with_capacity(handles.len());
        let mut join_error = None;
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(error) => {
                    tracing::error!("ワーカーの回収に失敗しました: {error}");
                    join_error.get_or_insert(error);
                }
            }
        }

        if let Some(error) = join_error {
            return Err(DispatchError::task(error));
        }

        let summary = RunSummary::from_reports(self.total_items, reports, start_time.elapsed());
        tracing::info!(
            handled = summary.handled,
            failed = summary.failed,
            cancelled = summary.cancelled,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "ファンアウト完了"
        );
        Ok(summary)
    }
}
