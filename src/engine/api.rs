// 高レベル公開API
// ランナーの構築と実行を1回の呼び出しで済ませるための便利な関数

use super::{with_single_consumer, FanOutRunner};
use crate::{
    core::{ConsumeHandler, DispatchConfig, DispatchResult, RunSummary, ShutdownOutcome, WorkHandler},
    services::DefaultDispatchConfig,
};
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

/// アイテムを `task_count` 個のワーカーで最後まで処理
pub async fn fan_out<T, H, I>(items: I, task_count: usize, handler: H) -> DispatchResult<RunSummary>
where
    T: Send + Sync + Debug + 'static,
    H: WorkHandler<T> + 'static,
    I: IntoIterator<Item = T>,
{
    FanOutRunner::new(items, task_count, handler)?.run().await
}

/// キャンセル可能なファンアウト
pub async fn fan_out_with_cancel<T, H, I>(
    items: I,
    task_count: usize,
    handler: H,
    cancel: CancellationToken,
) -> DispatchResult<RunSummary>
where
    T: Send + Sync + Debug + 'static,
    H: WorkHandler<T> + 'static,
    I: IntoIterator<Item = T>,
{
    FanOutRunner::new(items, task_count, handler)?.start(cancel).await
}

/// アイテム列を1つのコンシューマに直列で処理させ、停止まで待つ
///
/// 待機上限はデフォルト設定（10秒）を使用。
pub async fn consume_all<T, H, I>(items: I, handler: H) -> DispatchResult<ShutdownOutcome>
where
    T: Send + 'static,
    H: ConsumeHandler<T> + 'static,
    I: IntoIterator<Item = T>,
{
    consume_all_with_config(items, handler, &DefaultDispatchConfig::default()).await
}

/// 設定付きの `consume_all`
pub async fn consume_all_with_config<T, H, I, C>(
    items: I,
    handler: H,
    config: &C,
) -> DispatchResult<ShutdownOutcome>
where
    T: Send + 'static,
    H: ConsumeHandler<T> + 'static,
    I: IntoIterator<Item = T>,
    C: DispatchConfig + ?Sized,
{
    let (posted, outcome) = with_single_consumer(handler, config, |poster| async move {
        for item in items {
            poster.post(item)?;
        }
        DispatchResult::Ok(())
    })
    .await?;
    posted?;
    Ok(outcome)
}
