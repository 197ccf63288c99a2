// Consumer - シングルコンシューマの処理ループ

use super::guard::{guarded, guarded_report};
use crate::core::{ConsumeHandler, ConsumerStats};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// 単一コンシューマを起動
///
/// FIFO 順にアイテムを取り出して直列に処理する。`close` が発火すると受信側を閉じて
/// 新規投入を拒否し、既にキューにあるアイテムを全て処理してから終了する。
/// 全ての送信側が破棄された場合も残りを処理して終了する。
pub fn spawn_consumer<T, H>(
    handler: Arc<H>,
    mut work_rx: mpsc::UnboundedReceiver<T>,
    close: CancellationToken,
) -> tokio::task::JoinHandle<ConsumerStats>
where
    T: Send + 'static,
    H: ConsumeHandler<T> + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut stats = ConsumerStats::default();
        let mut closing = false;
        tracing::debug!("コンシューマ開始");

        loop {
            tokio::select! {
                biased;

                _ = close.cancelled(), if !closing => {
                    // 以降の投入は失敗し、バッファ済みのアイテムは引き続き受信できる
                    work_rx.close();
                    closing = true;
                    tracing::debug!(pending = work_rx.len(), "コンシューマ停止要求を受信");
                }

                next = work_rx.recv() => match next {
                    Some(item) => {
                        let outcome = guarded(handler.handle_item(item)).await;
                        match outcome {
                            Ok(()) => stats.handled += 1,
                            Err(error) => {
                                stats.failed += 1;
                                guarded_report(handler.handle_error(error), "single_consumer").await;
                            }
                        }
                    }
                    None => break, // 閉じられ、かつ空
                },
            }
        }

        tracing::debug!(
            handled = stats.handled,
            failed = stats.failed,
            "コンシューマ終了"
        );
        stats
    })
}
