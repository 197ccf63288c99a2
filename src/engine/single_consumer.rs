// SingleConsumer - 複数プロデューサから単一コンシューマへの直列化

use super::consumer::spawn_consumer;
use crate::core::{
    ConsumeHandler, ConsumerStats, DispatchConfig, DispatchError, DispatchResult, ShutdownOutcome,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// 停止時の待機上限のデフォルト値
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// プロデューサ用の投入ハンドル
///
/// 複製して任意のタスク・スレッドから同時に `post` できる。
pub struct Poster<T> {
    work_tx: mpsc::UnboundedSender<T>,
    close: CancellationToken,
}

impl<T> Clone for Poster<T> {
    fn clone(&self) -> Self {
        Self {
            work_tx: self.work_tx.clone(),
            close: self.close.clone(),
        }
    }
}

impl<T> Poster<T> {
    /// アイテムをキューに投入
    ///
    /// 停止処理の開始後に呼ぶと `DispatchError::Closed` を返し、アイテムは破棄される。
    /// 停止と競合した投入は、受理されれば必ず処理され、拒否されればエラーになる。
    pub fn post(&self, item: T) -> DispatchResult<()> {
        if self.close.is_cancelled() {
            return Err(DispatchError::Closed);
        }
        self.work_tx.send(item).map_err(|_| DispatchError::Closed)
    }

    /// 停止処理が始まっているか
    pub fn is_closed(&self) -> bool {
        self.close.is_cancelled() || self.work_tx.is_closed()
    }
}

/// シングルコンシューマランナー
///
/// 構築と同時にコンシューマタスクを1つ起動する。ハンドラが同時に2つ以上実行されることはない。
/// 必ず `shutdown` を呼ぶか `with_single_consumer` のスコープ内で使うこと。
/// `Drop` は停止を要求するだけで、処理完了は待たない。
pub struct SingleConsumer<T> {
    poster: Poster<T>,
    consumer_handle: Option<tokio::task::JoinHandle<ConsumerStats>>,
    shutdown_timeout: Duration,
}

impl<T> SingleConsumer<T>
where
    T: Send + 'static,
{
    /// デフォルトの待機上限でコンシューマを起動
    ///
    /// tokio ランタイム外で呼ぶと `Configuration` エラーを返す。
    pub fn new<H>(handler: H) -> DispatchResult<Self>
    where
        H: ConsumeHandler<T> + 'static,
    {
        Self::with_handler(Arc::new(handler), DEFAULT_SHUTDOWN_TIMEOUT)
    }

    /// 設定の待機上限でコンシューマを起動
    pub fn with_config<H, C>(handler: H, config: &C) -> DispatchResult<Self>
    where
        H: ConsumeHandler<T> + 'static,
        C: DispatchConfig + ?Sized,
    {
        Self::with_handler(Arc::new(handler), config.shutdown_timeout())
    }

    /// 共有済みのハンドラでコンシューマを起動
    pub fn with_handler<H>(handler: Arc<H>, shutdown_timeout: Duration) -> DispatchResult<Self>
    where
        H: ConsumeHandler<T> + ?Sized + 'static,
    {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(DispatchError::configuration(
                "SingleConsumer は tokio ランタイム内で作成する必要があります",
            ));
        }

        let (work_tx, work_rx) = mpsc::unbounded_channel();
        let close = CancellationToken::new();
        let consumer_handle = spawn_consumer(handler, work_rx, close.clone());

        Ok(Self {
            poster: Poster { work_tx, close },
            consumer_handle: Some(consumer_handle),
            shutdown_timeout,
        })
    }

    /// アイテムをキューに投入（`Poster::post` と同じ契約）
    pub fn post(&self, item: T) -> DispatchResult<()> {
        self.poster.post(item)
    }

    /// プロデューサ用ハンドルを取得
    pub fn poster(&self) -> Poster<T> {
        self.poster.clone()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// 停止済み（`shutdown` 呼び出し済み）か
    pub fn is_shut_down(&self) -> bool {
        self.consumer_handle.is_none()
    }

    /// 新規投入を止め、投入済みアイテムの処理完了を待つ
    ///
    /// 何度呼んでもよい。2回目以降は待たずに `AlreadyShutDown` を返す。
    /// 待機上限を超えた場合は `TimedOut` を返し、コンシューマはそのまま残りを処理し続ける。
    pub async fn shutdown(&mut self) -> ShutdownOutcome {
        let Some(handle) = self.consumer_handle.take() else {
            return ShutdownOutcome::AlreadyShutDown;
        };

        self.poster.close.cancel();

        match tokio::time::timeout(self.shutdown_timeout, handle).await {
            Ok(Ok(stats)) => ShutdownOutcome::Drained(stats),
            Ok(Err(error)) => {
                tracing::error!("コンシューマが異常終了しました: {error}");
                ShutdownOutcome::Aborted
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.shutdown_timeout.as_millis() as u64,
                    "コンシューマの停止待ちがタイムアウトしました"
                );
                ShutdownOutcome::TimedOut
            }
        }
    }
}

impl<T> Drop for SingleConsumer<T> {
    fn drop(&mut self) {
        if self.consumer_handle.is_some() {
            tracing::debug!("shutdown 前に破棄されたため停止のみ要求します");
            self.poster.close.cancel();
        }
    }
}

/// スコープ付きでシングルコンシューマを使う
///
/// `scope` の完了後に必ず `shutdown` を実行し、スコープの戻り値と停止結果を返す。
pub async fn with_single_consumer<T, H, C, F, Fut, R>(
    handler: H,
    config: &C,
    scope: F,
) -> DispatchResult<(R, ShutdownOutcome)>
where
    T: Send + 'static,
    H: ConsumeHandler<T> + 'static,
    C: DispatchConfig + ?Sized,
    F: FnOnce(Poster<T>) -> Fut,
    Fut: Future<Output = R>,
{
    let mut consumer = SingleConsumer::with_config(handler, config)?;
    let result = scope(consumer.poster()).await;
    let outcome = consumer.shutdown().await;
    Ok((result, outcome))
}
