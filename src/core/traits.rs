// ディスパッチ処理のトレイト定義
// ランナーが呼び出し側から受け取る能力（ハンドラ・設定）の抽象化

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::fmt::Debug;
use std::time::Duration;

/// ランナーの設定を抽象化するトレイト
#[automock]
pub trait DispatchConfig: Send + Sync {
    /// ファンアウト時のワーカー数を取得
    fn worker_count(&self) -> usize;

    /// シングルコンシューマ停止時の最大待機時間を取得
    fn shutdown_timeout(&self) -> Duration;
}

// DispatchConfig for Box<dyn DispatchConfig>
impl DispatchConfig for Box<dyn DispatchConfig> {
    fn worker_count(&self) -> usize {
        self.as_ref().worker_count()
    }

    fn shutdown_timeout(&self) -> Duration {
        self.as_ref().shutdown_timeout()
    }
}

/// ファンアウトランナーのアイテム処理
///
/// `handle_item` はワーカーごとに並行して呼ばれる。失敗（`Err` またはパニック）は
/// 同じアイテムと共に `handle_error` に渡され、ワーカーはそのまま次のアイテムへ進む。
#[async_trait]
pub trait WorkHandler<T>: Send + Sync
where
    T: Send + Sync + Debug + 'static,
{
    /// 1アイテムの処理。`worker_id` は `0..task_count` の安定したID
    async fn handle_item(&self, item: &T, worker_id: usize) -> Result<()>;

    /// 処理失敗時の報告。デフォルトはログ出力のみ
    async fn handle_error(&self, item: T, error: anyhow::Error) {
        tracing::error!(item = ?item, "アイテム処理エラー: {error:#}");
    }
}

// WorkHandler for Box<dyn WorkHandler>
#[async_trait]
impl<T> WorkHandler<T> for Box<dyn WorkHandler<T>>
where
    T: Send + Sync + Debug + 'static,
{
    async fn handle_item(&self, item: &T, worker_id: usize) -> Result<()> {
        self.as_ref().handle_item(item, worker_id).await
    }

    async fn handle_error(&self, item: T, error: anyhow::Error) {
        self.as_ref().handle_error(item, error).await
    }
}

/// シングルコンシューマのアイテム処理
///
/// 呼び出しは常に1つのコンシューマタスクから直列に行われる。
#[async_trait]
pub trait ConsumeHandler<T>: Send + Sync
where
    T: Send + 'static,
{
    /// 1アイテムの処理
    async fn handle_item(&self, item: T) -> Result<()>;

    /// 処理失敗時の報告。アイテムは渡されない
    async fn handle_error(&self, error: anyhow::Error) {
        tracing::error!("コンシューマ処理エラー: {error:#}");
    }
}

// ConsumeHandler for Box<dyn ConsumeHandler>
#[async_trait]
impl<T> ConsumeHandler<T> for Box<dyn ConsumeHandler<T>>
where
    T: Send + 'static,
{
    async fn handle_item(&self, item: T) -> Result<()> {
        self.as_ref().handle_item(item).await
    }

    async fn handle_error(&self, error: anyhow::Error) {
        self.as_ref().handle_error(error).await
    }
}
