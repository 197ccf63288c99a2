// ランナー間で共有される型定義

use std::time::Duration;

/// 1ワーカー分の処理結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// ハンドラが成功したアイテム数
    pub handled: usize,
    /// エラーハンドラに回したアイテム数
    pub failed: usize,
    /// キャンセルを観測して停止したか
    pub cancelled: bool,
}

impl WorkerReport {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    /// 取り出したアイテムの総数
    pub fn claimed(&self) -> usize {
        self.handled + self.failed
    }
}

/// ファンアウト実行全体のサマリー
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total_items: usize,
    pub handled: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
    pub workers: Vec<WorkerReport>,
}

impl RunSummary {
    /// ワーカーごとの結果を集計
    pub fn from_reports(total_items: usize, workers: Vec<WorkerReport>, elapsed: Duration) -> Self {
        let handled = workers.iter().map(|w| w.handled).sum();
        let failed = workers.iter().map(|w| w.failed).sum();
        let cancelled = workers.iter().any(|w| w.cancelled);

        Self {
            total_items,
            handled,
            failed,
            cancelled,
            elapsed,
            workers,
        }
    }

    /// ハンドラに渡されたアイテム数（成功・失敗の合計）
    pub fn processed(&self) -> usize {
        self.handled + self.failed
    }
}

/// コンシューマの処理統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub handled: usize,
    pub failed: usize,
}

impl ConsumerStats {
    pub fn processed(&self) -> usize {
        self.handled + self.failed
    }
}

/// シングルコンシューマ停止処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// 投入済みアイテムを全て処理して終了した
    Drained(ConsumerStats),
    /// 待機上限を超えたため待たずに戻った（コンシューマは動作を続けている可能性がある）
    TimedOut,
    /// コンシューマタスクが異常終了した
    Aborted,
    /// 既に停止済み
    AlreadyShutDown,
}

impl ShutdownOutcome {
    pub fn stats(&self) -> Option<ConsumerStats> {
        match self {
            Self::Drained(stats) => Some(*stats),
            _ => None,
        }
    }
}
