// Custom error types for work dispatch
// ランナー構築・投入・停止で発生するエラー型定義

use thiserror::Error;

/// ワーカー数の下限
pub const MIN_TASK_COUNT: usize = 1;

/// ワーカー数の上限
pub const MAX_TASK_COUNT: usize = 20;

/// ディスパッチ処理固有のエラー型
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("入力エラー: 処理対象のアイテムが空です")]
    EmptyInput,

    #[error("範囲外エラー: {field} = {value} (有効範囲: {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },

    #[error("投入エラー: コンシューマは既に停止処理に入っています")]
    Closed,

    #[error("設定エラー: {message}")]
    Configuration { message: String },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("内部エラー: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// ワーカー数の範囲外エラーの作成
    pub fn task_count_out_of_range(value: usize) -> Self {
        Self::OutOfRange {
            field: "task_count",
            value,
            min: MIN_TASK_COUNT,
            max: MAX_TASK_COUNT,
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    /// 内部エラーの作成
    pub fn internal(source: anyhow::Error) -> Self {
        Self::Internal { source }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyInput | Self::OutOfRange { .. } => ErrorSeverity::High,
            Self::Configuration { .. } => ErrorSeverity::High,
            Self::Closed => ErrorSeverity::Medium,
            Self::TaskError { .. } => ErrorSeverity::High,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// エラーが回復可能かどうかを判定
    ///
    /// 構築時のバリデーションエラーは呼び出し側が入力を直さない限り再試行しても同じ結果になる。
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::EmptyInput | Self::OutOfRange { .. } | Self::Configuration { .. } => false,
            Self::Closed => false,
            Self::TaskError { .. } => true,
            Self::Internal { .. } => false,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的
    Critical,
}

impl ErrorSeverity {
    /// 重要度の文字列表現を取得
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// ディスパッチ処理の結果型
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

impl From<anyhow::Error> for DispatchError {
    fn from(error: anyhow::Error) -> Self {
        DispatchError::Internal { source: error }
    }
}

impl From<tokio::task::JoinError> for DispatchError {
    fn from(error: tokio::task::JoinError) -> Self {
        DispatchError::TaskError { source: error }
    }
}
