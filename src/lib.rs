//! 作業分散のための2つの並行処理プリミティブ
//!
//! - [`engine::FanOutRunner`]: 固定のアイテム集合を `1..=20` 個のワーカーで取り合って処理する
//! - [`engine::SingleConsumer`]: 複数プロデューサからの投入を1つのコンシューマで直列に処理する
//!
//! どちらも呼び出し側はアイテム処理とエラー処理だけを実装し、
//! キューイング・キャンセル・停止はランナーが受け持つ。

pub mod cli;
pub mod core;
pub mod engine;
pub mod services;

pub use crate::core::{
    ConsumeHandler, ConsumerStats, DispatchConfig, DispatchError, DispatchResult, RunSummary,
    ShutdownOutcome, WorkHandler,
};
pub use engine::{with_single_consumer, CancellationToken, FanOutRunner, Poster, SingleConsumer};
pub use services::DefaultDispatchConfig;
