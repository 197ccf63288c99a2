// 監視機能
// tracing によるログ出力の初期化

pub mod implementations;

// 公開API
pub use implementations::{default_filter, init_tracing};
