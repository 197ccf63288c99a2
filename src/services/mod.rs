// サービス層 - ランナーを取り巻く設定・監視機能
// 各サービスは特定の責任を持ち、エンジン層とは疎結合

pub mod config;
pub mod monitoring;

// 公開API
pub use config::DefaultDispatchConfig;
pub use monitoring::init_tracing;
