// 設定管理
// デフォルト値・ビルダー・JSONファイル読み込み

pub mod implementations;

// 公開API
pub use implementations::DefaultDispatchConfig;
