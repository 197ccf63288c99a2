// テストユーティリティとハンドラ実装
// 統合テストで共通に使う記録用ハンドラ


// 公開API
pub use handlers::*;
