// エンジン層 - ワーカー・コンシューマのスケジューリングとライフサイクル
// コア層のトレイトを使って並列分散と直列化を提供

pub mod api;
pub mod consumer;
pub mod fan_out;
mod guard;
pub mod single_consumer;
pub mod worker;

// 公開API
pub use api::{consume_all, consume_all_with_config, fan_out, fan_out_with_cancel};
pub use fan_out::FanOutRunner;
pub use single_consumer::{with_single_consumer, Poster, SingleConsumer, DEFAULT_SHUTDOWN_TIMEOUT};
pub use tokio_util::sync::CancellationToken;
