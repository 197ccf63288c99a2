// コアレイヤー - 基盤となるトレイト、型、エラー定義
// エンジン層・サービス層から参照される基本的な抽象化を提供

pub mod error;
pub mod traits;
pub mod types;

// 公開API
pub use error::{DispatchError, DispatchResult, ErrorSeverity, MAX_TASK_COUNT, MIN_TASK_COUNT};
pub use traits::{ConsumeHandler, DispatchConfig, WorkHandler};
pub use types::{ConsumerStats, RunSummary, ShutdownOutcome, WorkerReport};
pub use traits::MockDispatchConfig;
