// 設定管理の具象実装

use crate::core::{DispatchConfig, DispatchError, DispatchResult, MAX_TASK_COUNT, MIN_TASK_COUNT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// デフォルト設定実装
///
/// JSON では `{"worker_count": 8, "shutdown_timeout_ms": 10000}` の形で保存される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultDispatchConfig {
    worker_count: usize,
    shutdown_timeout_ms: u64,
}

impl DefaultDispatchConfig {
    pub fn new(cpu_count: usize) -> Self {
        Self {
            worker_count: cpu_count.clamp(MIN_TASK_COUNT, MAX_TASK_COUNT),
            shutdown_timeout_ms: 10_000,
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// 値の範囲を検証
    pub fn validate(&self) -> DispatchResult<()> {
        if !(MIN_TASK_COUNT..=MAX_TASK_COUNT).contains(&self.worker_count) {
            return Err(DispatchError::task_count_out_of_range(self.worker_count));
        }
        if self.shutdown_timeout_ms == 0 {
            return Err(DispatchError::configuration(
                "shutdown_timeout_ms は1以上である必要があります",
            ));
        }
        Ok(())
    }

    /// JSONファイルから読み込み、検証する
    pub fn load_from_path(path: impl AsRef<Path>) -> DispatchResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DispatchError::configuration(format!("{} を読み込めません: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            DispatchError::configuration(format!("{} の形式が不正です: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for DefaultDispatchConfig {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl DispatchConfig for DefaultDispatchConfig {
    fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
