// ログ出力の具象実装

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` 未設定時に使うフィルタ
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "worker_dispatch=debug"
    } else {
        "worker_dispatch=info"
    }
}

/// tracing サブスクライバを初期化
///
/// `RUST_LOG` があればそれを優先する。既に初期化済みの場合は何もしない。
pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
