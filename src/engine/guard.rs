// Guard - ハンドラ呼び出しの失敗隔離
// ハンドラ内のパニックをエラーに変換し、ワーカー/コンシューマのループを守る

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// アイテムハンドラを実行し、パニックも `anyhow::Error` として返す
pub(crate) async fn guarded<F>(future: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!(
            "ハンドラがパニックしました: {}",
            panic_message(payload.as_ref())
        )),
    }
}

/// エラーハンドラを実行する。ここでのパニックはログに残して握りつぶす
pub(crate) async fn guarded_report<F>(future: F, origin: &str)
where
    F: Future<Output = ()>,
{
    if let Err(payload) = AssertUnwindSafe(future).catch_unwind().await {
        tracing::error!(
            origin,
            "エラーハンドラがパニックしました: {}",
            panic_message(payload.as_ref())
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
