// ファンアウトランナーの統合テスト
use crate::fixtures::{FailingWorkHandler, RecordingWorkHandler, SlowWorkHandler};
use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use worker_dispatch::{CancellationToken, DispatchError, FanOutRunner};

fn words() -> Vec<String> {
    ["one", "two", "three", "four", "five", "six", "seven", "eight"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_out_of_range_task_count_fails_construction() {
    for count in [0usize, 21] {
        let error = FanOutRunner::new(words(), count, RecordingWorkHandler::default())
            .err()
            .expect("構築は失敗するべきです");

        assert!(matches!(error, DispatchError::OutOfRange { value, .. } if value == count));
        assert!(error.to_string().contains(&count.to_string()));
    }
}

#[test]
fn test_empty_items_fail_construction() {
    let error = FanOutRunner::new(Vec::<String>::new(), 2, RecordingWorkHandler::default())
        .err()
        .expect("構築は失敗するべきです");

    assert!(matches!(error, DispatchError::EmptyInput));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_item_handled_once_for_all_task_counts() -> Result<()> {
    let expected: HashSet<String> = words().into_iter().collect();

    for task_count in 1..=20 {
        let handler = Arc::new(RecordingWorkHandler::default());
        let runner = FanOutRunner::with_handler(words(), task_count, Arc::clone(&handler))?;

        let summary = runner.run().await?;

        let items = handler.items();
        assert_eq!(items.len(), 8, "task_count = {task_count}");
        assert_eq!(items.into_iter().collect::<HashSet<_>>(), expected);
        assert_eq!(summary.handled, 8);
        assert!(handler.worker_ids().iter().all(|id| *id < task_count));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_error_handler_invoked_once_per_item() -> Result<()> {
    for task_count in 1..=10 {
        let handler = Arc::new(FailingWorkHandler::default());
        let runner = FanOutRunner::with_handler(words(), task_count, Arc::clone(&handler))?;

        let summary = runner.run().await?;
        assert_eq!(summary.failed, 8);
        assert_eq!(summary.handled, 0);

        let errors = handler.errors.lock().unwrap().clone();
        assert_eq!(errors.len(), 8);
        // エラーは対応するアイテムのものが渡される
        assert!(errors.iter().all(|(item, message)| item == message));
        let items: HashSet<String> = errors.into_iter().map(|(item, _)| item).collect();
        assert_eq!(items, words().into_iter().collect::<HashSet<_>>());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelling_mid_run_handles_fewer_items() -> Result<()> {
    let handler = Arc::new(SlowWorkHandler::new(Duration::from_millis(2)));
    let runner = Arc::new(FanOutRunner::with_handler(
        0..1000u32,
        10,
        Arc::clone(&handler),
    )?);
    let cancel = CancellationToken::new();

    let run = {
        let runner = Arc::clone(&runner);
        let cancel = cancel.clone();
        tokio::spawn(async move { runner.start(cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(5)).await;
    cancel.cancel();

    let summary = run.await??;

    assert!(summary.cancelled);
    assert!(handler.count() < 1000);
    assert_eq!(summary.handled, handler.count());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_slow_item_does_not_idle_other_workers() -> Result<()> {
    use async_trait::async_trait;
    use std::sync::Mutex;
    use worker_dispatch::WorkHandler;

    // 先頭アイテムだけ重い。他のワーカーが残りを全て引き受けるはず
    #[derive(Default)]
    struct Skewed {
        by_worker: Mutex<Vec<(u32, usize)>>,
    }

    #[async_trait]
    impl WorkHandler<u32> for Skewed {
        async fn handle_item(&self, item: &u32, worker_id: usize) -> Result<()> {
            if *item == 0 {
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            self.by_worker.lock().unwrap().push((*item, worker_id));
            Ok(())
        }
    }

    let handler = Arc::new(Skewed::default());
    let runner = FanOutRunner::with_handler(0..50u32, 2, Arc::clone(&handler))?;
    runner.run().await?;

    let by_worker = handler.by_worker.lock().unwrap().clone();
    let slow_worker = by_worker
        .iter()
        .find(|(item, _)| *item == 0)
        .map(|(_, worker)| *worker)
        .expect("item 0 は処理されるはず");
    let slow_worker_items = by_worker.iter().filter(|(_, w)| *w == slow_worker).count();

    assert_eq!(by_worker.len(), 50);
    assert_eq!(slow_worker_items, 1);
    Ok(())
}
