// シングルコンシューマの統合テスト
use crate::fixtures::{RecordingConsumer, POISON};
use anyhow::Result;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use worker_dispatch::{
    with_single_consumer, DefaultDispatchConfig, DispatchError, Poster, ShutdownOutcome,
    SingleConsumer,
};

const TIMEOUT: Duration = Duration::from_secs(10);

fn consumer_for(handler: &Arc<RecordingConsumer>) -> SingleConsumer<(usize, usize)> {
    SingleConsumer::with_handler(Arc::clone(handler), TIMEOUT).expect("ランタイム内で作成")
}

#[tokio::test]
async fn test_single_thread_post_consumes_all_items_in_order() -> Result<()> {
    for count in [1usize, 10, 100, 1000, 10000] {
        let handler = Arc::new(RecordingConsumer::default());
        let mut consumer = consumer_for(&handler);

        for i in 0..count {
            consumer.post((0, i))?;
        }
        let outcome = consumer.shutdown().await;

        assert_eq!(outcome.stats().map(|s| s.handled), Some(count));
        assert_eq!(handler.count(), count);
        let sequence: Vec<usize> = handler.items.lock().unwrap().iter().map(|(_, i)| *i).collect();
        assert_eq!(sequence, (0..count).collect::<Vec<_>>());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_multiple_threads_post_consumes_all_items() -> Result<()> {
    const PRODUCERS: usize = 7;

    for count in [1usize, 10, 100, 1000, 10000] {
        let handler = Arc::new(RecordingConsumer::default());
        let mut consumer = consumer_for(&handler);

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let poster = consumer.poster();
                std::thread::spawn(move || {
                    for i in 0..count {
                        poster.post((producer, i)).expect("停止前の投入は成功する");
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().expect("プロデューサスレッド");
        }

        let outcome = consumer.shutdown().await;
        assert_eq!(outcome.stats().map(|s| s.handled), Some(PRODUCERS * count));

        let items = handler.items.lock().unwrap().clone();
        let unique: HashSet<(usize, usize)> = items.iter().copied().collect();
        assert_eq!(items.len(), PRODUCERS * count);
        assert_eq!(unique.len(), PRODUCERS * count);

        // プロデューサ単位では投入順が保たれる
        for producer in 0..PRODUCERS {
            let sequence: Vec<usize> = items
                .iter()
                .filter(|(p, _)| *p == producer)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(sequence, (0..count).collect::<Vec<_>>());
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_errors_do_not_stop_the_consumer() -> Result<()> {
    let handler = Arc::new(RecordingConsumer::default());
    let mut consumer = consumer_for(&handler);

    consumer.post((0, 0))?;
    consumer.post((0, POISON))?;
    consumer.post((0, 1))?;
    consumer.post((1, POISON))?;
    consumer.post((0, 2))?;

    let stats = consumer.shutdown().await.stats().expect("drained");
    assert_eq!(stats.handled, 3);
    assert_eq!(stats.failed, 2);
    assert_eq!(handler.errors.load(Ordering::SeqCst), 2);
    assert_eq!(handler.count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_dispose_twice_is_safe() -> Result<()> {
    let handler = Arc::new(RecordingConsumer::default());
    let mut consumer = consumer_for(&handler);
    consumer.post((0, 0))?;

    assert!(matches!(consumer.shutdown().await, ShutdownOutcome::Drained(_)));
    assert_eq!(consumer.shutdown().await, ShutdownOutcome::AlreadyShutDown);
    assert!(matches!(consumer.post((0, 1)), Err(DispatchError::Closed)));
    assert_eq!(handler.count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_drop_without_shutdown_still_drains() -> Result<()> {
    let handler = Arc::new(RecordingConsumer::default());
    {
        let consumer = consumer_for(&handler);
        for i in 0..100 {
            consumer.post((0, i))?;
        }
    }

    // Drop は停止を要求するだけなので、コンシューマが追いつくまで待つ
    for _ in 0..100 {
        if handler.count() == 100 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(handler.count(), 100);
    Ok(())
}

#[tokio::test]
async fn test_scoped_consumer_shuts_down_after_scope() -> Result<()> {
    use async_trait::async_trait;
    use worker_dispatch::ConsumeHandler;

    struct Shared(Arc<RecordingConsumer>);

    #[async_trait]
    impl ConsumeHandler<(usize, usize)> for Shared {
        async fn handle_item(&self, item: (usize, usize)) -> Result<()> {
            self.0.handle_item(item).await
        }
    }

    let handler = Arc::new(RecordingConsumer::default());
    let config = DefaultDispatchConfig::new(1).with_shutdown_timeout(TIMEOUT);

    let mut leaked: Option<Poster<(usize, usize)>> = None;
    let (posted, outcome) = with_single_consumer(
        Shared(Arc::clone(&handler)),
        &config,
        |poster: Poster<(usize, usize)>| {
            leaked = Some(poster.clone());
            async move {
                for i in 0..500 {
                    poster.post((0, i)).expect("スコープ内の投入");
                }
                500
            }
        },
    )
    .await?;

    assert_eq!(posted, 500);
    assert_eq!(outcome.stats().map(|s| s.handled), Some(500));
    assert_eq!(handler.count(), 500);

    // スコープ外に持ち出したハンドルは停止後に拒否される
    let leaked = leaked.expect("poster");
    assert!(leaked.is_closed());
    assert!(matches!(leaked.post((0, 500)), Err(DispatchError::Closed)));
    Ok(())
}
