//! The store under real concurrent load.

use std::sync::Arc;
use std::time::Duration;

use entangle_context::{ContextError, ContextStore};
use futures::future::join_all;
use tokio::time::sleep;

/// Handles of a fake request.
#[derive(Debug, PartialEq)]
struct Handles {
    id: usize,
}

fn delay(id: usize, step: usize) -> Duration {
    Duration::from_millis(((id * 7 + step * 13) % 11) as u64)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_requests_never_cross_talk() {
    let store = ContextStore::new();

    let tasks = (0..64).map(|id| {
        let store = store.clone();
        tokio::spawn(async move {
            let token = store.begin(Handles { id });
            store
                .run(token, async {
                    for step in 0..8 {
                        sleep(delay(id, step)).await;
                        tokio::task::yield_now().await;
                        assert_eq!(store.current().unwrap().id, id);
                    }
                    id
                })
                .await
        })
    });

    let results = join_all(tasks).await;
    for (expected, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), expected);
    }
    assert_eq!(store.active(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_on_one_task() {
    // Several requests polled by the same task, not spawned
    let store = ContextStore::new();

    let requests = (0..16).map(|id| {
        let store = &store;
        store.enter(Handles { id }, async move {
            for step in 0..5 {
                sleep(delay(id, step)).await;
                assert_eq!(store.current().unwrap().id, id);
            }
        })
    });

    join_all(requests).await;
    assert_eq!(store.active(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bind_carries_scope_into_spawned_task() {
    let store = ContextStore::new();

    let seen = store
        .enter(Handles { id: 7 }, async {
            let inner = store.clone();
            tokio::spawn(store.bind(async move { inner.current().map(|h| h.id) }))
                .await
                .unwrap()
        })
        .await;

    assert_eq!(seen, Ok(7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawned_task_outliving_request_sees_nothing() {
    let store = ContextStore::new();

    let late = store
        .enter(Handles { id: 1 }, async {
            let inner = store.clone();
            tokio::spawn(store.bind(async move {
                sleep(Duration::from_millis(20)).await;
                inner.current().map(|h| h.id)
            }))
        })
        .await;

    assert!(matches!(late.await.unwrap(), Err(ContextError::NotFound(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn spawn_without_bind_is_outside_scope() {
    let store = ContextStore::new();

    let seen = store
        .enter(Handles { id: 3 }, async {
            let inner = store.clone();
            tokio::spawn(async move { inner.current().map(|h| h.id) })
                .await
                .unwrap()
        })
        .await;

    assert_eq!(seen, Err(ContextError::OutsideScope));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn aborted_request_is_released() {
    let store = ContextStore::new();
    let started = Arc::new(tokio::sync::Notify::new());

    let task = {
        let store = store.clone();
        let started = Arc::clone(&started);
        tokio::spawn(async move {
            store
                .enter(Handles { id: 1 }, async {
                    started.notify_one();
                    sleep(Duration::from_secs(60)).await;
                })
                .await
        })
    };

    started.notified().await;
    assert_eq!(store.active(), 1);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());
    assert_eq!(store.active(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_request_is_released() {
    let store = ContextStore::new();

    let task = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .enter(Handles { id: 1 }, async {
                    tokio::task::yield_now().await;
                    panic!("handler exploded");
                })
                .await
        })
    };

    assert!(task.await.unwrap_err().is_panic());
    assert_eq!(store.active(), 0);
}
