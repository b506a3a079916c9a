//! Bounded-concurrency driver.
//!
//! Runs an arbitrary number of async units of work with a fixed parallelism
//! cap, streaming each result as it lands.  Built on
//! [`StreamExt::buffer_unordered`], which gives sliding-window admission: a
//! new future is started the moment a slot frees, never batch-by-batch.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run `worker` over `items` with at most `concurrency` invocations in
/// flight, returning all results in completion order.
///
/// `on_progress` is called synchronously once per completed item, in
/// completion order, before the next settlement is observed.
///
/// Guarantees:
/// - every item is passed to the worker exactly once;
/// - the returned vector has exactly `items.len()` entries;
/// - `concurrency` is clamped to a minimum of 1;
/// - an empty `items` resolves immediately without invoking the worker.
///
/// The worker is infallible by contract: success or failure must be encoded
/// in `R`, never raised, so the pool has no error path.
pub async fn run_bounded<T, R, W, Fut, P>(
    items: Vec<T>,
    concurrency: usize,
    worker: W,
    mut on_progress: P,
) -> Vec<R>
where
    W: Fn(T) -> Fut,
    Fut: Future<Output = R>,
    P: FnMut(&R),
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }

    let mut settled = stream::iter(items.into_iter().map(worker))
        .buffer_unordered(concurrency.max(1));

    let mut results = Vec::with_capacity(total);
    while let Some(result) = settled.next().await {
        on_progress(&result);
        results.push(result);
    }
    results
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    /// Tracks the current and maximum number of concurrently running
    /// workers.
    #[derive(Default)]
    struct InFlight {
        current: AtomicUsize,
        max: AtomicUsize,
    }

    impl InFlight {
        fn enter(&self) {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.max.fetch_max(now, Ordering::SeqCst);
        }

        fn exit(&self) {
            self.current.fetch_sub(1, Ordering::SeqCst);
        }

        fn max(&self) -> usize {
            self.max.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn empty_input_resolves_immediately() {
        let calls = AtomicUsize::new(0);
        let results: Vec<u32> = run_bounded(
            Vec::<u32>::new(),
            4,
            |item| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { item }
            },
            |_| {},
        )
        .await;
        assert!(results.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_item_is_processed_exactly_once() {
        let items: Vec<u32> = (0..25).collect();
        let mut results = run_bounded(items, 3, |n| async move { n }, |_| {}).await;
        results.sort_unstable();
        assert_eq!(results, (0..25).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn in_flight_never_exceeds_cap() {
        let gauge = Arc::new(InFlight::default());
        let items: Vec<u32> = (0..12).collect();

        let worker_gauge = Arc::clone(&gauge);
        run_bounded(
            items,
            3,
            move |n| {
                let gauge = Arc::clone(&worker_gauge);
                async move {
                    gauge.enter();
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    gauge.exit();
                    n
                }
            },
            |_| {},
        )
        .await;

        // With 12 items and a 10ms hold, the window fills completely.
        assert_eq!(gauge.max(), 3);
    }

    #[tokio::test]
    async fn cap_above_item_count_runs_all_at_once() {
        let gauge = Arc::new(InFlight::default());
        let worker_gauge = Arc::clone(&gauge);
        run_bounded(
            (0..4).collect::<Vec<u32>>(),
            100,
            move |n| {
                let gauge = Arc::clone(&worker_gauge);
                async move {
                    gauge.enter();
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    gauge.exit();
                    n
                }
            },
            |_| {},
        )
        .await;
        assert_eq!(gauge.max(), 4);
    }

    #[tokio::test]
    async fn zero_cap_is_clamped_to_one() {
        let gauge = Arc::new(InFlight::default());
        let worker_gauge = Arc::clone(&gauge);
        let results = run_bounded(
            (0..5).collect::<Vec<u32>>(),
            0,
            move |n| {
                let gauge = Arc::clone(&worker_gauge);
                async move {
                    gauge.enter();
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    gauge.exit();
                    n
                }
            },
            |_| {},
        )
        .await;
        assert_eq!(results.len(), 5);
        assert_eq!(gauge.max(), 1);
    }

    #[tokio::test]
    async fn results_stream_in_completion_order() {
        // Item 0 sleeps much longer than item 1, so with both in flight the
        // completion order inverts the input order.
        let mut progress: Vec<u64> = Vec::new();
        let results = run_bounded(
            vec![50u64, 5u64],
            2,
            |delay| async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay
            },
            |settled| progress.push(*settled),
        )
        .await;
        assert_eq!(progress, vec![5, 50]);
        assert_eq!(results, vec![5, 50]);
    }
}
