//! Lazily computed values shared between concurrent tasks.

use crate::bundler::error::{Error, Result};
use futures::future::BoxFuture;
use std::{future::Future, sync::Arc};
use tokio::sync::OnceCell;

type Producer<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// A value produced on first [`resolve`](Deferred::resolve).
///
/// The producer runs at most once; concurrent callers wait for it and all
/// observe the same outcome. A failure is handed to every caller as
/// [`Error::Shared`], which keeps the skip/fatal classification of the
/// underlying error.
pub struct Deferred<T> {
    cell: OnceCell<std::result::Result<T, Arc<Error>>>,
    producer: Producer<T>,
}

impl<T> Deferred<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps `producer` without running it.
    pub fn new<F, Fut>(producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            producer: Box::new(move || Box::pin(producer())),
        }
    }

    /// Returns the value, computing it on first call.
    pub async fn resolve(&self) -> Result<T> {
        self.cell
            .get_or_init(|| async { (self.producer)().await.map_err(Arc::new) })
            .await
            .clone()
            .map_err(Error::Shared)
    }

    /// Whether the producer has completed.
    pub fn is_resolved(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("resolved", &self.cell.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn producer_runs_once_for_concurrent_callers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let deferred = Arc::new(Deferred::new(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok(42u32)
            }
        }));

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..4 {
            let deferred = deferred.clone();
            tasks.spawn(async move { deferred.resolve().await });
        }
        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(deferred.is_resolved());
    }

    #[tokio::test]
    async fn failures_are_shared_and_keep_their_category() {
        let deferred: Deferred<u32> = Deferred::new(|| async {
            Err(Error::Download {
                url: "https://example.invalid".into(),
                reason: "offline".into(),
            })
        });

        for _ in 0..2 {
            let err = deferred.resolve().await.unwrap_err();
            assert!(matches!(err, Error::Shared(_)));
            assert!(err.is_skippable());
        }
    }
}
