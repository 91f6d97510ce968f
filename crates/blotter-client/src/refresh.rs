//! Timed refresh of a record store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use blotter_core::{Error, Record, Result};

use crate::store::RecordStore;

/// Handle to a running auto-refresh task.
///
/// Dropping the handle aborts the task, so a view that goes away without
/// calling [`RefreshHandle::shutdown`] still stops refreshing.
pub struct RefreshHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: Option<JoinHandle<()>>,
    interval: Duration,
}

impl RefreshHandle {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the refresh task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the task after any in-flight refresh completes.
    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| Error::Internal("Failed to send shutdown signal".into()))?;
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| Error::Internal(format!("Refresh task failed: {}", e)))?;
        }
        Ok(())
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Reload `store` every `interval`, first tick one interval from now.
pub fn spawn_auto_refresh<R: Record>(store: Arc<RecordStore<R>>, interval: Duration) -> RefreshHandle {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

    let task = tokio::spawn(async move {
        info!(
            subsystem = "refresh",
            component = "auto_refresh",
            collection = %R::KIND,
            interval_secs = interval.as_secs(),
            "Auto-refresh started"
        );

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!(collection = %R::KIND, "Auto-refresh received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {
                    let outcome = store.refresh().await;
                    debug!(collection = %R::KIND, ?outcome, "Timed refresh finished");
                }
            }
        }

        info!(collection = %R::KIND, "Auto-refresh stopped");
    });

    RefreshHandle {
        shutdown_tx,
        task: Some(task),
        interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RecordSource;
    use async_trait::async_trait;
    use blotter_core::Criminal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordSource<Criminal> for CountingSource {
        async fn fetch_all(&self) -> Result<Vec<Criminal>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_on_interval_until_shutdown() {
        let source = Arc::new(CountingSource::default());
        let store = Arc::new(RecordStore::new(source.clone()));
        let handle = spawn_auto_refresh(store, Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(62)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);

        handle.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_task() {
        let source = Arc::new(CountingSource::default());
        let store = Arc::new(RecordStore::new(source.clone()));
        let handle = spawn_auto_refresh(store, Duration::from_secs(30));
        assert!(handle.is_running());
        drop(handle);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
