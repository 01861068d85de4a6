//! Fire-and-forget persistence of cart snapshots.
//!
//! Callers submit a full-replace write and return immediately. Failures are
//! logged and dropped; the in-memory cart is never rolled back.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::PersistMode;
use crate::storage::KeyValueStorage;

enum WriteRequest {
    Write { key: String, value: String },
    Flush(oneshot::Sender<()>),
}

enum Writer {
    /// One task per write; completion order is up to the runtime.
    Detached {
        in_flight: Mutex<Vec<JoinHandle<()>>>,
    },
    /// A single task draining a queue in submission order.
    Sequenced {
        queue: mpsc::UnboundedSender<WriteRequest>,
    },
}

/// Schedules snapshot writes to storage.
pub(crate) struct Persister {
    storage: Arc<dyn KeyValueStorage>,
    runtime: Handle,
    writer: Writer,
}

impl Persister {
    pub(crate) fn new(storage: Arc<dyn KeyValueStorage>, runtime: Handle, mode: PersistMode) -> Self {
        let writer = match mode {
            PersistMode::Detached => Writer::Detached {
                in_flight: Mutex::new(Vec::new()),
            },
            PersistMode::Sequenced => {
                let (queue, rx) = mpsc::unbounded_channel();
                runtime.spawn(run_writer(storage.clone(), rx));
                Writer::Sequenced { queue }
            }
        };

        Self {
            storage,
            runtime,
            writer,
        }
    }

    /// Submit a write and return without waiting for it.
    pub(crate) fn submit(&self, key: String, value: String) {
        match &self.writer {
            Writer::Detached { in_flight } => {
                let storage = self.storage.clone();
                let task = self.runtime.spawn(async move {
                    write_logged(storage.as_ref(), &key, &value).await;
                });

                let mut in_flight = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                in_flight.retain(|t| !t.is_finished());
                in_flight.push(task);
            }
            Writer::Sequenced { queue } => {
                if queue.send(WriteRequest::Write { key, value }).is_err() {
                    tracing::warn!("Persistence writer stopped; dropping cart write");
                }
            }
        }
    }

    /// Wait until every write submitted so far has finished.
    pub(crate) async fn flush(&self) {
        match &self.writer {
            Writer::Detached { in_flight } => {
                let tasks = std::mem::take(
                    &mut *in_flight.lock().unwrap_or_else(PoisonError::into_inner),
                );
                for task in tasks {
                    if let Err(e) = task.await {
                        tracing::warn!(error = %e, "Persistence task did not complete");
                    }
                }
            }
            Writer::Sequenced { queue } => {
                let (done, wait) = oneshot::channel();
                if queue.send(WriteRequest::Flush(done)).is_err() {
                    tracing::debug!("Persistence writer stopped; nothing to flush");
                    return;
                }
                if let Err(e) = wait.await {
                    tracing::debug!(error = %e, "Persistence writer dropped flush signal");
                }
            }
        }
    }
}

async fn run_writer(
    storage: Arc<dyn KeyValueStorage>,
    mut rx: mpsc::UnboundedReceiver<WriteRequest>,
) {
    while let Some(request) = rx.recv().await {
        match request {
            WriteRequest::Write { key, value } => {
                write_logged(storage.as_ref(), &key, &value).await;
            }
            WriteRequest::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    tracing::debug!("Persistence writer finished");
}

async fn write_logged(storage: &dyn KeyValueStorage, key: &str, value: &str) {
    match storage.set_item(key, value).await {
        Ok(()) => tracing::trace!(key = %key, bytes = value.len(), "Persisted cart"),
        Err(e) => tracing::warn!(key = %key, error = %e, "Failed to persist cart"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::storage::MemoryStorage;
    use futures::future::{self, BoxFuture, FutureExt};
    use std::time::Duration;

    struct FailingStorage;

    impl KeyValueStorage for FailingStorage {
        fn get_item<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
            future::ready(Ok(None)).boxed()
        }

        fn set_item<'a>(&'a self, _key: &'a str, _value: &'a str) -> BoxFuture<'a, Result<()>> {
            future::ready(Err(Error::Storage("disk full".into()))).boxed()
        }

        fn remove_item<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<()>> {
            future::ready(Ok(())).boxed()
        }
    }

    struct PanickingStorage;

    impl KeyValueStorage for PanickingStorage {
        fn get_item<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
            future::ready(Ok(None)).boxed()
        }

        fn set_item<'a>(&'a self, _key: &'a str, _value: &'a str) -> BoxFuture<'a, Result<()>> {
            panic!("storage backend crashed")
        }

        fn remove_item<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<()>> {
            future::ready(Ok(())).boxed()
        }
    }

    #[tokio::test]
    async fn detached_flush_waits_for_writes() {
        let storage = MemoryStorage::new();
        let persister = Persister::new(
            Arc::new(storage.clone()),
            Handle::current(),
            PersistMode::Detached,
        );

        persister.submit("k".into(), "v".into());
        persister.flush().await;

        assert_eq!(storage.get("k"), Some("v".to_string()));
    }

    #[tokio::test]
    async fn sequenced_keeps_submission_order() {
        let storage = MemoryStorage::new();
        let persister = Persister::new(
            Arc::new(storage.clone()),
            Handle::current(),
            PersistMode::Sequenced,
        );

        for i in 0..50 {
            persister.submit("k".into(), i.to_string());
        }
        persister.flush().await;

        assert_eq!(storage.get("k"), Some("49".to_string()));
    }

    #[tokio::test]
    async fn failed_write_is_swallowed() {
        for mode in [PersistMode::Detached, PersistMode::Sequenced] {
            let persister = Persister::new(Arc::new(FailingStorage), Handle::current(), mode);

            persister.submit("k".into(), "v".into());
            persister.flush().await;
        }
    }

    #[tokio::test]
    async fn flush_returns_after_writer_dies() {
        let persister = Persister::new(
            Arc::new(PanickingStorage),
            Handle::current(),
            PersistMode::Sequenced,
        );

        persister.submit("k".into(), "v".into());
        tokio::time::timeout(Duration::from_secs(5), persister.flush())
            .await
            .expect("flush hung after the writer stopped");

        // The queue is closed now; later flushes return straight away
        persister.submit("k".into(), "w".into());
        tokio::time::timeout(Duration::from_secs(5), persister.flush())
            .await
            .expect("flush hung on a closed queue");
    }
}
