//! Disk Worker Task
//!
//! Serial background queue that owns every disk tier operation of one cache
//! instance. Jobs run one after another in submission order, each on the
//! blocking thread pool, so disk I/O never happens on the caller's thread and
//! operations on the same identifier are applied in issue order.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::DiskTier;
use crate::error::{CacheError, Result};

type JobFn = Box<dyn FnOnce(&DiskTier) + Send + 'static>;

struct DiskJob {
    kind: &'static str,
    run: JobFn,
}

// == Disk Queue ==
/// Submission side of a disk worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DiskQueue {
    tx: mpsc::UnboundedSender<DiskJob>,
}

impl std::fmt::Debug for DiskJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskJob").field("kind", &self.kind).finish()
    }
}

impl DiskQueue {
    /// Queues a job behind every job submitted before it.
    ///
    /// Returns false if the worker has stopped; the job is dropped unrun,
    /// which drops whatever completion sender it captured.
    pub fn submit<F>(&self, kind: &'static str, run: F) -> bool
    where
        F: FnOnce(&DiskTier) + Send + 'static,
    {
        let job = DiskJob {
            kind,
            run: Box::new(run),
        };

        match self.tx.send(job) {
            Ok(()) => true,
            Err(_) => {
                warn!(kind, "disk worker stopped, job dropped");
                false
            }
        }
    }
}

/// Spawns the worker on the current Tokio runtime.
///
/// The worker stops once every [`DiskQueue`] clone has been dropped and the
/// queued jobs have drained.
///
/// # Errors
/// Returns `Runtime` when called outside a Tokio runtime.
pub fn spawn_disk_worker(disk: DiskTier) -> Result<(DiskQueue, JoinHandle<()>)> {
    let handle = Handle::try_current().map_err(|e| CacheError::Runtime(e.to_string()))?;
    let (tx, mut rx) = mpsc::unbounded_channel::<DiskJob>();

    let join = handle.spawn(async move {
        let disk = Arc::new(disk);

        while let Some(job) = rx.recv().await {
            let disk = Arc::clone(&disk);
            let kind = job.kind;
            debug!(kind, "running disk job");

            // Awaited before the next recv, which is what keeps jobs ordered.
            if let Err(e) = tokio::task::spawn_blocking(move || (job.run)(&disk)).await {
                warn!(kind, error = %e, "disk job did not complete");
            }
        }

        debug!("disk worker stopped");
    });

    Ok((DiskQueue { tx }, join))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_jobs_run_in_submission_order() {
        let dir = TempDir::new().unwrap();
        let (queue, _handle) = spawn_disk_worker(DiskTier::new(dir.path())).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..20 {
            let seen = Arc::clone(&seen);
            assert!(queue.submit("record", move |_| {
                // Earlier jobs sleep longer; order must still hold.
                std::thread::sleep(std::time::Duration::from_millis(20 - i));
                seen.lock().unwrap().push(i);
            }));
        }

        let (tx, rx) = oneshot::channel();
        queue.submit("done", move |_| {
            let _ = tx.send(());
        });
        rx.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), (0..20u64).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_panicking_job_does_not_stop_worker() {
        let dir = TempDir::new().unwrap();
        let (queue, _handle) = spawn_disk_worker(DiskTier::new(dir.path())).unwrap();

        queue.submit("boom", |_| panic!("job failure"));

        let (tx, rx) = oneshot::channel();
        queue.submit("after", move |_| {
            let _ = tx.send(7);
        });
        assert_eq!(rx.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_worker_stops_when_queue_dropped() {
        let dir = TempDir::new().unwrap();
        let (queue, handle) = spawn_disk_worker(DiskTier::new(dir.path())).unwrap();

        drop(queue);
        handle.await.unwrap();
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let result = spawn_disk_worker(DiskTier::unavailable());
        assert!(matches!(result, Err(CacheError::Runtime(_))));
    }
}
