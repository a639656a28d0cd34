use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub const DEFAULT_POOL_SIZE: usize = 4;

/// Bounded pool for blocking tool calls. A size of one serializes every call
/// in the process, which is what tools holding an exclusive OS session need.
#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn for_tools(exclusive: bool, configured: usize) -> Self {
        if exclusive {
            Self::new(1)
        } else {
            Self::new(configured)
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Runs `job` on the blocking thread pool. The permit travels into the
    /// job so it is held until the call returns, even if the caller's future
    /// is dropped first.
    pub async fn run<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| anyhow!("worker pool closed"))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        });

        handle
            .await
            .map_err(|e| anyhow!("tool worker failed: {}", e))
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}
