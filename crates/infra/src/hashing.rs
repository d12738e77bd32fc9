//! Bounded pool for CPU-bound password hashing.
//!
//! bcrypt at cost 10 takes tens of milliseconds; running it on the async
//! executor would stall every other request on that worker. Each call runs on
//! the blocking pool, and at most `workers` run at once.

use std::sync::Arc;

use tokio::sync::Semaphore;

use ridegate_auth::{HashError, PasswordHash, hash_password, verify_password};

#[derive(Debug, Clone)]
pub struct HashingPool {
    permits: Arc<Semaphore>,
    cost: u32,
}

impl HashingPool {
    pub fn new(workers: usize, cost: u32) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
            cost,
        }
    }

    pub async fn hash(&self, plaintext: String) -> Result<PasswordHash, HashError> {
        let cost = self.cost;
        self.run(move || hash_password(&plaintext, cost)).await
    }

    pub async fn verify(&self, plaintext: String, hash: PasswordHash) -> Result<bool, HashError> {
        self.run(move || verify_password(&plaintext, &hash)).await
    }

    async fn run<T, F>(&self, job: F) -> Result<T, HashError>
    where
        F: FnOnce() -> Result<T, HashError> + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| HashError::Task(e.to_string()))?;

        tokio::task::spawn_blocking(job)
            .await
            .map_err(|e| HashError::Task(e.to_string()))?
    }
}
