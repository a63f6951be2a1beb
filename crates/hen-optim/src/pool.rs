//! Worker pool for independent evaluations.

use crate::config::PoolConfig;
use crate::error::OptimResult;
use rayon::prelude::*;

/// Either a dedicated rayon pool or plain sequential iteration.
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    pub fn new(config: &PoolConfig) -> OptimResult<Self> {
        let pool = match config.workers {
            Some(1) => None,
            Some(n) => Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?),
            None => Some(rayon::ThreadPoolBuilder::new().build()?),
        };
        Ok(Self { pool })
    }

    pub fn sequential() -> Self {
        Self { pool: None }
    }

    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, rayon::ThreadPool::current_num_threads)
    }

    /// Apply `f` to every item; output order follows input order.
    pub fn map<T, U, F>(&self, items: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Send + Sync,
    {
        match &self.pool {
            None => items.into_iter().map(f).collect(),
            Some(pool) => pool.install(|| items.into_par_iter().map(f).collect()),
        }
    }
}
