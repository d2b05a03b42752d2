//! Load-balanced pool of attester endpoints (spec §4.9/§5).
//!
//! A near-literal port of `balancer.go`'s `LoadBalancer`/`AttesterEndpoint`:
//! least-loaded selection under the pool-wide lock, per-endpoint task
//! counters behind their own lock, and a periodic health-check sweep.
//! `MAX_QUEUED_TASKS` matches the Go original's constant; `max_queued_tasks`
//! is threaded through [`crate::config::Config`] instead, so it stays a
//! runtime knob rather than a compile-time one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::attester_client::AttesterClient;

struct Endpoint {
    client: AttesterClient,
    url: String,
    is_up: RwLock<bool>,
    queued_tasks: RwLock<usize>,
}

/// A handle returned by [`AttesterPool::next_attester`]. Callers must call
/// [`Lease::finish`] exactly once after the task completes (successfully or
/// not) — matching the Go original's comment that `FinishTask` "must be
/// called on all, and only, the attesters returned by `GetNextAttester()`".
pub struct Lease {
    pool: Arc<PoolInner>,
    index: usize,
}

impl Lease {
    pub fn client(&self) -> &AttesterClient {
        &self.pool.endpoints[self.index].client
    }

    pub fn url(&self) -> &str {
        &self.pool.endpoints[self.index].url
    }

    /// spec §4.9: decrements the endpoint's queued-task counter, floored at
    /// zero. The Go original treats going negative as an inconsistency
    /// error; this crate logs it the same way rather than panicking, since
    /// the counter is advisory load-balancing state, not a correctness
    /// invariant.
    pub async fn finish(self) {
        let endpoint = &self.pool.endpoints[self.index];
        let mut tasks = endpoint.queued_tasks.write().await;
        if *tasks == 0 {
            tracing::warn!(url = %endpoint.url, "inconsistent number of queued tasks (negative)");
        } else {
            *tasks -= 1;
        }
    }
}

struct PoolInner {
    endpoints: Vec<Endpoint>,
    max_queued_tasks: usize,
    selection_lock: Mutex<()>,
}

/// The dispatcher's view of the attester fleet: a fixed set of endpoints,
/// health-checked every 60s, selected least-loaded-first.
#[derive(Clone)]
pub struct AttesterPool {
    inner: Arc<PoolInner>,
}

impl AttesterPool {
    pub fn new(urls: Vec<String>, max_queued_tasks: usize) -> Self {
        let endpoints = urls
            .into_iter()
            .map(|url| Endpoint {
                client: AttesterClient::new(url.clone()),
                url,
                is_up: RwLock::new(false),
                queued_tasks: RwLock::new(0),
            })
            .collect();
        Self {
            inner: Arc::new(PoolInner {
                endpoints,
                max_queued_tasks,
                selection_lock: Mutex::new(()),
            }),
        }
    }

    /// Runs the 60s health-check ticker until `shutdown` resolves. Intended
    /// to be spawned once per pool, mirroring `balancer.go`'s background
    /// `go lb.healthCheck(checker)` goroutine.
    pub async fn run_health_checks(&self, shutdown: impl std::future::Future<Output = ()>) {
        self.check_all().await;
        let mut ticker = tokio::time::interval(Duration::from_secs(60));
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.check_all().await,
                _ = &mut shutdown => return,
            }
        }
    }

    async fn check_all(&self) {
        for endpoint in &self.inner.endpoints {
            let up = endpoint.client.health_check().await;
            *endpoint.is_up.write().await = up;
            if !up {
                tracing::warn!(url = %endpoint.url, "attester endpoint is down");
                *endpoint.queued_tasks.write().await = 0;
            }
        }
    }

    /// spec §4.9: selects the attester with the fewest queued tasks among
    /// those currently marked up, refusing selection once the winner would
    /// already be at `max_queued_tasks`.
    pub async fn next_attester(&self) -> Result<Lease, super::DispatcherError> {
        let _guard = self.inner.selection_lock.lock().await;

        let mut best: Option<usize> = None;
        let mut best_tasks = self.inner.max_queued_tasks + 1;
        for (idx, endpoint) in self.inner.endpoints.iter().enumerate() {
            if *endpoint.is_up.read().await {
                let tasks = *endpoint.queued_tasks.read().await;
                if tasks < best_tasks {
                    best_tasks = tasks;
                    best = Some(idx);
                }
            }
        }

        if best_tasks >= self.inner.max_queued_tasks {
            return Err(super::DispatcherError::AtCapacity);
        }
        let index = best.ok_or(super::DispatcherError::NoAttesterAvailable)?;
        *self.inner.endpoints[index].queued_tasks.write().await += 1;
        Ok(Lease { pool: self.inner.clone(), index })
    }
}
