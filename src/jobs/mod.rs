pub mod client_cache;
pub mod freescout;
pub mod queue;
pub mod runner;

use async_trait::async_trait;

use crate::utils::AppResult;

/// Job executado pelo worker a partir dos argumentos JSON da fila
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, args_json: &[u8]) -> AppResult<()>;
}

pub use client_cache::{ClientCache, ClientCacheKey};
pub use freescout::{http_client_factory, resolve_options, FreeScoutApi, FreeScoutJob, NewClientFn, FREESCOUT_JOB_NAME};
pub use queue::{
    queue_freescout_failing_policy_job, queue_freescout_vuln_jobs, JobQueue, MemoryJobQueue, QueuedJob,
};
pub use runner::{JobOutcome, WorkerPool};
