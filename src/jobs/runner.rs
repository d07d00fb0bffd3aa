//! Worker pool: consome a fila em memória e executa os jobs registrados
//!
//! Falhas voltam para a fila depois de `retry_delay_ms` até o job atingir
//! `max_attempts` execuções; depois disso o job é descartado.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::queue::{MemoryJobQueue, QueuedJob};
use super::Job;
use crate::config::WorkerSettings;
use crate::utils::logging::*;

/// Resultado de uma execução
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Retrying,
    Discarded,
}

pub struct WorkerPool {
    queue: Arc<MemoryJobQueue>,
    jobs: HashMap<&'static str, Arc<dyn Job>>,
    settings: WorkerSettings,
}

impl WorkerPool {
    pub fn new(queue: Arc<MemoryJobQueue>, settings: WorkerSettings) -> Self {
        Self {
            queue,
            jobs: HashMap::new(),
            settings,
        }
    }

    pub fn register(mut self, job: Arc<dyn Job>) -> Self {
        self.jobs.insert(job.name(), job);
        self
    }

    /// Sobe `concurrency` workers (mínimo 1)
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let pool = Arc::new(self);
        let workers = pool.settings.concurrency.max(1);

        (0..workers)
            .map(|worker_id| {
                let pool = Arc::clone(&pool);
                tokio::spawn(async move {
                    tracing::debug!(worker_id, "worker started");
                    while let Some(job) = pool.queue.next_job().await {
                        pool.process(job).await;
                    }
                    tracing::debug!(worker_id, "worker stopped");
                })
            })
            .collect()
    }

    /// Executa um job e decide entre concluir, agendar retry ou descartar
    pub async fn process(&self, mut job: QueuedJob) -> JobOutcome {
        let Some(handler) = self.jobs.get(job.name.as_str()) else {
            log_job_discarded(&job.name, job.id, "unknown job name");
            return JobOutcome::Discarded;
        };

        let args = match serde_json::to_vec(&job.args) {
            Ok(args) => args,
            Err(e) => {
                log_job_discarded(&job.name, job.id, &e.to_string());
                return JobOutcome::Discarded;
            }
        };

        job.attempts += 1;
        let err = match handler.run(&args).await {
            Ok(()) => {
                tracing::debug!(job_name = %job.name, job_id = job.id, attempts = job.attempts, "job completed");
                return JobOutcome::Completed;
            }
            Err(e) => e,
        };

        log_job_failed(&job.name, job.id, job.attempts, &err.to_string());
        if job.attempts >= self.settings.max_attempts {
            log_job_discarded(&job.name, job.id, "max attempts reached");
            return JobOutcome::Discarded;
        }

        let queue = Arc::clone(&self.queue);
        let delay = Duration::from_millis(self.settings.retry_delay_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = queue.requeue(job) {
                log_error(&e.to_string());
            }
        });

        JobOutcome::Retrying
    }
}
