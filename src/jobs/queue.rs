//! Fila de jobs e produtores FreeScout
//!
//! Os produtores montam os argumentos do job a partir do resultado do scan de
//! vulnerabilidades / avaliação de políticas e enfileiram um job por CVE ou
//! por política.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, Mutex};

use super::freescout::FREESCOUT_JOB_NAME;
use crate::models::{CveMeta, FailingPolicyArgs, FreeScoutArgs, Policy, PolicySetHost, SoftwareVulnerability, VulnArgs};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

/// Job enfileirado
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueuedJob {
    pub id: u64,
    pub name: String,
    pub args: serde_json::Value,
    /// Execuções já feitas (0 ao enfileirar)
    pub attempts: u32,
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn queue_job(&self, name: &str, args: serde_json::Value) -> AppResult<QueuedJob>;
}

/// Fila em memória consumida pelo worker pool
pub struct MemoryJobQueue {
    sender: mpsc::UnboundedSender<QueuedJob>,
    receiver: Mutex<mpsc::UnboundedReceiver<QueuedJob>>,
    next_id: AtomicU64,
}

impl Default for MemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
            next_id: AtomicU64::new(1),
        }
    }

    /// Próximo job da fila; espera enquanto estiver vazia
    ///
    /// Vários workers podem chamar em paralelo: o receiver fica atrás de um
    /// mutex e cada job é entregue a um único worker.
    pub async fn next_job(&self) -> Option<QueuedJob> {
        self.receiver.lock().await.recv().await
    }

    /// Job pronto, sem esperar
    ///
    /// Não bloqueia nem quando outro worker está parado em `next_job`
    /// segurando o receiver: nesse caso retorna `None`.
    pub fn try_next_job(&self) -> Option<QueuedJob> {
        self.receiver.try_lock().ok()?.try_recv().ok()
    }

    /// Devolve um job que falhou para a fila, mantendo id e tentativas
    pub fn requeue(&self, job: QueuedJob) -> AppResult<()> {
        self.sender
            .send(job)
            .map_err(|e| AppError::QueueError(format!("failed to requeue job {}: queue closed", e.0.id)))
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn queue_job(&self, name: &str, args: serde_json::Value) -> AppResult<QueuedJob> {
        let job = QueuedJob {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            args,
            attempts: 0,
        };

        self.sender
            .send(job.clone())
            .map_err(|_| AppError::QueueError(format!("failed to queue job {}: queue closed", name)))?;

        log_job_queued(&job.name, job.id);
        Ok(job)
    }
}

async fn queue_freescout_job(queue: &dyn JobQueue, args: &FreeScoutArgs) -> AppResult<QueuedJob> {
    let args = serde_json::to_value(args)?;
    queue.queue_job(FREESCOUT_JOB_NAME, args).await
}

/// Enfileira um job por CVE com todos os softwares afetados
///
/// Metadados da CVE (EPSS, CVSS, CISA, publicação) entram no job quando
/// conhecidos. A ordem dos jobs segue a ordem alfabética das CVEs.
pub async fn queue_freescout_vuln_jobs(
    queue: &dyn JobQueue,
    recent_vulns: &[SoftwareVulnerability],
    cve_meta: &HashMap<String, CveMeta>,
) -> AppResult<Vec<QueuedJob>> {
    let mut by_cve: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for vuln in recent_vulns {
        let ids = by_cve.entry(vuln.cve.as_str()).or_default();
        if !ids.contains(&vuln.software_id) {
            ids.push(vuln.software_id);
        }
    }

    let cves: Vec<&str> = by_cve.keys().copied().collect();
    tracing::info!(enabled = true, recent_vulns = ?cves, "queueing freescout vulnerability jobs");

    let mut jobs = Vec::with_capacity(by_cve.len());
    for (cve, software_ids) in by_cve {
        let meta = cve_meta.get(cve);
        let args = FreeScoutArgs::Vulnerability(VulnArgs {
            cve: cve.to_string(),
            affected_software_ids: software_ids,
            epss_probability: meta.and_then(|m| m.epss_probability),
            cvss_score: meta.and_then(|m| m.cvss_score),
            cisa_known_exploit: meta.and_then(|m| m.cisa_known_exploit),
            cve_published: meta.and_then(|m| m.published),
        });

        jobs.push(queue_freescout_job(queue, &args).await?);
    }

    Ok(jobs)
}

/// Enfileira o job de uma política com falha
///
/// Sem hosts não há o que reportar: retorna `None` sem enfileirar.
pub async fn queue_freescout_failing_policy_job(
    queue: &dyn JobQueue,
    policy: &Policy,
    hosts: &[PolicySetHost],
) -> AppResult<Option<QueuedJob>> {
    if hosts.is_empty() {
        tracing::debug!(
            policy_id = policy.id,
            policy_name = %policy.name,
            "skipping, no host"
        );
        return Ok(None);
    }

    tracing::info!(
        failing_policy = policy.id,
        hosts_count = hosts.len(),
        team_id = ?policy.team_id,
        "queueing freescout failing policy job"
    );

    let args = FreeScoutArgs::FailingPolicy(FailingPolicyArgs {
        policy_id: policy.id,
        policy_name: policy.name.clone(),
        policy_critical: policy.critical,
        team_id: policy.team_id,
        hosts: hosts.to_vec(),
    });

    queue_freescout_job(queue, &args).await.map(Some)
}
