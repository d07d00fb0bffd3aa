/// Endpoints dos produtores: recebem o resultado do scan / da avaliação de
/// políticas e enfileiram os jobs FreeScout no worker pool

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use freescout_worker::jobs::{queue_freescout_failing_policy_job, queue_freescout_vuln_jobs};
use freescout_worker::models::{CveMeta, Policy, PolicySetHost, SoftwareVulnerability};
use freescout_worker::utils::logging::*;
use freescout_worker::utils::AppResult;
use freescout_worker::AppState;

#[derive(Debug, Deserialize)]
pub struct VulnerabilitiesRequest {
    pub vulnerabilities: Vec<SoftwareVulnerability>,
    #[serde(default)]
    pub cve_meta: Vec<CveMeta>,
}

#[derive(Debug, Deserialize)]
pub struct FailingPolicyRequest {
    pub policy: Policy,
    #[serde(default)]
    pub hosts: Vec<PolicySetHost>,
}

pub async fn queue_vulnerabilities(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VulnerabilitiesRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    log_request_received("/jobs/vulnerabilities", "POST");

    let cve_meta: HashMap<String, CveMeta> = req
        .cve_meta
        .into_iter()
        .map(|meta| (meta.cve.clone(), meta))
        .collect();

    let jobs = queue_freescout_vuln_jobs(state.queue.as_ref(), &req.vulnerabilities, &cve_meta).await?;
    let job_ids: Vec<u64> = jobs.iter().map(|j| j.id).collect();

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "queued": job_ids.len(),
            "job_ids": job_ids
        })),
    ))
}

pub async fn queue_failing_policy(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FailingPolicyRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    log_request_received("/jobs/failing-policy", "POST");

    let response = match queue_freescout_failing_policy_job(state.queue.as_ref(), &req.policy, &req.hosts).await? {
        Some(job) => (
            StatusCode::ACCEPTED,
            Json(json!({ "queued": true, "job_id": job.id })),
        ),
        None => (
            StatusCode::OK,
            Json(json!({ "queued": false, "reason": "no failing hosts" })),
        ),
    };

    Ok(response)
}
