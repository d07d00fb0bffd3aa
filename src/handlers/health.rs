use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use freescout_worker::utils::logging::*;
use freescout_worker::AppState;

pub async fn health_check() -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": "freescout-worker",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Pronto quando o datastore pode ser lido
///
/// Também informa quais integrações globais estão habilitadas, útil para
/// conferir se uma mudança no arquivo de estado já foi aplicada.
pub async fn ready_check(State(state): State<Arc<AppState>>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    log_health_check();

    match state.datastore.app_config().await {
        Ok(ac) => {
            let intgs = &ac.integrations.freescout;
            Ok(Json(json!({
                "ready": true,
                "service": "freescout-worker",
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "freescout": {
                    "integrations": intgs.len(),
                    "software_vulnerabilities_enabled": intgs.iter().any(|i| i.enable_software_vulnerabilities),
                    "failing_policies_enabled": intgs.iter().any(|i| i.enable_failing_policies),
                    "cached_clients": state.freescout_job.clients().len()
                }
            })))
        }
        Err(e) => {
            log_error(&format!("Datastore not ready: {}", e));
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "ready": false,
                    "error": e.to_string()
                })),
            ))
        }
    }
}
