/// Endpoints administrativos da integração FreeScout (protegidos por X-Admin-Key)

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use freescout_worker::models::{validate_freescout_integrations, Integrations};
use freescout_worker::utils::logging::*;
use freescout_worker::utils::AppResult;
use freescout_worker::AppState;

/// Valida uma lista de integrações antes de gravá-la no app config
///
/// 200 com `valid: true`, ou 422 com a lista de problemas por entrada.
pub async fn validate_integrations(Json(intgs): Json<Integrations>) -> (StatusCode, Json<Value>) {
    log_request_received("/admin/freescout/validate", "POST");

    let problems = validate_freescout_integrations(&intgs.freescout);
    for problem in &problems {
        log_validation_error(&format!("freescout[{}].{}", problem.index, problem.field), &problem.message);
    }

    let status = if problems.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    (
        status,
        Json(json!({
            "valid": problems.is_empty(),
            "problems": problems
        })),
    )
}

/// Problemas da configuração atualmente gravada no datastore
pub async fn check_current_integrations(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    log_request_received("/admin/freescout/integrations", "GET");

    let ac = state.datastore.app_config().await?;
    let problems = validate_freescout_integrations(&ac.integrations.freescout);

    Ok(Json(json!({
        "integrations": ac.integrations.freescout.len(),
        "valid": problems.is_empty(),
        "problems": problems
    })))
}
