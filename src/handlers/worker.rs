/// Worker Handler: executa um job FreeScout recebido por HTTP
///
/// Usado por filas com entrega via push (Cloud Tasks, Pub/Sub push etc.):
/// o corpo é o JSON de argumentos do job. O status HTTP decide o retry da fila:
/// - 200: conversa criada, ou integração desabilitada (nada a fazer)
/// - 400: argumentos inválidos (retry não adianta)
/// - 502: erro da API do FreeScout
/// - 500: demais erros (datastore, configuração)

use axum::{body::Bytes, extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::Instant;

use freescout_worker::models::FreeScoutArgs;
use freescout_worker::utils::logging::*;
use freescout_worker::utils::{AppResult, ResultExt};
use freescout_worker::AppState;

pub async fn handle_worker(State(state): State<Arc<AppState>>, body: Bytes) -> AppResult<Json<Value>> {
    let start_time = Instant::now();
    log_request_received("/worker/process", "POST");

    let result = process_job(&state, &body).await;

    let status = match &result {
        Ok(_) => 200,
        Err(e) => {
            tracing::debug!(error = %e, "freescout job failed");
            e.status_code().as_u16()
        }
    };
    log_request_processed("/worker/process", status, start_time.elapsed().as_millis() as u64);

    result.map(Json)
}

async fn process_job(state: &AppState, body: &[u8]) -> AppResult<Value> {
    let args: FreeScoutArgs = serde_json::from_slice(body).context("unmarshal args")?;

    let response = match state.freescout_job.process(&args).await? {
        Some(conversation_id) => {
            log_info(&format!("✅ FreeScout conversation {} ready ({})", conversation_id, args.kind()));
            json!({
                "status": "created",
                "kind": args.kind().as_str(),
                "conversation_id": conversation_id
            })
        }
        None => json!({
            "status": "skipped",
            "kind": args.kind().as_str(),
            "reason": "integration disabled"
        }),
    };

    Ok(response)
}
