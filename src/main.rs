/// Main Application: worker da integração Fleet -> FreeScout
///
/// Arquitetura:
/// - Produtores (`/jobs/*`) enfileiram um job por CVE ou por política com falha
/// - Worker pool consome a fila em memória, com retry
/// - `/worker/process` executa um job entregue por uma fila push externa
/// - Cada job resolve a integração habilitada e cria/atualiza a conversa no FreeScout

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use freescout_worker::config::Settings;
use freescout_worker::jobs::{http_client_factory, FreeScoutJob, MemoryJobQueue, WorkerPool};
use freescout_worker::middleware as app_middleware;
use freescout_worker::models::validate_freescout_integrations;
use freescout_worker::services::{Datastore, YamlDatastore};
use freescout_worker::utils::{logging::*, AppError};
use freescout_worker::AppState;

mod handlers;

use handlers::{
    check_current_integrations, handle_worker, health_check, queue_failing_policy, queue_vulnerabilities,
    ready_check, validate_integrations,
};

fn build_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/admin/freescout/validate", post(validate_integrations))
        .route("/admin/freescout/integrations", get(check_current_integrations))
        .layer(middleware::from_fn(app_middleware::require_admin_key));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/worker/process", post(handle_worker))
        .route("/jobs/vulnerabilities", post(queue_vulnerabilities))
        .route("/jobs/failing-policy", post(queue_failing_policy))
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Avisa na subida se o app config atual tem integrações inválidas
async fn check_integrations_on_startup(datastore: &dyn Datastore) {
    match datastore.app_config().await {
        Ok(ac) => {
            let problems = validate_freescout_integrations(&ac.integrations.freescout);
            if problems.is_empty() {
                log_info(&format!(
                    "📄 {} FreeScout integration(s) configured",
                    ac.integrations.freescout.len()
                ));
            }
            for problem in problems {
                log_warning(&format!(
                    "⚠️ FreeScout integration #{} invalid {}: {}",
                    problem.index, problem.field, problem.message
                ));
            }
        }
        Err(e) => log_warning(&format!("⚠️ Could not read datastore on startup: {}", e)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if dotenv_loaded {
        tracing::info!("✅ Arquivo .env carregado com sucesso");
    } else {
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    let settings = Settings::new()
        .map_err(|e| AppError::ConfigError(format!("Failed to load settings: {}", e)))?;

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    let datastore: Arc<dyn Datastore> = Arc::new(YamlDatastore::new(&settings.datastore.path));
    check_integrations_on_startup(datastore.as_ref()).await;

    let freescout_job = Arc::new(FreeScoutJob::new(
        settings.fleet.server_url.clone(),
        Arc::clone(&datastore),
        http_client_factory(),
    ));
    let queue = Arc::new(MemoryJobQueue::new());

    let workers = WorkerPool::new(Arc::clone(&queue), settings.worker.clone())
        .register(freescout_job.clone())
        .spawn();
    log_info(&format!("👷 {} worker(s) started", workers.len()));

    let state = Arc::new(AppState {
        settings: settings.clone(),
        datastore,
        freescout_job,
        queue,
    });

    let app = build_router(state);

    let port = settings.server.port;
    let listener = TcpListener::bind(format!("{}:{}", settings.server.host, port)).await?;

    log_server_startup(port);
    log_server_ready(port);

    // Graceful shutdown com signal handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // jobs ainda na fila em memória são perdidos aqui
    for worker in workers {
        worker.abort();
    }
    log_info("👋 Server stopped");

    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
