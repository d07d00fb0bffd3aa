use tracing::{debug, error, info, warn};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_request_processed(endpoint: &str, status: u16, duration_ms: u64) {
    info!("Request processed: {} - Status: {} - Duration: {}ms",
          endpoint, status, duration_ms);
}

pub fn log_job_queued(job_name: &str, job_id: u64) {
    debug!(job_name, job_id, "job queued");
}

pub fn log_job_failed(job_name: &str, job_id: u64, attempt: u32, error: &str) {
    warn!("Job {} #{} failed (attempt {}): {}", job_name, job_id, attempt, error);
}

pub fn log_job_discarded(job_name: &str, job_id: u64, reason: &str) {
    error!("❌ Job {} #{} discarded: {}", job_name, job_id, reason);
}

pub fn log_integration_disabled(key: &str) {
    debug!("FreeScout integration disabled for {}, skipping message", key);
}

pub fn log_freescout_api_error(step: &str, status: Option<u16>, error: &str) {
    error!("FreeScout API error: {} - Status: {:?} - Error: {}", step, status, error);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 FreeScout worker server starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("✅ Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
