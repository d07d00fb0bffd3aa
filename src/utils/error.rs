use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use freescout::FreeScoutError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("FreeScout error: {0}")]
    FreeScout(#[from] FreeScoutError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Datastore error: {0}")]
    DatastoreError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Queue error: {0}")]
    QueueError(String),

    /// Erro de uma etapa do job, com o nome da etapa
    #[error("{step}: {source}")]
    Context {
        step: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Erro original, sem os rótulos de etapa
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Status HTTP correspondente (502 para falhas do FreeScout, para o push fazer retry)
    pub fn status_code(&self) -> StatusCode {
        match self.root() {
            AppError::FreeScout(FreeScoutError::InvalidOptions(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::FreeScout(_) => StatusCode::BAD_GATEWAY,
            AppError::JsonError(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Adiciona o nome da etapa ao erro, como `get FreeScout client: ...`
pub trait ResultExt<T> {
    fn context(self, step: &'static str) -> AppResult<T>;
}

impl<T, E: Into<AppError>> ResultExt<T> for Result<T, E> {
    fn context(self, step: &'static str) -> AppResult<T> {
        self.map_err(|e| AppError::Context {
            step,
            source: Box::new(e.into()),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
