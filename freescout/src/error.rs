//! Tipos de erro para o crate freescout

use thiserror::Error;

/// Erros do cliente FreeScout
#[derive(Debug, Error)]
pub enum FreeScoutError {
    /// Opções inválidas na construção do cliente (URL, token, mailbox...)
    #[error("invalid FreeScout options: {0}")]
    InvalidOptions(String),

    /// Erro de requisição HTTP (conexão, timeout, cancelamento)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Resposta não-2xx do FreeScout
    #[error("freescout request failed: status {status}: {message}")]
    Api { status: u16, message: String },

    /// Erro de parsing JSON
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl FreeScoutError {
    /// Status HTTP retornado pelo FreeScout, se o erro veio da API
    pub fn status(&self) -> Option<u16> {
        match self {
            FreeScoutError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Tipo Result padrão para o crate
pub type Result<T> = std::result::Result<T, FreeScoutError>;
