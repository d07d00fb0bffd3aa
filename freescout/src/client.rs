//! Cliente HTTP para a API do FreeScout

use crate::error::{FreeScoutError, Result};
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Header de autenticação da API do FreeScout
pub const API_KEY_HEADER: &str = "X-FreeScout-API-Key";

/// Opções usadas para construir um [`FreeScoutClient`]
///
/// Comparadas por igualdade estrutural: o cache de clientes do worker usa
/// isso para detectar que a configuração mudou desde a criação do cliente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeScoutOptions {
    pub url: String,
    pub api_token: String,
    pub mailbox_id: i64,
    pub customer_email: String,
    pub assign_to: Option<i64>,
}

/// Cliente para interagir com a API do FreeScout
#[derive(Clone)]
pub struct FreeScoutClient {
    http_client: HttpClient,
    opts: FreeScoutOptions,
    base_url: String,
}

impl FreeScoutClient {
    /// Cria um novo cliente FreeScout
    ///
    /// # Timeouts
    ///
    /// - Total: 30s
    /// - Connect: 5s
    pub fn new(opts: FreeScoutOptions) -> Result<Self> {
        Self::with_timeouts(opts, 30, 5)
    }

    /// Cria um novo cliente com timeouts customizados
    pub fn with_timeouts(
        opts: FreeScoutOptions,
        total_timeout_secs: u64,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let base_url = validate_options(&opts)?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(total_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            // um 3xx precisa chegar em handle_response como erro
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| FreeScoutError::InvalidOptions(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            opts,
            base_url,
        })
    }

    /// Retorna true se o cliente foi construído com exatamente essas opções
    pub fn config_matches(&self, opts: &FreeScoutOptions) -> bool {
        self.opts == *opts
    }

    /// Opções originais (sem normalização) do cliente
    pub fn options(&self) -> &FreeScoutOptions {
        &self.opts
    }

    /// URL base sem `/` no final
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Executa uma requisição GET com query string e parseia JSON
    pub(crate) async fn get_json<T, Q>(&self, endpoint: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(API_KEY_HEADER, &self.opts.api_token)
            .header("Content-Type", "application/json")
            .query(query)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Executa uma requisição POST com corpo JSON
    pub(crate) async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);

        tracing::debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.opts.api_token)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Processa a resposta HTTP: qualquer status fora de 2xx vira erro
    async fn handle_response(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let error_body = response.text().await.unwrap_or_default();
        let message = error_body.trim().to_string();

        tracing::debug!("FreeScout API error ({}): {}", status_code, message);

        Err(FreeScoutError::Api {
            status: status_code,
            message,
        })
    }
}

/// Valida as opções e retorna a URL base normalizada
fn validate_options(opts: &FreeScoutOptions) -> Result<String> {
    if opts.url.is_empty() {
        return Err(FreeScoutError::InvalidOptions("missing FreeScout URL".to_string()));
    }

    let parsed = Url::parse(&opts.url)
        .map_err(|e| FreeScoutError::InvalidOptions(format!("invalid FreeScout URL {}: {}", opts.url, e)))?;
    if parsed.scheme().is_empty() || parsed.host_str().map_or(true, str::is_empty) {
        return Err(FreeScoutError::InvalidOptions("invalid FreeScout URL".to_string()));
    }

    if opts.api_token.is_empty() {
        return Err(FreeScoutError::InvalidOptions("missing FreeScout API token".to_string()));
    }
    if opts.mailbox_id <= 0 {
        return Err(FreeScoutError::InvalidOptions(format!(
            "invalid FreeScout mailbox id: {}",
            opts.mailbox_id
        )));
    }
    if opts.customer_email.is_empty() {
        return Err(FreeScoutError::InvalidOptions("missing FreeScout customer email".to_string()));
    }

    Ok(opts.url.trim_end_matches('/').to_string())
}
