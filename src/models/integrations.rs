//! Configuração das integrações FreeScout (global e por time)
//!
//! O formulário de administração grava essas estruturas; as regras que ele
//! aplica aos campos ficam em [`validate_freescout_integrations`].

use freescout::FreeScoutOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use crate::utils::{AppError, AppResult};

/// Configuração global da aplicação (apenas a parte usada pela integração)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub integrations: Integrations,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Integrations {
    #[serde(default)]
    pub freescout: Vec<FreeScoutIntegration>,
}

/// Uma integração FreeScout configurada globalmente
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeScoutIntegration {
    pub url: String,
    pub api_token: String,
    pub mailbox_id: i64,
    pub customer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign_to: Option<i64>,
    #[serde(default)]
    pub enable_software_vulnerabilities: bool,
    #[serde(default)]
    pub enable_failing_policies: bool,
}

impl FreeScoutIntegration {
    pub fn to_options(&self) -> FreeScoutOptions {
        FreeScoutOptions {
            url: self.url.clone(),
            api_token: self.api_token.clone(),
            mailbox_id: self.mailbox_id,
            customer_email: self.customer_email.clone(),
            assign_to: self.assign_to,
        }
    }
}

/// Time com sua configuração (versão enxuta)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamLite {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub config: TeamConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamConfig {
    #[serde(default)]
    pub integrations: TeamIntegrations,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamIntegrations {
    #[serde(default)]
    pub freescout: Vec<TeamFreeScoutIntegration>,
}

/// Integração de time: referencia uma integração global por (url, mailbox_id)
/// e só liga/desliga as políticas com falha daquele time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamFreeScoutIntegration {
    pub url: String,
    pub mailbox_id: i64,
    #[serde(default)]
    pub enable_failing_policies: bool,
}

impl TeamIntegrations {
    /// Completa as integrações do time com token, e-mail e responsável da global
    ///
    /// Cada entrada do time precisa ter uma global correspondente; caso
    /// contrário a configuração do time está inconsistente e é erro.
    pub fn match_with_integrations(&self, global: &Integrations) -> AppResult<Vec<FreeScoutIntegration>> {
        self.freescout
            .iter()
            .map(|team_intg| {
                let global_intg = global
                    .freescout
                    .iter()
                    .find(|g| g.url == team_intg.url && g.mailbox_id == team_intg.mailbox_id)
                    .ok_or_else(|| {
                        AppError::ConfigError(format!(
                            "unknown FreeScout integration for url {} and mailbox {}",
                            team_intg.url, team_intg.mailbox_id
                        ))
                    })?;

                Ok(FreeScoutIntegration {
                    url: team_intg.url.clone(),
                    api_token: global_intg.api_token.clone(),
                    mailbox_id: team_intg.mailbox_id,
                    customer_email: global_intg.customer_email.clone(),
                    assign_to: global_intg.assign_to,
                    enable_software_vulnerabilities: false,
                    enable_failing_policies: team_intg.enable_failing_policies,
                })
            })
            .collect()
    }
}

/// Problema encontrado em uma integração
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrationProblem {
    /// Posição da integração na lista
    pub index: usize,
    pub field: &'static str,
    pub message: String,
}

impl IntegrationProblem {
    fn new(index: usize, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            index,
            field,
            message: message.into(),
        }
    }
}

/// Regras do formulário de administração para integrações FreeScout
///
/// Retorna todos os problemas encontrados (lista vazia = válido).
pub fn validate_freescout_integrations(integrations: &[FreeScoutIntegration]) -> Vec<IntegrationProblem> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    let mut vuln_enabled = 0;
    let mut policies_enabled = 0;

    for (i, intg) in integrations.iter().enumerate() {
        match Url::parse(&intg.url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") && u.host_str().is_some() => {}
            Ok(_) => problems.push(IntegrationProblem::new(i, "url", "URL must use http or https and include a host")),
            Err(e) => problems.push(IntegrationProblem::new(i, "url", format!("invalid URL: {}", e))),
        }
        if intg.api_token.trim().is_empty() {
            problems.push(IntegrationProblem::new(i, "api_token", "API token is required"));
        }
        if intg.mailbox_id <= 0 {
            problems.push(IntegrationProblem::new(i, "mailbox_id", "mailbox id must be positive"));
        }
        if !intg.customer_email.contains('@') {
            problems.push(IntegrationProblem::new(i, "customer_email", "customer email must be an email address"));
        }
        if matches!(intg.assign_to, Some(id) if id <= 0) {
            problems.push(IntegrationProblem::new(i, "assign_to", "assignee id must be positive"));
        }

        if !seen.insert((intg.url.trim_end_matches('/').to_string(), intg.mailbox_id)) {
            problems.push(IntegrationProblem::new(i, "url", "duplicate integration for this URL and mailbox"));
        }

        if intg.enable_software_vulnerabilities {
            vuln_enabled += 1;
            if vuln_enabled > 1 {
                problems.push(IntegrationProblem::new(
                    i,
                    "enable_software_vulnerabilities",
                    "only one FreeScout integration can enable software vulnerabilities",
                ));
            }
        }
        if intg.enable_failing_policies {
            policies_enabled += 1;
            if policies_enabled > 1 {
                problems.push(IntegrationProblem::new(
                    i,
                    "enable_failing_policies",
                    "only one FreeScout integration can enable failing policies",
                ));
            }
        }
    }

    problems
}
