//! Argumentos do job FreeScout
//!
//! Formato JSON gravado na fila (exatamente uma chave):
//!
//! ```text
//! { "vulnerability": { "cve": "CVE-2024-0001", "affected_software_ids": [1, 2] } }
//! { "failing_policy": { "policy_id": 5, "policy_name": "Disk encryption", "hosts": [...] } }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::host::PolicySetHost;

/// Tipo da integração, define o caminho de configuração e os templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrationKind {
    Vulnerability,
    FailingPolicy,
}

impl IntegrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationKind::Vulnerability => "vuln",
            IntegrationKind::FailingPolicy => "failingPolicy",
        }
    }
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreeScoutArgs {
    Vulnerability(VulnArgs),
    FailingPolicy(FailingPolicyArgs),
}

impl FreeScoutArgs {
    pub fn kind(&self) -> IntegrationKind {
        match self {
            FreeScoutArgs::Vulnerability(_) => IntegrationKind::Vulnerability,
            FreeScoutArgs::FailingPolicy(_) => IntegrationKind::FailingPolicy,
        }
    }

    /// Time da mensagem; só políticas com falha podem ser de um time
    pub fn team_id(&self) -> Option<u64> {
        match self {
            FreeScoutArgs::Vulnerability(_) => None,
            FreeScoutArgs::FailingPolicy(p) => p.team_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnArgs {
    pub cve: String,
    /// Vazio em payloads antigos: nesse caso os hosts são buscados pela CVE
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_software_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epss_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cisa_known_exploit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve_published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailingPolicyArgs {
    pub policy_id: u64,
    pub policy_name: String,
    #[serde(default)]
    pub policy_critical: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
    #[serde(default)]
    pub hosts: Vec<PolicySetHost>,
}
