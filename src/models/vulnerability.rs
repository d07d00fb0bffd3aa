use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vulnerabilidade recente detectada em um software
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareVulnerability {
    pub cve: String,
    pub software_id: u64,
}

/// Metadados de uma CVE (NVD, EPSS, CISA)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CveMeta {
    pub cve: String,
    #[serde(default)]
    pub cvss_score: Option<f64>,
    #[serde(default)]
    pub epss_probability: Option<f64>,
    #[serde(default)]
    pub cisa_known_exploit: Option<bool>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

/// Política avaliada pelo Fleet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub team_id: Option<u64>,
}
