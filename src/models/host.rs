use serde::{Deserialize, Serialize};

/// Host afetado por uma vulnerabilidade, com os caminhos do software instalado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVulnerabilitySummary {
    pub id: u64,
    pub hostname: String,
    pub display_name: String,
    #[serde(default)]
    pub software_installed_paths: Vec<String>,
}

/// Host que falhou uma política
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySetHost {
    pub id: u64,
    pub hostname: String,
    pub display_name: String,
}
