/// Datastore usado pelo job FreeScout
///
/// O job só precisa de leitura: app config, time, e hosts afetados por uma
/// CVE. A implementação padrão lê um arquivo YAML a cada chamada, então
/// alterações no arquivo valem para o próximo job sem reiniciar o worker.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::models::{AppConfig, HostVulnerabilitySummary, TeamLite};
use crate::utils::{AppError, AppResult};

#[async_trait]
pub trait Datastore: Send + Sync {
    async fn app_config(&self) -> AppResult<AppConfig>;

    async fn team_lite(&self, team_id: u64) -> AppResult<TeamLite>;

    /// Hosts afetados por uma CVE (caminho antigo, mais lento)
    async fn hosts_by_cve(&self, cve: &str) -> AppResult<Vec<HostVulnerabilitySummary>>;

    async fn host_vuln_summaries_by_software_ids(
        &self,
        software_ids: &[u64],
    ) -> AppResult<Vec<HostVulnerabilitySummary>>;
}

/// Estado do Fleet gravado no arquivo YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct FleetState {
    #[serde(default)]
    pub app_config: AppConfig,
    #[serde(default)]
    pub teams: Vec<TeamLite>,
    #[serde(default)]
    pub hosts: Vec<StateHost>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateHost {
    pub id: u64,
    pub hostname: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub software: Vec<InstalledSoftware>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledSoftware {
    pub id: u64,
    #[serde(default)]
    pub cves: Vec<String>,
    #[serde(default)]
    pub installed_paths: Vec<String>,
}

impl FleetState {
    /// Monta o resumo dos hosts com algum software que satisfaz `matches`
    ///
    /// Ordenado por id do host; caminhos sem duplicatas, na ordem do arquivo.
    fn summaries_where<F>(&self, matches: F) -> Vec<HostVulnerabilitySummary>
    where
        F: Fn(&InstalledSoftware) -> bool,
    {
        let mut by_host = BTreeMap::new();

        for host in &self.hosts {
            let mut matched = false;
            let mut seen = HashSet::new();
            let mut paths = Vec::new();

            for sw in host.software.iter().filter(|sw| matches(sw)) {
                matched = true;
                for path in &sw.installed_paths {
                    if seen.insert(path.as_str()) {
                        paths.push(path.clone());
                    }
                }
            }

            if matched {
                let display_name = if host.display_name.is_empty() {
                    host.hostname.clone()
                } else {
                    host.display_name.clone()
                };
                by_host.insert(
                    host.id,
                    HostVulnerabilitySummary {
                        id: host.id,
                        hostname: host.hostname.clone(),
                        display_name,
                        software_installed_paths: paths,
                    },
                );
            }
        }

        by_host.into_values().collect()
    }
}

/// Datastore baseado em arquivo YAML
#[derive(Debug, Clone)]
pub struct YamlDatastore {
    path: PathBuf,
}

impl YamlDatastore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> AppResult<FleetState> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::DatastoreError(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            AppError::DatastoreError(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl Datastore for YamlDatastore {
    async fn app_config(&self) -> AppResult<AppConfig> {
        Ok(self.load().await?.app_config)
    }

    async fn team_lite(&self, team_id: u64) -> AppResult<TeamLite> {
        self.load()
            .await?
            .teams
            .into_iter()
            .find(|t| t.id == team_id)
            .ok_or_else(|| AppError::DatastoreError(format!("team {} not found", team_id)))
    }

    async fn hosts_by_cve(&self, cve: &str) -> AppResult<Vec<HostVulnerabilitySummary>> {
        let state = self.load().await?;
        Ok(state.summaries_where(|sw| sw.cves.iter().any(|c| c.eq_ignore_ascii_case(cve))))
    }

    async fn host_vuln_summaries_by_software_ids(
        &self,
        software_ids: &[u64],
    ) -> AppResult<Vec<HostVulnerabilitySummary>> {
        let state = self.load().await?;
        Ok(state.summaries_where(|sw| software_ids.contains(&sw.id)))
    }
}
