/// Job FreeScout: abre (ou atualiza) uma conversa no FreeScout para uma
/// vulnerabilidade detectada ou uma política com falha.
///
/// Fluxo, sem estado intermediário persistido:
/// 1. Parseia os argumentos do job
/// 2. Resolve a configuração (global ou do time) e o cliente via cache
/// 3. Sem integração habilitada: sucesso sem ação (foi desabilitada depois
///    que a mensagem entrou na fila)
/// 4. Monta assunto/corpo e cria a conversa

use async_trait::async_trait;
use freescout::{FreeScoutClient, FreeScoutOptions};
use std::sync::Arc;

use super::client_cache::{ClientCache, ClientCacheKey};
use super::Job;
use crate::models::{FailingPolicyArgs, FreeScoutArgs, FreeScoutIntegration, IntegrationKind, VulnArgs};
use crate::services::{Datastore, FailingPolicyMessage, RenderedMessage, VulnMessage};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult, ResultExt};

/// Nome do job registrado no worker
pub const FREESCOUT_JOB_NAME: &str = "freescout";

/// Operações do cliente FreeScout usadas pelo job
#[async_trait]
pub trait FreeScoutApi: Send + Sync {
    async fn create_conversation(&self, subject: &str, body: &str) -> freescout::Result<i64>;

    fn config_matches(&self, opts: &FreeScoutOptions) -> bool;
}

#[async_trait]
impl FreeScoutApi for FreeScoutClient {
    async fn create_conversation(&self, subject: &str, body: &str) -> freescout::Result<i64> {
        FreeScoutClient::create_conversation(self, subject, body).await
    }

    fn config_matches(&self, opts: &FreeScoutOptions) -> bool {
        FreeScoutClient::config_matches(self, opts)
    }
}

/// Constrói um cliente a partir das opções (pode falhar: URL inválida etc.)
pub type NewClientFn =
    Arc<dyn Fn(&FreeScoutOptions) -> freescout::Result<Arc<dyn FreeScoutApi>> + Send + Sync>;

/// Fábrica padrão: cliente HTTP real
pub fn http_client_factory() -> NewClientFn {
    Arc::new(|opts: &FreeScoutOptions| -> freescout::Result<Arc<dyn FreeScoutApi>> {
        Ok(Arc::new(FreeScoutClient::new(opts.clone())?))
    })
}

pub struct FreeScoutJob {
    fleet_url: String,
    datastore: Arc<dyn Datastore>,
    new_client: NewClientFn,
    clients: ClientCache,
}

impl FreeScoutJob {
    pub fn new(fleet_url: impl Into<String>, datastore: Arc<dyn Datastore>, new_client: NewClientFn) -> Self {
        Self {
            fleet_url: fleet_url.into(),
            datastore,
            new_client,
            clients: ClientCache::new(),
        }
    }

    pub fn clients(&self) -> &ClientCache {
        &self.clients
    }

    /// Processa argumentos já parseados
    ///
    /// Retorna o ID da conversa, ou `None` quando a integração está desabilitada.
    pub async fn process(&self, args: &FreeScoutArgs) -> AppResult<Option<i64>> {
        let Some(cli) = self.get_client(args).await.context("get FreeScout client")? else {
            log_integration_disabled(&ClientCacheKey::new(args.kind(), args.team_id()).to_string());
            return Ok(None);
        };

        let conversation_id = match args {
            FreeScoutArgs::Vulnerability(vargs) => self.run_vuln(cli.as_ref(), vargs).await?,
            FreeScoutArgs::FailingPolicy(pargs) => self.run_failing_policy(cli.as_ref(), pargs).await?,
        };
        Ok(Some(conversation_id))
    }

    /// Retorna `None` se não há integração habilitada para a mensagem
    async fn get_client(&self, args: &FreeScoutArgs) -> AppResult<Option<Arc<dyn FreeScoutApi>>> {
        let key = ClientCacheKey::new(args.kind(), args.team_id());

        // a configuração é lida antes do lock: ela decide se o cliente em
        // cache ainda serve
        let opts = resolve_options(self.datastore.as_ref(), args.kind(), args.team_id()).await?;

        self.clients.resolve(key, opts.as_ref(), |opts| {
            tracing::debug!(key = %key, "creating FreeScout client");
            (self.new_client)(opts).map_err(AppError::from)
        })
    }

    async fn run_vuln(&self, cli: &dyn FreeScoutApi, vargs: &VulnArgs) -> AppResult<i64> {
        // payloads antigos não têm software ids: busca pela CVE (mais lento)
        let hosts = if vargs.affected_software_ids.is_empty() {
            self.datastore.hosts_by_cve(&vargs.cve).await
        } else {
            self.datastore
                .host_vuln_summaries_by_software_ids(&vargs.affected_software_ids)
                .await
        }
        .context("fetching hosts")?;

        let message = VulnMessage {
            fleet_url: &self.fleet_url,
            cve: &vargs.cve,
            hosts: &hosts,
            epss_probability: vargs.epss_probability,
            cvss_score: vargs.cvss_score,
            cisa_known_exploit: vargs.cisa_known_exploit,
            cve_published: vargs.cve_published,
        }
        .render()
        .context("execute vulnerability template")?;

        let conversation_id = create_templated_conversation(cli, &message).await?;
        tracing::debug!(
            cve = %vargs.cve,
            conversation_id,
            "created freescout conversation for cve"
        );
        Ok(conversation_id)
    }

    async fn run_failing_policy(&self, cli: &dyn FreeScoutApi, pargs: &FailingPolicyArgs) -> AppResult<i64> {
        let message = FailingPolicyMessage {
            fleet_url: &self.fleet_url,
            policy_id: pargs.policy_id,
            policy_name: &pargs.policy_name,
            policy_critical: pargs.policy_critical,
            team_id: pargs.team_id,
            hosts: &pargs.hosts,
        }
        .render()
        .context("execute failing policy template")?;

        let conversation_id = create_templated_conversation(cli, &message).await?;
        tracing::debug!(
            policy_id = pargs.policy_id,
            policy_name = %pargs.policy_name,
            team_id = ?pargs.team_id,
            conversation_id,
            "created freescout conversation for failing policy"
        );
        Ok(conversation_id)
    }
}

#[async_trait]
impl Job for FreeScoutJob {
    fn name(&self) -> &'static str {
        FREESCOUT_JOB_NAME
    }

    async fn run(&self, args_json: &[u8]) -> AppResult<()> {
        let args: FreeScoutArgs = serde_json::from_slice(args_json).context("unmarshal args")?;
        self.process(&args).await?;
        Ok(())
    }
}

async fn create_templated_conversation(cli: &dyn FreeScoutApi, message: &RenderedMessage) -> AppResult<i64> {
    cli.create_conversation(&message.summary, &message.body)
        .await
        .map_err(|e| {
            log_freescout_api_error("create conversation", e.status(), &e.to_string());
            e
        })
        .context("create conversation")
}

/// Opções da integração habilitada para o tipo/time, ou `None`
///
/// Mensagens de time (apenas políticas com falha) usam somente a configuração
/// do time, completada com as credenciais da global. Vale a primeira
/// integração habilitada, na ordem da configuração.
pub async fn resolve_options(
    datastore: &dyn Datastore,
    kind: IntegrationKind,
    team_id: Option<u64>,
) -> AppResult<Option<FreeScoutOptions>> {
    let ac = datastore.app_config().await?;

    if let (IntegrationKind::FailingPolicy, Some(team_id)) = (kind, team_id) {
        let tm = datastore.team_lite(team_id).await?;
        let intgs = tm.config.integrations.match_with_integrations(&ac.integrations)?;
        return Ok(intgs
            .iter()
            .find(|intg| intg.enable_failing_policies)
            .map(FreeScoutIntegration::to_options));
    }

    Ok(ac
        .integrations
        .freescout
        .iter()
        .find(|intg| match kind {
            IntegrationKind::Vulnerability => intg.enable_software_vulnerabilities,
            IntegrationKind::FailingPolicy => intg.enable_failing_policies,
        })
        .map(FreeScoutIntegration::to_options))
}
