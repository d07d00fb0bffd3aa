//! Cache de clientes FreeScout por tipo de integração + time
//!
//! Um cliente só é reaproveitado enquanto as opções usadas para criá-lo forem
//! iguais às opções resolvidas agora; qualquer diferença recria o cliente.

use freescout::FreeScoutOptions;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use super::freescout::FreeScoutApi;
use crate::models::IntegrationKind;

/// Chave do cache: `vuln:`, `failingPolicy:` ou `failingPolicy:12`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientCacheKey {
    pub kind: IntegrationKind,
    /// `None` = configuração global
    pub team_id: Option<u64>,
}

impl ClientCacheKey {
    pub fn new(kind: IntegrationKind, team_id: Option<u64>) -> Self {
        Self { kind, team_id }
    }
}

impl fmt::Display for ClientCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.team_id {
            Some(id) => write!(f, "{}:{}", self.kind, id),
            None => write!(f, "{}:", self.kind),
        }
    }
}

/// Mapa chave -> cliente, protegido por um único mutex
///
/// O job pode rodar em paralelo; o lock cobre a decisão inteira de
/// reaproveitar, recriar ou remover, mas não a leitura da configuração.
#[derive(Default)]
pub struct ClientCache {
    clients: Mutex<HashMap<ClientCacheKey, Arc<dyn FreeScoutApi>>>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retorna o cliente para `key` de acordo com as opções resolvidas
    ///
    /// - `None`: integração desabilitada, remove a entrada e retorna `None`.
    /// - Entrada com as mesmas opções: retorna a existente, sem chamar `build`.
    /// - Caso contrário: chama `build`, grava (sobrescrevendo) e retorna.
    ///
    /// Se `build` falhar o erro é repassado e nenhuma entrada nova é gravada.
    pub fn resolve<F, E>(
        &self,
        key: ClientCacheKey,
        options: Option<&FreeScoutOptions>,
        build: F,
    ) -> Result<Option<Arc<dyn FreeScoutApi>>, E>
    where
        F: FnOnce(&FreeScoutOptions) -> Result<Arc<dyn FreeScoutApi>, E>,
    {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(opts) = options else {
            clients.remove(&key);
            return Ok(None);
        };

        if let Some(cli) = clients.get(&key) {
            if cli.config_matches(opts) {
                return Ok(Some(Arc::clone(cli)));
            }
        }

        let cli = build(opts)?;
        clients.insert(key, Arc::clone(&cli));
        Ok(Some(cli))
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn contains(&self, key: &ClientCacheKey) -> bool {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}
