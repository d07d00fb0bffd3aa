// Biblioteca do worker FreeScout
// Expõe módulos para uso em testes e no binário

pub mod config;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub datastore: Arc<dyn services::Datastore>,
    pub freescout_job: Arc<jobs::FreeScoutJob>,
    pub queue: Arc<jobs::MemoryJobQueue>,
}
