use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub fleet: FleetSettings,
    pub datastore: DatastoreSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FleetSettings {
    /// URL pública do Fleet, usada nos links das mensagens
    pub server_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatastoreSettings {
    /// Arquivo YAML com app config, times e hosts
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkerSettings {
    /// Número de jobs processados em paralelo
    pub concurrency: usize,
    /// Total de tentativas por job (inclui a primeira)
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_attempts: 3,
            retry_delay_ms: 5_000,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("datastore.path", "config/fleet_state.yaml")?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Cloud Run e afins injetam a porta em PORT
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(url) = std::env::var("FLEET_SERVER_URL") {
            builder = builder.set_override("fleet.server_url", url)?;
        }

        // FREESCOUT_WORKER__WORKER__CONCURRENCY=8 -> worker.concurrency
        builder = builder.add_source(Environment::with_prefix("FREESCOUT_WORKER").separator("__"));

        let s = builder.build()?;

        s.try_deserialize()
    }
}
