pub mod settings;

pub use settings::{DatastoreSettings, FleetSettings, ServerSettings, Settings, WorkerSettings};
