pub mod datastore;
pub mod templates;

pub use datastore::{Datastore, YamlDatastore};
pub use templates::{FailingPolicyMessage, RenderedMessage, VulnMessage};
