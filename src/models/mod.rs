pub mod host;
pub mod integrations;
pub mod job_args;
pub mod vulnerability;

pub use host::{HostVulnerabilitySummary, PolicySetHost};
pub use integrations::{
    validate_freescout_integrations, AppConfig, FreeScoutIntegration, IntegrationProblem, Integrations,
    TeamConfig, TeamFreeScoutIntegration, TeamIntegrations, TeamLite,
};
pub use job_args::{FailingPolicyArgs, FreeScoutArgs, IntegrationKind, VulnArgs};
pub use vulnerability::{CveMeta, Policy, SoftwareVulnerability};
