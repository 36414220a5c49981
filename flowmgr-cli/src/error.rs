use flowmgr_config::ConfigError;
use flowmgr_core::{ResourceError, ResourceKind};
use flowmgr_registry::RegistryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("output encoding error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no devices configured")]
    NoDevices,

    #[error("stress worker panicked")]
    WorkerPanicked,

    #[error("{kind} leaked {in_use} entries and {flows} flows after stress run")]
    Leak {
        kind: ResourceKind,
        in_use: usize,
        flows: usize,
    },
}
