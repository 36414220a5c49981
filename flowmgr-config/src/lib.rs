//! # flowmgr configuration
//!
//! Layered configuration for the flow offload manager: the capacity tables
//! the hardware backend exposes per offload profile, the adapters to bring
//! up, and telemetry settings.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::{Validate, ValidationError};

mod device;
mod error;
mod profile;
mod telemetry;
mod validation;

pub use device::DeviceConfig;
pub use error::ConfigError;
pub use profile::{ProfileConfig, ProfilesConfig};
pub use telemetry::TelemetryConfig;
pub use validation::MAX_CAPACITY;

const BASE_FILE: &str = "config/flowmgr.yaml";
const ENV_PREFIX: &str = "FLOWMGR_";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
#[validate(schema(function = validate_devices, skip_on_field_errors = false))]
pub struct FlowMgrConfig {
    /// Per-profile capacity tables.
    #[validate(nested)]
    #[serde(default)]
    pub profiles: ProfilesConfig,

    /// NICs created at start-up, in order.
    #[validate(nested)]
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceConfig>,

    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_devices() -> Vec<DeviceConfig> {
    vec![DeviceConfig::default()]
}

fn validate_devices(config: &FlowMgrConfig) -> Result<(), ValidationError> {
    validation::validate_unique_adapters(&config.devices)
}

impl Default for FlowMgrConfig {
    fn default() -> Self {
        Self {
            profiles: ProfilesConfig::default(),
            devices: default_devices(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl FlowMgrConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/flowmgr.yaml`, if present
    /// 3. `config/<FLOWMGR_ENV>.yaml` (default `production`), if present
    /// 4. `FLOWMGR_*` environment variables, `__` separating nested keys
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(FlowMgrConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        } else {
            debug!("{} not found, using default configuration", BASE_FILE);
        }

        let env = std::env::var("FLOWMGR_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific file on top of the defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::extract(
            Figment::from(Serialized::defaults(FlowMgrConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}
