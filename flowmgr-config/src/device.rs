//! Devices to bring up at start-up.

use flowmgr_core::OffloadProfile;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Physical adapter number in the host.
    pub adapter_no: u8,

    /// In-ports addressable on the NIC.
    #[validate(range(min = 1, max = 256))]
    #[serde(default = "default_ports")]
    pub ports: u16,

    #[serde(default = "default_profile")]
    pub profile: OffloadProfile,
}

fn default_ports() -> u16 {
    2
}

fn default_profile() -> OffloadProfile {
    OffloadProfile::Inline
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            adapter_no: 0,
            ports: default_ports(),
            profile: default_profile(),
        }
    }
}
