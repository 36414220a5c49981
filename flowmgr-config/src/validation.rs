//! Custom validation functions for configuration.

use std::collections::{BTreeMap, HashSet};

use flowmgr_core::ResourceKind;
use validator::ValidationError;

use crate::device::DeviceConfig;

/// Largest entry count accepted for a single resource kind.
pub const MAX_CAPACITY: usize = 65536;

/// Every configured capacity must fit the hardware addressing range.
pub fn validate_capacities(capacities: &BTreeMap<ResourceKind, usize>) -> Result<(), ValidationError> {
    if capacities.values().all(|&capacity| capacity <= MAX_CAPACITY) {
        Ok(())
    } else {
        Err(ValidationError::new("capacity_out_of_range"))
    }
}

/// Adapter numbers must be unique across the device list.
pub fn validate_unique_adapters(devices: &[DeviceConfig]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if devices.iter().all(|device| seen.insert(device.adapter_no)) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_adapter"))
    }
}

/// Validate a tracing level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^(?i)(trace|debug|info|warn|error)$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(level) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowmgr_core::OffloadProfile;

    #[test]
    fn test_capacity_bounds() {
        let mut caps = BTreeMap::new();
        caps.insert(ResourceKind::Queue, MAX_CAPACITY);
        assert!(validate_capacities(&caps).is_ok());
        caps.insert(ResourceKind::TpeRpl, MAX_CAPACITY + 1);
        assert!(validate_capacities(&caps).is_err());
    }

    #[test]
    fn test_unique_adapters() {
        let device = |adapter_no| DeviceConfig {
            adapter_no,
            ports: 1,
            profile: OffloadProfile::Inline,
        };
        assert!(validate_unique_adapters(&[device(0), device(1)]).is_ok());
        assert!(validate_unique_adapters(&[device(0), device(0)]).is_err());
    }

    #[test]
    fn test_log_levels() {
        assert!(validate_log_level("debug").is_ok());
        assert!(validate_log_level("WARN").is_ok());
        assert!(validate_log_level("verbose").is_err());
        assert!(validate_log_level("").is_err());
    }
}
