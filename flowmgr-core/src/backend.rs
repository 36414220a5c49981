//! Offload profiles and the capacity seam to the hardware backend.
//!
//! Capacities differ per hardware generation and profile; the backend owns
//! that knowledge and hands a [`CapacityTable`] over at device creation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alloc::CapacityTable;

/// Hardware configuration a NIC is prepared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffloadProfile {
    Vswitch,
    Inline,
}

impl fmt::Display for OffloadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OffloadProfile::Vswitch => f.write_str("vswitch"),
            OffloadProfile::Inline => f.write_str("inline"),
        }
    }
}

/// Supplies per-kind capacities for a profile.
pub trait CapacityProvider {
    /// Returns `None` when the backend has no table for `profile`.
    fn capacity_table(&self, profile: OffloadProfile) -> Option<CapacityTable>;
}

impl CapacityProvider for BTreeMap<OffloadProfile, CapacityTable> {
    fn capacity_table(&self, profile: OffloadProfile) -> Option<CapacityTable> {
        self.get(&profile).cloned()
    }
}

impl CapacityProvider for CapacityTable {
    /// A single table serves every profile.
    fn capacity_table(&self, _profile: OffloadProfile) -> Option<CapacityTable> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ResourceKind;

    #[test]
    fn test_map_provider_returns_only_known_profiles() {
        let mut map = BTreeMap::new();
        map.insert(
            OffloadProfile::Inline,
            CapacityTable::new().with(ResourceKind::CatCfn, 64),
        );

        let table = map.capacity_table(OffloadProfile::Inline).unwrap();
        assert_eq!(table.get(ResourceKind::CatCfn), 64);
        assert!(map.capacity_table(OffloadProfile::Vswitch).is_none());
    }

    #[test]
    fn test_profile_display() {
        assert_eq!(OffloadProfile::Inline.to_string(), "inline");
        assert_eq!(OffloadProfile::Vswitch.to_string(), "vswitch");
    }
}
