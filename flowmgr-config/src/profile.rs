//! Offload profile capacity tables.
//!
//! The backend reports how many entries each hardware table holds for a
//! given profile. Kinds missing from a profile get capacity zero.

use std::collections::BTreeMap;

use flowmgr_core::{CapacityProvider, CapacityTable, OffloadProfile, ResourceKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Entry count per resource kind.
    #[serde(default)]
    #[validate(custom(function = validation::validate_capacities))]
    pub capacities: BTreeMap<ResourceKind, usize>,
}

impl ProfileConfig {
    pub fn to_table(&self) -> CapacityTable {
        self.capacities.iter().map(|(&k, &c)| (k, c)).collect()
    }
}

/// Capacity tables for every known profile.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct ProfilesConfig {
    #[validate(nested)]
    #[serde(default = "default_inline")]
    pub inline: ProfileConfig,

    #[validate(nested)]
    #[serde(default = "default_vswitch")]
    pub vswitch: ProfileConfig,
}

impl ProfilesConfig {
    pub fn profile(&self, profile: OffloadProfile) -> &ProfileConfig {
        match profile {
            OffloadProfile::Inline => &self.inline,
            OffloadProfile::Vswitch => &self.vswitch,
        }
    }
}

impl CapacityProvider for ProfilesConfig {
    fn capacity_table(&self, profile: OffloadProfile) -> Option<CapacityTable> {
        Some(self.profile(profile).to_table())
    }
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            inline: default_inline(),
            vswitch: default_vswitch(),
        }
    }
}

fn default_inline() -> ProfileConfig {
    use ResourceKind::*;
    ProfileConfig {
        capacities: BTreeMap::from([
            (Queue, 128),
            (CatCfn, 64),
            (CatCot, 64),
            (CatExo, 8),
            (CatLen, 8),
            (KmFlowType, 16),
            (KmCategory, 32),
            (HshRcp, 32),
            (PdbRcp, 16),
            (QslRcp, 128),
            (QslQst, 4096),
            (SlcLrRcp, 32),
            (FlmFlowType, 16),
            (FlmRcp, 16),
            (TpeRcp, 32),
            (TpeExt, 1024),
            (TpeRpl, 4096),
            (ScrubRcp, 16),
        ]),
    }
}

fn default_vswitch() -> ProfileConfig {
    use ResourceKind::*;
    // No flow matcher, packet editor or scrubber in this profile.
    ProfileConfig {
        capacities: BTreeMap::from([
            (Queue, 128),
            (CatCfn, 64),
            (CatCot, 64),
            (CatExo, 8),
            (CatLen, 8),
            (KmFlowType, 16),
            (KmCategory, 32),
            (HshRcp, 32),
            (PdbRcp, 16),
            (QslRcp, 128),
            (QslQst, 4096),
            (SlcLrRcp, 32),
        ]),
    }
}
