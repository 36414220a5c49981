//! Hardware resource kinds addressable on a NIC.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A category of hardware-addressable table with its own fixed capacity.
///
/// The discriminant doubles as the slot in a [`ResourceTable`](crate::ResourceTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Queue,
    CatCfn,
    CatCot,
    CatExo,
    CatLen,
    KmFlowType,
    KmCategory,
    HshRcp,
    PdbRcp,
    QslRcp,
    QslQst,
    SlcLrRcp,
    FlmFlowType,
    FlmRcp,
    TpeRcp,
    TpeExt,
    TpeRpl,
    ScrubRcp,
}

impl ResourceKind {
    pub const COUNT: usize = 18;

    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Queue,
        ResourceKind::CatCfn,
        ResourceKind::CatCot,
        ResourceKind::CatExo,
        ResourceKind::CatLen,
        ResourceKind::KmFlowType,
        ResourceKind::KmCategory,
        ResourceKind::HshRcp,
        ResourceKind::PdbRcp,
        ResourceKind::QslRcp,
        ResourceKind::QslQst,
        ResourceKind::SlcLrRcp,
        ResourceKind::FlmFlowType,
        ResourceKind::FlmRcp,
        ResourceKind::TpeRcp,
        ResourceKind::TpeExt,
        ResourceKind::TpeRpl,
        ResourceKind::ScrubRcp,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Diagnostic name used in logs and dumps.
    pub const fn name(self) -> &'static str {
        match self {
            ResourceKind::Queue => "RES_QUEUE",
            ResourceKind::CatCfn => "RES_CAT_CFN",
            ResourceKind::CatCot => "RES_CAT_COT",
            ResourceKind::CatExo => "RES_CAT_EXO",
            ResourceKind::CatLen => "RES_CAT_LEN",
            ResourceKind::KmFlowType => "RES_KM_FLOW_TYPE",
            ResourceKind::KmCategory => "RES_KM_CATEGORY",
            ResourceKind::HshRcp => "RES_HSH_RCP",
            ResourceKind::PdbRcp => "RES_PDB_RCP",
            ResourceKind::QslRcp => "RES_QSL_RCP",
            ResourceKind::QslQst => "RES_QSL_QST",
            ResourceKind::SlcLrRcp => "RES_SLC_LR_RCP",
            ResourceKind::FlmFlowType => "RES_FLM_FLOW_TYPE",
            ResourceKind::FlmRcp => "RES_FLM_RCP",
            ResourceKind::TpeRcp => "RES_TPE_RCP",
            ResourceKind::TpeExt => "RES_TPE_EXT",
            ResourceKind::TpeRpl => "RES_TPE_RPL",
            ResourceKind::ScrubRcp => "RES_SCRUB_RCP",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown resource kind '{0}'")]
pub struct ParseKindError(String);

impl FromStr for ResourceKind {
    type Err = ParseKindError;

    /// Accepts the diagnostic name (`RES_CAT_CFN`) or its snake_case form
    /// (`cat_cfn`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        let wanted = wanted
            .get(..4)
            .filter(|prefix| prefix.eq_ignore_ascii_case("res_"))
            .map_or(wanted, |_| &wanted[4..]);
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.name()[4..].eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}
