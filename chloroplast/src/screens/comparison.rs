//! Pathway comparison screen: C3, C4 and CAM carbon assimilation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Carbon-assimilation pathway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum Pathway {
    #[default]
    C3,
    C4,
    #[serde(rename = "CAM")]
    Cam,
}

impl Pathway {
    pub const ALL: [Pathway; 3] = [Pathway::C3, Pathway::C4, Pathway::Cam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pathway::C3 => "C3",
            Pathway::C4 => "C4",
            Pathway::Cam => "CAM",
        }
    }

    pub fn profile(&self) -> PathwayProfile {
        match self {
            Pathway::C3 => PathwayProfile {
                initial_carboxylase: Carboxylase::Rubisco,
                concentration: CarbonConcentration::None,
                photorespiration: Exposure::High,
                extra_atp: false,
                habitat: Habitat::Temperate,
            },
            Pathway::C4 => PathwayProfile {
                initial_carboxylase: Carboxylase::Pepc,
                concentration: CarbonConcentration::Spatial,
                photorespiration: Exposure::Negligible,
                extra_atp: true,
                habitat: Habitat::HotHighLight,
            },
            Pathway::Cam => PathwayProfile {
                initial_carboxylase: Carboxylase::Pepc,
                concentration: CarbonConcentration::Temporal,
                photorespiration: Exposure::Low,
                extra_atp: true,
                habitat: Habitat::Arid,
            },
        }
    }
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pathway {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "C3" => Ok(Pathway::C3),
            "C4" => Ok(Pathway::C4),
            "CAM" => Ok(Pathway::Cam),
            other => Err(format!("unknown pathway: {}", other)),
        }
    }
}

/// Enzyme that first fixes inorganic carbon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum Carboxylase {
    Rubisco,
    /// PEP carboxylase
    Pepc,
}

/// How CO₂ is concentrated around Rubisco.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum CarbonConcentration {
    None,
    /// Mesophyll fixes, bundle sheath releases (Kranz anatomy)
    Spatial,
    /// Night fixation into malate, daytime release
    Temporal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    Negligible,
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Habitat {
    Temperate,
    HotHighLight,
    Arid,
}

/// Structured traits of one pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PathwayProfile {
    pub initial_carboxylase: Carboxylase,
    pub concentration: CarbonConcentration,
    pub photorespiration: Exposure,
    /// Pays ATP beyond the Calvin cycle to move C4 acids
    pub extra_atp: bool,
    pub habitat: Habitat,
}

/// Selected tab on the comparison screen.
#[derive(Debug, Clone, Default)]
pub struct PathwayComparison {
    selected: Pathway,
}

impl PathwayComparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Pathway {
        self.selected
    }

    pub fn select(&mut self, pathway: Pathway) -> PathwayProfile {
        self.selected = pathway;
        pathway.profile()
    }

    pub fn profile(&self) -> PathwayProfile {
        self.selected.profile()
    }
}
