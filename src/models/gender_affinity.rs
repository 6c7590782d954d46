use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Gender affinity used to bias recommendations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderAffinity {
    Male,
    #[default]
    Unisex,
    Female,
}

impl GenderAffinity {
    pub const ALL: [GenderAffinity; 3] = [
        GenderAffinity::Male,
        GenderAffinity::Unisex,
        GenderAffinity::Female,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GenderAffinity::Male => "male",
            GenderAffinity::Unisex => "unisex",
            GenderAffinity::Female => "female",
        }
    }
}

impl Display for GenderAffinity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a stored or user-supplied value is not a known affinity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gender affinity: {0:?}")]
pub struct UnknownGenderAffinity(pub String);

impl FromStr for GenderAffinity {
    type Err = UnknownGenderAffinity;

    // Exact match only: anything else in storage is treated as corrupt.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(GenderAffinity::Male),
            "unisex" => Ok(GenderAffinity::Unisex),
            "female" => Ok(GenderAffinity::Female),
            other => Err(UnknownGenderAffinity(other.to_string())),
        }
    }
}
