//! Rescue categories and the table that turns them into filter criteria
//!
//! Each working-dog category is a fixed preset: a set of breed substrings,
//! a required sex at outcome, and an inclusive age window in weeks.
//! `All` is the absence of a preset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::criteria::{AgeRange, FilterCriteria};
use crate::{Error, Result};

/// Named filter preset selectable by a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RescueCategory {
    All,
    Water,
    Mountain,
    Disaster,
}

impl RescueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RescueCategory::All => "All",
            RescueCategory::Water => "Water",
            RescueCategory::Mountain => "Mountain",
            RescueCategory::Disaster => "Disaster",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            RescueCategory::All => "All",
            RescueCategory::Water => "Water Rescue",
            RescueCategory::Mountain => "Mountain or Wilderness Rescue",
            RescueCategory::Disaster => "Disaster Rescue or Individual Tracking",
        }
    }

    pub fn all() -> &'static [RescueCategory] {
        &[
            RescueCategory::All,
            RescueCategory::Water,
            RescueCategory::Mountain,
            RescueCategory::Disaster,
        ]
    }
}

impl FromStr for RescueCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(RescueCategory::All),
            "water" => Ok(RescueCategory::Water),
            "mountain" => Ok(RescueCategory::Mountain),
            "disaster" => Ok(RescueCategory::Disaster),
            _ => Err(Error::InvalidInput(format!("Unknown rescue category: {}", s))),
        }
    }
}

impl fmt::Display for RescueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the preset table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RescueProfile {
    pub category: RescueCategory,
    pub breeds: &'static [&'static str],
    pub sex: &'static str,
    pub min_age_weeks: f64,
    pub max_age_weeks: f64,
}

impl RescueProfile {
    pub fn age_range(&self) -> AgeRange {
        AgeRange::new(self.min_age_weeks, self.max_age_weeks)
    }

    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new()
            .breed_any(self.breeds.iter().copied())
            .sex(self.sex)
            .age_weeks(self.min_age_weeks, self.max_age_weeks)
    }
}

// Mountain and Disaster share sex and most breeds; the values are kept as
// published even where they look templated.
pub const RESCUE_PROFILES: &[RescueProfile] = &[
    RescueProfile {
        category: RescueCategory::Water,
        breeds: &["lab", "chesa", "newf"],
        sex: "Intact Female",
        min_age_weeks: 26.0,
        max_age_weeks: 156.0,
    },
    RescueProfile {
        category: RescueCategory::Mountain,
        breeds: &["german", "mala", "old english", "husk", "rott"],
        sex: "Intact Male",
        min_age_weeks: 26.0,
        max_age_weeks: 156.0,
    },
    RescueProfile {
        category: RescueCategory::Disaster,
        breeds: &["german", "golden", "blood", "dober", "rott"],
        sex: "Intact Male",
        min_age_weeks: 20.0,
        max_age_weeks: 300.0,
    },
];

/// Look up the preset row for a category. `All` has none.
pub fn profile(category: RescueCategory) -> Option<&'static RescueProfile> {
    RESCUE_PROFILES.iter().find(|p| p.category == category)
}

/// Translate a category into criteria.
///
/// `All` yields empty criteria. Any other category without a table row is
/// rejected rather than silently widened to "everything".
pub fn resolve(category: RescueCategory) -> Result<FilterCriteria> {
    if category == RescueCategory::All {
        return Ok(FilterCriteria::new());
    }

    profile(category)
        .map(RescueProfile::criteria)
        .ok_or_else(|| Error::InvalidInput(format!("No rescue profile for category: {}", category)))
}

/// Parse a category name and resolve it
pub fn resolve_named(name: &str) -> Result<FilterCriteria> {
    resolve(name.parse()?)
}
