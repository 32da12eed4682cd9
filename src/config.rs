//! Run-level configuration.
//!
//! Stored as a JSON object on disk; every field is optional and defaults to
//! the Saue route 15 barrier analysis:
//! ```json
//! {
//!   "area": {
//!     "bounding_box": { "x_min": 6565550, "x_max": 6567850, "y_min": 542660, "y_max": 544382 },
//!     "exclusions": [{ "route_number": 11154 }, { "route_number": 11153, "from_km": 0.1 }],
//!     "route": { "route_number": 15, "street_name": "TALLINN - RAPLA - TÜRI", "start_km": 18, "end_km": 21 }
//!   },
//!   "missing_values": "impute",
//!   "framing": "victims",
//!   "intervention_date": "2019-06-01"
//! }
//! ```

use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analyzers::rules::{CategoryRule, Framing};
use crate::filter::AreaOfInterest;
use crate::normalize::MissingValuePolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub area: AreaOfInterest,
    pub missing_values: MissingValuePolicy,
    pub framing: Framing,
    /// Two custom categories replacing the framing's built-in rules.
    pub categories: Option<Vec<CategoryRule>>,
    /// Date after which accidents count as "after the intervention".
    pub intervention_date: Option<NaiveDate>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            area: AreaOfInterest::default(),
            missing_values: MissingValuePolicy::default(),
            framing: Framing::default(),
            categories: None,
            // Barrier assumed built over summer 2019.
            intervention_date: NaiveDate::from_ymd_opt(2019, 6, 1),
        }
    }
}

impl RunConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read run config '{path}'"))?;
        let config: RunConfig =
            serde_json::from_str(&content).with_context(|| format!("Invalid run config '{path}'"))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.area.validate(self.missing_values)?;
        if let Some(categories) = &self.categories {
            ensure!(
                categories.len() == 2,
                "exactly two categories are needed for a comparison, got {}",
                categories.len()
            );
            ensure!(
                categories[0].name != categories[1].name,
                "category names must differ"
            );
        }
        Ok(())
    }

    /// The two category rules to compare.
    pub fn category_rules(&self) -> Vec<CategoryRule> {
        self.categories
            .clone()
            .unwrap_or_else(|| self.framing.rules())
    }
}
