//! Optimizer configuration
//!
//! Defaults reproduce the rule-based constants. A JSON file may override any
//! subset of them:
//!
//! ```json
//! { "scorer": { "free_flow_speed": 60.0 }, "cycle": { "max_green": 50 } }
//! ```

use crate::{CycleConfig, OptimizerError, Result, ScorerConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Largest accepted scoring weight; with capped inputs priorities stay finite
pub const MAX_WEIGHT: f64 = 1_000.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub scorer: ScorerConfig,
    pub cycle: CycleConfig,
}

impl OptimizerConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading optimizer config from {:?}", path);

        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("w_vehicles", self.scorer.w_vehicles),
            ("w_queue", self.scorer.w_queue),
        ];
        for (name, weight) in weights {
            if !(0.0..=MAX_WEIGHT).contains(&weight) {
                return Err(OptimizerError::InvalidConfig(format!(
                    "{} must be in 0..={}, got {}",
                    name, MAX_WEIGHT, weight
                )));
            }
        }
        if !(self.scorer.free_flow_speed.is_finite() && self.scorer.free_flow_speed > 0.0) {
            return Err(OptimizerError::InvalidConfig(format!(
                "free_flow_speed must be positive, got {}",
                self.scorer.free_flow_speed
            )));
        }
        self.cycle.validate()
    }
}
