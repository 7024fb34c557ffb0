//! Prover configuration, loaded from JSON.

use std::path::Path;

use accumulator_circuits::Settings;
use serde::{Deserialize, Serialize};

use crate::prove::ProveError;

fn enabled() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProverConfig {
    /// Sizing of the accumulator module.
    pub accumulator: Settings,
    /// Replay every trace natively before laying out columns.
    #[serde(default = "enabled")]
    pub verify_traces: bool,
    /// Run the reference constraint check on every assigned batch.
    #[serde(default = "enabled")]
    pub check_constraints: bool,
}

impl ProverConfig {
    pub fn new(accumulator: Settings) -> Self {
        Self {
            accumulator,
            verify_traces: true,
            check_constraints: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ProveError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ProveError::Config(e.to_string()))?;
        config
            .accumulator
            .validate()
            .map_err(|e| ProveError::Config(e.to_string()))?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ProveError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String, ProveError> {
        serde_json::to_string_pretty(self).map_err(|e| ProveError::Serialization(e.to_string()))
    }
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self::new(Settings::new(64, 16))
    }
}
