//! Segment trace builder and accumulator constraint module.
//!
//! Every accumulator operation becomes a fixed-size segment of rows:
//! read-non-zero, read-zero and update take 2 rows, insert and delete take 6.
//! `build_segments` turns traces into per-row column values without touching
//! any constraint system; `AccumulatorModule` declares the columns and the
//! constraints tying the rows together, and hands every row's Merkle proof
//! to the root recomputation gadget.

mod assign;
mod builder;
mod define;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use sparse_accumulator::smt::MAX_DEPTH;

pub use builder::{build_segments, ColumnAssignments};
pub use define::{define_constraints, AccumulatorColumns, AccumulatorModule};

use crate::codec::next_power_of_two;
use crate::error::CircuitError;
use crate::runtime::Round;

fn default_name() -> String {
    "ACCUMULATOR".to_string()
}

/// Sizing of one accumulator module instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_name")]
    pub name: String,
    /// Row budget: the most rows a batch of operations may occupy.
    pub max_num_proofs: usize,
    pub merkle_tree_depth: usize,
    #[serde(default)]
    pub round: Round,
}

impl Settings {
    pub fn new(max_num_proofs: usize, merkle_tree_depth: usize) -> Self {
        Self {
            name: default_name(),
            max_num_proofs,
            merkle_tree_depth,
            round: 0,
        }
    }

    pub fn validate(&self) -> Result<(), CircuitError> {
        if self.max_num_proofs < 2 {
            return Err(CircuitError::InvalidSettings(format!(
                "max_num_proofs must be at least 2, got {}",
                self.max_num_proofs
            )));
        }
        if self.merkle_tree_depth == 0 || self.merkle_tree_depth > MAX_DEPTH {
            return Err(CircuitError::InvalidSettings(format!(
                "merkle_tree_depth must be in 1..={MAX_DEPTH}, got {}",
                self.merkle_tree_depth
            )));
        }
        if self.name.is_empty() {
            return Err(CircuitError::InvalidSettings("empty module name".to_string()));
        }
        Ok(())
    }

    /// Rows of every per-operation column.
    pub fn num_rows(&self) -> usize {
        next_power_of_two(self.max_num_proofs)
    }

    /// Rows of the depth-expanded proof column.
    pub fn num_proof_rows(&self) -> usize {
        next_power_of_two(self.num_rows() * self.merkle_tree_depth)
    }
}
