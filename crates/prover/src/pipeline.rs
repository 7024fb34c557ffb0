//! Batch pipeline: operations -> traces -> columns -> constraint check.
//!
//! A batch is all-or-nothing. Capacity is checked before anything runs, and
//! any later failure restores the accumulator to its pre-batch snapshot.

use std::time::Instant;

use accumulator_circuits::{
    build_segments, AccumulatorModule, ColumnAssignments, Composition, Witness,
};
use ark_bn254::Fr;
use sparse_accumulator::{Accumulator, AccumulatorVerifier, Hashable, Trace};
use tracing::{debug, info, warn};

use crate::config::ProverConfig;
use crate::ops::{required_rows, Operation};
use crate::prove::ProveError;

/// Everything a successful batch produced.
#[derive(Clone, Debug)]
pub struct BatchOutcome<K, V> {
    pub traces: Vec<Trace<K, V>>,
    pub assignments: ColumnAssignments,
    pub witness: Witness,
    pub old_top_root: Fr,
    pub new_top_root: Fr,
}

/// Accumulator state plus the constraint module its batches are laid out on.
pub struct StateManager<K, V> {
    accumulator: Accumulator<K, V>,
    config: ProverConfig,
    composition: Composition,
    module: AccumulatorModule,
}

impl<K, V> StateManager<K, V>
where
    K: Hashable + Clone,
    V: Hashable + Clone,
{
    pub fn new(config: ProverConfig) -> Result<Self, ProveError> {
        config
            .accumulator
            .validate()
            .map_err(|e| ProveError::Config(e.to_string()))?;
        let accumulator = Accumulator::new(config.accumulator.merkle_tree_depth)
            .map_err(|e| ProveError::Config(e.to_string()))?;

        let mut composition = Composition::new();
        let module = AccumulatorModule::define(&mut composition, config.accumulator.clone())?;

        Ok(Self {
            accumulator,
            config,
            composition,
            module,
        })
    }

    pub fn accumulator(&self) -> &Accumulator<K, V> {
        &self.accumulator
    }

    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn module(&self) -> &AccumulatorModule {
        &self.module
    }

    /// Apply `operations` in order and check the resulting columns.
    pub fn prove_batch(
        &mut self,
        operations: &[Operation<K, V>],
    ) -> Result<BatchOutcome<K, V>, ProveError> {
        let required = required_rows(operations);
        let max = self.config.accumulator.max_num_proofs;
        if required > max {
            return Err(ProveError::CapacityOverflow { required, max });
        }

        let snapshot = self.accumulator.clone();
        let start = Instant::now();
        let result = self.run(operations);
        match &result {
            Ok(outcome) => info!(
                operations = operations.len(),
                rows = outcome.assignments.num_rows(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "batch proved"
            ),
            Err(e) => {
                warn!(error = %e, "batch rejected, rolling back");
                self.accumulator = snapshot;
            }
        }
        result
    }

    fn run(&mut self, operations: &[Operation<K, V>]) -> Result<BatchOutcome<K, V>, ProveError> {
        let old_top_root = self.accumulator.top_root();
        let mut verifier = AccumulatorVerifier::from_accumulator(&self.accumulator);

        let mut traces = Vec::with_capacity(operations.len());
        for (index, op) in operations.iter().enumerate() {
            let trace = op
                .apply(&mut self.accumulator)
                .map_err(|source| ProveError::Precondition {
                    index,
                    kind: op.kind(),
                    source,
                })?;
            debug!(index, kind = %op.kind(), "operation applied");
            traces.push(trace);
        }

        if self.config.verify_traces {
            for (index, trace) in traces.iter().enumerate() {
                verifier
                    .verify(trace)
                    .map_err(|source| ProveError::TraceRejected { index, source })?;
            }
        }

        let assignments = build_segments(&traces, &self.config.accumulator)?;
        let mut witness = self.composition.new_witness();
        self.module.assign(&mut witness, &assignments)?;
        if self.config.check_constraints {
            self.composition
                .check(&witness)
                .map_err(ProveError::Rejected)?;
        }

        Ok(BatchOutcome {
            traces,
            assignments,
            witness,
            old_top_root,
            new_top_root: self.accumulator.top_root(),
        })
    }
}
