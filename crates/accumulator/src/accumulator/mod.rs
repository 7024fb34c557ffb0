//! Authenticated trie core.
//!
//! This module provides:
//! - `Accumulator`: the stateful prover-side store
//! - `Trace`: per-operation witness records
//! - `AccumulatorVerifier`: native replay of traces against a root

mod opening;
mod prover;
mod trace;
mod verifier;

#[cfg(test)]
mod tests;

pub use opening::{LeafHashChain, LeafOpening, HEAD_SLOT, TAIL_SLOT};
pub use prover::Accumulator;
pub use trace::{
    total_rows, DeletionTrace, InsertionTrace, OperationKind, ReadNonZeroTrace, ReadZeroTrace,
    Trace, UpdateTrace,
};
pub use verifier::AccumulatorVerifier;
