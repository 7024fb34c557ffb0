//! Sparse Merkle tree backing the accumulator.
//!
//! This module provides:
//! - Native fixed-depth tree storage with default subtrees
//! - Merkle proofs (leaf-to-root siblings plus a position)

mod proof;
mod tree;

#[cfg(test)]
mod tests;

pub use proof::Proof;
pub use tree::{SparseMerkleTree, EMPTY_LEAF, MAX_DEPTH};
