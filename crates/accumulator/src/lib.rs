//! Authenticated sparse Merkle accumulator over BN254.
//!
//! This crate provides:
//! - Anemoi/Jive 2-to-1 compression and the hashing built on it
//! - A fixed-depth sparse Merkle tree
//! - `Accumulator`: a key-value store whose leaves form a sorted linked list,
//!   producing a `Trace` per insert, update, delete and read
//! - `AccumulatorVerifier`: native replay of traces

pub mod accumulator;
pub mod anemoi;
pub mod error;
pub mod hashing;
pub mod smt;

pub use accumulator::{
    Accumulator, AccumulatorVerifier, LeafOpening, OperationKind, Trace, HEAD_SLOT, TAIL_SLOT,
};
pub use anemoi::compress;
pub use error::AccumulatorError;
pub use hashing::{hash_bytes, node_hash, top_root, Hashable};
pub use smt::{Proof, SparseMerkleTree, EMPTY_LEAF};
