//! Root recomputation gadget.
//!
//! Re-derives, inside the row-oriented constraint system, the Merkle root of
//! each (leaf, position, proof) triple supplied by a caller module, and checks
//! it against the root the caller claims.
//!
//! Proof `p` occupies rows `p * depth .. (p + 1) * depth`. The last row of a
//! block holds the leaf level and the first row the root level, so hashing
//! runs upward through the block.

mod assign;
mod define;

#[cfg(test)]
mod tests;

pub use define::{
    ActivityPlan, ExpandedColumns, ProofReuse, RootRecomputation, RootRecomputationColumns,
    RootRecomputationInputs,
};
