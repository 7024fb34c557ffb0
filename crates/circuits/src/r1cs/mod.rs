//! R1CS gadgets for the accumulator hashing layout.
//!
//! These mirror the native hashing of `sparse_accumulator` inside an arkworks
//! constraint system:
//! - `compress_var`: Anemoi/Jive 2-to-1 compression
//! - `LeafOpeningVar`: leaf hash `C(C(C(C(0, prev), next), hkey), hval)`
//! - `MerkleProofVar`: root recomputation with `C(C(0, left), right)` nodes
//! - `ReadNonZeroCircuit`: membership of a key-value pair under a top root

mod anemoi;
mod leaf;
mod membership;
mod merkle;


pub use anemoi::{compress_var, hash_elements_var, node_hash_var, top_root_var};
pub use leaf::LeafOpeningVar;
pub use membership::ReadNonZeroCircuit;
pub use merkle::MerkleProofVar;
