//! Arithmetization of the sparse Merkle accumulator.
//!
//! This crate provides:
//! - `runtime`: the constraint-runtime interface and an in-memory reference
//!   implementation that checks every declared query
//! - `codec`: packing of Merkle proofs into the column layout and limb codecs
//! - `merkle`: the root recomputation gadget
//! - `segments`: the segment trace builder and the accumulator module
//! - `r1cs`: arkworks gadgets for the same hashing layout

pub mod codec;
pub mod error;
pub mod merkle;
pub mod r1cs;
pub mod runtime;
pub mod segments;

pub use codec::{pack, pack_into, unpack, Endianness, LimbLayout, PackedProofs};
pub use error::CircuitError;
pub use merkle::{RootRecomputation, RootRecomputationInputs};
pub use r1cs::ReadNonZeroCircuit;
pub use runtime::{AssignmentRuntime, Composition, ConstraintRuntime, Witness};
pub use segments::{
    build_segments, define_constraints, AccumulatorModule, ColumnAssignments, Settings,
};
