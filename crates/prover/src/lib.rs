//! Batch proving for the sparse Merkle accumulator.
//!
//! This crate provides utilities for:
//! - Loading prover configuration
//! - Running operation batches through the accumulator module, all-or-nothing
//! - Trusted setup, proving and local verification of membership reads

pub mod config;
pub mod ops;
pub mod pipeline;
pub mod prove;
pub mod setup;
pub mod verify;

pub use config::ProverConfig;
pub use ops::{required_rows, Operation};
pub use pipeline::{BatchOutcome, StateManager};
pub use prove::{prove_read_non_zero, prove_reads, ProofWithInputs, ProveError};
pub use setup::{load_or_setup_read_non_zero, setup_read_non_zero, CircuitKeyPair, SetupError};
pub use verify::{verify_read_non_zero, VerifyError};
