//! Anemoi permutation over BN254 and its Jive compression mode.
//!
//! `compress` is the only hashing primitive of the accumulator: every leaf,
//! node and top-root hash is a chain of 2-to-1 compressions.
//!
//! Reference: "New Design Techniques for Efficient Arithmetization-Oriented Hash Functions:
//! Anemoi Permutations and Jive Compression Mode" (CRYPTO 2023)
//! https://eprint.iacr.org/2022/840

mod constants;
mod native;


pub use constants::{constants, exp_inv_alpha, AnemoiConstants, ALPHA, GENERATOR, NUM_ROUNDS};
pub use native::{compress, permutation, AnemoiState};
