//! Local proof verification.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, VerifyingKey};
use ark_snark::SNARK;
use thiserror::Error;

/// Errors during verification
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Verification failed: {0}")]
    Verification(String),
    #[error("Expected {expected} public inputs, got {actual}")]
    InvalidInputs { expected: usize, actual: usize },
}

/// Verify a read-non-zero proof against `[top_root, hkey, hval]`.
pub fn verify_read_non_zero(
    vk: &VerifyingKey<Bn254>,
    proof: &Proof<Bn254>,
    public_inputs: &[Fr],
) -> Result<bool, VerifyError> {
    if public_inputs.len() != 3 {
        return Err(VerifyError::InvalidInputs {
            expected: 3,
            actual: public_inputs.len(),
        });
    }
    Groth16::<Bn254>::verify(vk, public_inputs, proof)
        .map_err(|e| VerifyError::Verification(e.to_string()))
}
