//! Errors surfaced by the prover and Groth16 membership proofs.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, Proof, ProvingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use sparse_accumulator::accumulator::ReadNonZeroTrace;
use sparse_accumulator::{AccumulatorError, OperationKind};
use thiserror::Error;
use tracing::debug;

use accumulator_circuits::{CircuitError, ReadNonZeroCircuit};

/// Errors during batch proving and proof generation
#[derive(Error, Debug)]
pub enum ProveError {
    /// An operation's precondition failed; the batch was rolled back.
    #[error("operation {index} ({kind}) failed: {source}")]
    Precondition {
        index: usize,
        kind: OperationKind,
        #[source]
        source: AccumulatorError,
    },
    /// The batch needs more rows than the module has. Nothing was applied.
    #[error("batch needs {required} rows, module holds {max}")]
    CapacityOverflow { required: usize, max: usize },
    /// A produced trace did not replay against the pre-batch state.
    #[error("trace {index} rejected: {source}")]
    TraceRejected {
        index: usize,
        #[source]
        source: AccumulatorError,
    },
    /// The assigned columns violate a constraint.
    #[error("constraint check rejected the batch: {0}")]
    Rejected(#[source] CircuitError),
    #[error("circuit error: {0}")]
    Circuit(#[from] CircuitError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Proof generation failed: {0}")]
    ProofGeneration(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// A proof with its public inputs
#[derive(Clone)]
pub struct ProofWithInputs {
    pub proof: Proof<Bn254>,
    pub public_inputs: Vec<Fr>,
}

impl ProofWithInputs {
    pub fn serialize_proof(&self) -> Result<Vec<u8>, ProveError> {
        let mut bytes = Vec::new();
        self.proof
            .serialize_compressed(&mut bytes)
            .map_err(|e| ProveError::Serialization(e.to_string()))?;
        Ok(bytes)
    }

    /// Serialize public inputs to bytes (each Fr is 32 bytes)
    pub fn serialize_public_inputs(&self) -> Result<Vec<u8>, ProveError> {
        let mut bytes = Vec::new();
        for input in &self.public_inputs {
            input
                .serialize_compressed(&mut bytes)
                .map_err(|e| ProveError::Serialization(e.to_string()))?;
        }
        Ok(bytes)
    }

    pub fn deserialize_proof(bytes: &[u8]) -> Result<Proof<Bn254>, ProveError> {
        Proof::deserialize_compressed(bytes).map_err(|e| ProveError::Serialization(e.to_string()))
    }

    /// `0x`-prefixed hex of the compressed proof.
    pub fn proof_hex(&self) -> Result<String, ProveError> {
        Ok(format!("0x{}", hex::encode(self.serialize_proof()?)))
    }
}

/// Prove that the pair read by `trace` is stored under its top root.
pub fn prove_read_non_zero<K, V>(
    pk: &ProvingKey<Bn254>,
    trace: &ReadNonZeroTrace<K, V>,
) -> Result<ProofWithInputs, ProveError> {
    let circuit = ReadNonZeroCircuit::from_trace(trace);
    let public_inputs = circuit
        .public_inputs()
        .ok_or_else(|| ProveError::ProofGeneration("missing public inputs".to_string()))?;

    let mut rng = StdRng::from_entropy();
    let proof = Groth16::<Bn254>::prove(pk, circuit, &mut rng)
        .map_err(|e| ProveError::ProofGeneration(e.to_string()))?;

    debug!(slot = trace.proof.path, "read-non-zero proof generated");
    Ok(ProofWithInputs {
        proof,
        public_inputs,
    })
}

/// Prove several reads in parallel.
pub fn prove_reads<K: Sync, V: Sync>(
    pk: &ProvingKey<Bn254>,
    traces: &[ReadNonZeroTrace<K, V>],
) -> Result<Vec<ProofWithInputs>, ProveError> {
    traces
        .par_iter()
        .map(|trace| prove_read_non_zero(pk, trace))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_read_non_zero;
    use sparse_accumulator::{Accumulator, Trace};

    fn reads(acc: &Accumulator<u64, u64>, keys: &[u64]) -> Vec<ReadNonZeroTrace<u64, u64>> {
        keys.iter()
            .map(|key| match acc.read_non_zero(key).unwrap() {
                Trace::ReadNonZero(trace) => trace,
                _ => panic!("expected a read-non-zero trace"),
            })
            .collect()
    }

    #[test]
    fn test_prove_read_non_zero() {
        let mut rng = StdRng::seed_from_u64(42);
        let keys = setup_read_non_zero(&mut rng, 4).unwrap();

        let mut acc = Accumulator::<u64, u64>::new(4).unwrap();
        acc.insert(&7, 70).unwrap();
        let trace = &reads(&acc, &[7])[0];

        let proof = prove_read_non_zero(&keys.proving_key, trace).unwrap();
        assert_eq!(proof.public_inputs[0], acc.top_root());
        assert_eq!(proof.public_inputs[1], trace.leaf_opening.hkey);

        let bytes = proof.serialize_proof().unwrap();
        assert_eq!(ProofWithInputs::deserialize_proof(&bytes).unwrap(), proof.proof);
        assert_eq!(proof.serialize_public_inputs().unwrap().len(), 96);
        assert!(proof.proof_hex().unwrap().starts_with("0x"));
    }

    #[test]
    fn test_prove_reads_in_parallel() {
        let mut rng = StdRng::seed_from_u64(7);
        let keys = setup_read_non_zero(&mut rng, 4).unwrap();

        let mut acc = Accumulator::<u64, u64>::new(4).unwrap();
        for key in [1u64, 2, 3] {
            acc.insert(&key, key + 10).unwrap();
        }
        let proofs = prove_reads(&keys.proving_key, &reads(&acc, &[1, 2, 3])).unwrap();
        assert_eq!(proofs.len(), 3);
        assert!(proofs.iter().all(|p| p.public_inputs[0] == acc.top_root()));
    }
}
