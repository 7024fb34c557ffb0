//! ReadNonZero circuit: a key-value pair is stored under a top root.
//!
//! Public inputs, in order: `top_root`, `hkey`, `hval`.
//!
//! The opening's list pointers, the sub-root, the next free node and the
//! Merkle proof stay private.

use ark_bn254::Fr;
use ark_ff::Zero;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};
use sparse_accumulator::accumulator::ReadNonZeroTrace;
use sparse_accumulator::{top_root, LeafOpening, Proof};

use super::anemoi::top_root_var;
use super::leaf::LeafOpeningVar;
use super::merkle::MerkleProofVar;

#[derive(Clone)]
pub struct ReadNonZeroCircuit {
    /// Public input: `C(C(0, next_free_node), sub_root)`.
    pub top_root: Option<Fr>,
    /// Public input: hashed key.
    pub hkey: Option<Fr>,
    /// Public input: hashed value.
    pub hval: Option<Fr>,

    pub opening: Option<LeafOpening>,
    pub next_free_node: Option<u64>,
    pub proof: Option<Proof>,
}

impl ReadNonZeroCircuit {
    /// Circuit with zero witnesses of the right shape, for key generation.
    pub fn empty(depth: usize) -> Self {
        Self {
            top_root: Some(Fr::zero()),
            hkey: Some(Fr::zero()),
            hval: Some(Fr::zero()),
            opening: Some(LeafOpening::default()),
            next_free_node: Some(0),
            proof: Some(Proof::new(0, vec![Fr::zero(); depth])),
        }
    }

    pub fn from_trace<K, V>(trace: &ReadNonZeroTrace<K, V>) -> Self {
        Self {
            top_root: Some(top_root(trace.next_free_node, trace.sub_root)),
            hkey: Some(trace.leaf_opening.hkey),
            hval: Some(trace.leaf_opening.hval),
            opening: Some(trace.leaf_opening),
            next_free_node: Some(trace.next_free_node),
            proof: Some(trace.proof.clone()),
        }
    }

    /// Public inputs in allocation order.
    pub fn public_inputs(&self) -> Option<Vec<Fr>> {
        Some(vec![self.top_root?, self.hkey?, self.hval?])
    }
}

impl ConstraintSynthesizer<Fr> for ReadNonZeroCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let top_root = FpVar::new_input(cs.clone(), || {
            self.top_root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let hkey = FpVar::new_input(cs.clone(), || {
            self.hkey.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let hval = FpVar::new_input(cs.clone(), || {
            self.hval.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let opening = self.opening.ok_or(SynthesisError::AssignmentMissing)?;
        let proof = self.proof.as_ref().ok_or(SynthesisError::AssignmentMissing)?;
        let opening_var = LeafOpeningVar::new_witness(cs.clone(), &opening)?;
        let proof_var = MerkleProofVar::new_witness(cs.clone(), proof)?;
        let next_free_node = FpVar::new_witness(cs.clone(), || {
            self.next_free_node
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        opening_var.hkey.enforce_equal(&hkey)?;
        opening_var.hval.enforce_equal(&hval)?;

        let leaf_hash = opening_var.hash(cs.clone())?;
        let sub_root = proof_var.compute_root(cs.clone(), &leaf_hash)?;
        top_root_var(cs, &next_free_node, &sub_root)?.enforce_equal(&top_root)?;

        Ok(())
    }
}
