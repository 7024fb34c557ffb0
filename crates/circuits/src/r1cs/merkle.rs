use ark_bn254::Fr;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use sparse_accumulator::Proof;

use super::anemoi::node_hash_var;

/// Merkle proof as circuit variables.
#[derive(Clone)]
pub struct MerkleProofVar {
    /// Leaf-level sibling first.
    siblings: Vec<FpVar<Fr>>,

    /// `is_right[level]` is set when the node at `level` is a right child.
    is_right: Vec<Boolean<Fr>>,
}

impl MerkleProofVar {
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        proof: &Proof,
    ) -> Result<Self, SynthesisError> {
        let siblings = proof
            .siblings
            .iter()
            .map(|sibling| FpVar::new_witness(cs.clone(), || Ok(*sibling)))
            .collect::<Result<Vec<_>, _>>()?;
        let is_right = (0..proof.depth())
            .map(|level| Boolean::new_witness(cs.clone(), || Ok(proof.is_right(level))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { siblings, is_right })
    }

    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Leaf position, recomposed from the direction bits.
    pub fn position(&self) -> Result<FpVar<Fr>, SynthesisError> {
        Boolean::le_bits_to_fp_var(&self.is_right)
    }

    /// Fold the siblings over `leaf_hash`, bottom-up.
    pub fn compute_root(
        &self,
        cs: ConstraintSystemRef<Fr>,
        leaf_hash: &FpVar<Fr>,
    ) -> Result<FpVar<Fr>, SynthesisError> {
        let mut current = leaf_hash.clone();
        for (sibling, is_right) in self.siblings.iter().zip(&self.is_right) {
            let left = is_right.select(sibling, &current)?;
            let right = is_right.select(&current, sibling)?;
            current = node_hash_var(cs.clone(), &left, &right)?;
        }
        Ok(current)
    }
}
