use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use sparse_accumulator::LeafOpening;

use super::anemoi::hash_elements_var;

/// Leaf opening as circuit variables.
#[derive(Clone)]
pub struct LeafOpeningVar {
    pub prev: FpVar<Fr>,
    pub next: FpVar<Fr>,
    pub hkey: FpVar<Fr>,
    pub hval: FpVar<Fr>,
}

impl LeafOpeningVar {
    /// Allocate every field of `opening` as a witness.
    pub fn new_witness(
        cs: ConstraintSystemRef<Fr>,
        opening: &LeafOpening,
    ) -> Result<Self, SynthesisError> {
        let alloc = |value: Fr| FpVar::new_witness(cs.clone(), || Ok(value));
        Ok(Self {
            prev: alloc(Fr::from(opening.prev))?,
            next: alloc(Fr::from(opening.next))?,
            hkey: alloc(opening.hkey)?,
            hval: alloc(opening.hval)?,
        })
    }

    /// `C(C(C(C(0, prev), next), hkey), hval)`.
    pub fn hash(&self, cs: ConstraintSystemRef<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
        hash_elements_var(
            cs,
            &[
                self.prev.clone(),
                self.next.clone(),
                self.hkey.clone(),
                self.hval.clone(),
            ],
        )
    }
}
