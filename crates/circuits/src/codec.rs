//! Proof codec and limb codec.
//!
//! Proofs are packed into one flat column of `depth`-row blocks. Inside the
//! block of proof `p`, row `p * depth + (depth - 1 - level)` holds the sibling
//! at `level`, so the root-side sibling comes first and the leaf-side sibling
//! last. The column is right-zero-padded to a power of two.

use ark_bn254::Fr;
use ark_ff::{BigInteger, Field, One, PrimeField, Zero};
use num_bigint::BigUint;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sparse_accumulator::Proof;

use crate::error::CircuitError;

/// Smallest power of two `>= n` (1 for `n == 0`).
pub fn next_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// `values` followed by zeros up to `size` entries.
pub fn right_zero_padded(mut values: Vec<Fr>, size: usize) -> Vec<Fr> {
    if values.len() < size {
        values.resize(size, Fr::zero());
    }
    values
}

/// Field element as `u64`, if it fits.
pub fn field_to_u64(value: Fr) -> Option<u64> {
    let bigint = value.into_bigint();
    if bigint.as_ref()[1..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(bigint.as_ref()[0])
}

/// Proofs laid out for the root recomputation gadget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedProofs {
    pub depth: usize,
    pub num_proofs: usize,
    pub column: Vec<Fr>,
}

/// Pack `proofs` into a single column of `next_power_of_two(len * depth)` rows.
pub fn pack(proofs: &[Proof], depth: usize) -> Result<PackedProofs, CircuitError> {
    pack_into(proofs, depth, next_power_of_two(proofs.len() * depth))
}

/// Pack `proofs` into a column of exactly `size` rows.
pub fn pack_into(proofs: &[Proof], depth: usize, size: usize) -> Result<PackedProofs, CircuitError> {
    if let Some((index, proof)) = proofs
        .iter()
        .enumerate()
        .find(|(_, proof)| proof.depth() != depth)
    {
        return Err(CircuitError::ProofDepthMismatch {
            index,
            expected: depth,
            actual: proof.depth(),
        });
    }
    if proofs.len() * depth > size {
        return Err(CircuitError::CapacityOverflow {
            required: proofs.len() * depth,
            max: size,
        });
    }

    let mut column = vec![Fr::zero(); size];
    if depth > 0 {
        column
            .par_chunks_mut(depth)
            .zip(proofs.par_iter())
            .for_each(|(block, proof)| {
                for (level, sibling) in proof.siblings.iter().enumerate() {
                    block[depth - 1 - level] = *sibling;
                }
            });
    }

    Ok(PackedProofs {
        depth,
        num_proofs: proofs.len(),
        column,
    })
}

/// Inverse of `pack` over the first `positions.len()` blocks. Only the
/// `num_proofs` populated blocks can be read back.
pub fn unpack(packed: &PackedProofs, positions: &[u64]) -> Result<Vec<Proof>, CircuitError> {
    let depth = packed.depth;
    if positions.len() > packed.num_proofs {
        return Err(CircuitError::CapacityOverflow {
            required: positions.len(),
            max: packed.num_proofs,
        });
    }

    Ok(positions
        .iter()
        .enumerate()
        .map(|(p, &path)| {
            let block = &packed.column[p * depth..(p + 1) * depth];
            Proof::new(path, block.iter().rev().copied().collect())
        })
        .collect())
}

/// Leaf positions of `proofs` as field elements.
pub fn positions_column(proofs: &[Proof]) -> Vec<Fr> {
    proofs.iter().map(|proof| Fr::from(proof.path)).collect()
}

/// Limb order inside a limb decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Most significant limb first.
    Big,
    /// Least significant limb first.
    Little,
}

/// Fixed-width limb decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimbLayout {
    pub limb_bits: usize,
    pub num_limbs: usize,
    pub endianness: Endianness,
}

impl LimbLayout {
    /// 16 big-endian limbs of 16 bits, wide enough for any field element.
    pub const HKEY: LimbLayout = LimbLayout {
        limb_bits: 16,
        num_limbs: 16,
        endianness: Endianness::Big,
    };

    pub fn new(limb_bits: usize, num_limbs: usize, endianness: Endianness) -> Self {
        Self {
            limb_bits,
            num_limbs,
            endianness,
        }
    }

    pub fn total_bits(&self) -> usize {
        self.limb_bits * self.num_limbs
    }

    /// Power of 2^limb_bits carried by the limb stored at `index`.
    fn significance(&self, index: usize) -> usize {
        match self.endianness {
            Endianness::Big => self.num_limbs - 1 - index,
            Endianness::Little => index,
        }
    }

    /// Weight of each stored limb, in storage order.
    pub fn weights(&self) -> Vec<Fr> {
        let base = Fr::from(2u64).pow([self.limb_bits as u64]);
        (0..self.num_limbs)
            .map(|index| base.pow([self.significance(index) as u64]))
            .collect()
    }
}

/// Split `value` into limbs following `layout`.
pub fn to_limbs(value: Fr, layout: &LimbLayout) -> Result<Vec<Fr>, CircuitError> {
    integer_to_limbs(&value.into(), layout)
}

/// Limbs of the field modulus. Limb vectors below it are canonical.
pub fn modulus_limbs(layout: &LimbLayout) -> Result<Vec<Fr>, CircuitError> {
    integer_to_limbs(&BigUint::from(Fr::MODULUS), layout)
}

/// Split an arbitrary integer into limbs following `layout`.
pub fn integer_to_limbs(integer: &BigUint, layout: &LimbLayout) -> Result<Vec<Fr>, CircuitError> {
    if integer.bits() as usize > layout.total_bits() {
        return Err(CircuitError::ValueOutOfRange {
            bits: layout.total_bits(),
        });
    }
    let mask = (BigUint::one() << layout.limb_bits) - BigUint::one();
    Ok((0..layout.num_limbs)
        .map(|index| {
            let shift = layout.significance(index) * layout.limb_bits;
            Fr::from((integer >> shift) & &mask)
        })
        .collect())
}

/// Recompose limbs into a field element.
pub fn from_limbs(limbs: &[Fr], layout: &LimbLayout) -> Result<Fr, CircuitError> {
    compose_integer(limbs, layout)
        .map(Fr::from)
        .ok_or(CircuitError::ValueOutOfRange {
            bits: layout.limb_bits,
        })
}

/// Integer value of `limbs`, or `None` when a limb exceeds its width or the
/// limb count does not match the layout.
pub fn compose_integer(limbs: &[Fr], layout: &LimbLayout) -> Option<BigUint> {
    if limbs.len() != layout.num_limbs {
        return None;
    }
    let mut integer = BigUint::zero();
    for (index, limb) in limbs.iter().enumerate() {
        let limb = limb.into_bigint();
        if limb.num_bits() as usize > layout.limb_bits {
            return None;
        }
        let shift = layout.significance(index) * layout.limb_bits;
        integer += BigUint::from(limb) << shift;
    }
    Some(integer)
}
