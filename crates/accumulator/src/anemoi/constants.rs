//! Anemoi constants for the two-cell BN254 instance.
//!
//! Round constants are derived from the digits of pi the way the Anemoi paper
//! prescribes (single column, `j = 0`). They are generated once on first use.

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_ff::{Field, PrimeField};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};

/// Number of rounds for 128-bit security with 2 cells (state width 2).
pub const NUM_ROUNDS: usize = 21;

/// S-box exponent alpha = 5.
pub const ALPHA: u64 = 5;

/// Multiplicative generator used by the linear layer and the Flystel.
pub const GENERATOR: u64 = 5;

/// First 76 decimal digits of pi.
const PI_0: &[u8] = b"1415926535897932384626433832795028841971693993751058209749445923078164062862";

/// Precomputed constants shared by the native permutation and the R1CS gadget.
#[derive(Debug)]
pub struct AnemoiConstants {
    pub generator: Fr,
    pub generator_inv: Fr,
    pub round_c: [Fr; NUM_ROUNDS],
    pub round_d: [Fr; NUM_ROUNDS],
    /// 1/alpha mod (p - 1), little-endian u64 limbs for `Field::pow`.
    pub inv_alpha: Vec<u64>,
}

static CONSTANTS: OnceLock<AnemoiConstants> = OnceLock::new();

/// Shared constant table.
pub fn constants() -> &'static AnemoiConstants {
    CONSTANTS.get_or_init(AnemoiConstants::generate)
}

impl AnemoiConstants {
    fn generate() -> Self {
        let generator = Fr::from(GENERATOR);
        let generator_inv = generator
            .inverse()
            .expect("generator is non-zero");

        let pi_0 = Fr::from(BigUint::parse_bytes(PI_0, 10).expect("pi digits are decimal"));

        let mut round_c = [Fr::from(0u64); NUM_ROUNDS];
        let mut round_d = [Fr::from(0u64); NUM_ROUNDS];
        let mut pi_0_i = Fr::from(1u64);
        for i in 0..NUM_ROUNDS {
            // (pi_0^i + pi_1^0)^alpha with pi_1^0 = 1
            let mixed = (pi_0_i + Fr::from(1u64)).pow([ALPHA]);
            round_c[i] = generator * pi_0_i.square() + mixed;
            round_d[i] = generator + mixed + generator_inv;
            pi_0_i *= pi_0;
        }

        Self {
            generator,
            generator_inv,
            round_c,
            round_d,
            inv_alpha: compute_inv_alpha().to_u64_digits(),
        }
    }
}

/// Compute 1/alpha modulo (p - 1) for the BN254 scalar field.
fn compute_inv_alpha() -> BigUint {
    let p_minus_1 = BigUint::from(Fr::MODULUS) - BigUint::one();
    mod_inverse(&BigUint::from(ALPHA), &p_minus_1).expect("alpha is coprime with p - 1")
}

/// Extended Euclidean algorithm for modular inverse.
fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a = BigInt::from(a.clone());
    let m = BigInt::from(m.clone());

    let (mut old_r, mut r) = (m.clone(), a);
    let (mut old_s, mut s) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);

        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if old_r != BigInt::one() {
        return None;
    }
    if old_s.is_negative() {
        old_s += &m;
    }
    old_s.to_biguint()
}

/// Compute x^(1/alpha).
pub fn exp_inv_alpha(x: Fr) -> Fr {
    x.pow(&constants().inv_alpha)
}

#[cfg(test)]
mod constants_tests {
    use super::*;

    #[test]
    fn test_inv_alpha_is_inverse() {
        let x = Fr::from(123_456_789u64);
        assert_eq!(exp_inv_alpha(x).pow([ALPHA]), x);
    }

    #[test]
    fn test_mod_inverse_small() {
        let inv = mod_inverse(&BigUint::from(3u64), &BigUint::from(7u64)).unwrap();
        assert_eq!(inv, BigUint::from(5u64));
        assert!(mod_inverse(&BigUint::from(2u64), &BigUint::from(4u64)).is_none());
    }

    #[test]
    fn test_round_constants_distinct() {
        let c = constants();
        for i in 1..NUM_ROUNDS {
            assert_ne!(c.round_c[i], c.round_c[i - 1]);
            assert_ne!(c.round_d[i], c.round_d[i - 1]);
        }
        assert_eq!(c.generator * c.generator_inv, Fr::from(1u64));
    }
}
