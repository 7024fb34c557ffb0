//! Anemoi/Jive compression in-circuit.
//!
//! x^(1/5) is witnessed and checked with w^5 = x, so each round costs a
//! handful of multiplications.

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::prelude::*;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};
use sparse_accumulator::anemoi::{constants, exp_inv_alpha, NUM_ROUNDS};

/// Anemoi state as circuit variables.
#[derive(Clone)]
struct AnemoiStateVar {
    x: FpVar<Fr>,
    y: FpVar<Fr>,
}

/// x^5, 3 constraints.
fn exp_alpha_var(x: &FpVar<Fr>) -> Result<FpVar<Fr>, SynthesisError> {
    let x2 = x.square()?;
    let x4 = x2.square()?;
    Ok(&x4 * x)
}

fn exp_inv_alpha_var(
    cs: ConstraintSystemRef<Fr>,
    x: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let w = FpVar::new_witness(cs, || Ok(exp_inv_alpha(x.value()?)))?;
    exp_alpha_var(&w)?.enforce_equal(x)?;
    Ok(w)
}

fn apply_round_constants_var(state: &mut AnemoiStateVar, round: usize) {
    let c = constants();
    state.x += FpVar::constant(c.round_c[round]);
    state.y += FpVar::constant(c.round_d[round]);
}

/// `x += g*y; y += g*x`, free of constraints.
fn apply_linear_layer_var(state: &mut AnemoiStateVar) {
    let g = constants().generator;
    state.x = &state.x + &state.y * g;
    state.y = &state.y + &state.x * g;
}

/// Open Flystel.
fn apply_sbox_var(
    cs: ConstraintSystemRef<Fr>,
    state: &mut AnemoiStateVar,
) -> Result<(), SynthesisError> {
    let c = constants();
    state.x = &state.x - state.y.square()? * c.generator - FpVar::constant(c.generator_inv);
    let root = exp_inv_alpha_var(cs, &state.x)?;
    state.y = &state.y - &root;
    state.x = &state.x + state.y.square()? * c.generator;
    Ok(())
}

fn permutation_var(
    cs: ConstraintSystemRef<Fr>,
    state: &mut AnemoiStateVar,
) -> Result<(), SynthesisError> {
    for round in 0..NUM_ROUNDS {
        apply_round_constants_var(state, round);
        apply_linear_layer_var(state);
        apply_sbox_var(cs.clone(), state)?;
    }
    apply_linear_layer_var(state);
    Ok(())
}

/// Jive compression `a + b + P(a, b).x + P(a, b).y`.
pub fn compress_var(
    cs: ConstraintSystemRef<Fr>,
    a: &FpVar<Fr>,
    b: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut state = AnemoiStateVar {
        x: a.clone(),
        y: b.clone(),
    };
    permutation_var(cs, &mut state)?;
    Ok(a + b + &state.x + &state.y)
}

/// Compression chain over `elements` from the zero state.
pub fn hash_elements_var(
    cs: ConstraintSystemRef<Fr>,
    elements: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    elements
        .iter()
        .try_fold(FpVar::zero(), |state, element| compress_var(cs.clone(), &state, element))
}

/// `C(C(0, left), right)`.
pub fn node_hash_var(
    cs: ConstraintSystemRef<Fr>,
    left: &FpVar<Fr>,
    right: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    hash_elements_var(cs, &[left.clone(), right.clone()])
}

/// `C(C(0, next_free_node), sub_root)`.
pub fn top_root_var(
    cs: ConstraintSystemRef<Fr>,
    next_free_node: &FpVar<Fr>,
    sub_root: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    hash_elements_var(cs, &[next_free_node.clone(), sub_root.clone()])
}
