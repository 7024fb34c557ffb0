//! Native Anemoi permutation and Jive compression.

use ark_bn254::Fr;
use ark_ff::Field;

use super::constants::{constants, exp_inv_alpha, NUM_ROUNDS};

/// Anemoi state (2 field elements for 2:1 mode).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnemoiState {
    pub x: Fr,
    pub y: Fr,
}

impl AnemoiState {
    pub fn from_elements(x: Fr, y: Fr) -> Self {
        Self { x, y }
    }
}

fn apply_round_constants(state: &mut AnemoiState, round: usize) {
    let c = constants();
    state.x += c.round_c[round];
    state.y += c.round_d[round];
}

/// Linear layer for l = 1: `x += g*y; y += g*x`.
fn apply_linear_layer(state: &mut AnemoiState) {
    let g = constants().generator;
    state.x += g * state.y;
    state.y += g * state.x;
}

/// Open Flystel:
/// 1. x -= g*y^2 + g^-1
/// 2. y -= x^(1/alpha)
/// 3. x += g*y^2
fn apply_sbox(state: &mut AnemoiState) {
    let c = constants();
    state.x -= c.generator * state.y.square() + c.generator_inv;
    state.y -= exp_inv_alpha(state.x);
    state.x += c.generator * state.y.square();
}

/// Execute the full Anemoi permutation.
pub fn permutation(state: &mut AnemoiState) {
    for round in 0..NUM_ROUNDS {
        apply_round_constants(state, round);
        apply_linear_layer(state);
        apply_sbox(state);
    }
    apply_linear_layer(state);
}

/// Jive 2-to-1 compression: `a + b + P(a, b).x + P(a, b).y`.
pub fn compress(a: Fr, b: Fr) -> Fr {
    let mut state = AnemoiState::from_elements(a, b);
    permutation(&mut state);
    a + b + state.x + state.y
}
