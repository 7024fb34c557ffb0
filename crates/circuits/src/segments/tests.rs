use ark_bn254::Fr;
use ark_ff::{One, PrimeField, Zero};
use num_bigint::BigUint;
use sparse_accumulator::accumulator::{total_rows, ReadZeroTrace};
use sparse_accumulator::{Accumulator, Hashable, Trace};

use super::*;
use crate::codec::{integer_to_limbs, LimbLayout};
use crate::error::CircuitError;
use crate::runtime::{ColumnId, Composition, Witness};

const DEPTH: usize = 4;
const MAX_PROOFS: usize = 32;

type U64Accumulator = Accumulator<u64, u64>;

fn seeded(keys: &[u64]) -> U64Accumulator {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    for key in keys {
        acc.insert(key, key * 10).unwrap();
    }
    acc
}

struct Proved {
    comp: Composition,
    module: AccumulatorModule,
    witness: Witness,
}

fn assign(assignments: &ColumnAssignments) -> Result<Proved, CircuitError> {
    let mut comp = Composition::new();
    let module = define_constraints(&mut comp, MAX_PROOFS, DEPTH)?;
    let mut witness = comp.new_witness();
    module.assign(&mut witness, assignments)?;
    Ok(Proved {
        comp,
        module,
        witness,
    })
}

fn prove(traces: &[Trace<u64, u64>]) -> Result<Proved, CircuitError> {
    let settings = Settings::new(MAX_PROOFS, DEPTH);
    let assignments = build_segments(traces, &settings)?;
    let proved = assign(&assignments)?;
    proved.comp.check(&proved.witness)?;
    Ok(proved)
}

fn build(traces: &[Trace<u64, u64>]) -> ColumnAssignments {
    build_segments(traces, &Settings::new(MAX_PROOFS, DEPTH)).unwrap()
}

fn check(assignments: &ColumnAssignments) -> Result<(), CircuitError> {
    let proved = assign(assignments)?;
    proved.comp.check(&proved.witness)
}

fn violated(result: Result<(), CircuitError>, suffix: &str) -> bool {
    match result {
        Err(CircuitError::ConstraintViolation { query, .. })
        | Err(CircuitError::OrderingViolation { query, .. })
        | Err(CircuitError::ProjectionMismatch { query, .. }) => query.ends_with(suffix),
        _ => false,
    }
}

fn insertion(acc: &mut U64Accumulator, key: u64) -> Vec<Trace<u64, u64>> {
    vec![acc.insert(&key, key + 1).unwrap()]
}

/// Overwrite `limbs` at `row` with the limbs of `value + p`.
fn shift_limbs_by_modulus(proved: &mut Proved, limbs: &[ColumnId], value: Fr, row: usize) {
    let shifted = BigUint::from(value) + BigUint::from(Fr::MODULUS);
    let limb_values = integer_to_limbs(&shifted, &LimbLayout::HKEY).unwrap();
    for (column, limb) in limbs.iter().zip(limb_values) {
        proved.witness.set(*column, row, limb).unwrap();
    }
}

#[test]
fn test_segment_lengths() {
    let mut acc = seeded(&[3, 9]);
    let traces = vec![
        acc.insert(&5, 50).unwrap(),
        acc.read_non_zero(&5).unwrap(),
        acc.read_zero(&6).unwrap(),
        acc.update(&9, 91).unwrap(),
        acc.delete(&3).unwrap(),
    ];
    let a = build(&traces);

    assert_eq!(a.num_rows(), 18);
    assert_eq!(a.num_rows(), total_rows(&traces));
    let firsts: Vec<usize> = (0..a.num_rows()).filter(|&i| a.is_first[i].is_one()).collect();
    assert_eq!(firsts, vec![0, 6, 8, 10, 12]);
    assert!(a.is_insert[..6].iter().all(One::is_one));
    assert!(a.is_read_non_zero[6..8].iter().all(One::is_one));
    assert!(a.is_read_zero[8..10].iter().all(One::is_one));
    assert!(a.is_update[10..12].iter().all(One::is_one));
    assert!(a.is_delete[12..].iter().all(One::is_one));
    assert_eq!(a.counter[17], Fr::from(17u64));
}

#[test]
fn test_insertion_rows() {
    let mut acc = seeded(&[]);
    let old_root = acc.sub_root();
    let nfn = acc.next_free_node();
    let traces = insertion(&mut acc, 42);
    let a = build(&traces);

    assert_eq!(a.roots[0], old_root);
    assert_eq!(a.roots[5], acc.sub_root());
    assert_eq!(a.leaves[2], Fr::zero());
    assert!(a.is_empty_leaf[2].is_one());
    assert!(a.is_insert_row3[2].is_one());
    assert_eq!(a.insertion_path[2], Fr::from(nfn));
    assert_eq!(a.positions[2], Fr::from(nfn));
    assert_eq!(a.next_free_node[1], Fr::from(nfn));
    assert_eq!(a.next_free_node[2], Fr::from(nfn + 1));
    assert_eq!(a.top_root[5], acc.top_root());
    // Proofs are shared by consecutive row pairs.
    let reuse: Vec<bool> = a.use_next_proof.iter().map(One::is_one).collect();
    assert_eq!(reuse, vec![true, false, true, false, true, false]);
    assert_eq!(a.proofs[0], a.proofs[1]);
    assert_eq!(a.proofs[4], a.proofs[5]);
}

#[test]
fn test_reads_do_not_reuse_proofs() {
    let acc = seeded(&[7]);
    let a = build(&[acc.read_non_zero(&7).unwrap(), acc.read_zero(&8).unwrap()]);
    assert!(a.use_next_proof.iter().all(Zero::is_zero));
    assert_eq!(a.leaves[0], a.leaves[1]);
    assert_eq!(a.hkey[2], 8u64.digest());
}

#[test]
fn test_single_insertion_holds() {
    let mut acc = seeded(&[]);
    let traces = insertion(&mut acc, 1);
    prove(&traces).unwrap();
}

#[test]
fn test_mixed_batch_holds() {
    let mut acc = seeded(&[11, 22, 33]);
    let traces = vec![
        acc.insert(&15, 150).unwrap(),
        acc.read_non_zero(&22).unwrap(),
        acc.update(&22, 220).unwrap(),
        acc.read_zero(&16).unwrap(),
        acc.delete(&11).unwrap(),
        acc.insert(&40, 400).unwrap(),
        acc.read_non_zero(&40).unwrap(),
    ];
    let proved = prove(&traces).unwrap();

    let last = total_rows(&traces) - 1;
    assert_eq!(
        proved.witness.cell(proved.module.cols.top_root, last),
        acc.top_root()
    );
    assert_eq!(
        proved.witness.cell(proved.module.cols.is_active, last + 1),
        Fr::zero()
    );
}

#[test]
fn test_delete_then_read_zero_holds() {
    let mut acc = seeded(&[5, 6, 7]);
    let traces = vec![acc.delete(&6).unwrap(), acc.read_zero(&6).unwrap()];
    prove(&traces).unwrap();
}

#[test]
fn test_full_row_budget_holds() {
    let mut acc = seeded(&[]);
    let mut traces = Vec::new();
    for key in 1..=5 {
        traces.push(acc.insert(&key, key).unwrap());
    }
    traces.push(acc.update(&3, 33).unwrap());
    assert_eq!(total_rows(&traces), MAX_PROOFS);
    prove(&traces).unwrap();
}

#[test]
fn test_empty_batch_holds() {
    let proved = prove(&[]).unwrap();
    assert_eq!(proved.witness.cell(proved.module.cols.is_active, 0), Fr::zero());
}

#[test]
fn test_tampered_root_rejected() {
    let mut acc = seeded(&[2]);
    let mut a = build(&insertion(&mut acc, 4));
    a.roots[3] += Fr::one();
    assert!(check(&a).is_err());
}

#[test]
fn test_tampered_sibling_rejected() {
    let mut acc = seeded(&[2]);
    let mut a = build(&insertion(&mut acc, 4));
    a.proofs[2].siblings[1] += Fr::one();
    a.proofs[3].siblings[1] += Fr::one();
    assert!(check(&a).is_err());
}

#[test]
fn test_tampered_position_bit_rejected() {
    let acc = seeded(&[2]);
    let a = build(&[acc.read_non_zero(&2).unwrap()]);
    let mut proved = assign(&a).unwrap();
    let pos_bit = proved.module.merkle.cols.pos_bit;
    let flipped = Fr::one() - proved.witness.cell(pos_bit, 0);
    proved.witness.set(pos_bit, 0, flipped).unwrap();
    assert!(proved.comp.check(&proved.witness).is_err());
}

#[test]
fn test_sandwich_order_enforced() {
    let mut acc = seeded(&[2, 8]);
    let mut a = build(&insertion(&mut acc, 5));
    a.hkey[0] = a.hkey_minus[0];
    assert!(matches!(
        check(&a),
        Err(CircuitError::OrderingViolation { query, row: 0 })
            if query == "ACCUMULATOR_HKEY_MINUS_LESS_THAN_HKEY"
    ));
}

#[test]
fn test_non_canonical_limbs_rejected() {
    let acc = seeded(&[2, 8]);
    let a = build(&[acc.read_zero(&5).unwrap()]);

    let mut proved = assign(&a).unwrap();
    let plus = proved.module.cols.hkey_plus_limbs.clone();
    shift_limbs_by_modulus(&mut proved, &plus, a.hkey_plus[0], 0);
    assert!(violated(
        proved.comp.check(&proved.witness),
        "HKEY_PLUS_CANONICAL"
    ));

    // Shifting the key and its successor together keeps both orderings.
    let mut proved = assign(&a).unwrap();
    let key = proved.module.cols.hkey_limbs.clone();
    shift_limbs_by_modulus(&mut proved, &key, a.hkey[0], 0);
    shift_limbs_by_modulus(&mut proved, &plus, a.hkey_plus[0], 0);
    assert!(violated(
        proved.comp.check(&proved.witness),
        "_HKEY_CANONICAL"
    ));
}

#[test]
fn test_present_key_cannot_pass_as_absent() {
    let acc = seeded(&[3, 7, 12]);
    let slot = acc.slot_of(&7).unwrap();
    let own = *acc.opening(slot).unwrap();
    let forged = Trace::ReadZero(ReadZeroTrace {
        key: 7u64,
        hkey: 7u64.digest(),
        opening_minus: *acc.opening(own.prev).unwrap(),
        opening_plus: own,
        proof_minus: acc.proof(own.prev).unwrap(),
        proof_plus: acc.proof(slot).unwrap(),
        sub_root: acc.sub_root(),
        next_free_node: acc.next_free_node(),
    });
    let a = build(&[forged]);
    assert!(violated(check(&a), "HKEY_LESS_THAN_HKEY_PLUS"));

    // Limbs of hkey + p satisfy the ordering and the recomposition mod p.
    let mut proved = assign(&a).unwrap();
    let limbs = proved.module.cols.hkey_plus_limbs.clone();
    shift_limbs_by_modulus(&mut proved, &limbs, a.hkey_plus[0], 0);
    assert!(violated(
        proved.comp.check(&proved.witness),
        "HKEY_PLUS_CANONICAL"
    ));
}

#[test]
fn test_non_adjacent_neighbours_rejected() {
    let acc = seeded(&[2, 8]);
    let mut a = build(&[acc.read_zero(&5).unwrap()]);
    a.leaf_minus_next[0] += Fr::one();
    assert!(violated(check(&a), "READ_ZERO_POINTER_1"));
}

#[test]
fn test_next_free_node_tamper_rejected() {
    let mut acc = seeded(&[]);
    let mut a = build(&insertion(&mut acc, 9));
    a.next_free_node[2] += Fr::one();
    assert!(violated(check(&a), "NEXT_FREE_NODE_INCREMENT"));
}

#[test]
fn test_broken_root_chain_rejected() {
    let before = seeded(&[1]);
    let mut after = seeded(&[1]);
    after.update(&1, 99).unwrap();
    let first = before.read_non_zero(&1).unwrap();
    let second = after.read_non_zero(&1).unwrap();

    assert!(violated(check(&build(&[first, second])), "ROOT_CHAINING"));
}

#[test]
fn test_relabelled_operation_rejected() {
    let mut acc = seeded(&[3]);
    let mut a = build(&[acc.update(&3, 4).unwrap()]);
    a.is_update = vec![Fr::zero(); 2];
    a.is_read_non_zero = vec![Fr::one(); 2];
    assert!(check(&a).is_err());
}

#[test]
fn test_capacity_overflow() {
    let mut acc = seeded(&[]);
    let traces: Vec<_> = (1..=6).map(|key| acc.insert(&key, key).unwrap()).collect();
    assert!(matches!(
        build_segments(&traces, &Settings::new(MAX_PROOFS, DEPTH)),
        Err(CircuitError::CapacityOverflow { required: 36, max: 32 })
    ));

    let mut a = build(&traces[..5]);
    let extra = build(&traces[5..]);
    a.is_active.extend(extra.is_active);
    assert!(matches!(
        assign(&a),
        Err(CircuitError::CapacityOverflow { required: 36, max: 32 })
    ));
}

#[test]
fn test_proof_depth_mismatch() {
    let mut shallow = Accumulator::<u64, u64>::new(DEPTH - 1).unwrap();
    let mut deep = seeded(&[]);
    let traces = vec![deep.insert(&1, 1).unwrap(), shallow.insert(&1, 1).unwrap()];
    assert!(matches!(
        build_segments(&traces, &Settings::new(MAX_PROOFS, DEPTH)),
        Err(CircuitError::ProofDepthMismatch { index: 1, expected: 4, actual: 3 })
    ));
}

#[test]
fn test_settings_validation() {
    assert!(Settings::new(32, 4).validate().is_ok());
    assert!(Settings::new(1, 4).validate().is_err());
    assert!(Settings::new(32, 0).validate().is_err());
    assert!(Settings::new(32, 64).validate().is_err());

    let settings = Settings::new(20, 5);
    assert_eq!(settings.num_rows(), 32);
    assert_eq!(settings.num_proof_rows(), 256);

    let mut comp = Composition::new();
    assert!(matches!(
        define_constraints(&mut comp, 1, 4),
        Err(CircuitError::InvalidSettings(_))
    ));
}

#[test]
fn test_settings_from_json() {
    let settings: Settings =
        serde_json::from_str(r#"{"max_num_proofs": 64, "merkle_tree_depth": 10}"#).unwrap();
    assert_eq!(settings, Settings::new(64, 10));
    assert_eq!(settings.name, "ACCUMULATOR");
}
