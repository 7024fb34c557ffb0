use ark_bn254::Fr;
use ark_ff::{One, Zero};
use sparse_accumulator::{Proof, SparseMerkleTree};

use super::*;
use crate::codec::{pack, positions_column};
use crate::error::CircuitError;
use crate::runtime::{AssignmentRuntime, ColumnId, Composition, ConstraintRuntime, Witness};

struct Fixture {
    comp: Composition,
    gadget: RootRecomputation,
    leaves: ColumnId,
    roots: ColumnId,
    positions: ColumnId,
    proofs: ColumnId,
    is_active: Option<ColumnId>,
    reuse: Option<ProofReuse>,
}

fn fixture(depth: usize, num_proofs: usize, driven: bool, reuse: bool) -> Fixture {
    let mut comp = Composition::new();
    let size = crate::codec::next_power_of_two(num_proofs * depth);
    let leaves = comp.declare_column(0, "LEAVES", num_proofs);
    let roots = comp.declare_column(0, "ROOTS", num_proofs);
    let positions = comp.declare_column(0, "POSITIONS", num_proofs);
    let proofs = comp.declare_column(0, "PROOFS", size);
    let is_active = driven.then(|| comp.declare_column(0, "IS_ACTIVE", num_proofs));
    let reuse = reuse.then(|| ProofReuse {
        use_next: comp.declare_column(0, "USE_NEXT", num_proofs),
        counter: comp.declare_column(0, "COUNTER", num_proofs),
    });

    let gadget = RootRecomputation::define(
        &mut comp,
        RootRecomputationInputs {
            name: "MERKLE".to_string(),
            round: 0,
            depth,
            num_proofs,
            proofs,
            leaves,
            roots,
            positions,
            is_active,
            reuse,
        },
    )
    .unwrap();

    Fixture {
        comp,
        gadget,
        leaves,
        roots,
        positions,
        proofs,
        is_active,
        reuse,
    }
}

/// Tree of the given depth with leaf `i` set to `i + 100`.
fn populated_tree(depth: usize) -> SparseMerkleTree {
    let mut tree = SparseMerkleTree::new(depth).unwrap();
    for position in 0..tree.capacity() {
        tree.set_leaf(position, Fr::from(position + 100)).unwrap();
    }
    tree
}

fn openings(tree: &SparseMerkleTree, positions: &[u64]) -> (Vec<Fr>, Vec<Fr>, Vec<Proof>) {
    let leaves = positions.iter().map(|p| tree.leaf(*p).unwrap()).collect();
    let roots = vec![tree.root(); positions.len()];
    let proofs = positions.iter().map(|p| tree.proof(*p).unwrap()).collect();
    (leaves, roots, proofs)
}

fn assign_inputs(fx: &Fixture, leaves: Vec<Fr>, roots: Vec<Fr>, proofs: &[Proof]) -> Witness {
    let mut witness = fx.comp.new_witness();
    let packed = pack(proofs, fx.gadget.inputs.depth).unwrap();
    witness.assign(fx.leaves, leaves).unwrap();
    witness.assign(fx.roots, roots).unwrap();
    witness.assign(fx.positions, positions_column(proofs)).unwrap();
    witness.assign(fx.proofs, packed.column).unwrap();
    witness
}

#[test]
fn test_plan_selection() {
    assert_eq!(fixture(2, 4, false, false).gadget.plan, ActivityPlan::FullyActive);
    assert_eq!(fixture(3, 4, false, false).gadget.plan, ActivityPlan::Padded);
    assert_eq!(fixture(3, 4, true, false).gadget.plan, ActivityPlan::Driven);
    assert_eq!(fixture(3, 4, true, true).gadget.plan, ActivityPlan::Driven);
    assert_eq!(fixture(3, 4, false, false).gadget.size, 16);
}

#[test]
fn test_fully_active_recomputation() {
    let fx = fixture(2, 4, false, false);
    let tree = populated_tree(2);
    let (leaves, roots, proofs) = openings(&tree, &[0, 1, 2, 3]);

    let mut witness = assign_inputs(&fx, leaves, roots, &proofs);
    fx.gadget.assign(&mut witness).unwrap();
    fx.comp.check(&witness).unwrap();
}

#[test]
fn test_padded_four_proofs_depth_three() {
    let fx = fixture(3, 4, false, false);
    let tree = populated_tree(3);
    let (leaves, roots, proofs) = openings(&tree, &[5, 0, 7, 2]);

    let mut witness = assign_inputs(&fx, leaves, roots, &proofs);
    fx.gadget.assign(&mut witness).unwrap();
    fx.comp.check(&witness).unwrap();

    // Padding rows hash two zero children.
    let pad_interm = sparse_accumulator::compress(Fr::zero(), Fr::zero());
    assert_eq!(witness.cell(fx.gadget.cols.interm, 12), pad_interm);
    assert_eq!(witness.cell(fx.gadget.cols.root, 15), Fr::zero());
    // The leaf row of proof 0 accumulates the full position.
    assert_eq!(witness.cell(fx.gadget.cols.pos_acc, 2), Fr::from(5u64));
    assert_eq!(witness.cell(fx.gadget.cols.root, 0), tree.root());
}

#[test]
fn test_wrong_root_rejected() {
    let fx = fixture(3, 4, false, false);
    let tree = populated_tree(3);
    let (leaves, mut roots, proofs) = openings(&tree, &[1, 2, 3, 4]);
    roots[2] += Fr::one();

    let mut witness = assign_inputs(&fx, leaves, roots, &proofs);
    fx.gadget.assign(&mut witness).unwrap();
    assert!(matches!(
        fx.comp.check(&witness),
        Err(CircuitError::ProjectionMismatch { .. })
    ));
}

#[test]
fn test_tampered_gadget_column_rejected() {
    let fx = fixture(2, 4, false, false);
    let tree = populated_tree(2);
    let (leaves, roots, proofs) = openings(&tree, &[0, 1, 2, 3]);

    let mut witness = assign_inputs(&fx, leaves, roots, &proofs);
    fx.gadget.assign(&mut witness).unwrap();
    let interm = witness.cell(fx.gadget.cols.interm, 1);
    witness
        .set(fx.gadget.cols.interm, 1, interm + Fr::one())
        .unwrap();
    assert!(fx.comp.check(&witness).is_err());
}

#[test]
fn test_driven_activity_with_proof_reuse() {
    let fx = fixture(3, 4, true, true);
    let mut tree = populated_tree(3);

    // Blocks 0 and 1 open the same position before and after a leaf write.
    let old_leaf = tree.leaf(6).unwrap();
    let old_root = tree.root();
    let proof = tree.proof(6).unwrap();
    tree.set_leaf(6, Fr::from(999u64)).unwrap();
    let new_root = tree.root();
    let other = tree.proof(1).unwrap();

    let proofs = vec![proof.clone(), proof, other];
    let leaves = vec![old_leaf, Fr::from(999u64), tree.leaf(1).unwrap(), Fr::zero()];
    let roots = vec![old_root, new_root, new_root, Fr::zero()];

    let mut witness = fx.comp.new_witness();
    let packed = crate::codec::pack_into(&proofs, 3, 16).unwrap();
    let mut positions = positions_column(&proofs);
    positions.push(Fr::zero());
    witness.assign(fx.leaves, leaves).unwrap();
    witness.assign(fx.roots, roots).unwrap();
    witness.assign(fx.positions, positions).unwrap();
    witness.assign(fx.proofs, packed.column).unwrap();
    witness
        .assign(fx.is_active.unwrap(), vec![Fr::one(), Fr::one(), Fr::one(), Fr::zero()])
        .unwrap();
    let reuse = fx.reuse.unwrap();
    witness
        .assign(reuse.use_next, vec![Fr::one(), Fr::zero(), Fr::zero(), Fr::zero()])
        .unwrap();
    witness
        .assign(reuse.counter, vec![Fr::zero(), Fr::one(), Fr::from(2u64), Fr::zero()])
        .unwrap();

    fx.gadget.assign(&mut witness).unwrap();
    fx.comp.check(&witness).unwrap();

    let expanded = fx.gadget.cols.expanded.unwrap();
    assert_eq!(witness.cell(expanded.is_active, 8), Fr::one());
    assert_eq!(witness.cell(expanded.is_active, 9), Fr::zero());
}

#[test]
fn test_reuse_across_different_proofs_rejected() {
    let fx = fixture(2, 2, true, true);
    let tree = populated_tree(2);
    let (leaves, roots, proofs) = openings(&tree, &[0, 3]);

    let mut witness = assign_inputs(&fx, leaves, roots, &proofs);
    witness.assign(fx.is_active.unwrap(), vec![Fr::one(); 2]).unwrap();
    let reuse = fx.reuse.unwrap();
    witness
        .assign(reuse.use_next, vec![Fr::one(), Fr::zero()])
        .unwrap();
    witness
        .assign(reuse.counter, vec![Fr::zero(), Fr::one()])
        .unwrap();

    fx.gadget.assign(&mut witness).unwrap();
    match fx.comp.check(&witness) {
        Err(CircuitError::ConstraintViolation { query, .. }) => {
            assert!(query.ends_with("_REUSE"), "unexpected query {query}");
        }
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_activity_must_be_boolean() {
    let fx = fixture(2, 2, true, false);
    let tree = populated_tree(2);
    let (leaves, roots, proofs) = openings(&tree, &[0, 1]);

    let mut witness = assign_inputs(&fx, leaves, roots, &proofs);
    witness
        .assign(fx.is_active.unwrap(), vec![Fr::one(), Fr::from(2u64)])
        .unwrap();
    assert!(matches!(
        fx.gadget.assign(&mut witness),
        Err(CircuitError::NotABit { row: 1, .. })
    ));
}

#[test]
fn test_invalid_definitions() {
    let mut comp = Composition::new();
    let leaves = comp.declare_column(0, "LEAVES", 4);
    let proofs = comp.declare_column(0, "PROOFS", 8);
    let use_next = comp.declare_column(0, "USE_NEXT", 4);

    let inputs = RootRecomputationInputs {
        name: "MERKLE".to_string(),
        round: 0,
        depth: 3,
        num_proofs: 4,
        proofs,
        leaves,
        roots: leaves,
        positions: leaves,
        is_active: None,
        reuse: None,
    };
    assert!(matches!(
        RootRecomputation::define(&mut comp, inputs.clone()),
        Err(CircuitError::ColumnSizeMismatch { expected: 16, actual: 8, .. })
    ));

    let inputs = RootRecomputationInputs {
        depth: 2,
        reuse: Some(ProofReuse {
            use_next,
            counter: use_next,
        }),
        ..inputs
    };
    assert!(matches!(
        RootRecomputation::define(&mut comp, inputs),
        Err(CircuitError::InvalidSettings(_))
    ));
}
