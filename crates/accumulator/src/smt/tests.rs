use ark_bn254::Fr;
use ark_ff::Zero;

use super::*;
use crate::error::AccumulatorError;
use crate::hashing::node_hash;

const DEPTH: usize = 4;

#[test]
fn test_empty_tree_root_is_default() {
    let tree = SparseMerkleTree::new(DEPTH).unwrap();
    assert_eq!(tree.root(), tree.default_at_level(DEPTH));
    assert_eq!(tree.capacity(), 16);
    assert!(tree.leaf(3).unwrap().is_zero());
}

#[test]
fn test_invalid_depth() {
    assert!(matches!(
        SparseMerkleTree::new(0),
        Err(AccumulatorError::InvalidDepth(0))
    ));
    assert!(SparseMerkleTree::new(MAX_DEPTH + 1).is_err());
}

#[test]
fn test_set_leaf_changes_root() {
    let mut tree = SparseMerkleTree::new(DEPTH).unwrap();
    let empty_root = tree.root();

    let root = tree.set_leaf(5, Fr::from(42u64)).unwrap();

    assert_ne!(root, empty_root);
    assert_eq!(root, tree.root());
    assert_eq!(tree.leaf(5).unwrap(), Fr::from(42u64));
}

#[test]
fn test_clearing_leaf_restores_root() {
    let mut tree = SparseMerkleTree::new(DEPTH).unwrap();
    tree.set_leaf(1, Fr::from(7u64)).unwrap();
    let root = tree.root();

    tree.set_leaf(9, Fr::from(8u64)).unwrap();
    tree.set_leaf(9, EMPTY_LEAF).unwrap();

    assert_eq!(tree.root(), root);
}

#[test]
fn test_proofs_verify_for_every_slot() {
    let mut tree = SparseMerkleTree::new(DEPTH).unwrap();
    for position in [0u64, 3, 6, 15] {
        tree.set_leaf(position, Fr::from(position + 100)).unwrap();
    }

    for position in 0..tree.capacity() {
        let proof = tree.proof(position).unwrap();
        let leaf = tree.leaf(position).unwrap();
        assert_eq!(proof.depth(), DEPTH);
        assert!(proof.verify(leaf, tree.root()), "slot {position}");
        assert!(!proof.verify(leaf + Fr::from(1u64), tree.root()));
    }
}

#[test]
fn test_depth_one_tree() {
    let mut tree = SparseMerkleTree::new(1).unwrap();
    tree.set_leaf(0, Fr::from(1u64)).unwrap();
    tree.set_leaf(1, Fr::from(2u64)).unwrap();
    assert_eq!(tree.root(), node_hash(Fr::from(1u64), Fr::from(2u64)));
}

#[test]
fn test_position_out_of_range() {
    let mut tree = SparseMerkleTree::new(DEPTH).unwrap();
    assert!(matches!(
        tree.set_leaf(16, Fr::from(1u64)),
        Err(AccumulatorError::PositionOutOfRange { position: 16, depth: DEPTH })
    ));
    assert!(tree.proof(16).is_err());
}

#[test]
fn test_deterministic_root_regardless_of_order() {
    let mut a = SparseMerkleTree::new(DEPTH).unwrap();
    let mut b = SparseMerkleTree::new(DEPTH).unwrap();

    a.set_leaf(2, Fr::from(20u64)).unwrap();
    a.set_leaf(11, Fr::from(110u64)).unwrap();
    b.set_leaf(11, Fr::from(110u64)).unwrap();
    b.set_leaf(2, Fr::from(20u64)).unwrap();

    assert_eq!(a.root(), b.root());
}
