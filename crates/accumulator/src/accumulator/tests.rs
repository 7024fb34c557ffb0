use ark_bn254::Fr;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::error::AccumulatorError;
use crate::hashing::Hashable;
use crate::smt::EMPTY_LEAF;

const DEPTH: usize = 4;

type U64Accumulator = Accumulator<u64, u64>;

fn walk(acc: &U64Accumulator) -> Vec<LeafOpening> {
    let mut out = Vec::new();
    let mut slot = HEAD_SLOT;
    loop {
        let opening = *acc.opening(slot).expect("slot on the list has an opening");
        out.push(opening);
        if slot == TAIL_SLOT {
            return out;
        }
        let next = acc.opening(opening.next).expect("next slot exists");
        assert_eq!(next.prev, slot, "prev pointer of slot {} is stale", opening.next);
        slot = opening.next;
        assert!(out.len() <= acc.capacity() as usize, "cycle in list");
    }
}

fn assert_sorted(acc: &U64Accumulator) {
    let list = walk(acc);
    assert_eq!(list.len(), acc.len() + 2);
    for pair in list.windows(2) {
        assert!(pair[0].hkey < pair[1].hkey);
    }
}

#[test]
fn test_new_accumulator_holds_sentinels() {
    let acc = U64Accumulator::new(DEPTH).unwrap();

    assert!(acc.is_empty());
    assert_eq!(acc.next_free_node(), 2);
    assert_eq!(acc.opening(HEAD_SLOT), Some(&LeafOpening::head()));
    assert_eq!(acc.opening(TAIL_SLOT), Some(&LeafOpening::tail()));
    assert_sorted(&acc);
}

#[test]
fn test_depth_four_scenario() {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    let mut verifier = AccumulatorVerifier::from_accumulator(&acc);
    let initial_root = acc.sub_root();

    let insert = acc.insert(&0x32, 0x12).unwrap();
    assert_eq!(insert.kind(), OperationKind::Insert);
    assert_eq!(insert.next_free_node(), 3);
    verifier.verify(&insert).unwrap();

    let read = acc.read_non_zero(&0x32).unwrap();
    match &read {
        Trace::ReadNonZero(t) => {
            assert_eq!(t.value, 0x12);
            assert_eq!(t.leaf_opening.hval, 0x12u64.digest());
        }
        other => panic!("unexpected trace {:?}", other.kind()),
    }
    verifier.verify(&read).unwrap();

    let update = acc.update(&0x32, 0x20).unwrap();
    verifier.verify(&update).unwrap();
    assert_eq!(acc.get(&0x32), Some(&0x20));

    let read = acc.read_non_zero(&0x32).unwrap();
    verifier.verify(&read).unwrap();

    let delete = acc.delete(&0x32).unwrap();
    verifier.verify(&delete).unwrap();

    assert_eq!(acc.sub_root(), initial_root);
    assert_eq!(acc.next_free_node(), 3);
    assert_eq!(verifier.sub_root(), acc.sub_root());
    assert_eq!(verifier.top_root(), acc.top_root());
    assert!(acc.get(&0x32).is_none());
}

#[test]
fn test_insert_then_delete_restores_sub_root_only() {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    acc.insert(&1, 10).unwrap();
    let root = acc.sub_root();
    let top = acc.top_root();

    acc.insert(&2, 20).unwrap();
    acc.delete(&2).unwrap();

    assert_eq!(acc.sub_root(), root);
    assert_ne!(acc.top_root(), top);
}

#[test]
fn test_insertion_trace_shape() {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    let old_root = acc.sub_root();

    let trace = match acc.insert(&7, 70).unwrap() {
        Trace::Insertion(t) => t,
        other => panic!("unexpected trace {:?}", other.kind()),
    };

    assert_eq!(trace.old_sub_root, old_root);
    assert_eq!(trace.proof_minus.path, HEAD_SLOT);
    assert_eq!(trace.proof_plus.path, TAIL_SLOT);
    assert_eq!(trace.new_slot(), 2);
    assert_eq!(trace.new_open_minus().next, 2);
    assert_eq!(trace.new_open_plus().prev, 2);
    assert_eq!(acc.opening(2), Some(&trace.inserted_opening()));
    assert!(trace.proof_new.verify(EMPTY_LEAF, trace.proof_minus.compute_root(trace.new_open_minus().hash())));
}

#[test]
fn test_read_zero_returns_neighbours() {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    for key in [1u64, 2, 3, 4] {
        acc.insert(&key, key * 10).unwrap();
    }

    let trace = match acc.read_zero(&99).unwrap() {
        Trace::ReadZero(t) => t,
        other => panic!("unexpected trace {:?}", other.kind()),
    };

    assert!(trace.opening_minus.hkey < trace.hkey);
    assert!(trace.hkey < trace.opening_plus.hkey);
    assert_eq!(trace.opening_minus.next, trace.proof_plus.path);
    assert_eq!(trace.opening_plus.prev, trace.proof_minus.path);

    let mut verifier = AccumulatorVerifier::from_accumulator(&acc);
    verifier.verify(&Trace::<u64, u64>::ReadZero(trace)).unwrap();
}

#[test]
fn test_reads_do_not_mutate() {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    acc.insert(&5, 50).unwrap();
    let root = acc.sub_root();

    let first = acc.read_non_zero(&5).unwrap();
    let second = acc.read_non_zero(&5).unwrap();
    acc.read_zero(&6).unwrap();

    assert_eq!(first, second);
    assert_eq!(acc.sub_root(), root);
    assert_eq!(acc.next_free_node(), 3);
}

#[test]
fn test_precondition_failures() {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    acc.insert(&1, 1).unwrap();
    let root = acc.sub_root();

    assert!(matches!(
        acc.insert(&1, 2),
        Err(AccumulatorError::KeyAlreadyPresent { .. })
    ));
    assert!(matches!(
        acc.delete(&2),
        Err(AccumulatorError::KeyNotFound { kind: OperationKind::Delete, .. })
    ));
    assert!(matches!(
        acc.update(&2, 5),
        Err(AccumulatorError::KeyNotFound { kind: OperationKind::Update, .. })
    ));
    assert!(matches!(
        acc.read_non_zero(&2),
        Err(AccumulatorError::KeyNotFound { kind: OperationKind::ReadNonZero, .. })
    ));
    assert!(matches!(
        acc.read_zero(&1),
        Err(AccumulatorError::KeyPresent { .. })
    ));
    assert_eq!(acc.sub_root(), root);
}

#[test]
fn test_reserved_keys_rejected() {
    let mut acc: Accumulator<Vec<u8>, u64> = Accumulator::new(DEPTH).unwrap();
    assert!(matches!(
        acc.insert(&Vec::new(), 1),
        Err(AccumulatorError::ReservedKey { kind: OperationKind::Insert })
    ));
}

#[test]
fn test_tree_full() {
    let mut acc = U64Accumulator::new(2).unwrap();
    acc.insert(&1, 1).unwrap();
    acc.insert(&2, 2).unwrap();

    assert!(matches!(
        acc.insert(&3, 3),
        Err(AccumulatorError::TreeFull { capacity: 4 })
    ));

    // deleted slots are not recycled
    acc.delete(&1).unwrap();
    assert!(matches!(acc.insert(&3, 3), Err(AccumulatorError::TreeFull { .. })));
}

#[test]
fn test_next_free_node_monotone() {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    let traces = vec![
        acc.insert(&1, 1).unwrap(),
        acc.update(&1, 2).unwrap(),
        acc.read_zero(&3).unwrap(),
        acc.delete(&1).unwrap(),
        acc.insert(&1, 1).unwrap(),
    ];

    let counters: Vec<u64> = traces.iter().map(Trace::next_free_node).collect();
    assert_eq!(counters, vec![3, 3, 3, 3, 4]);
    assert_eq!(acc.slot_of(&1), Some(3));
}

#[test]
fn test_random_operations_keep_list_sorted_and_traces_valid() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut acc = Accumulator::<u64, u64>::new(8).unwrap();
    let mut verifier = AccumulatorVerifier::from_accumulator(&acc);

    for _ in 0..120 {
        let key = rng.gen_range(0..40u64);
        let trace = if acc.contains(&key) {
            match rng.gen_range(0..3) {
                0 => acc.delete(&key).unwrap(),
                1 => acc.update(&key, rng.gen()).unwrap(),
                _ => acc.read_non_zero(&key).unwrap(),
            }
        } else if rng.gen_bool(0.7) {
            acc.insert(&key, rng.gen()).unwrap()
        } else {
            acc.read_zero(&key).unwrap()
        };
        verifier.verify(&trace).unwrap();
    }

    assert_sorted(&acc);
    assert_eq!(verifier.top_root(), acc.top_root());
    let keys: Vec<Fr> = acc.iter().map(|(k, _)| k.digest()).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_verifier_rejects_tampered_traces() {
    let mut acc = U64Accumulator::new(DEPTH).unwrap();
    acc.insert(&1, 1).unwrap();
    let verifier = AccumulatorVerifier::from_accumulator(&acc);

    let mut insert = acc.clone().insert(&2, 2).unwrap();
    if let Trace::Insertion(t) = &mut insert {
        t.new_sub_root += Fr::from(1u64);
    }
    assert!(matches!(
        verifier.clone().verify(&insert),
        Err(AccumulatorError::InvalidTrace { kind: OperationKind::Insert, .. })
    ));

    let mut read = acc.read_zero(&3).unwrap();
    if let Trace::ReadZero(t) = &mut read {
        std::mem::swap(&mut t.opening_minus, &mut t.opening_plus);
    }
    assert!(verifier.clone().verify(&read).is_err());

    let mut update = acc.clone().update(&1, 9).unwrap();
    if let Trace::Update(t) = &mut update {
        t.proof.siblings[0] += Fr::from(1u64);
    }
    assert!(verifier.clone().verify(&update).is_err());

    let delete = acc.clone().delete(&1).unwrap();
    let mut stale = verifier.clone();
    stale.verify(&acc.clone().update(&1, 4).unwrap()).unwrap();
    assert!(matches!(
        stale.verify(&delete),
        Err(AccumulatorError::InvalidTrace { reason: "stale sub-root", .. })
    ));
}

#[test]
fn test_byte_keys() {
    let mut acc: Accumulator<[u8; 32], Vec<u8>> = Accumulator::new(DEPTH).unwrap();
    let key = [0x32u8; 32];
    acc.insert(&key, b"value".to_vec()).unwrap();
    assert_eq!(acc.get(&key), Some(&b"value".to_vec()));
    assert_eq!(total_rows(&[acc.read_non_zero(&key).unwrap()]), 2);
}

#[test]
fn test_keys_differing_in_leading_zeros_are_distinct() {
    let mut acc: Accumulator<Vec<u8>, u64> = Accumulator::new(DEPTH).unwrap();
    let short = vec![0x01];
    let padded = vec![0x00, 0x01];
    acc.insert(&short, 1).unwrap();
    acc.insert(&padded, 2).unwrap();

    assert_eq!(acc.len(), 2);
    assert_eq!(acc.get(&short), Some(&1));
    assert_eq!(acc.get(&padded), Some(&2));
    assert!(acc.read_zero(&vec![0x00, 0x00, 0x01]).is_ok());
}
