//! Prover-side accumulator state.
//!
//! The accumulator keeps a sparse Merkle tree whose leaves are the hashes of
//! `LeafOpening`s. The openings form a doubly-linked list sorted by HKey and
//! bracketed by two sentinels. Every operation returns a `Trace` holding the
//! openings and proofs needed to re-verify the transition.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};

use ark_bn254::Fr;
use ark_ff::{One, Zero};
use tracing::debug;

use super::opening::{LeafOpening, HEAD_SLOT, TAIL_SLOT};
use super::trace::{
    DeletionTrace, InsertionTrace, OperationKind, ReadNonZeroTrace, ReadZeroTrace, Trace,
    UpdateTrace,
};
use crate::error::AccumulatorError;
use crate::hashing::{top_root, Hashable};
use crate::smt::{Proof, SparseMerkleTree, EMPTY_LEAF};

/// Authenticated key-value store over a sparse Merkle tree.
#[derive(Clone, Debug)]
pub struct Accumulator<K, V> {
    tree: SparseMerkleTree,

    /// Slot -> opening, for every non-empty slot (sentinels included).
    openings: HashMap<u64, LeafOpening>,

    /// HKey -> slot, ordered for neighbour lookups.
    index: BTreeMap<Fr, u64>,

    /// Slot -> original key and value.
    entries: HashMap<u64, (K, V)>,

    next_free_node: u64,
}

impl<K, V> Accumulator<K, V>
where
    K: Hashable + Clone,
    V: Hashable + Clone,
{
    /// Empty accumulator holding only the head and tail sentinels.
    pub fn new(depth: usize) -> Result<Self, AccumulatorError> {
        let mut accumulator = Self {
            tree: SparseMerkleTree::new(depth)?,
            openings: HashMap::new(),
            index: BTreeMap::new(),
            entries: HashMap::new(),
            next_free_node: TAIL_SLOT + 1,
        };

        for (slot, opening) in [(HEAD_SLOT, LeafOpening::head()), (TAIL_SLOT, LeafOpening::tail())] {
            accumulator.write_leaf(slot, opening)?;
            accumulator.index.insert(opening.hkey, slot);
        }

        Ok(accumulator)
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn capacity(&self) -> u64 {
        self.tree.capacity()
    }

    /// Root of the Merkle tree.
    pub fn sub_root(&self) -> Fr {
        self.tree.root()
    }

    /// Commitment to the tree root and the next free node.
    pub fn top_root(&self) -> Fr {
        top_root(self.next_free_node, self.sub_root())
    }

    pub fn next_free_node(&self) -> u64 {
        self.next_free_node
    }

    /// Number of stored keys, sentinels excluded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn opening(&self, slot: u64) -> Option<&LeafOpening> {
        self.openings.get(&slot)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let slot = self.index.get(&key.digest())?;
        self.entries.get(slot).map(|(_, value)| value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Slot currently holding `key`.
    pub fn slot_of(&self, key: &K) -> Option<u64> {
        let hkey = key.digest();
        if is_sentinel(hkey) {
            return None;
        }
        self.index.get(&hkey).copied()
    }

    pub fn proof(&self, slot: u64) -> Result<Proof, AccumulatorError> {
        self.tree.proof(slot)
    }

    /// Stored keys and values in HKey order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.index
            .values()
            .filter_map(|slot| self.entries.get(slot))
            .map(|(key, value)| (key, value))
    }

    /// Membership read. Fails if `key` is absent.
    pub fn read_non_zero(&self, key: &K) -> Result<Trace<K, V>, AccumulatorError> {
        let kind = OperationKind::ReadNonZero;
        let hkey = checked_hkey(key, kind)?;
        let slot = self.locate(hkey, kind)?;
        let (_, value) = self.entry(slot, kind)?;

        let trace = ReadNonZeroTrace {
            key: key.clone(),
            value: value.clone(),
            leaf_opening: self.opening_at(slot, kind)?,
            proof: self.tree.proof(slot)?,
            sub_root: self.sub_root(),
            next_free_node: self.next_free_node,
        };

        debug!(slot, "read-non-zero");
        Ok(Trace::ReadNonZero(trace))
    }

    /// Non-membership read. Fails if `key` is present.
    pub fn read_zero(&self, key: &K) -> Result<Trace<K, V>, AccumulatorError> {
        let kind = OperationKind::ReadZero;
        let hkey = checked_hkey(key, kind)?;
        if self.index.contains_key(&hkey) {
            return Err(AccumulatorError::KeyPresent { hkey });
        }

        let (minus, plus) = self.neighbours(hkey, kind)?;
        let trace = ReadZeroTrace {
            key: key.clone(),
            hkey,
            opening_minus: self.opening_at(minus, kind)?,
            opening_plus: self.opening_at(plus, kind)?,
            proof_minus: self.tree.proof(minus)?,
            proof_plus: self.tree.proof(plus)?,
            sub_root: self.sub_root(),
            next_free_node: self.next_free_node,
        };

        debug!(minus, plus, "read-zero");
        Ok(Trace::ReadZero(trace))
    }

    /// Replace the value of a present key.
    pub fn update(&mut self, key: &K, value: V) -> Result<Trace<K, V>, AccumulatorError> {
        let kind = OperationKind::Update;
        let hkey = checked_hkey(key, kind)?;
        let slot = self.locate(hkey, kind)?;
        let (_, old_value) = self.entry(slot, kind)?.clone();

        let old_sub_root = self.sub_root();
        let old_opening = self.opening_at(slot, kind)?;
        let proof = self.tree.proof(slot)?;
        let new_hval = value.digest();

        self.write_leaf(slot, old_opening.with_hval(new_hval))?;
        self.entries.insert(slot, (key.clone(), value.clone()));

        debug!(slot, "update");
        Ok(Trace::Update(UpdateTrace {
            key: key.clone(),
            old_value,
            new_value: value,
            old_opening,
            new_hval,
            proof,
            old_sub_root,
            new_sub_root: self.sub_root(),
            next_free_node: self.next_free_node,
        }))
    }

    /// Insert a fresh key at the next free slot.
    pub fn insert(&mut self, key: &K, value: V) -> Result<Trace<K, V>, AccumulatorError> {
        let kind = OperationKind::Insert;
        let hkey = checked_hkey(key, kind)?;
        if self.index.contains_key(&hkey) {
            return Err(AccumulatorError::KeyAlreadyPresent { hkey });
        }
        if self.next_free_node >= self.capacity() {
            return Err(AccumulatorError::TreeFull {
                capacity: self.capacity(),
            });
        }

        let (minus, plus) = self.neighbours(hkey, kind)?;
        let old_open_minus = self.opening_at(minus, kind)?;
        let old_open_plus = self.opening_at(plus, kind)?;
        let new_slot = self.next_free_node;
        let hval = value.digest();
        let old_sub_root = self.sub_root();

        let proof_minus = self.tree.proof(minus)?;
        self.write_leaf(minus, old_open_minus.with_next(new_slot))?;

        let proof_new = self.tree.proof(new_slot)?;
        self.write_leaf(new_slot, LeafOpening::new(minus, plus, hkey, hval))?;

        let proof_plus = self.tree.proof(plus)?;
        self.write_leaf(plus, old_open_plus.with_prev(new_slot))?;

        self.index.insert(hkey, new_slot);
        self.entries.insert(new_slot, (key.clone(), value.clone()));
        self.next_free_node += 1;

        debug!(slot = new_slot, minus, plus, "insert");
        Ok(Trace::Insertion(InsertionTrace {
            key: key.clone(),
            value,
            hkey,
            hval,
            old_open_minus,
            old_open_plus,
            proof_minus,
            proof_new,
            proof_plus,
            old_sub_root,
            new_sub_root: self.sub_root(),
            new_next_free_node: self.next_free_node,
        }))
    }

    /// Remove a present key. Its slot is emptied and not recycled.
    pub fn delete(&mut self, key: &K) -> Result<Trace<K, V>, AccumulatorError> {
        let kind = OperationKind::Delete;
        let hkey = checked_hkey(key, kind)?;
        let slot = self.locate(hkey, kind)?;

        let deleted_open = self.opening_at(slot, kind)?;
        let (minus, plus) = (deleted_open.prev, deleted_open.next);
        let old_open_minus = self.opening_at(minus, kind)?;
        let old_open_plus = self.opening_at(plus, kind)?;
        if old_open_minus.next != slot || old_open_plus.prev != slot {
            return Err(AccumulatorError::CorruptedList { kind, slot });
        }
        let old_sub_root = self.sub_root();

        let proof_minus = self.tree.proof(minus)?;
        self.write_leaf(minus, old_open_minus.with_next(plus))?;

        let proof_deleted = self.tree.proof(slot)?;
        self.clear_leaf(slot)?;

        let proof_plus = self.tree.proof(plus)?;
        self.write_leaf(plus, old_open_plus.with_prev(minus))?;

        self.index.remove(&hkey);
        let (_, deleted_value) = self
            .entries
            .remove(&slot)
            .ok_or(AccumulatorError::CorruptedList { kind, slot })?;

        debug!(slot, minus, plus, "delete");
        Ok(Trace::Deletion(DeletionTrace {
            key: key.clone(),
            deleted_value,
            old_open_minus,
            deleted_open,
            old_open_plus,
            proof_minus,
            proof_deleted,
            proof_plus,
            old_sub_root,
            new_sub_root: self.sub_root(),
            next_free_node: self.next_free_node,
        }))
    }

    fn locate(&self, hkey: Fr, kind: OperationKind) -> Result<u64, AccumulatorError> {
        self.index
            .get(&hkey)
            .copied()
            .ok_or(AccumulatorError::KeyNotFound { kind, hkey })
    }

    fn entry(&self, slot: u64, kind: OperationKind) -> Result<&(K, V), AccumulatorError> {
        self.entries
            .get(&slot)
            .ok_or(AccumulatorError::CorruptedList { kind, slot })
    }

    fn opening_at(&self, slot: u64, kind: OperationKind) -> Result<LeafOpening, AccumulatorError> {
        self.openings
            .get(&slot)
            .copied()
            .ok_or(AccumulatorError::CorruptedList { kind, slot })
    }

    /// Slots of the largest HKey below and the smallest HKey above `hkey`.
    fn neighbours(&self, hkey: Fr, kind: OperationKind) -> Result<(u64, u64), AccumulatorError> {
        let minus = self
            .index
            .range(..hkey)
            .next_back()
            .map(|(_, slot)| *slot)
            .ok_or(AccumulatorError::CorruptedList { kind, slot: HEAD_SLOT })?;
        let plus = self
            .index
            .range((Excluded(hkey), Unbounded))
            .next()
            .map(|(_, slot)| *slot)
            .ok_or(AccumulatorError::CorruptedList { kind, slot: TAIL_SLOT })?;

        let minus_next = self.opening_at(minus, kind)?.next;
        if minus_next != plus {
            return Err(AccumulatorError::CorruptedList { kind, slot: minus });
        }
        Ok((minus, plus))
    }

    fn write_leaf(&mut self, slot: u64, opening: LeafOpening) -> Result<(), AccumulatorError> {
        self.tree.set_leaf(slot, opening.hash())?;
        self.openings.insert(slot, opening);
        Ok(())
    }

    fn clear_leaf(&mut self, slot: u64) -> Result<(), AccumulatorError> {
        self.tree.set_leaf(slot, EMPTY_LEAF)?;
        self.openings.remove(&slot);
        Ok(())
    }
}

fn is_sentinel(hkey: Fr) -> bool {
    hkey.is_zero() || hkey == -Fr::one()
}

fn checked_hkey<K: Hashable>(key: &K, kind: OperationKind) -> Result<Fr, AccumulatorError> {
    let hkey = key.digest();
    if is_sentinel(hkey) {
        return Err(AccumulatorError::ReservedKey { kind });
    }
    Ok(hkey)
}
