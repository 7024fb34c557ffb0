//! Native replay of operation traces.
//!
//! The verifier only tracks the sub-root and the next free node. Each trace
//! is checked against that state and, when it is sound, advances it.

use ark_bn254::Fr;

use super::opening::LeafOpening;
use super::trace::{
    DeletionTrace, InsertionTrace, OperationKind, ReadNonZeroTrace, ReadZeroTrace, Trace,
    UpdateTrace,
};
use super::Accumulator;
use crate::error::AccumulatorError;
use crate::hashing::{top_root, Hashable};
use crate::smt::{Proof, EMPTY_LEAF};

/// Succinct view of an accumulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccumulatorVerifier {
    depth: usize,
    sub_root: Fr,
    next_free_node: u64,
}

impl AccumulatorVerifier {
    pub fn new(depth: usize, sub_root: Fr, next_free_node: u64) -> Self {
        Self {
            depth,
            sub_root,
            next_free_node,
        }
    }

    /// Snapshot of the current state of `accumulator`.
    pub fn from_accumulator<K, V>(accumulator: &Accumulator<K, V>) -> Self
    where
        K: Hashable + Clone,
        V: Hashable + Clone,
    {
        Self::new(
            accumulator.depth(),
            accumulator.sub_root(),
            accumulator.next_free_node(),
        )
    }

    pub fn sub_root(&self) -> Fr {
        self.sub_root
    }

    pub fn next_free_node(&self) -> u64 {
        self.next_free_node
    }

    pub fn top_root(&self) -> Fr {
        top_root(self.next_free_node, self.sub_root)
    }

    /// Check `trace` against the tracked state and apply it.
    pub fn verify<K: Hashable, V: Hashable>(
        &mut self,
        trace: &Trace<K, V>,
    ) -> Result<(), AccumulatorError> {
        let kind = trace.kind();
        ensure(trace.old_sub_root() == self.sub_root, kind, "stale sub-root")?;
        ensure(
            trace.old_next_free_node() == self.next_free_node,
            kind,
            "stale next free node",
        )?;

        match trace {
            Trace::ReadNonZero(t) => self.check_read_non_zero(t)?,
            Trace::ReadZero(t) => self.check_read_zero(t)?,
            Trace::Update(t) => self.check_update(t)?,
            Trace::Insertion(t) => self.check_insertion(t)?,
            Trace::Deletion(t) => self.check_deletion(t)?,
        }

        self.sub_root = trace.new_sub_root();
        self.next_free_node = trace.next_free_node();
        Ok(())
    }

    /// Verify a whole batch, stopping at the first bad trace.
    pub fn verify_all<K: Hashable, V: Hashable>(
        &mut self,
        traces: &[Trace<K, V>],
    ) -> Result<(), AccumulatorError> {
        traces.iter().try_for_each(|trace| self.verify(trace))
    }

    fn check_proofs(&self, proofs: &[&Proof]) -> Result<(), AccumulatorError> {
        proofs.iter().try_for_each(|proof| proof.check_shape(self.depth))
    }

    fn check_read_non_zero<K: Hashable, V: Hashable>(
        &self,
        t: &ReadNonZeroTrace<K, V>,
    ) -> Result<(), AccumulatorError> {
        let kind = OperationKind::ReadNonZero;
        self.check_proofs(&[&t.proof])?;
        ensure(t.leaf_opening.hkey == t.key.digest(), kind, "opening does not hold the key")?;
        ensure(t.leaf_opening.hval == t.value.digest(), kind, "opening does not hold the value")?;
        ensure(
            t.proof.verify(t.leaf_opening.hash(), t.sub_root),
            kind,
            "leaf proof does not match the root",
        )
    }

    fn check_read_zero<K: Hashable>(&self, t: &ReadZeroTrace<K>) -> Result<(), AccumulatorError> {
        let kind = OperationKind::ReadZero;
        self.check_proofs(&[&t.proof_minus, &t.proof_plus])?;
        ensure(t.hkey == t.key.digest(), kind, "hashed key mismatch")?;
        check_sandwich(&t.opening_minus, t.hkey, &t.opening_plus, kind)?;
        check_adjacent(&t.opening_minus, &t.proof_minus, &t.opening_plus, &t.proof_plus, kind)?;
        ensure(
            t.proof_minus.verify(t.opening_minus.hash(), t.sub_root),
            kind,
            "minus proof does not match the root",
        )?;
        ensure(
            t.proof_plus.verify(t.opening_plus.hash(), t.sub_root),
            kind,
            "plus proof does not match the root",
        )
    }

    fn check_update<K: Hashable, V: Hashable>(
        &self,
        t: &UpdateTrace<K, V>,
    ) -> Result<(), AccumulatorError> {
        let kind = OperationKind::Update;
        self.check_proofs(&[&t.proof])?;
        ensure(t.old_opening.hkey == t.key.digest(), kind, "opening does not hold the key")?;
        ensure(t.old_opening.hval == t.old_value.digest(), kind, "old value mismatch")?;
        ensure(t.new_hval == t.new_value.digest(), kind, "new value mismatch")?;
        ensure(
            t.proof.verify(t.old_opening.hash(), t.old_sub_root),
            kind,
            "old leaf does not match the old root",
        )?;
        ensure(
            t.proof.compute_root(t.new_opening().hash()) == t.new_sub_root,
            kind,
            "new leaf does not produce the new root",
        )
    }

    fn check_insertion<K: Hashable, V: Hashable>(
        &self,
        t: &InsertionTrace<K, V>,
    ) -> Result<(), AccumulatorError> {
        let kind = OperationKind::Insert;
        self.check_proofs(&[&t.proof_minus, &t.proof_new, &t.proof_plus])?;
        ensure(t.hkey == t.key.digest(), kind, "hashed key mismatch")?;
        ensure(t.hval == t.value.digest(), kind, "hashed value mismatch")?;
        ensure(
            t.new_slot() == self.next_free_node,
            kind,
            "new leaf is not written at the next free node",
        )?;
        check_sandwich(&t.old_open_minus, t.hkey, &t.old_open_plus, kind)?;
        check_adjacent(
            &t.old_open_minus,
            &t.proof_minus,
            &t.old_open_plus,
            &t.proof_plus,
            kind,
        )?;

        ensure(
            t.proof_minus.verify(t.old_open_minus.hash(), t.old_sub_root),
            kind,
            "minus proof does not match the old root",
        )?;
        let interm_1 = t.proof_minus.compute_root(t.new_open_minus().hash());
        ensure(
            t.proof_new.verify(EMPTY_LEAF, interm_1),
            kind,
            "new slot is not empty",
        )?;
        let interm_2 = t.proof_new.compute_root(t.inserted_opening().hash());
        ensure(
            t.proof_plus.verify(t.old_open_plus.hash(), interm_2),
            kind,
            "plus proof does not match the intermediate root",
        )?;
        ensure(
            t.proof_plus.compute_root(t.new_open_plus().hash()) == t.new_sub_root,
            kind,
            "new plus leaf does not produce the new root",
        )
    }

    fn check_deletion<K: Hashable, V: Hashable>(
        &self,
        t: &DeletionTrace<K, V>,
    ) -> Result<(), AccumulatorError> {
        let kind = OperationKind::Delete;
        self.check_proofs(&[&t.proof_minus, &t.proof_deleted, &t.proof_plus])?;
        ensure(t.deleted_open.hkey == t.key.digest(), kind, "opening does not hold the key")?;
        ensure(
            t.deleted_open.hval == t.deleted_value.digest(),
            kind,
            "opening does not hold the deleted value",
        )?;
        check_sandwich(&t.old_open_minus, t.deleted_open.hkey, &t.old_open_plus, kind)?;
        check_adjacent(
            &t.old_open_minus,
            &t.proof_minus,
            &t.deleted_open,
            &t.proof_deleted,
            kind,
        )?;
        check_adjacent(
            &t.deleted_open,
            &t.proof_deleted,
            &t.old_open_plus,
            &t.proof_plus,
            kind,
        )?;

        ensure(
            t.proof_minus.verify(t.old_open_minus.hash(), t.old_sub_root),
            kind,
            "minus proof does not match the old root",
        )?;
        let interm_1 = t.proof_minus.compute_root(t.new_open_minus().hash());
        ensure(
            t.proof_deleted.verify(t.deleted_open.hash(), interm_1),
            kind,
            "deleted proof does not match the intermediate root",
        )?;
        let interm_2 = t.proof_deleted.compute_root(EMPTY_LEAF);
        ensure(
            t.proof_plus.verify(t.old_open_plus.hash(), interm_2),
            kind,
            "plus proof does not match the intermediate root",
        )?;
        ensure(
            t.proof_plus.compute_root(t.new_open_plus().hash()) == t.new_sub_root,
            kind,
            "new plus leaf does not produce the new root",
        )
    }
}

fn ensure(condition: bool, kind: OperationKind, reason: &'static str) -> Result<(), AccumulatorError> {
    if condition {
        Ok(())
    } else {
        Err(AccumulatorError::InvalidTrace { kind, reason })
    }
}

fn check_sandwich(
    minus: &LeafOpening,
    hkey: Fr,
    plus: &LeafOpening,
    kind: OperationKind,
) -> Result<(), AccumulatorError> {
    ensure(minus.hkey < hkey && hkey < plus.hkey, kind, "key is not sandwiched")
}

/// `left` and `right` must point at each other.
fn check_adjacent(
    left: &LeafOpening,
    left_proof: &Proof,
    right: &LeafOpening,
    right_proof: &Proof,
    kind: OperationKind,
) -> Result<(), AccumulatorError> {
    ensure(
        left.next == right_proof.path && right.prev == left_proof.path,
        kind,
        "neighbours are not linked",
    )
}
