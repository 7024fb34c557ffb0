//! Operation traces: everything needed to re-verify one state transition.

use std::fmt;

use ark_bn254::Fr;
use serde::{Deserialize, Serialize};

use super::opening::LeafOpening;
use crate::smt::Proof;

/// The five accumulator operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    ReadNonZero,
    ReadZero,
    Update,
    Insert,
    Delete,
}

impl OperationKind {
    /// Rows the operation occupies in the arithmetization.
    pub fn num_rows(self) -> usize {
        match self {
            OperationKind::ReadNonZero | OperationKind::ReadZero | OperationKind::Update => 2,
            OperationKind::Insert | OperationKind::Delete => 6,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::ReadNonZero => "read-non-zero",
            OperationKind::ReadZero => "read-zero",
            OperationKind::Update => "update",
            OperationKind::Insert => "insert",
            OperationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Membership read of a present key.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadNonZeroTrace<K, V> {
    pub key: K,
    pub value: V,
    pub leaf_opening: LeafOpening,
    pub proof: Proof,
    pub sub_root: Fr,
    pub next_free_node: u64,
}

/// Non-membership read: the two neighbours sandwiching the absent key.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadZeroTrace<K> {
    pub key: K,
    pub hkey: Fr,
    pub opening_minus: LeafOpening,
    pub opening_plus: LeafOpening,
    pub proof_minus: Proof,
    pub proof_plus: Proof,
    pub sub_root: Fr,
    pub next_free_node: u64,
}

/// Value change of a present key.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateTrace<K, V> {
    pub key: K,
    pub old_value: V,
    pub new_value: V,
    pub old_opening: LeafOpening,
    pub new_hval: Fr,
    pub proof: Proof,
    pub old_sub_root: Fr,
    pub new_sub_root: Fr,
    pub next_free_node: u64,
}

impl<K, V> UpdateTrace<K, V> {
    pub fn new_opening(&self) -> LeafOpening {
        self.old_opening.with_hval(self.new_hval)
    }
}

/// Insertion of a fresh key at slot `new_next_free_node - 1`.
///
/// `proof_minus` is taken against the old tree, `proof_new` after the minus
/// neighbour was relinked and `proof_plus` after the new leaf was written.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertionTrace<K, V> {
    pub key: K,
    pub value: V,
    pub hkey: Fr,
    pub hval: Fr,
    pub old_open_minus: LeafOpening,
    pub old_open_plus: LeafOpening,
    pub proof_minus: Proof,
    pub proof_new: Proof,
    pub proof_plus: Proof,
    pub old_sub_root: Fr,
    pub new_sub_root: Fr,
    pub new_next_free_node: u64,
}

impl<K, V> InsertionTrace<K, V> {
    pub fn new_slot(&self) -> u64 {
        self.proof_new.path
    }

    pub fn new_open_minus(&self) -> LeafOpening {
        self.old_open_minus.with_next(self.new_slot())
    }

    pub fn inserted_opening(&self) -> LeafOpening {
        LeafOpening::new(
            self.proof_minus.path,
            self.proof_plus.path,
            self.hkey,
            self.hval,
        )
    }

    pub fn new_open_plus(&self) -> LeafOpening {
        self.old_open_plus.with_prev(self.new_slot())
    }
}

/// Removal of a present key; its slot is emptied and never reused.
#[derive(Clone, Debug, PartialEq)]
pub struct DeletionTrace<K, V> {
    pub key: K,
    pub deleted_value: V,
    pub old_open_minus: LeafOpening,
    pub deleted_open: LeafOpening,
    pub old_open_plus: LeafOpening,
    pub proof_minus: Proof,
    pub proof_deleted: Proof,
    pub proof_plus: Proof,
    pub old_sub_root: Fr,
    pub new_sub_root: Fr,
    pub next_free_node: u64,
}

impl<K, V> DeletionTrace<K, V> {
    pub fn new_open_minus(&self) -> LeafOpening {
        self.old_open_minus.with_next(self.proof_plus.path)
    }

    pub fn new_open_plus(&self) -> LeafOpening {
        self.old_open_plus.with_prev(self.proof_minus.path)
    }
}

/// Record of one executed operation.
#[derive(Clone, Debug, PartialEq)]
pub enum Trace<K, V> {
    ReadNonZero(ReadNonZeroTrace<K, V>),
    ReadZero(ReadZeroTrace<K>),
    Update(UpdateTrace<K, V>),
    Insertion(InsertionTrace<K, V>),
    Deletion(DeletionTrace<K, V>),
}

impl<K, V> Trace<K, V> {
    pub fn kind(&self) -> OperationKind {
        match self {
            Trace::ReadNonZero(_) => OperationKind::ReadNonZero,
            Trace::ReadZero(_) => OperationKind::ReadZero,
            Trace::Update(_) => OperationKind::Update,
            Trace::Insertion(_) => OperationKind::Insert,
            Trace::Deletion(_) => OperationKind::Delete,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.kind().num_rows()
    }

    pub fn old_sub_root(&self) -> Fr {
        match self {
            Trace::ReadNonZero(t) => t.sub_root,
            Trace::ReadZero(t) => t.sub_root,
            Trace::Update(t) => t.old_sub_root,
            Trace::Insertion(t) => t.old_sub_root,
            Trace::Deletion(t) => t.old_sub_root,
        }
    }

    pub fn new_sub_root(&self) -> Fr {
        match self {
            Trace::ReadNonZero(t) => t.sub_root,
            Trace::ReadZero(t) => t.sub_root,
            Trace::Update(t) => t.new_sub_root,
            Trace::Insertion(t) => t.new_sub_root,
            Trace::Deletion(t) => t.new_sub_root,
        }
    }

    /// Next free node once the operation has been applied.
    pub fn next_free_node(&self) -> u64 {
        match self {
            Trace::ReadNonZero(t) => t.next_free_node,
            Trace::ReadZero(t) => t.next_free_node,
            Trace::Update(t) => t.next_free_node,
            Trace::Insertion(t) => t.new_next_free_node,
            Trace::Deletion(t) => t.next_free_node,
        }
    }

    /// Next free node before the operation was applied.
    pub fn old_next_free_node(&self) -> u64 {
        match self {
            Trace::Insertion(t) => t.new_next_free_node.saturating_sub(1),
            _ => self.next_free_node(),
        }
    }
}

/// Total number of rows `traces` occupy.
pub fn total_rows<K, V>(traces: &[Trace<K, V>]) -> usize {
    traces.iter().map(Trace::num_rows).sum()
}
