use ark_bn254::Fr;
use ark_ff::{One, Zero};
use sparse_accumulator::accumulator::{
    total_rows, DeletionTrace, InsertionTrace, ReadNonZeroTrace, ReadZeroTrace, UpdateTrace,
};
use sparse_accumulator::{compress, LeafOpening, OperationKind, Proof, Trace, EMPTY_LEAF};
use tracing::debug;

use super::Settings;
use crate::error::CircuitError;

/// Values of every accumulator column over the rows actually used.
///
/// Columns are stored unpadded; `AccumulatorModule::assign` pads them to the
/// module size. Limb decompositions and the packed proof column are derived
/// at assignment time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnAssignments {
    pub leaves: Vec<Fr>,
    pub roots: Vec<Fr>,
    pub positions: Vec<Fr>,
    pub proofs: Vec<Proof>,
    pub use_next_proof: Vec<Fr>,
    pub is_active: Vec<Fr>,
    pub counter: Vec<Fr>,

    pub is_first: Vec<Fr>,
    pub is_insert: Vec<Fr>,
    pub is_delete: Vec<Fr>,
    pub is_update: Vec<Fr>,
    pub is_read_zero: Vec<Fr>,
    pub is_read_non_zero: Vec<Fr>,

    pub hkey: Vec<Fr>,
    pub hkey_minus: Vec<Fr>,
    pub hkey_plus: Vec<Fr>,

    pub leaf_minus_index: Vec<Fr>,
    pub leaf_minus_next: Vec<Fr>,
    pub leaf_plus_index: Vec<Fr>,
    pub leaf_plus_prev: Vec<Fr>,
    pub leaf_deleted_index: Vec<Fr>,
    pub leaf_deleted_prev: Vec<Fr>,
    pub leaf_deleted_next: Vec<Fr>,

    pub opening_prev: Vec<Fr>,
    pub opening_next: Vec<Fr>,
    pub opening_hkey: Vec<Fr>,
    pub opening_hval: Vec<Fr>,
    pub interm_prev: Vec<Fr>,
    pub interm_next: Vec<Fr>,
    pub interm_hkey: Vec<Fr>,
    pub leaf_hashes: Vec<Fr>,
    pub is_empty_leaf: Vec<Fr>,

    pub next_free_node: Vec<Fr>,
    pub insertion_path: Vec<Fr>,
    pub is_insert_row3: Vec<Fr>,
    pub interm_top_root: Vec<Fr>,
    pub top_root: Vec<Fr>,
}

fn flag(value: bool) -> Fr {
    if value {
        Fr::one()
    } else {
        Fr::zero()
    }
}

#[derive(Clone, Copy)]
struct Sandwich {
    hkey: Fr,
    minus: Fr,
    plus: Fr,
}

#[derive(Clone, Copy, Default)]
struct Pointers {
    minus_index: u64,
    minus_next: u64,
    plus_index: u64,
    plus_prev: u64,
    deleted_index: u64,
    deleted_prev: u64,
    deleted_next: u64,
}

/// One row before it is flattened into columns.
struct Row<'a> {
    kind: OperationKind,
    opening: LeafOpening,
    root: Fr,
    proof: &'a Proof,
    next_free_node: u64,
    is_first: bool,
    is_empty_leaf: bool,
    is_insert_row3: bool,
    reuse_disabled: bool,
    sandwich: Option<Sandwich>,
    pointers: Option<Pointers>,
}

impl<'a> Row<'a> {
    fn new(
        kind: OperationKind,
        opening: LeafOpening,
        root: Fr,
        proof: &'a Proof,
        next_free_node: u64,
    ) -> Self {
        Self {
            kind,
            opening,
            root,
            proof,
            next_free_node,
            is_first: false,
            is_empty_leaf: false,
            is_insert_row3: false,
            reuse_disabled: matches!(kind, OperationKind::ReadZero | OperationKind::ReadNonZero),
            sandwich: None,
            pointers: None,
        }
    }

    /// Slot being emptied or just allocated: zero opening, empty leaf.
    fn empty(kind: OperationKind, root: Fr, proof: &'a Proof, next_free_node: u64) -> Self {
        Self {
            is_empty_leaf: true,
            ..Self::new(kind, LeafOpening::default(), root, proof, next_free_node)
        }
    }

    fn first(self) -> Self {
        Self {
            is_first: true,
            ..self
        }
    }

    fn insert_row3(self) -> Self {
        Self {
            is_insert_row3: true,
            ..self
        }
    }

    fn sandwich(self, sandwich: Sandwich) -> Self {
        Self {
            sandwich: Some(sandwich),
            ..self
        }
    }

    fn pointers(self, pointers: Pointers) -> Self {
        Self {
            pointers: Some(pointers),
            ..self
        }
    }
}

impl ColumnAssignments {
    /// Rows used so far.
    pub fn num_rows(&self) -> usize {
        self.is_active.len()
    }

    fn push(&mut self, row: Row<'_>) {
        let index = self.num_rows();
        let chain = row.opening.hash_chain();

        self.leaves.push(if row.is_empty_leaf {
            EMPTY_LEAF
        } else {
            chain.leaf_hash
        });
        self.roots.push(row.root);
        self.positions.push(Fr::from(row.proof.path));
        self.proofs.push(row.proof.clone());
        // Segments start on even rows, so reuse pairs rows (2k, 2k + 1).
        self.use_next_proof
            .push(flag(!row.reuse_disabled && index % 2 == 0));
        self.is_active.push(Fr::one());
        self.counter.push(Fr::from(index as u64));

        self.is_first.push(flag(row.is_first));
        self.is_insert.push(flag(row.kind == OperationKind::Insert));
        self.is_delete.push(flag(row.kind == OperationKind::Delete));
        self.is_update.push(flag(row.kind == OperationKind::Update));
        self.is_read_zero.push(flag(row.kind == OperationKind::ReadZero));
        self.is_read_non_zero
            .push(flag(row.kind == OperationKind::ReadNonZero));

        let sandwich = row.sandwich.unwrap_or(Sandwich {
            hkey: Fr::zero(),
            minus: Fr::zero(),
            plus: Fr::zero(),
        });
        self.hkey.push(sandwich.hkey);
        self.hkey_minus.push(sandwich.minus);
        self.hkey_plus.push(sandwich.plus);

        let pointers = row.pointers.unwrap_or_default();
        self.leaf_minus_index.push(Fr::from(pointers.minus_index));
        self.leaf_minus_next.push(Fr::from(pointers.minus_next));
        self.leaf_plus_index.push(Fr::from(pointers.plus_index));
        self.leaf_plus_prev.push(Fr::from(pointers.plus_prev));
        self.leaf_deleted_index.push(Fr::from(pointers.deleted_index));
        self.leaf_deleted_prev.push(Fr::from(pointers.deleted_prev));
        self.leaf_deleted_next.push(Fr::from(pointers.deleted_next));

        self.opening_prev.push(Fr::from(row.opening.prev));
        self.opening_next.push(Fr::from(row.opening.next));
        self.opening_hkey.push(row.opening.hkey);
        self.opening_hval.push(row.opening.hval);
        self.interm_prev.push(chain.interm_prev);
        self.interm_next.push(chain.interm_next);
        self.interm_hkey.push(chain.interm_hkey);
        self.leaf_hashes.push(chain.leaf_hash);
        self.is_empty_leaf.push(flag(row.is_empty_leaf));

        let next_free_node = Fr::from(row.next_free_node);
        self.next_free_node.push(next_free_node);
        self.insertion_path.push(if row.is_insert_row3 {
            Fr::from(row.proof.path)
        } else {
            Fr::zero()
        });
        self.is_insert_row3.push(flag(row.is_insert_row3));
        let interm_top_root = compress(Fr::zero(), next_free_node);
        self.interm_top_root.push(interm_top_root);
        self.top_root.push(compress(interm_top_root, row.root));
    }

    fn push_read_non_zero<K, V>(&mut self, t: &ReadNonZeroTrace<K, V>) {
        let kind = OperationKind::ReadNonZero;
        // The read is duplicated to keep every segment an even number of rows.
        self.push(Row::new(kind, t.leaf_opening, t.sub_root, &t.proof, t.next_free_node).first());
        self.push(Row::new(kind, t.leaf_opening, t.sub_root, &t.proof, t.next_free_node));
    }

    fn push_read_zero<K>(&mut self, t: &ReadZeroTrace<K>) {
        let kind = OperationKind::ReadZero;
        self.push(
            Row::new(kind, t.opening_minus, t.sub_root, &t.proof_minus, t.next_free_node)
                .first()
                .sandwich(Sandwich {
                    hkey: t.hkey,
                    minus: t.opening_minus.hkey,
                    plus: t.opening_plus.hkey,
                })
                .pointers(Pointers {
                    minus_index: t.proof_minus.path,
                    minus_next: t.opening_minus.next,
                    plus_index: t.proof_plus.path,
                    plus_prev: t.opening_plus.prev,
                    ..Pointers::default()
                }),
        );
        self.push(Row::new(kind, t.opening_plus, t.sub_root, &t.proof_plus, t.next_free_node));
    }

    fn push_update<K, V>(&mut self, t: &UpdateTrace<K, V>) {
        let kind = OperationKind::Update;
        self.push(Row::new(kind, t.old_opening, t.old_sub_root, &t.proof, t.next_free_node).first());
        self.push(Row::new(kind, t.new_opening(), t.new_sub_root, &t.proof, t.next_free_node));
    }

    fn push_insertion<K, V>(&mut self, t: &InsertionTrace<K, V>) {
        let kind = OperationKind::Insert;
        let old_nfn = t.new_next_free_node.saturating_sub(1);
        let new_nfn = t.new_next_free_node;

        let new_open_minus = t.new_open_minus();
        let inserted = t.inserted_opening();
        let root_1 = t.proof_minus.compute_root(new_open_minus.hash());
        let root_3 = t.proof_new.compute_root(inserted.hash());

        self.push(
            Row::new(kind, t.old_open_minus, t.old_sub_root, &t.proof_minus, old_nfn)
                .first()
                .sandwich(Sandwich {
                    hkey: t.hkey,
                    minus: t.old_open_minus.hkey,
                    plus: t.old_open_plus.hkey,
                })
                .pointers(Pointers {
                    minus_index: t.proof_minus.path,
                    minus_next: t.old_open_minus.next,
                    plus_index: t.proof_plus.path,
                    plus_prev: t.old_open_plus.prev,
                    ..Pointers::default()
                }),
        );
        self.push(Row::new(kind, new_open_minus, root_1, &t.proof_minus, old_nfn));
        self.push(Row::empty(kind, root_1, &t.proof_new, new_nfn).insert_row3());
        self.push(Row::new(kind, inserted, root_3, &t.proof_new, new_nfn));
        self.push(Row::new(kind, t.old_open_plus, root_3, &t.proof_plus, new_nfn));
        self.push(Row::new(kind, t.new_open_plus(), t.new_sub_root, &t.proof_plus, new_nfn));
    }

    fn push_deletion<K, V>(&mut self, t: &DeletionTrace<K, V>) {
        let kind = OperationKind::Delete;
        let nfn = t.next_free_node;

        let new_open_minus = t.new_open_minus();
        let root_1 = t.proof_minus.compute_root(new_open_minus.hash());
        let root_3 = t.proof_deleted.compute_root(EMPTY_LEAF);

        self.push(
            Row::new(kind, t.old_open_minus, t.old_sub_root, &t.proof_minus, nfn)
                .first()
                .pointers(Pointers {
                    minus_index: t.proof_minus.path,
                    minus_next: t.old_open_minus.next,
                    plus_index: t.proof_plus.path,
                    plus_prev: t.old_open_plus.prev,
                    deleted_index: t.proof_deleted.path,
                    deleted_prev: t.deleted_open.prev,
                    deleted_next: t.deleted_open.next,
                }),
        );
        self.push(Row::new(kind, new_open_minus, root_1, &t.proof_minus, nfn));
        self.push(Row::new(kind, t.deleted_open, root_1, &t.proof_deleted, nfn));
        self.push(Row::empty(kind, root_3, &t.proof_deleted, nfn));
        self.push(Row::new(kind, t.old_open_plus, root_3, &t.proof_plus, nfn));
        self.push(Row::new(kind, t.new_open_plus(), t.new_sub_root, &t.proof_plus, nfn));
    }
}

fn proofs_of<K, V>(trace: &Trace<K, V>) -> Vec<&Proof> {
    match trace {
        Trace::ReadNonZero(t) => vec![&t.proof],
        Trace::ReadZero(t) => vec![&t.proof_minus, &t.proof_plus],
        Trace::Update(t) => vec![&t.proof],
        Trace::Insertion(t) => vec![&t.proof_minus, &t.proof_new, &t.proof_plus],
        Trace::Deletion(t) => vec![&t.proof_minus, &t.proof_deleted, &t.proof_plus],
    }
}

/// Lay `traces` out as accumulator rows, in order.
///
/// Fails with `CapacityOverflow` when the traces need more rows than
/// `settings.max_num_proofs`, and with `ProofDepthMismatch` when a proof does
/// not match the configured depth. No constraint system is involved.
pub fn build_segments<K, V>(
    traces: &[Trace<K, V>],
    settings: &Settings,
) -> Result<ColumnAssignments, CircuitError> {
    let required = total_rows(traces);
    if required > settings.max_num_proofs {
        return Err(CircuitError::CapacityOverflow {
            required,
            max: settings.max_num_proofs,
        });
    }

    let depth = settings.merkle_tree_depth;
    for (index, trace) in traces.iter().enumerate() {
        if let Some(proof) = proofs_of(trace).into_iter().find(|proof| proof.depth() != depth) {
            return Err(CircuitError::ProofDepthMismatch {
                index,
                expected: depth,
                actual: proof.depth(),
            });
        }
    }

    let mut assignments = ColumnAssignments::default();
    for trace in traces {
        match trace {
            Trace::ReadNonZero(t) => assignments.push_read_non_zero(t),
            Trace::ReadZero(t) => assignments.push_read_zero(t),
            Trace::Update(t) => assignments.push_update(t),
            Trace::Insertion(t) => assignments.push_insertion(t),
            Trace::Deletion(t) => assignments.push_deletion(t),
        }
    }

    debug!(
        operations = traces.len(),
        rows = assignments.num_rows(),
        "segments built"
    );
    Ok(assignments)
}
