use sparse_accumulator::EMPTY_LEAF;
use tracing::info;

use super::Settings;
use crate::codec::{modulus_limbs, LimbLayout};
use crate::error::CircuitError;
use crate::merkle::{ProofReuse, RootRecomputation, RootRecomputationInputs};
use crate::runtime::{
    Boundary, ColumnId, CompressionQuery, ConstraintRuntime, Expr, LessThanQuery,
};

/// Every column owned by the accumulator module.
#[derive(Clone, Debug)]
pub struct AccumulatorColumns {
    pub leaves: ColumnId,
    pub roots: ColumnId,
    pub positions: ColumnId,
    /// Depth-expanded, `Settings::num_proof_rows` rows.
    pub proofs: ColumnId,
    pub use_next_proof: ColumnId,
    pub is_active: ColumnId,
    pub counter: ColumnId,

    pub is_first: ColumnId,
    pub is_insert: ColumnId,
    pub is_delete: ColumnId,
    pub is_update: ColumnId,
    pub is_read_zero: ColumnId,
    pub is_read_non_zero: ColumnId,

    pub hkey: ColumnId,
    pub hkey_minus: ColumnId,
    pub hkey_plus: ColumnId,
    pub hkey_limbs: Vec<ColumnId>,
    pub hkey_minus_limbs: Vec<ColumnId>,
    pub hkey_plus_limbs: Vec<ColumnId>,
    /// Precomputed limbs of the field modulus.
    pub modulus_limbs: Vec<ColumnId>,

    pub leaf_minus_index: ColumnId,
    pub leaf_minus_next: ColumnId,
    pub leaf_plus_index: ColumnId,
    pub leaf_plus_prev: ColumnId,
    pub leaf_deleted_index: ColumnId,
    pub leaf_deleted_prev: ColumnId,
    pub leaf_deleted_next: ColumnId,

    pub opening_prev: ColumnId,
    pub opening_next: ColumnId,
    pub opening_hkey: ColumnId,
    pub opening_hval: ColumnId,
    pub interm_prev: ColumnId,
    pub interm_next: ColumnId,
    pub interm_hkey: ColumnId,
    pub leaf_hashes: ColumnId,
    pub is_empty_leaf: ColumnId,

    pub next_free_node: ColumnId,
    pub insertion_path: ColumnId,
    pub is_insert_row3: ColumnId,
    pub interm_top_root: ColumnId,
    pub top_root: ColumnId,
}

#[derive(Clone, Debug)]
pub struct AccumulatorModule {
    pub settings: Settings,
    pub cols: AccumulatorColumns,
    pub merkle: RootRecomputation,
}

/// Declare an accumulator module of `max_proofs` rows over trees of `depth`.
pub fn define_constraints<R: ConstraintRuntime>(
    runtime: &mut R,
    max_proofs: usize,
    depth: usize,
) -> Result<AccumulatorModule, CircuitError> {
    AccumulatorModule::define(runtime, Settings::new(max_proofs, depth))
}

impl AccumulatorModule {
    pub fn define<R: ConstraintRuntime>(
        runtime: &mut R,
        settings: Settings,
    ) -> Result<Self, CircuitError> {
        settings.validate()?;
        let cols = declare_columns(runtime, &settings)?;

        let merkle = RootRecomputation::define(
            runtime,
            RootRecomputationInputs {
                name: format!("{}_MERKLE_PROOFS", settings.name),
                round: settings.round,
                depth: settings.merkle_tree_depth,
                num_proofs: settings.num_rows(),
                proofs: cols.proofs,
                leaves: cols.leaves,
                roots: cols.roots,
                positions: cols.positions,
                is_active: Some(cols.is_active),
                reuse: Some(ProofReuse {
                    use_next: cols.use_next_proof,
                    counter: cols.counter,
                }),
            },
        )?;

        let module = Self {
            settings,
            cols,
            merkle,
        };
        module.check_segments(runtime);
        module.check_roots(runtime);
        module.check_leaves(runtime);
        module.check_sandwich(runtime);
        module.check_pointers(runtime);
        module.check_relinks(runtime);
        module.check_next_free_node(runtime);
        module.check_zero_in_inactive(runtime);

        info!(
            name = %module.settings.name,
            rows = module.settings.num_rows(),
            depth = module.settings.merkle_tree_depth,
            "accumulator module defined"
        );
        Ok(module)
    }

    fn global<R: ConstraintRuntime>(&self, runtime: &mut R, suffix: &str, expr: Expr) {
        self.global_with(runtime, suffix, expr, Boundary::Cancel)
    }

    fn global_with<R: ConstraintRuntime>(
        &self,
        runtime: &mut R,
        suffix: &str,
        expr: Expr,
        boundary: Boundary,
    ) {
        runtime.declare_global(
            self.settings.round,
            &format!("{}_{}", self.settings.name, suffix),
            expr,
            boundary,
        );
    }

    fn compression<R: ConstraintRuntime>(
        &self,
        runtime: &mut R,
        suffix: &str,
        old_state: Expr,
        block: ColumnId,
        new_state: ColumnId,
    ) {
        runtime.declare_compression(
            self.settings.round,
            &format!("{}_{}", self.settings.name, suffix),
            CompressionQuery {
                old_state,
                block: block.expr(),
                new_state: new_state.expr(),
                selector: Some(self.cols.is_active.expr()),
            },
        );
    }

    /// `is_first * flag` as an expression.
    fn first(&self, flag: ColumnId) -> Expr {
        self.cols.is_active.expr() * self.cols.is_first.expr() * flag.expr()
    }

    fn operations(&self) -> [(&'static str, ColumnId, usize); 5] {
        let c = &self.cols;
        [
            ("INSERT", c.is_insert, 6),
            ("DELETE", c.is_delete, 6),
            ("UPDATE", c.is_update, 2),
            ("READ_ZERO", c.is_read_zero, 2),
            ("READ_NON_ZERO", c.is_read_non_zero, 2),
        ]
    }

    fn check_segments<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let a = c.is_active;
        let round = self.settings.round;
        let name = &self.settings.name;

        self.global_with(
            runtime,
            "IS_ACTIVE_BOOLEAN",
            a.expr().square() - a.expr(),
            Boundary::Cyclic,
        );
        self.global(
            runtime,
            "IS_ACTIVE_ZERO_FOLLOWED_BY_ZERO",
            a.expr() - a.shift(-1) * a.expr(),
        );

        let flags = [
            ("IS_FIRST", c.is_first),
            ("IS_INSERT", c.is_insert),
            ("IS_DELETE", c.is_delete),
            ("IS_UPDATE", c.is_update),
            ("IS_READ_ZERO", c.is_read_zero),
            ("IS_READ_NON_ZERO", c.is_read_non_zero),
            ("USE_NEXT_PROOF", c.use_next_proof),
            ("IS_EMPTY_LEAF", c.is_empty_leaf),
        ];
        for (suffix, flag) in flags {
            self.global_with(
                runtime,
                &format!("{suffix}_BOOLEAN"),
                flag.expr().square() * a.expr() - flag.expr(),
                Boundary::Cyclic,
            );
        }

        let ops = self.operations();
        self.global_with(
            runtime,
            "OPS_MUTUALLY_EXCLUSIVE",
            a.expr() - Expr::sum(ops.iter().map(|(_, flag, _)| flag.expr())),
            Boundary::Cyclic,
        );

        runtime.declare_local(
            round,
            &format!("{name}_IS_FIRST_AT_START"),
            c.is_first.expr() - a.expr(),
        );
        runtime.declare_local(
            round,
            &format!("{name}_COUNTER_STARTS_AT_ZERO"),
            c.counter.expr(),
        );
        self.global(
            runtime,
            "COUNTER_INCREMENT",
            a.shift(1) * (c.counter.shift(1) - c.counter.expr() - Expr::one()),
        );

        for (op, flag, len) in ops {
            self.global(
                runtime,
                &format!("IS_{op}_CONSTANT_IN_SEGMENT"),
                a.shift(1) * c.is_first.shift(1).one_minus() * (flag.shift(1) - flag.expr()),
            );
            for offset in 1..len {
                self.global(
                    runtime,
                    &format!("{op}_SEGMENT_ROW_{offset}_NOT_FIRST"),
                    self.first(flag) * c.is_first.shift(offset as isize),
                );
            }
            self.global(
                runtime,
                &format!("{op}_SEGMENT_FOLLOWED_BY_FIRST"),
                self.first(flag)
                    * a.shift(len as isize)
                    * c.is_first.shift(len as isize).one_minus(),
            );
        }

        // Proofs are shared by rows (2k, 2k + 1) of every non-read segment.
        self.global_with(
            runtime,
            "USE_NEXT_PROOF_PATTERN",
            c.use_next_proof.expr()
                - Expr::periodic(2, 0)
                    * (c.is_insert.expr() + c.is_delete.expr() + c.is_update.expr()),
            Boundary::Cyclic,
        );
    }

    fn check_roots<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let roots = c.roots;

        for (op, flag) in [("INSERT", c.is_insert), ("DELETE", c.is_delete)] {
            self.global(
                runtime,
                &format!("ROOT_EQUALITY_{op}_1"),
                self.first(flag) * (roots.shift(1) - roots.shift(2)),
            );
            self.global(
                runtime,
                &format!("ROOT_EQUALITY_{op}_2"),
                self.first(flag) * (roots.shift(3) - roots.shift(4)),
            );
        }
        self.global(
            runtime,
            "ROOT_EQUALITY_READ_ZERO",
            self.first(c.is_read_zero) * (roots.expr() - roots.shift(1)),
        );
        for (suffix, id) in [("ROOT", roots), ("LEAF", c.leaves), ("POSITION", c.positions)] {
            self.global(
                runtime,
                &format!("READ_NON_ZERO_{suffix}_EQUALITY"),
                self.first(c.is_read_non_zero) * (id.expr() - id.shift(1)),
            );
        }
        for (suffix, id) in [
            ("PREV", c.opening_prev),
            ("NEXT", c.opening_next),
            ("HKEY", c.opening_hkey),
        ] {
            self.global(
                runtime,
                &format!("UPDATE_KEEPS_{suffix}"),
                self.first(c.is_update) * (id.shift(1) - id.expr()),
            );
        }

        // The first root of a segment is the last root of the previous one.
        self.global(
            runtime,
            "ROOT_CHAINING",
            c.is_active.expr() * c.is_first.expr() * (roots.expr() - roots.shift(-1)),
        );
    }

    fn check_leaves<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let a = c.is_active;
        let empty = Expr::constant(EMPTY_LEAF);

        self.global(
            runtime,
            "EMPTY_LEAF_FOR_INSERT",
            self.first(c.is_insert) * (c.leaves.shift(2) - empty.clone()),
        );
        self.global(
            runtime,
            "EMPTY_LEAF_FOR_DELETE",
            self.first(c.is_delete) * (c.leaves.shift(3) - empty),
        );
        self.global_with(
            runtime,
            "IS_EMPTY_LEAF_ON_INSERT_ROW_3_AND_DELETE_ROW_4",
            c.is_empty_leaf.expr()
                - c.is_first.shift(-2) * c.is_insert.shift(-2)
                - c.is_first.shift(-3) * c.is_delete.shift(-3),
            Boundary::Cyclic,
        );
        self.global_with(
            runtime,
            "LEAF_HASH_EQUALITY",
            a.expr()
                * c.is_empty_leaf.expr().one_minus()
                * (c.leaves.expr() - c.leaf_hashes.expr()),
            Boundary::Cyclic,
        );

        let chain = [
            ("LEAF_HASH_PREV", Expr::zero(), c.opening_prev, c.interm_prev),
            ("LEAF_HASH_NEXT", c.interm_prev.expr(), c.opening_next, c.interm_next),
            ("LEAF_HASH_HKEY", c.interm_next.expr(), c.opening_hkey, c.interm_hkey),
            ("LEAF_HASH_HVAL", c.interm_hkey.expr(), c.opening_hval, c.leaf_hashes),
        ];
        for (suffix, old_state, block, new_state) in chain {
            self.compression(runtime, suffix, old_state, block, new_state);
        }
    }

    fn check_sandwich<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let round = self.settings.round;
        let name = &self.settings.name;
        let layout = LimbLayout::HKEY;
        let weights = layout.weights();
        let selector = self.first(c.is_insert) + self.first(c.is_read_zero);

        runtime.declare_less_than(
            round,
            &format!("{name}_HKEY_MINUS_LESS_THAN_HKEY"),
            LessThanQuery {
                lhs: c.hkey_minus_limbs.clone(),
                rhs: c.hkey_limbs.clone(),
                layout,
                selector: selector.clone(),
            },
        );
        runtime.declare_less_than(
            round,
            &format!("{name}_HKEY_LESS_THAN_HKEY_PLUS"),
            LessThanQuery {
                lhs: c.hkey_limbs.clone(),
                rhs: c.hkey_plus_limbs.clone(),
                layout,
                selector: selector.clone(),
            },
        );

        for (suffix, id, limbs) in [
            ("HKEY", c.hkey, &c.hkey_limbs),
            ("HKEY_MINUS", c.hkey_minus, &c.hkey_minus_limbs),
            ("HKEY_PLUS", c.hkey_plus, &c.hkey_plus_limbs),
        ] {
            // Recomposition only holds modulo p, so the limbs must also
            // stay below p to pin down a single integer.
            runtime.declare_less_than(
                round,
                &format!("{name}_{suffix}_CANONICAL"),
                LessThanQuery {
                    lhs: limbs.clone(),
                    rhs: c.modulus_limbs.clone(),
                    layout,
                    selector: selector.clone(),
                },
            );
            let recomposed = Expr::sum(
                limbs
                    .iter()
                    .zip(&weights)
                    .map(|(limb, weight)| Expr::constant(*weight) * limb.expr()),
            );
            self.global_with(
                runtime,
                &format!("{suffix}_LIMB_RECOMPOSITION"),
                selector.clone() * (id.expr() - recomposed),
                Boundary::Cyclic,
            );
            self.global_with(
                runtime,
                &format!("{suffix}_ZERO_OUTSIDE_SANDWICH"),
                selector.one_minus() * id.expr(),
                Boundary::Cyclic,
            );
        }

        self.global_with(
            runtime,
            "HKEY_MINUS_MATCHES_OPENING",
            selector.clone() * (c.hkey_minus.expr() - c.opening_hkey.expr()),
            Boundary::Cyclic,
        );
        self.global(
            runtime,
            "HKEY_MATCHES_INSERTED_OPENING",
            self.first(c.is_insert) * (c.hkey.expr() - c.opening_hkey.shift(3)),
        );
        self.global(
            runtime,
            "HKEY_PLUS_MATCHES_OPENING_INSERT",
            self.first(c.is_insert) * (c.hkey_plus.expr() - c.opening_hkey.shift(4)),
        );
        self.global(
            runtime,
            "HKEY_PLUS_MATCHES_OPENING_READ_ZERO",
            self.first(c.is_read_zero) * (c.hkey_plus.expr() - c.opening_hkey.shift(1)),
        );
    }

    fn check_pointers<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let ins = self.first(c.is_insert);
        let del = self.first(c.is_delete);
        let rz = self.first(c.is_read_zero);

        // Neighbours are adjacent in the list before the operation.
        for (suffix, selector, lhs, rhs) in [
            ("INSERT_POINTER_1", &ins, c.leaf_minus_next, c.leaf_plus_index),
            ("INSERT_POINTER_2", &ins, c.leaf_plus_prev, c.leaf_minus_index),
            ("DELETE_POINTER_1", &del, c.leaf_minus_next, c.leaf_deleted_index),
            ("DELETE_POINTER_2", &del, c.leaf_deleted_prev, c.leaf_minus_index),
            ("DELETE_POINTER_3", &del, c.leaf_deleted_next, c.leaf_plus_index),
            ("DELETE_POINTER_4", &del, c.leaf_plus_prev, c.leaf_deleted_index),
            ("READ_ZERO_POINTER_1", &rz, c.leaf_minus_next, c.leaf_plus_index),
            ("READ_ZERO_POINTER_2", &rz, c.leaf_plus_prev, c.leaf_minus_index),
        ] {
            self.global(runtime, suffix, selector.clone() * (lhs.expr() - rhs.expr()));
        }

        // Pointer columns are read off the rows holding each neighbour.
        let any = ins.clone() + del.clone() + rz.clone();
        let reads = [
            ("LEAF_MINUS_INDEX_IS_POSITION", &any, c.leaf_minus_index, c.positions.expr()),
            ("LEAF_MINUS_NEXT_IS_OPENING", &any, c.leaf_minus_next, c.opening_next.expr()),
            ("LEAF_PLUS_INDEX_IS_POSITION_INSERT", &ins, c.leaf_plus_index, c.positions.shift(4)),
            ("LEAF_PLUS_PREV_IS_OPENING_INSERT", &ins, c.leaf_plus_prev, c.opening_prev.shift(4)),
            ("LEAF_PLUS_INDEX_IS_POSITION_DELETE", &del, c.leaf_plus_index, c.positions.shift(4)),
            ("LEAF_PLUS_PREV_IS_OPENING_DELETE", &del, c.leaf_plus_prev, c.opening_prev.shift(4)),
            ("LEAF_PLUS_INDEX_IS_POSITION_READ_ZERO", &rz, c.leaf_plus_index, c.positions.shift(1)),
            ("LEAF_PLUS_PREV_IS_OPENING_READ_ZERO", &rz, c.leaf_plus_prev, c.opening_prev.shift(1)),
            ("LEAF_DELETED_INDEX_IS_POSITION", &del, c.leaf_deleted_index, c.positions.shift(2)),
            ("LEAF_DELETED_PREV_IS_OPENING", &del, c.leaf_deleted_prev, c.opening_prev.shift(2)),
            ("LEAF_DELETED_NEXT_IS_OPENING", &del, c.leaf_deleted_next, c.opening_next.shift(2)),
        ];
        for (suffix, selector, pointer, source) in reads {
            self.global(runtime, suffix, selector.clone() * (pointer.expr() - source));
        }

        for (suffix, id) in [
            ("LEAF_MINUS_INDEX", c.leaf_minus_index),
            ("LEAF_MINUS_NEXT", c.leaf_minus_next),
            ("LEAF_PLUS_INDEX", c.leaf_plus_index),
            ("LEAF_PLUS_PREV", c.leaf_plus_prev),
        ] {
            self.global_with(
                runtime,
                &format!("{suffix}_ZERO_OUTSIDE_POINTER_ROWS"),
                any.one_minus() * id.expr(),
                Boundary::Cyclic,
            );
        }
        for (suffix, id) in [
            ("LEAF_DELETED_INDEX", c.leaf_deleted_index),
            ("LEAF_DELETED_PREV", c.leaf_deleted_prev),
            ("LEAF_DELETED_NEXT", c.leaf_deleted_next),
        ] {
            self.global_with(
                runtime,
                &format!("{suffix}_ZERO_OUTSIDE_POINTER_ROWS"),
                del.one_minus() * id.expr(),
                Boundary::Cyclic,
            );
        }
    }

    /// Rewritten neighbours differ from their old opening in one pointer only.
    fn check_relinks<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let pos = c.positions;

        for (op, flag, new_slot_row) in [("INSERT", c.is_insert, 2), ("DELETE", c.is_delete, 4)] {
            let selector = self.first(flag);
            for (suffix, id) in [("PREV", c.opening_prev), ("HKEY", c.opening_hkey), ("HVAL", c.opening_hval)] {
                self.global(
                    runtime,
                    &format!("{op}_MINUS_RELINK_KEEPS_{suffix}"),
                    selector.clone() * (id.shift(1) - id.expr()),
                );
            }
            self.global(
                runtime,
                &format!("{op}_MINUS_RELINK_NEXT"),
                selector.clone() * (c.opening_next.shift(1) - pos.shift(new_slot_row)),
            );

            for (suffix, id) in [("NEXT", c.opening_next), ("HKEY", c.opening_hkey), ("HVAL", c.opening_hval)] {
                self.global(
                    runtime,
                    &format!("{op}_PLUS_RELINK_KEEPS_{suffix}"),
                    selector.clone() * (id.shift(5) - id.shift(4)),
                );
            }
        }

        let ins = self.first(c.is_insert);
        let del = self.first(c.is_delete);
        self.global(
            runtime,
            "INSERT_PLUS_RELINK_PREV",
            ins.clone() * (c.opening_prev.shift(5) - pos.shift(2)),
        );
        self.global(
            runtime,
            "DELETE_PLUS_RELINK_PREV",
            del * (c.opening_prev.shift(5) - pos.expr()),
        );
        self.global(
            runtime,
            "INSERTED_LEAF_PREV",
            ins.clone() * (c.opening_prev.shift(3) - pos.expr()),
        );
        self.global(
            runtime,
            "INSERTED_LEAF_NEXT",
            ins * (c.opening_next.shift(3) - pos.shift(4)),
        );
    }

    fn check_next_free_node<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let nfn = c.next_free_node;
        let row3 = c.is_insert_row3;

        self.global(
            runtime,
            "NEXT_FREE_NODE_INCREMENT",
            c.is_active.expr() * (nfn.expr() - nfn.shift(-1) - row3.expr()),
        );
        self.global_with(
            runtime,
            "IS_INSERT_ROW3_CONSISTENCY",
            c.is_insert.expr() * c.is_empty_leaf.expr() - row3.expr(),
            Boundary::Cyclic,
        );
        self.global_with(
            runtime,
            "INSERTION_PATH_IS_POSITION",
            row3.expr() * (c.insertion_path.expr() - c.positions.expr()),
            Boundary::Cyclic,
        );
        self.global_with(
            runtime,
            "INSERTION_PATH_IS_ALLOCATED_SLOT",
            row3.expr() * (c.insertion_path.expr() - nfn.expr() + Expr::one()),
            Boundary::Cyclic,
        );
        self.global_with(
            runtime,
            "INSERTION_PATH_ZERO_ELSEWHERE",
            row3.expr().one_minus() * c.insertion_path.expr(),
            Boundary::Cyclic,
        );

        self.compression(
            runtime,
            "TOP_ROOT_NEXT_FREE_NODE",
            Expr::zero(),
            nfn,
            c.interm_top_root,
        );
        self.compression(runtime, "TOP_ROOT", c.interm_top_root.expr(), c.roots, c.top_root);
    }

    fn check_zero_in_inactive<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let inactive = c.is_active.expr().one_minus();
        for (suffix, id) in [
            ("LEAVES", c.leaves),
            ("ROOTS", c.roots),
            ("POSITIONS", c.positions),
            ("COUNTER", c.counter),
            ("NEXT_FREE_NODE", c.next_free_node),
            ("OPENING_PREV", c.opening_prev),
            ("OPENING_NEXT", c.opening_next),
            ("OPENING_HKEY", c.opening_hkey),
            ("OPENING_HVAL", c.opening_hval),
            ("IS_INSERT_ROW3", c.is_insert_row3),
        ] {
            self.global_with(
                runtime,
                &format!("{suffix}_ZERO_WHEN_INACTIVE"),
                inactive.clone() * id.expr(),
                Boundary::Cyclic,
            );
        }
    }
}

fn declare_columns<R: ConstraintRuntime>(
    runtime: &mut R,
    settings: &Settings,
) -> Result<AccumulatorColumns, CircuitError> {
    let rows = settings.num_rows();
    let round = settings.round;
    let name = &settings.name;
    let modulus_limbs: Vec<ColumnId> = modulus_limbs(&LimbLayout::HKEY)?
        .into_iter()
        .enumerate()
        .map(|(index, limb)| {
            runtime.declare_precomputed(&format!("{name}_MODULUS_LIMB_{index}"), vec![limb; rows])
        })
        .collect();
    let proofs = runtime.declare_column(
        round,
        &format!("{name}_PROOFS"),
        settings.num_proof_rows(),
    );
    let mut column =
        |suffix: &str| runtime.declare_column(round, &format!("{name}_{suffix}"), rows);

    let mut limbs = |prefix: &str| -> Vec<ColumnId> {
        (0..LimbLayout::HKEY.num_limbs)
            .map(|index| column(&format!("{prefix}_LIMB_{index}")))
            .collect()
    };
    let hkey_limbs = limbs("HKEY");
    let hkey_minus_limbs = limbs("HKEY_MINUS");
    let hkey_plus_limbs = limbs("HKEY_PLUS");

    Ok(AccumulatorColumns {
        leaves: column("LEAVES"),
        roots: column("ROOTS"),
        positions: column("POSITIONS"),
        proofs,
        use_next_proof: column("USE_NEXT_PROOF"),
        is_active: column("IS_ACTIVE"),
        counter: column("COUNTER"),
        is_first: column("IS_FIRST"),
        is_insert: column("IS_INSERT"),
        is_delete: column("IS_DELETE"),
        is_update: column("IS_UPDATE"),
        is_read_zero: column("IS_READ_ZERO"),
        is_read_non_zero: column("IS_READ_NON_ZERO"),
        hkey: column("HKEY"),
        hkey_minus: column("HKEY_MINUS"),
        hkey_plus: column("HKEY_PLUS"),
        hkey_limbs,
        hkey_minus_limbs,
        hkey_plus_limbs,
        modulus_limbs,
        leaf_minus_index: column("LEAF_MINUS_INDEX"),
        leaf_minus_next: column("LEAF_MINUS_NEXT"),
        leaf_plus_index: column("LEAF_PLUS_INDEX"),
        leaf_plus_prev: column("LEAF_PLUS_PREV"),
        leaf_deleted_index: column("LEAF_DELETED_INDEX"),
        leaf_deleted_prev: column("LEAF_DELETED_PREV"),
        leaf_deleted_next: column("LEAF_DELETED_NEXT"),
        opening_prev: column("OPENING_PREV"),
        opening_next: column("OPENING_NEXT"),
        opening_hkey: column("OPENING_HKEY"),
        opening_hval: column("OPENING_HVAL"),
        interm_prev: column("INTERM_PREV"),
        interm_next: column("INTERM_NEXT"),
        interm_hkey: column("INTERM_HKEY"),
        leaf_hashes: column("LEAF_HASHES"),
        is_empty_leaf: column("IS_EMPTY_LEAF"),
        next_free_node: column("NEXT_FREE_NODE"),
        insertion_path: column("INSERTION_PATH"),
        is_insert_row3: column("IS_INSERT_ROW3"),
        interm_top_root: column("INTERM_TOP_ROOT"),
        top_root: column("TOP_ROOT"),
    })
}
