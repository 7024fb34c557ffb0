use ark_bn254::Fr;
use ark_ff::{One, Zero};
use tracing::info;

use crate::codec::next_power_of_two;
use crate::error::CircuitError;
use crate::runtime::{
    Boundary, ColumnId, CompressionQuery, ConstraintRuntime, Expr, ProjectionQuery, Round,
};

/// How row activity is known to the gadget. Chosen once at definition time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityPlan {
    /// Every row carries a proof; no activity flag is needed.
    FullyActive,
    /// The first `num_proofs * depth` rows are active; the flag is precomputed.
    Padded,
    /// Activity comes from the caller's `is_active` column.
    Driven,
}

/// Caller columns enabling consecutive rows to share one proof.
#[derive(Clone, Copy, Debug)]
pub struct ProofReuse {
    pub use_next: ColumnId,
    pub counter: ColumnId,
}

/// Columns owned by the caller.
#[derive(Clone, Debug)]
pub struct RootRecomputationInputs {
    pub name: String,
    pub round: Round,
    pub depth: usize,
    /// Size of the leaf/root/position columns.
    pub num_proofs: usize,
    /// Packed proofs, `next_power_of_two(num_proofs * depth)` rows.
    pub proofs: ColumnId,
    pub leaves: ColumnId,
    pub roots: ColumnId,
    pub positions: ColumnId,
    pub is_active: Option<ColumnId>,
    pub reuse: Option<ProofReuse>,
}

/// Caller flags repeated over every row of their proof block.
#[derive(Clone, Copy, Debug)]
pub struct ExpandedColumns {
    pub is_active: ColumnId,
    pub use_next: Option<ColumnId>,
    pub counter: Option<ColumnId>,
    /// Precomputed: 1 on the leaf row of each of the `num_proofs` blocks.
    pub leaf_rows: ColumnId,
}

#[derive(Clone, Copy, Debug)]
pub struct RootRecomputationColumns {
    pub curr: ColumnId,
    pub pos_bit: ColumnId,
    pub pos_acc: ColumnId,
    pub left: ColumnId,
    pub right: ColumnId,
    pub interm: ColumnId,
    pub node_hash: ColumnId,
    pub root: ColumnId,
    pub is_inactive: Option<ColumnId>,
    pub expanded: Option<ExpandedColumns>,
}

#[derive(Clone, Debug)]
pub struct RootRecomputation {
    pub inputs: RootRecomputationInputs,
    pub plan: ActivityPlan,
    pub cols: RootRecomputationColumns,
    /// Rows of every gadget column.
    pub size: usize,
}

impl RootRecomputation {
    pub fn define<R: ConstraintRuntime>(
        runtime: &mut R,
        inputs: RootRecomputationInputs,
    ) -> Result<Self, CircuitError> {
        let depth = inputs.depth;
        if depth == 0 || inputs.num_proofs == 0 {
            return Err(CircuitError::InvalidSettings(format!(
                "{}: depth and number of proofs must be positive",
                inputs.name
            )));
        }
        let size = next_power_of_two(inputs.num_proofs * depth);
        check_size(runtime, &inputs.name, inputs.proofs, size)?;
        for id in [inputs.leaves, inputs.roots, inputs.positions] {
            check_size(runtime, &inputs.name, id, inputs.num_proofs)?;
        }

        let plan = match (&inputs.is_active, &inputs.reuse) {
            (Some(_), _) => ActivityPlan::Driven,
            (None, Some(_)) => {
                return Err(CircuitError::InvalidSettings(format!(
                    "{}: proof reuse needs an activity column",
                    inputs.name
                )))
            }
            (None, None) if inputs.num_proofs * depth == size => ActivityPlan::FullyActive,
            (None, None) => ActivityPlan::Padded,
        };

        let name = inputs.name.clone();
        let round = inputs.round;
        let column = |runtime: &mut R, suffix: &str| {
            runtime.declare_column(round, &format!("{name}_{suffix}"), size)
        };

        let curr = column(runtime, "CURR");
        let pos_bit = column(runtime, "POS_BIT");
        let pos_acc = column(runtime, "POS_ACC");
        let left = column(runtime, "LEFT");
        let right = column(runtime, "RIGHT");
        let interm = column(runtime, "INTERM");
        let node_hash = column(runtime, "NODE_HASH");
        let root = column(runtime, "ROOT");

        let is_inactive = match plan {
            ActivityPlan::Padded => {
                let active_rows = inputs.num_proofs * depth;
                let values = (0..size)
                    .map(|row| if row < active_rows { Fr::zero() } else { Fr::one() })
                    .collect();
                Some(runtime.declare_precomputed(&format!("{name}_IS_INACTIVE"), values))
            }
            _ => None,
        };

        let expanded = match plan {
            ActivityPlan::Driven => {
                let leaf_rows = (0..size)
                    .map(|row| {
                        if row < inputs.num_proofs * depth && row % depth == depth - 1 {
                            Fr::one()
                        } else {
                            Fr::zero()
                        }
                    })
                    .collect();
                Some(ExpandedColumns {
                    is_active: column(runtime, "IS_ACTIVE_EXPANDED"),
                    use_next: inputs.reuse.map(|_| column(runtime, "USE_NEXT_EXPANDED")),
                    counter: inputs.reuse.map(|_| column(runtime, "SEGMENT_COUNTER")),
                    leaf_rows: runtime.declare_precomputed(&format!("{name}_LEAF_ROWS"), leaf_rows),
                })
            }
            _ => None,
        };

        let gadget = Self {
            inputs,
            plan,
            cols: RootRecomputationColumns {
                curr,
                pos_bit,
                pos_acc,
                left,
                right,
                interm,
                node_hash,
                root,
                is_inactive,
                expanded,
            },
            size,
        };

        gadget.define_recomputation(runtime);
        gadget.define_activity(runtime);
        gadget.define_links(runtime);
        if gadget.inputs.reuse.is_some() {
            gadget.define_reuse(runtime);
        }

        info!(name = %gadget.inputs.name, plan = ?gadget.plan, rows = size, "root recomputation defined");
        Ok(gadget)
    }

    /// 1 on active rows.
    pub fn activity(&self) -> Expr {
        match (&self.cols.is_inactive, &self.cols.expanded) {
            (Some(is_inactive), _) => is_inactive.expr().one_minus(),
            (None, Some(expanded)) => expanded.is_active.expr(),
            (None, None) => Expr::one(),
        }
    }

    /// 1 on the leaf row of every active proof.
    pub fn new_proof(&self) -> Expr {
        Expr::periodic(self.inputs.depth, self.inputs.depth - 1) * self.activity()
    }

    /// 1 on the root row of every active proof.
    pub fn end_of_proof(&self) -> Expr {
        Expr::periodic(self.inputs.depth, 0) * self.activity()
    }

    fn query_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.inputs.name, suffix)
    }

    fn define_recomputation<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let round = self.inputs.round;
        let proof = self.inputs.proofs;
        let act = self.activity();

        runtime.declare_global(
            round,
            &self.query_name("ROOT_BROADCAST"),
            self.new_proof().one_minus() * (act.clone() * c.root.shift(1) - c.root.expr()),
            Boundary::Cyclic,
        );
        runtime.declare_global(
            round,
            &self.query_name("ROOT_AT_END"),
            self.end_of_proof() * (c.root.expr() - c.node_hash.expr()),
            Boundary::Cyclic,
        );
        runtime.declare_global(
            round,
            &self.query_name("POS_BIT_BOOLEAN"),
            act.clone() * c.pos_bit.expr().square() - c.pos_bit.expr(),
            Boundary::Cyclic,
        );
        runtime.declare_global(
            round,
            &self.query_name("POS_ACC"),
            (Expr::from_u64(2) * self.end_of_proof().one_minus() * c.pos_acc.shift(-1)
                + c.pos_bit.expr())
                * act.clone()
                - c.pos_acc.expr(),
            Boundary::Cyclic,
        );
        runtime.declare_global(
            round,
            &self.query_name("SELECT_LEFT"),
            c.left.expr()
                - c.pos_bit.expr() * proof.expr()
                - c.pos_bit.expr().one_minus() * c.curr.expr(),
            Boundary::Cyclic,
        );
        runtime.declare_global(
            round,
            &self.query_name("SELECT_RIGHT"),
            c.right.expr()
                - c.pos_bit.expr() * c.curr.expr()
                - c.pos_bit.expr().one_minus() * proof.expr(),
            Boundary::Cyclic,
        );
        runtime.declare_global(
            round,
            &self.query_name("CURR_CHAIN"),
            self.new_proof().one_minus() * (act * c.node_hash.shift(1) - c.curr.expr()),
            Boundary::Cyclic,
        );

        runtime.declare_compression(
            round,
            &self.query_name("INTERM"),
            CompressionQuery {
                old_state: Expr::zero(),
                block: c.left.expr(),
                new_state: c.interm.expr(),
                selector: None,
            },
        );
        runtime.declare_compression(
            round,
            &self.query_name("NODE_HASH"),
            CompressionQuery {
                old_state: c.interm.expr(),
                block: c.right.expr(),
                new_state: c.node_hash.expr(),
                selector: None,
            },
        );
    }

    fn define_activity<R: ConstraintRuntime>(&self, runtime: &mut R) {
        if self.plan == ActivityPlan::FullyActive {
            return;
        }
        let c = &self.cols;
        let round = self.inputs.round;
        let inactive = self.activity().one_minus();

        for (suffix, id) in [
            ("ROOT", c.root),
            ("CURR", c.curr),
            ("PROOF", self.inputs.proofs),
            ("LEFT", c.left),
            ("RIGHT", c.right),
            ("POS_BIT", c.pos_bit),
            ("POS_ACC", c.pos_acc),
        ] {
            runtime.declare_global(
                round,
                &self.query_name(&format!("{suffix}_ZERO_WHEN_INACTIVE")),
                inactive.clone() * id.expr(),
                Boundary::Cyclic,
            );
        }

        let Some(expanded) = &c.expanded else {
            return;
        };
        let ae = expanded.is_active;
        let depth = self.inputs.depth;
        let inside_block = Expr::periodic(depth, depth - 1).one_minus();

        runtime.declare_global(
            round,
            &self.query_name("IS_ACTIVE_EXPANDED_BOOLEAN"),
            ae.expr().square() - ae.expr(),
            Boundary::Cyclic,
        );
        runtime.declare_global(
            round,
            &self.query_name("IS_ACTIVE_EXPANDED_NO_REACTIVATION"),
            ae.expr() * ae.shift(-1).one_minus(),
            Boundary::Cancel,
        );

        let use_next = expanded.use_next.map(|id| ("USE_NEXT", id));
        let counter = expanded.counter.map(|id| ("COUNTER", id));
        for (suffix, id) in [Some(("IS_ACTIVE", ae)), use_next, counter].into_iter().flatten() {
            runtime.declare_global(
                round,
                &self.query_name(&format!("{suffix}_EXPANDED_CONSTANT_IN_BLOCK")),
                inside_block.clone() * (id.shift(1) - id.expr()),
                Boundary::Cancel,
            );
        }
        for (suffix, id) in [use_next, counter].into_iter().flatten() {
            runtime.declare_global(
                round,
                &self.query_name(&format!("{suffix}_EXPANDED_ZERO_WHEN_INACTIVE")),
                ae.expr().one_minus() * id.expr(),
                Boundary::Cyclic,
            );
        }
    }

    fn define_links<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let c = &self.cols;
        let inputs = &self.inputs;
        let round = inputs.round;

        let mut source = vec![inputs.leaves, inputs.roots, inputs.positions];
        let mut target = vec![c.curr, c.root, c.pos_acc];
        if let (Some(reuse), Some(counter)) = (
            &inputs.reuse,
            c.expanded.as_ref().and_then(|expanded| expanded.counter),
        ) {
            source.push(reuse.counter);
            target.push(counter);
        }

        runtime.declare_projection(
            round,
            &self.query_name("INPUTS"),
            ProjectionQuery {
                source,
                source_filter: inputs.is_active.map_or_else(Expr::one, ColumnId::expr),
                target,
                target_filter: self.new_proof(),
            },
        );

        if let (Some(is_active), Some(expanded)) = (inputs.is_active, &c.expanded) {
            let mut source = vec![is_active];
            let mut target = vec![expanded.is_active];
            if let (Some(reuse), Some(use_next), Some(counter)) =
                (&inputs.reuse, expanded.use_next, expanded.counter)
            {
                source.extend([reuse.use_next, reuse.counter]);
                target.extend([use_next, counter]);
            }
            runtime.declare_projection(
                round,
                &self.query_name("EXPAND"),
                ProjectionQuery {
                    source,
                    source_filter: Expr::one(),
                    target,
                    target_filter: expanded.leaf_rows.expr(),
                },
            );
        }
    }

    /// Blocks flagged `use_next` carry the same proof and path as the next block.
    fn define_reuse<R: ConstraintRuntime>(&self, runtime: &mut R) {
        let Some(expanded) = &self.cols.expanded else {
            return;
        };
        let (Some(use_next), Some(seg)) = (expanded.use_next, expanded.counter) else {
            return;
        };
        let round = self.inputs.round;
        let depth = self.inputs.depth as isize;
        let ae = expanded.is_active;

        for (suffix, id) in [("PROOF", self.inputs.proofs), ("POS_BIT", self.cols.pos_bit)] {
            runtime.declare_global(
                round,
                &self.query_name(&format!("{suffix}_REUSE")),
                use_next.expr()
                    * ae.expr()
                    * (id.expr() * (seg.expr() + Expr::one()) - id.shift(depth) * seg.shift(depth)),
                Boundary::Cancel,
            );
        }
        runtime.declare_global(
            round,
            &self.query_name("SEGMENT_INCREMENT"),
            ae.shift(depth) * (seg.shift(depth) - seg.expr() - Expr::one()),
            Boundary::Cancel,
        );
    }
}

fn check_size<R: ConstraintRuntime>(
    runtime: &R,
    name: &str,
    id: ColumnId,
    expected: usize,
) -> Result<(), CircuitError> {
    let actual = runtime.column_size(id);
    if actual != expected {
        return Err(CircuitError::ColumnSizeMismatch {
            column: format!("{name} input #{}", id.0),
            expected,
            actual,
        });
    }
    Ok(())
}
