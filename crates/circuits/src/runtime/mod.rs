//! Constraint runtime interface and its in-memory reference implementation.
//!
//! Modules declare columns and queries through `ConstraintRuntime`, and fill
//! columns through `AssignmentRuntime`. `Composition` and `Witness` implement
//! both sides in memory and can check every declared query.

mod expr;
mod memory;


use ark_bn254::Fr;

pub use expr::Expr;
pub use memory::{Composition, CompositionStats, Witness};

use crate::codec::LimbLayout;
use crate::error::CircuitError;

/// Interaction round a column or query belongs to.
pub type Round = usize;

/// Handle on a declared column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub usize);

impl ColumnId {
    pub fn expr(self) -> Expr {
        self.shift(0)
    }

    /// View of the column shifted by `offset` rows, without copying.
    pub fn shift(self, offset: isize) -> Expr {
        Expr::Column {
            id: self,
            shift: offset,
        }
    }
}

/// How a global constraint treats rows whose shifted reads leave the domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// Such rows are not constrained.
    Cancel,
    /// Reads wrap around the end of the column.
    Cyclic,
}

/// `new_state == compress(old_state, block)` on every row where `selector` is non-zero.
#[derive(Clone, Debug)]
pub struct CompressionQuery {
    pub old_state: Expr,
    pub block: Expr,
    pub new_state: Expr,
    pub selector: Option<Expr>,
}

/// The rows of `source` picked by `source_filter`, read in order, equal the
/// rows of `target` picked by `target_filter`. Filters must be boolean.
#[derive(Clone, Debug)]
pub struct ProjectionQuery {
    pub source: Vec<ColumnId>,
    pub source_filter: Expr,
    pub target: Vec<ColumnId>,
    pub target_filter: Expr,
}

/// `compose(lhs) < compose(rhs)` as integers, with every limb inside its
/// bit width, on every row where `selector` is non-zero.
#[derive(Clone, Debug)]
pub struct LessThanQuery {
    pub lhs: Vec<ColumnId>,
    pub rhs: Vec<ColumnId>,
    pub layout: LimbLayout,
    pub selector: Expr,
}

/// Definition side of a constraint system.
pub trait ConstraintRuntime {
    fn declare_column(&mut self, round: Round, name: &str, size: usize) -> ColumnId;

    /// Column whose values are fixed at definition time.
    fn declare_precomputed(&mut self, name: &str, values: Vec<Fr>) -> ColumnId;

    /// `expr` vanishes on every row.
    fn declare_global(&mut self, round: Round, name: &str, expr: Expr, boundary: Boundary);

    /// `expr` vanishes on row 0.
    fn declare_local(&mut self, round: Round, name: &str, expr: Expr);

    fn declare_compression(&mut self, round: Round, name: &str, query: CompressionQuery);

    fn declare_projection(&mut self, round: Round, name: &str, query: ProjectionQuery);

    fn declare_less_than(&mut self, round: Round, name: &str, query: LessThanQuery);

    fn column_size(&self, id: ColumnId) -> usize;
}

/// Prover side of a constraint system.
pub trait AssignmentRuntime {
    fn assign(&mut self, id: ColumnId, values: Vec<Fr>) -> Result<(), CircuitError>;

    fn values(&self, id: ColumnId) -> Result<&[Fr], CircuitError>;
}
