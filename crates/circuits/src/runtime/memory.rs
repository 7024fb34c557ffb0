//! In-memory constraint runtime.

use std::cmp::Ordering;

use ark_bn254::Fr;
use ark_ff::{One, Zero};
use rayon::prelude::*;
use sparse_accumulator::compress;
use tracing::{debug, info};

use super::{
    AssignmentRuntime, Boundary, ColumnId, CompressionQuery, ConstraintRuntime, Expr,
    LessThanQuery, ProjectionQuery, Round,
};
use crate::codec::compose_integer;
use crate::error::CircuitError;

#[derive(Clone, Debug)]
struct ColumnSpec {
    name: String,
    round: Round,
    size: usize,
    precomputed: Option<Vec<Fr>>,
}

#[derive(Clone, Debug)]
enum QueryKind {
    Global { expr: Expr, boundary: Boundary },
    Local { expr: Expr },
    Compression(CompressionQuery),
    Projection(ProjectionQuery),
    LessThan(LessThanQuery),
}

#[derive(Clone, Debug)]
struct Query {
    name: String,
    round: Round,
    kind: QueryKind,
}

/// Column and query counts of a composition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CompositionStats {
    pub columns: usize,
    pub cells: usize,
    pub globals: usize,
    pub locals: usize,
    pub compressions: usize,
    pub projections: usize,
    pub less_thans: usize,
    pub rounds: usize,
}

/// Declared columns and queries.
#[derive(Clone, Debug, Default)]
pub struct Composition {
    columns: Vec<ColumnSpec>,
    queries: Vec<Query>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_name(&self, id: ColumnId) -> &str {
        self.columns
            .get(id.0)
            .map(|spec| spec.name.as_str())
            .unwrap_or("<unknown>")
    }

    pub fn find_column(&self, name: &str) -> Option<ColumnId> {
        self.columns
            .iter()
            .position(|spec| spec.name == name)
            .map(ColumnId)
    }

    pub fn query_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.queries.iter().map(|query| query.name.as_str())
    }

    pub fn stats(&self) -> CompositionStats {
        let mut stats = CompositionStats {
            columns: self.columns.len(),
            cells: self.columns.iter().map(|spec| spec.size).sum(),
            ..Default::default()
        };
        for query in &self.queries {
            match query.kind {
                QueryKind::Global { .. } => stats.globals += 1,
                QueryKind::Local { .. } => stats.locals += 1,
                QueryKind::Compression(_) => stats.compressions += 1,
                QueryKind::Projection(_) => stats.projections += 1,
                QueryKind::LessThan(_) => stats.less_thans += 1,
            }
        }
        stats.rounds = self
            .columns
            .iter()
            .map(|spec| spec.round)
            .chain(self.queries.iter().map(|query| query.round))
            .max()
            .map_or(0, |round| round + 1);
        stats
    }

    /// Fresh witness with every precomputed column already filled.
    pub fn new_witness(&self) -> Witness {
        Witness {
            names: self.columns.iter().map(|spec| spec.name.clone()).collect(),
            sizes: self.columns.iter().map(|spec| spec.size).collect(),
            values: self
                .columns
                .iter()
                .map(|spec| spec.precomputed.clone())
                .collect(),
        }
    }

    /// Check every declared query against `witness`.
    pub fn check(&self, witness: &Witness) -> Result<(), CircuitError> {
        for query in &self.queries {
            debug!(query = %query.name, "checking");
            match &query.kind {
                QueryKind::Global { expr, boundary } => {
                    check_global(&query.name, expr, *boundary, witness)?
                }
                QueryKind::Local { expr } => check_local(&query.name, expr, witness)?,
                QueryKind::Compression(q) => check_compression(&query.name, q, witness)?,
                QueryKind::Projection(q) => check_projection(&query.name, q, witness)?,
                QueryKind::LessThan(q) => check_less_than(&query.name, q, witness)?,
            }
        }
        info!(queries = self.queries.len(), "all queries hold");
        Ok(())
    }

    fn push_query(&mut self, round: Round, name: &str, kind: QueryKind) {
        self.queries.push(Query {
            name: name.to_string(),
            round,
            kind,
        });
    }
}

impl ConstraintRuntime for Composition {
    fn declare_column(&mut self, round: Round, name: &str, size: usize) -> ColumnId {
        self.columns.push(ColumnSpec {
            name: name.to_string(),
            round,
            size,
            precomputed: None,
        });
        ColumnId(self.columns.len() - 1)
    }

    fn declare_precomputed(&mut self, name: &str, values: Vec<Fr>) -> ColumnId {
        self.columns.push(ColumnSpec {
            name: name.to_string(),
            round: 0,
            size: values.len(),
            precomputed: Some(values),
        });
        ColumnId(self.columns.len() - 1)
    }

    fn declare_global(&mut self, round: Round, name: &str, expr: Expr, boundary: Boundary) {
        self.push_query(round, name, QueryKind::Global { expr, boundary });
    }

    fn declare_local(&mut self, round: Round, name: &str, expr: Expr) {
        self.push_query(round, name, QueryKind::Local { expr });
    }

    fn declare_compression(&mut self, round: Round, name: &str, query: CompressionQuery) {
        self.push_query(round, name, QueryKind::Compression(query));
    }

    fn declare_projection(&mut self, round: Round, name: &str, query: ProjectionQuery) {
        self.push_query(round, name, QueryKind::Projection(query));
    }

    fn declare_less_than(&mut self, round: Round, name: &str, query: LessThanQuery) {
        self.push_query(round, name, QueryKind::LessThan(query));
    }

    fn column_size(&self, id: ColumnId) -> usize {
        self.columns.get(id.0).map_or(0, |spec| spec.size)
    }
}

/// Column values of one proving run.
#[derive(Clone, Debug)]
pub struct Witness {
    names: Vec<String>,
    sizes: Vec<usize>,
    values: Vec<Option<Vec<Fr>>>,
}

impl Witness {
    /// Value of a cell; unassigned columns read as zero.
    pub fn cell(&self, id: ColumnId, row: usize) -> Fr {
        self.values
            .get(id.0)
            .and_then(|column| column.as_ref())
            .and_then(|column| column.get(row))
            .copied()
            .unwrap_or_else(Fr::zero)
    }

    pub fn is_assigned(&self, id: ColumnId) -> bool {
        matches!(self.values.get(id.0), Some(Some(_)))
    }

    pub fn name(&self, id: ColumnId) -> &str {
        self.names.get(id.0).map_or("<unknown>", String::as_str)
    }

    /// Overwrite one cell of an assigned column.
    pub fn set(&mut self, id: ColumnId, row: usize, value: Fr) -> Result<(), CircuitError> {
        let name = self.name(id).to_string();
        let column = self
            .values
            .get_mut(id.0)
            .ok_or(CircuitError::UnknownColumn(id.0))?
            .as_mut()
            .ok_or_else(|| CircuitError::UnassignedColumn(name.clone()))?;
        let size = column.len();
        let cell = column
            .get_mut(row)
            .ok_or(CircuitError::ColumnSizeMismatch {
                column: name,
                expected: size,
                actual: row + 1,
            })?;
        *cell = value;
        Ok(())
    }

    /// Shared size of every column read by `exprs`.
    fn domain(&self, query: &str, exprs: &[&Expr]) -> Result<usize, CircuitError> {
        let mut size = None;
        for expr in exprs {
            for (id, _) in expr.column_reads() {
                let column = self.values(id)?;
                match size {
                    None => size = Some(column.len()),
                    Some(n) if n != column.len() => {
                        return Err(CircuitError::DomainMismatch {
                            query: query.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }
        size.ok_or_else(|| CircuitError::DomainMismatch {
            query: query.to_string(),
        })
    }
}

impl AssignmentRuntime for Witness {
    fn assign(&mut self, id: ColumnId, values: Vec<Fr>) -> Result<(), CircuitError> {
        let expected = *self.sizes.get(id.0).ok_or(CircuitError::UnknownColumn(id.0))?;
        let name = self.name(id).to_string();
        if values.len() != expected {
            return Err(CircuitError::ColumnSizeMismatch {
                column: name,
                expected,
                actual: values.len(),
            });
        }
        let slot = &mut self.values[id.0];
        if slot.is_some() {
            return Err(CircuitError::AlreadyAssigned(name));
        }
        *slot = Some(values);
        Ok(())
    }

    fn values(&self, id: ColumnId) -> Result<&[Fr], CircuitError> {
        self.values
            .get(id.0)
            .ok_or(CircuitError::UnknownColumn(id.0))?
            .as_deref()
            .ok_or_else(|| CircuitError::UnassignedColumn(self.name(id).to_string()))
    }
}

fn violation(query: &str, row: usize) -> CircuitError {
    CircuitError::ConstraintViolation {
        query: query.to_string(),
        row,
    }
}

fn check_global(
    name: &str,
    expr: &Expr,
    boundary: Boundary,
    witness: &Witness,
) -> Result<(), CircuitError> {
    let size = witness.domain(name, &[expr])?;
    let (start, end) = match boundary {
        Boundary::Cyclic => (0, size),
        Boundary::Cancel => {
            let (lo, hi) = expr.shift_range();
            (lo.unsigned_abs(), size.saturating_sub(hi.max(0) as usize))
        }
    };
    if start >= end {
        return Ok(());
    }

    match (start..end)
        .into_par_iter()
        .find_first(|&row| !expr.eval(row, size, witness).is_zero())
    {
        Some(row) => Err(violation(name, row)),
        None => Ok(()),
    }
}

fn check_local(name: &str, expr: &Expr, witness: &Witness) -> Result<(), CircuitError> {
    let size = witness.domain(name, &[expr])?;
    if expr.eval(0, size, witness).is_zero() {
        Ok(())
    } else {
        Err(violation(name, 0))
    }
}

fn check_compression(
    name: &str,
    query: &CompressionQuery,
    witness: &Witness,
) -> Result<(), CircuitError> {
    let mut exprs = vec![&query.old_state, &query.block, &query.new_state];
    if let Some(selector) = &query.selector {
        exprs.push(selector);
    }
    let size = witness.domain(name, &exprs)?;

    let failing = (0..size).into_par_iter().find_first(|&row| {
        if let Some(selector) = &query.selector {
            if selector.eval(row, size, witness).is_zero() {
                return false;
            }
        }
        let old_state = query.old_state.eval(row, size, witness);
        let block = query.block.eval(row, size, witness);
        compress(old_state, block) != query.new_state.eval(row, size, witness)
    });

    match failing {
        Some(row) => Err(violation(name, row)),
        None => Ok(()),
    }
}

/// Tuples of `columns` on the rows picked by `filter`, in row order.
fn filtered_rows(
    name: &str,
    columns: &[ColumnId],
    filter: &Expr,
    witness: &Witness,
) -> Result<Vec<Vec<Fr>>, CircuitError> {
    let mut exprs: Vec<Expr> = columns.iter().map(|id| id.expr()).collect();
    exprs.push(filter.clone());
    let size = witness.domain(name, &exprs.iter().collect::<Vec<_>>())?;

    let mut rows = Vec::new();
    for row in 0..size {
        let selected = filter.eval(row, size, witness);
        if selected.is_zero() {
            continue;
        }
        if !selected.is_one() {
            return Err(CircuitError::NotABit {
                column: format!("{name} filter"),
                row,
            });
        }
        rows.push(columns.iter().map(|id| witness.cell(*id, row)).collect());
    }
    Ok(rows)
}

fn check_projection(
    name: &str,
    query: &ProjectionQuery,
    witness: &Witness,
) -> Result<(), CircuitError> {
    if query.source.len() != query.target.len() {
        return Err(CircuitError::ProjectionMismatch {
            query: name.to_string(),
            reason: "source and target have different widths".to_string(),
        });
    }

    let source = filtered_rows(name, &query.source, &query.source_filter, witness)?;
    let target = filtered_rows(name, &query.target, &query.target_filter, witness)?;

    if source.len() != target.len() {
        return Err(CircuitError::ProjectionMismatch {
            query: name.to_string(),
            reason: format!(
                "{} source rows against {} target rows",
                source.len(),
                target.len()
            ),
        });
    }
    if let Some(index) = source.iter().zip(&target).position(|(s, t)| s != t) {
        return Err(CircuitError::ProjectionMismatch {
            query: name.to_string(),
            reason: format!("tuple {index} differs"),
        });
    }
    Ok(())
}

fn check_less_than(
    name: &str,
    query: &LessThanQuery,
    witness: &Witness,
) -> Result<(), CircuitError> {
    let mut exprs: Vec<Expr> = query
        .lhs
        .iter()
        .chain(&query.rhs)
        .map(|id| id.expr())
        .collect();
    exprs.push(query.selector.clone());
    let size = witness.domain(name, &exprs.iter().collect::<Vec<_>>())?;

    let row_limbs = |columns: &[ColumnId], row: usize| -> Vec<Fr> {
        columns.iter().map(|id| witness.cell(*id, row)).collect()
    };

    let failing = (0..size).into_par_iter().find_first(|&row| {
        if query.selector.eval(row, size, witness).is_zero() {
            return false;
        }
        let lhs = compose_integer(&row_limbs(&query.lhs, row), &query.layout);
        let rhs = compose_integer(&row_limbs(&query.rhs, row), &query.layout);
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs) != Ordering::Less,
            _ => true,
        }
    });

    match failing {
        Some(row) => Err(CircuitError::OrderingViolation {
            query: name.to_string(),
            row,
        }),
        None => Ok(()),
    }
}
