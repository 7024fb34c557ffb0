//! Symbolic row expressions over columns.

use std::ops::{Add, Mul, Neg, Sub};

use ark_bn254::Fr;
use ark_ff::{One, Zero};

use super::memory::Witness;
use super::ColumnId;

/// Polynomial expression evaluated row by row.
///
/// `Column { shift }` reads the row `i + shift`, wrapping around the column
/// size. `Periodic` is 1 on rows where `i % period == offset` and 0 elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(Fr),
    Column { id: ColumnId, shift: isize },
    Periodic { period: usize, offset: usize },
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
}

impl Expr {
    pub fn constant(value: Fr) -> Self {
        Expr::Const(value)
    }

    pub fn from_u64(value: u64) -> Self {
        Expr::Const(Fr::from(value))
    }

    pub fn zero() -> Self {
        Expr::Const(Fr::zero())
    }

    pub fn one() -> Self {
        Expr::Const(Fr::one())
    }

    pub fn periodic(period: usize, offset: usize) -> Self {
        Expr::Periodic { period, offset }
    }

    /// Sum of an iterator of expressions (zero when empty).
    pub fn sum<I: IntoIterator<Item = Expr>>(terms: I) -> Self {
        terms
            .into_iter()
            .reduce(|acc, term| acc + term)
            .unwrap_or_else(Expr::zero)
    }

    pub fn square(&self) -> Self {
        self.clone() * self.clone()
    }

    /// `1 - self`.
    pub fn one_minus(&self) -> Self {
        Expr::one() - self.clone()
    }

    /// Every (column, shift) read by the expression.
    pub fn column_reads(&self) -> Vec<(ColumnId, isize)> {
        let mut out = Vec::new();
        self.collect_reads(&mut out);
        out
    }

    fn collect_reads(&self, out: &mut Vec<(ColumnId, isize)>) {
        match self {
            Expr::Const(_) | Expr::Periodic { .. } => {}
            Expr::Column { id, shift } => out.push((*id, *shift)),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) => {
                a.collect_reads(out);
                b.collect_reads(out);
            }
            Expr::Neg(a) => a.collect_reads(out),
        }
    }

    /// Smallest and largest shift used, `(0, 0)` without column reads.
    pub fn shift_range(&self) -> (isize, isize) {
        self.column_reads()
            .iter()
            .fold((0, 0), |(lo, hi), (_, shift)| (lo.min(*shift), hi.max(*shift)))
    }

    /// Value at `row` of a domain of `size` rows.
    pub fn eval(&self, row: usize, size: usize, witness: &Witness) -> Fr {
        match self {
            Expr::Const(c) => *c,
            Expr::Column { id, shift } => {
                let index = (row as isize + shift).rem_euclid(size as isize) as usize;
                witness.cell(*id, index)
            }
            Expr::Periodic { period, offset } => {
                if row % period == *offset {
                    Fr::one()
                } else {
                    Fr::zero()
                }
            }
            Expr::Add(a, b) => a.eval(row, size, witness) + b.eval(row, size, witness),
            Expr::Sub(a, b) => a.eval(row, size, witness) - b.eval(row, size, witness),
            Expr::Mul(a, b) => {
                let lhs = a.eval(row, size, witness);
                if lhs.is_zero() {
                    return lhs;
                }
                lhs * b.eval(row, size, witness)
            }
            Expr::Neg(a) => -a.eval(row, size, witness),
        }
    }
}

impl From<ColumnId> for Expr {
    fn from(id: ColumnId) -> Self {
        id.expr()
    }
}

impl From<Fr> for Expr {
    fn from(value: Fr) -> Self {
        Expr::Const(value)
    }
}

impl Add for Expr {
    type Output = Expr;
    fn add(self, rhs: Expr) -> Expr {
        Expr::Add(Box::new(self), Box::new(rhs))
    }
}

impl Sub for Expr {
    type Output = Expr;
    fn sub(self, rhs: Expr) -> Expr {
        Expr::Sub(Box::new(self), Box::new(rhs))
    }
}

impl Mul for Expr {
    type Output = Expr;
    fn mul(self, rhs: Expr) -> Expr {
        Expr::Mul(Box::new(self), Box::new(rhs))
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}
