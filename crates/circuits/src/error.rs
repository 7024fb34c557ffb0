//! Errors raised while defining, assigning or checking the arithmetization.

use ark_relations::r1cs::SynthesisError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CircuitError {
    #[error("column {column}: expected {expected} values, got {actual}")]
    ColumnSizeMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("unknown column #{0}")]
    UnknownColumn(usize),
    #[error("column {0} is not assigned")]
    UnassignedColumn(String),
    #[error("column {0} is already assigned")]
    AlreadyAssigned(String),
    #[error("proof {index} has depth {actual}, expected {expected}")]
    ProofDepthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("{required} rows needed but only {max} are available")]
    CapacityOverflow { required: usize, max: usize },
    #[error("column {column} row {row}: expected a bit")]
    NotABit { column: String, row: usize },
    #[error("value does not fit in {bits} bits")]
    ValueOutOfRange { bits: usize },
    #[error("query {query} mixes columns of different sizes")]
    DomainMismatch { query: String },
    #[error("constraint {query} fails at row {row}")]
    ConstraintViolation { query: String, row: usize },
    #[error("projection {query}: {reason}")]
    ProjectionMismatch { query: String, reason: String },
    #[error("less-than {query} fails at row {row}")]
    OrderingViolation { query: String, row: usize },
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),
}
