//! Errors raised by the accumulator and its trace verifier.

use ark_bn254::Fr;
use thiserror::Error;

use crate::accumulator::OperationKind;

/// Precondition and consistency failures of accumulator operations.
///
/// Every variant is fatal for the operation that raised it: the accumulator is
/// left untouched when a precondition fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccumulatorError {
    #[error("{kind}: key {hkey} is not present")]
    KeyNotFound { kind: OperationKind, hkey: Fr },
    #[error("insert: key {hkey} is already present")]
    KeyAlreadyPresent { hkey: Fr },
    #[error("read-zero: key {hkey} is present")]
    KeyPresent { hkey: Fr },
    #[error("{kind}: key hashes to a sentinel value")]
    ReservedKey { kind: OperationKind },
    #[error("insert: tree is full ({capacity} slots)")]
    TreeFull { capacity: u64 },
    #[error("unsupported tree depth {0}")]
    InvalidDepth(usize),
    #[error("proof depth {actual} does not match tree depth {expected}")]
    DepthMismatch { expected: usize, actual: usize },
    #[error("position {position} is outside a tree of depth {depth}")]
    PositionOutOfRange { position: u64, depth: usize },
    #[error("{kind}: linked list is corrupted at slot {slot}")]
    CorruptedList { kind: OperationKind, slot: u64 },
    #[error("{kind} trace rejected: {reason}")]
    InvalidTrace {
        kind: OperationKind,
        reason: &'static str,
    },
}
