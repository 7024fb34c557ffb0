//! Accumulator operations as data, so batches can be loaded from JSON.

use serde::{Deserialize, Serialize};
use sparse_accumulator::{Accumulator, AccumulatorError, Hashable, OperationKind, Trace};

/// One requested operation.
///
/// Serialized with an `op` tag, e.g. `{"op": "insert", "key": 1, "value": 2}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation<K, V> {
    Insert { key: K, value: V },
    Update { key: K, value: V },
    Delete { key: K },
    ReadZero { key: K },
    ReadNonZero { key: K },
}

impl<K, V> Operation<K, V>
where
    K: Hashable + Clone,
    V: Hashable + Clone,
{
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert { .. } => OperationKind::Insert,
            Operation::Update { .. } => OperationKind::Update,
            Operation::Delete { .. } => OperationKind::Delete,
            Operation::ReadZero { .. } => OperationKind::ReadZero,
            Operation::ReadNonZero { .. } => OperationKind::ReadNonZero,
        }
    }

    /// Run the operation; the accumulator is untouched on error.
    pub fn apply(&self, accumulator: &mut Accumulator<K, V>) -> Result<Trace<K, V>, AccumulatorError> {
        match self {
            Operation::Insert { key, value } => accumulator.insert(key, value.clone()),
            Operation::Update { key, value } => accumulator.update(key, value.clone()),
            Operation::Delete { key } => accumulator.delete(key),
            Operation::ReadZero { key } => accumulator.read_zero(key),
            Operation::ReadNonZero { key } => accumulator.read_non_zero(key),
        }
    }
}

/// Rows a batch occupies in the accumulator module.
pub fn required_rows<K, V>(operations: &[Operation<K, V>]) -> usize
where
    K: Hashable + Clone,
    V: Hashable + Clone,
{
    operations.iter().map(|op| op.kind().num_rows()).sum()
}

#[cfg(test)]
mod ops_tests {
    use super::*;

    #[test]
    fn test_operations_from_json() {
        let ops: Vec<Operation<u64, u64>> = serde_json::from_str(
            r#"[
                {"op": "insert", "key": 50, "value": 18},
                {"op": "read_non_zero", "key": 50},
                {"op": "update", "key": 50, "value": 32},
                {"op": "read_zero", "key": 51},
                {"op": "delete", "key": 50}
            ]"#,
        )
        .unwrap();

        assert_eq!(ops[0], Operation::Insert { key: 50, value: 18 });
        assert_eq!(ops[3].kind(), OperationKind::ReadZero);
        assert_eq!(required_rows(&ops), 18);
    }

    #[test]
    fn test_apply_matches_accumulator() {
        let mut acc = Accumulator::<u64, u64>::new(4).unwrap();
        let trace = Operation::Insert { key: 3, value: 4 }.apply(&mut acc).unwrap();
        assert_eq!(trace.kind(), OperationKind::Insert);
        assert_eq!(acc.get(&3), Some(&4));

        let err = Operation::<u64, u64>::Delete { key: 9 }.apply(&mut acc).unwrap_err();
        assert!(matches!(err, AccumulatorError::KeyNotFound { .. }));
    }
}
