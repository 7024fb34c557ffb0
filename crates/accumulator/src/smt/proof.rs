//! Merkle proof structure for fixed-depth sparse trees.

use ark_bn254::Fr;

use crate::error::AccumulatorError;
use crate::hashing::node_hash;

/// Authentication path of a single leaf.
///
/// `siblings[0]` is the sibling at the leaf level, `siblings[depth - 1]` the
/// child of the root. Bit `level` of `path` is set when the node at that
/// level is a right child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    pub path: u64,
    pub siblings: Vec<Fr>,
}

impl Proof {
    pub fn new(path: u64, siblings: Vec<Fr>) -> Self {
        Self { path, siblings }
    }

    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Direction at `level`: true when the current node is a right child.
    pub fn is_right(&self, level: usize) -> bool {
        (self.path >> level) & 1 == 1
    }

    /// Fold the siblings over `leaf`, bottom-up.
    pub fn compute_root(&self, leaf: Fr) -> Fr {
        self.siblings
            .iter()
            .enumerate()
            .fold(leaf, |current, (level, sibling)| {
                if self.is_right(level) {
                    node_hash(*sibling, current)
                } else {
                    node_hash(current, *sibling)
                }
            })
    }

    pub fn verify(&self, leaf: Fr, root: Fr) -> bool {
        self.compute_root(leaf) == root
    }

    /// Fails unless the proof has `depth` siblings and a path inside the tree.
    pub fn check_shape(&self, depth: usize) -> Result<(), AccumulatorError> {
        if self.depth() != depth {
            return Err(AccumulatorError::DepthMismatch {
                expected: depth,
                actual: self.depth(),
            });
        }
        if depth < 64 && self.path >> depth != 0 {
            return Err(AccumulatorError::PositionOutOfRange {
                position: self.path,
                depth,
            });
        }
        Ok(())
    }
}
