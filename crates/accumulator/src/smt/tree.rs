//! Sparse Merkle tree storage.
//!
//! Only written leaves and their ancestors are stored. Untouched subtrees fall
//! back to the precomputed hash of an all-empty subtree of the same height.

use std::collections::HashMap;

use ark_bn254::Fr;
use ark_ff::{MontFp, Zero};

use super::proof::Proof;
use crate::error::AccumulatorError;
use crate::hashing::node_hash;

/// Largest supported depth; positions are `u64`.
pub const MAX_DEPTH: usize = 63;

/// Value of a slot that was never written or has been cleared.
pub const EMPTY_LEAF: Fr = MontFp!("0");

/// Fixed-depth binary Merkle tree over field-element leaves.
#[derive(Clone, Debug)]
pub struct SparseMerkleTree {
    depth: usize,

    /// Sparse node storage: (level, index) -> hash.
    /// Level 0 = leaves, level `depth` = root.
    nodes: HashMap<(usize, u64), Fr>,

    /// defaults[i] = root of an empty subtree of height i.
    defaults: Vec<Fr>,
}

impl SparseMerkleTree {
    pub fn new(depth: usize) -> Result<Self, AccumulatorError> {
        if depth == 0 || depth > MAX_DEPTH {
            return Err(AccumulatorError::InvalidDepth(depth));
        }
        Ok(Self {
            depth,
            nodes: HashMap::new(),
            defaults: Self::compute_defaults(depth),
        })
    }

    fn compute_defaults(depth: usize) -> Vec<Fr> {
        let mut defaults = Vec::with_capacity(depth + 1);
        let mut current = EMPTY_LEAF;
        defaults.push(current);
        for _ in 0..depth {
            current = node_hash(current, current);
            defaults.push(current);
        }
        defaults
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaf slots.
    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }

    pub fn root(&self) -> Fr {
        self.node(self.depth, 0)
    }

    /// Root of an empty subtree of height `level`.
    pub fn default_at_level(&self, level: usize) -> Fr {
        self.defaults[level]
    }

    fn node(&self, level: usize, index: u64) -> Fr {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or(self.defaults[level])
    }

    fn check_position(&self, position: u64) -> Result<(), AccumulatorError> {
        if position >= self.capacity() {
            return Err(AccumulatorError::PositionOutOfRange {
                position,
                depth: self.depth,
            });
        }
        Ok(())
    }

    pub fn leaf(&self, position: u64) -> Result<Fr, AccumulatorError> {
        self.check_position(position)?;
        Ok(self.node(0, position))
    }

    /// Overwrite a leaf and rehash its path. Returns the new root.
    pub fn set_leaf(&mut self, position: u64, leaf: Fr) -> Result<Fr, AccumulatorError> {
        self.check_position(position)?;

        if leaf.is_zero() {
            self.nodes.remove(&(0, position));
        } else {
            self.nodes.insert((0, position), leaf);
        }

        let mut index = position;
        let mut current = leaf;
        for level in 0..self.depth {
            let sibling = self.node(level, index ^ 1);
            current = if index & 1 == 0 {
                node_hash(current, sibling)
            } else {
                node_hash(sibling, current)
            };
            index >>= 1;

            if current == self.defaults[level + 1] {
                self.nodes.remove(&(level + 1, index));
            } else {
                self.nodes.insert((level + 1, index), current);
            }
        }

        Ok(current)
    }

    /// Authentication path of the leaf at `position` against the current root.
    pub fn proof(&self, position: u64) -> Result<Proof, AccumulatorError> {
        self.check_position(position)?;

        let siblings = (0..self.depth)
            .map(|level| self.node(level, (position >> level) ^ 1))
            .collect();

        Ok(Proof::new(position, siblings))
    }
}
