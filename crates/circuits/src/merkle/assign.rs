use ark_bn254::Fr;
use ark_ff::{Field, One, Zero};
use rayon::prelude::*;
use sparse_accumulator::compress;
use tracing::debug;

use super::define::{ActivityPlan, RootRecomputation};
use crate::codec::field_to_u64;
use crate::error::CircuitError;
use crate::runtime::AssignmentRuntime;

/// Gadget-owned values of one proof block, indexed by offset from the root row.
struct Block {
    curr: Vec<Fr>,
    pos_bit: Vec<Fr>,
    pos_acc: Vec<Fr>,
    left: Vec<Fr>,
    right: Vec<Fr>,
    interm: Vec<Fr>,
    node_hash: Vec<Fr>,
    root: Fr,
}

fn compute_block(depth: usize, leaf: Fr, position: u64, siblings: &[Fr]) -> Block {
    let bit = |level: usize| level < 64 && (position >> level) & 1 == 1;

    let mut block = Block {
        curr: vec![Fr::zero(); depth],
        pos_bit: vec![Fr::zero(); depth],
        pos_acc: vec![Fr::zero(); depth],
        left: vec![Fr::zero(); depth],
        right: vec![Fr::zero(); depth],
        interm: vec![Fr::zero(); depth],
        node_hash: vec![Fr::zero(); depth],
        root: Fr::zero(),
    };

    let mut current = leaf;
    for level in 0..depth {
        let offset = depth - 1 - level;
        let sibling = siblings[offset];
        let (left, right) = if bit(level) {
            (sibling, current)
        } else {
            (current, sibling)
        };
        let interm = compress(Fr::zero(), left);
        let node = compress(interm, right);

        block.curr[offset] = current;
        block.pos_bit[offset] = if bit(level) { Fr::one() } else { Fr::zero() };
        block.left[offset] = left;
        block.right[offset] = right;
        block.interm[offset] = interm;
        block.node_hash[offset] = node;
        current = node;
    }
    block.root = current;

    let mut acc = Fr::zero();
    for offset in 0..depth {
        acc = acc.double() + block.pos_bit[offset];
        block.pos_acc[offset] = acc;
    }
    block
}

/// Number of leading ones of a 0/1 column.
fn leading_ones(values: &[Fr], column: &str) -> Result<usize, CircuitError> {
    let mut count = 0;
    let mut seen_zero = false;
    for (row, value) in values.iter().enumerate() {
        if value.is_one() {
            if !seen_zero {
                count += 1;
            }
        } else if value.is_zero() {
            seen_zero = true;
        } else {
            return Err(CircuitError::NotABit {
                column: column.to_string(),
                row,
            });
        }
    }
    Ok(count)
}

impl RootRecomputation {
    /// Fill every gadget-owned column from the caller's leaves, positions and
    /// packed proofs, which must already be assigned.
    pub fn assign<W: AssignmentRuntime>(&self, witness: &mut W) -> Result<(), CircuitError> {
        let inputs = &self.inputs;
        let depth = inputs.depth;
        let size = self.size;

        let active = match (self.plan, inputs.is_active) {
            (ActivityPlan::Driven, Some(is_active)) => leading_ones(
                witness.values(is_active)?,
                &format!("{}_IS_ACTIVE", inputs.name),
            )?,
            _ => inputs.num_proofs,
        };

        let leaves = witness.values(inputs.leaves)?.to_vec();
        let positions = witness.values(inputs.positions)?[..active]
            .iter()
            .map(|position| field_to_u64(*position).ok_or(CircuitError::ValueOutOfRange { bits: 64 }))
            .collect::<Result<Vec<_>, _>>()?;
        let proofs = witness.values(inputs.proofs)?.to_vec();

        let blocks: Vec<Block> = (0..active)
            .into_par_iter()
            .map(|p| compute_block(depth, leaves[p], positions[p], &proofs[p * depth..(p + 1) * depth]))
            .collect();

        let pad_interm = compress(Fr::zero(), Fr::zero());
        let pad_node = compress(pad_interm, Fr::zero());

        let mut curr = vec![Fr::zero(); size];
        let mut pos_bit = vec![Fr::zero(); size];
        let mut pos_acc = vec![Fr::zero(); size];
        let mut left = vec![Fr::zero(); size];
        let mut right = vec![Fr::zero(); size];
        let mut interm = vec![pad_interm; size];
        let mut node_hash = vec![pad_node; size];
        let mut root = vec![Fr::zero(); size];

        for (p, block) in blocks.iter().enumerate() {
            let rows = p * depth..(p + 1) * depth;
            curr[rows.clone()].copy_from_slice(&block.curr);
            pos_bit[rows.clone()].copy_from_slice(&block.pos_bit);
            pos_acc[rows.clone()].copy_from_slice(&block.pos_acc);
            left[rows.clone()].copy_from_slice(&block.left);
            right[rows.clone()].copy_from_slice(&block.right);
            interm[rows.clone()].copy_from_slice(&block.interm);
            node_hash[rows.clone()].copy_from_slice(&block.node_hash);
            root[rows].fill(block.root);
        }

        let c = &self.cols;
        witness.assign(c.curr, curr)?;
        witness.assign(c.pos_bit, pos_bit)?;
        witness.assign(c.pos_acc, pos_acc)?;
        witness.assign(c.left, left)?;
        witness.assign(c.right, right)?;
        witness.assign(c.interm, interm)?;
        witness.assign(c.node_hash, node_hash)?;
        witness.assign(c.root, root)?;

        if let Some(expanded) = &c.expanded {
            let expand = |values: &[Fr]| {
                let mut column = vec![Fr::zero(); size];
                for (p, value) in values.iter().take(active).enumerate() {
                    column[p * depth..(p + 1) * depth].fill(*value);
                }
                column
            };
            witness.assign(expanded.is_active, expand(&vec![Fr::one(); active]))?;
            if let (Some(reuse), Some(use_next), Some(counter)) =
                (&inputs.reuse, expanded.use_next, expanded.counter)
            {
                let use_next_values = expand(witness.values(reuse.use_next)?);
                let counter_values = expand(witness.values(reuse.counter)?);
                witness.assign(use_next, use_next_values)?;
                witness.assign(counter, counter_values)?;
            }
        }

        debug!(name = %inputs.name, active, rows = size, "root recomputation assigned");
        Ok(())
    }
}
