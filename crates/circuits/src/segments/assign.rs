use ark_bn254::Fr;
use tracing::info;

use super::builder::ColumnAssignments;
use super::define::AccumulatorModule;
use crate::codec::{pack_into, right_zero_padded, to_limbs, LimbLayout};
use crate::error::CircuitError;
use crate::runtime::{AssignmentRuntime, ColumnId};

impl AccumulatorModule {
    /// Assign every accumulator column, then the Merkle gadget, from the
    /// output of `build_segments`.
    pub fn assign<W: AssignmentRuntime>(
        &self,
        witness: &mut W,
        assignments: &ColumnAssignments,
    ) -> Result<(), CircuitError> {
        let settings = &self.settings;
        let rows = settings.num_rows();
        if assignments.num_rows() > settings.max_num_proofs {
            return Err(CircuitError::CapacityOverflow {
                required: assignments.num_rows(),
                max: settings.max_num_proofs,
            });
        }

        let c = &self.cols;
        let a = assignments;
        let plain: [(ColumnId, &Vec<Fr>); 36] = [
            (c.leaves, &a.leaves),
            (c.roots, &a.roots),
            (c.positions, &a.positions),
            (c.use_next_proof, &a.use_next_proof),
            (c.is_active, &a.is_active),
            (c.counter, &a.counter),
            (c.is_first, &a.is_first),
            (c.is_insert, &a.is_insert),
            (c.is_delete, &a.is_delete),
            (c.is_update, &a.is_update),
            (c.is_read_zero, &a.is_read_zero),
            (c.is_read_non_zero, &a.is_read_non_zero),
            (c.hkey, &a.hkey),
            (c.hkey_minus, &a.hkey_minus),
            (c.hkey_plus, &a.hkey_plus),
            (c.leaf_minus_index, &a.leaf_minus_index),
            (c.leaf_minus_next, &a.leaf_minus_next),
            (c.leaf_plus_index, &a.leaf_plus_index),
            (c.leaf_plus_prev, &a.leaf_plus_prev),
            (c.leaf_deleted_index, &a.leaf_deleted_index),
            (c.leaf_deleted_prev, &a.leaf_deleted_prev),
            (c.leaf_deleted_next, &a.leaf_deleted_next),
            (c.opening_prev, &a.opening_prev),
            (c.opening_next, &a.opening_next),
            (c.opening_hkey, &a.opening_hkey),
            (c.opening_hval, &a.opening_hval),
            (c.interm_prev, &a.interm_prev),
            (c.interm_next, &a.interm_next),
            (c.interm_hkey, &a.interm_hkey),
            (c.leaf_hashes, &a.leaf_hashes),
            (c.is_empty_leaf, &a.is_empty_leaf),
            (c.next_free_node, &a.next_free_node),
            (c.insertion_path, &a.insertion_path),
            (c.is_insert_row3, &a.is_insert_row3),
            (c.interm_top_root, &a.interm_top_root),
            (c.top_root, &a.top_root),
        ];
        for (id, values) in plain {
            witness.assign(id, right_zero_padded(values.clone(), rows))?;
        }

        for (limb_columns, values) in [
            (&c.hkey_limbs, &a.hkey),
            (&c.hkey_minus_limbs, &a.hkey_minus),
            (&c.hkey_plus_limbs, &a.hkey_plus),
        ] {
            let limbs = values
                .iter()
                .map(|value| to_limbs(*value, &LimbLayout::HKEY))
                .collect::<Result<Vec<_>, _>>()?;
            for (index, id) in limb_columns.iter().enumerate() {
                let column = limbs.iter().map(|row| row[index]).collect();
                witness.assign(*id, right_zero_padded(column, rows))?;
            }
        }

        let packed = pack_into(
            &a.proofs,
            settings.merkle_tree_depth,
            settings.num_proof_rows(),
        )?;
        witness.assign(c.proofs, packed.column)?;

        self.merkle.assign(witness)?;

        info!(
            name = %settings.name,
            used = a.num_rows(),
            rows,
            "accumulator module assigned"
        );
        Ok(())
    }
}
