//! Leaf openings: the preimage of every accumulator leaf.

use ark_bn254::Fr;
use ark_ff::{One, Zero};

use crate::anemoi::compress;

/// Slot of the head sentinel (smallest HKey).
pub const HEAD_SLOT: u64 = 0;
/// Slot of the tail sentinel (largest HKey).
pub const TAIL_SLOT: u64 = 1;

/// Node of the sorted doubly-linked list stored in the tree leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LeafOpening {
    pub prev: u64,
    pub next: u64,
    pub hkey: Fr,
    pub hval: Fr,
}

/// Chaining values of the leaf hash, in absorption order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeafHashChain {
    pub interm_prev: Fr,
    pub interm_next: Fr,
    pub interm_hkey: Fr,
    pub leaf_hash: Fr,
}

impl LeafOpening {
    pub fn new(prev: u64, next: u64, hkey: Fr, hval: Fr) -> Self {
        Self { prev, next, hkey, hval }
    }

    /// Head sentinel, HKey = 0.
    pub fn head() -> Self {
        Self::new(HEAD_SLOT, TAIL_SLOT, Fr::zero(), Fr::zero())
    }

    /// Tail sentinel, HKey = p - 1.
    pub fn tail() -> Self {
        Self::new(HEAD_SLOT, TAIL_SLOT, -Fr::one(), Fr::zero())
    }

    /// `C(C(C(C(0, prev), next), hkey), hval)` with every step kept.
    pub fn hash_chain(&self) -> LeafHashChain {
        let interm_prev = compress(Fr::zero(), Fr::from(self.prev));
        let interm_next = compress(interm_prev, Fr::from(self.next));
        let interm_hkey = compress(interm_next, self.hkey);
        LeafHashChain {
            interm_prev,
            interm_next,
            interm_hkey,
            leaf_hash: compress(interm_hkey, self.hval),
        }
    }

    pub fn hash(&self) -> Fr {
        self.hash_chain().leaf_hash
    }

    pub fn with_prev(self, prev: u64) -> Self {
        Self { prev, ..self }
    }

    pub fn with_next(self, next: u64) -> Self {
        Self { next, ..self }
    }

    pub fn with_hval(self, hval: Fr) -> Self {
        Self { hval, ..self }
    }
}

#[cfg(test)]
mod opening_tests {
    use super::*;
    use crate::hashing::hash_elements;

    #[test]
    fn test_hash_matches_element_chain() {
        let opening = LeafOpening::new(3, 9, Fr::from(5u64), Fr::from(6u64));
        let expected = hash_elements(&[
            Fr::from(3u64),
            Fr::from(9u64),
            Fr::from(5u64),
            Fr::from(6u64),
        ]);
        assert_eq!(opening.hash(), expected);
    }

    #[test]
    fn test_sentinels_bracket_the_key_space() {
        let head = LeafOpening::head();
        let tail = LeafOpening::tail();
        assert!(head.hkey < Fr::from(1u64));
        assert!(tail.hkey > Fr::from(u64::MAX));
        assert_eq!(head.next, TAIL_SLOT);
        assert_eq!(tail.prev, HEAD_SLOT);
    }

    #[test]
    fn test_empty_opening_hash_is_not_zero() {
        assert!(!LeafOpening::default().hash().is_zero());
    }
}
