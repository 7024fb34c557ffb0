//! Key, value, leaf and node hashing.
//!
//! Everything reduces to chains of the 2-to-1 `compress` primitive.

use ark_bn254::Fr;
use ark_ff::{PrimeField, Zero};

use crate::anemoi::compress;

/// Number of bytes absorbed per field element when hashing byte strings.
pub const BYTES_PER_CHUNK: usize = 31;

/// Types that can be used as accumulator keys or values.
pub trait Hashable {
    fn digest(&self) -> Fr;
}

/// Merkle-Damgard hash of a byte string over 31-byte big-endian chunks.
///
/// The byte length is absorbed first: chunks are read as integers, so
/// `[0x01]` and `[0x00, 0x01]` would otherwise collide.
pub fn hash_bytes(bytes: &[u8]) -> Fr {
    bytes
        .chunks(BYTES_PER_CHUNK)
        .fold(length_prefix(bytes.len()), |state, chunk| {
            compress(state, Fr::from_be_bytes_mod_order(chunk))
        })
}

fn length_prefix(len: usize) -> Fr {
    compress(Fr::zero(), Fr::from(len as u64))
}

/// Hash a sequence of field elements starting from the zero state.
pub fn hash_elements(elements: &[Fr]) -> Fr {
    elements
        .iter()
        .fold(Fr::zero(), |state, element| compress(state, *element))
}

/// Internal node hash: `C(C(0, left), right)`.
pub fn node_hash(left: Fr, right: Fr) -> Fr {
    compress(compress(Fr::zero(), left), right)
}

/// Commitment to a full accumulator state: `C(C(0, next_free_node), sub_root)`.
pub fn top_root(next_free_node: u64, sub_root: Fr) -> Fr {
    hash_elements(&[Fr::from(next_free_node), sub_root])
}

impl Hashable for u64 {
    fn digest(&self) -> Fr {
        hash_bytes(&self.to_be_bytes())
    }
}

impl<const N: usize> Hashable for [u8; N] {
    fn digest(&self) -> Fr {
        hash_bytes(self)
    }
}

impl Hashable for Vec<u8> {
    fn digest(&self) -> Fr {
        hash_bytes(self)
    }
}

impl Hashable for &[u8] {
    fn digest(&self) -> Fr {
        hash_bytes(self)
    }
}

impl Hashable for String {
    fn digest(&self) -> Fr {
        hash_bytes(self.as_bytes())
    }
}
