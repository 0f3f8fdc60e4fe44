//! Flat three-dimensional field-element scratch used by the protocol for the
//! per-round share and opening matrices.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::params::PRIME_BYTES;

/// A `[planes][rows][cols]` matrix of field elements stored contiguously.
/// Indexed one plane (round) at a time; callers address rows and columns
/// inside the returned slice. Holds secret shares during a protocol run, so
/// the backing store is wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct FieldMatrix {
    planes: usize,
    plane_len: usize,
    data: Vec<u128>,
}

impl FieldMatrix {
    pub(crate) fn new(planes: usize, rows: usize, cols: usize) -> Self {
        let plane_len = rows * cols;
        Self {
            planes,
            plane_len,
            data: vec![0u128; planes * plane_len],
        }
    }

    pub(crate) fn plane(&self, n: usize) -> &[u128] {
        assert!(n < self.planes, "matrix plane out of bounds");
        &self.data[n * self.plane_len..(n + 1) * self.plane_len]
    }

    pub(crate) fn plane_mut(&mut self, n: usize) -> &mut [u128] {
        assert!(n < self.planes, "matrix plane out of bounds");
        &mut self.data[n * self.plane_len..(n + 1) * self.plane_len]
    }

    pub(crate) fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Serialises the whole matrix as little-endian field elements, in plane
    /// order. Used to hash all openings in one pass.
    pub(crate) fn as_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.data.len() * PRIME_BYTES];
        for (chunk, value) in out.chunks_exact_mut(PRIME_BYTES).zip(&self.data) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}
