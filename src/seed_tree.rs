//! GGM seed trees for the cut-and-choose secret sharing.
//!
//! Each round owns a complete binary tree of 16-byte seeds with one leaf per
//! virtual party, stored flat with the root at index 0 and `left(i) = 2i + 1`.
//! The prover reveals all leaves but one by releasing the `depth` sibling
//! seeds along the unopened leaf's path ([`SeedTree::release_seeds`]); the
//! verifier rebuilds every other leaf from them ([`SeedTree::fill_down`]).

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::hash;
use crate::params::{Params, SEED_BYTES};

#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct SeedTree {
    n_rounds: usize,
    parties: usize,
    party_depth: usize,
    /// Bytes per round: (2·parties − 1) seeds.
    round_size: usize,
    /// Flattened `[n_rounds][(2·parties − 1) · SEED_BYTES]`.
    data: Vec<u8>,
}

fn left_child(i: usize) -> usize {
    2 * i + 1
}

fn parent(i: usize) -> usize {
    (i - 1) / 2
}

fn sibling(i: usize) -> usize {
    if i % 2 == 0 {
        i - 1
    } else {
        i + 1
    }
}

impl SeedTree {
    pub(crate) fn new(params: &Params) -> Self {
        let round_size = (params.parties * 2 - 1) * SEED_BYTES;
        Self {
            n_rounds: params.n_rounds,
            parties: params.parties,
            party_depth: params.party_depth,
            round_size,
            data: vec![0u8; params.n_rounds * round_size],
        }
    }

    pub(crate) fn round(&self, round: usize) -> &[u8] {
        assert!(round < self.n_rounds, "seed tree round out of bounds");
        &self.data[round * self.round_size..(round + 1) * self.round_size]
    }

    fn round_mut(&mut self, round: usize) -> &mut [u8] {
        assert!(round < self.n_rounds, "seed tree round out of bounds");
        &mut self.data[round * self.round_size..(round + 1) * self.round_size]
    }

    /// Byte offset of leaf `index` within a round slice.
    pub(crate) fn leaf_offset(&self, index: usize) -> usize {
        (self.parties - 1 + index) * SEED_BYTES
    }

    /// Samples a fresh random root for `round` and expands it down to the
    /// leaves, each internal node yielding both children in one XOF call.
    pub(crate) fn generate(&mut self, round: usize) {
        let parties = self.parties;
        let tree = self.round_mut(round);
        OsRng.fill_bytes(&mut tree[..SEED_BYTES]);

        for node in 0..parties - 1 {
            let mut seed = [0u8; SEED_BYTES];
            seed.copy_from_slice(&tree[node * SEED_BYTES..(node + 1) * SEED_BYTES]);
            let dst = left_child(node) * SEED_BYTES;
            hash::expand(&seed, &mut tree[dst..dst + 2 * SEED_BYTES]);
        }
    }

    /// Writes the `party_depth` sibling seeds along the path from leaf
    /// `unopened_index` to the root into `out`, deepest level last. Nothing
    /// on the direct path itself is revealed.
    pub(crate) fn release_seeds(&self, round: usize, unopened_index: usize, out: &mut [u8]) {
        let tree = self.round(round);
        let mut node = self.parties - 1 + unopened_index;
        let mut level = self.party_depth;
        while level > 0 {
            level -= 1;
            let src = sibling(node) * SEED_BYTES;
            out[level * SEED_BYTES..(level + 1) * SEED_BYTES]
                .copy_from_slice(&tree[src..src + SEED_BYTES]);
            node = parent(node);
        }
    }

    /// Rebuilds the round's tree from released sibling seeds: zeroes the
    /// round, inserts each sibling at its level, then re-expands downward.
    /// Nodes on the unopened path stay zero and are never expanded, so every
    /// leaf except `unopened_index` matches the generating tree.
    pub(crate) fn fill_down(&mut self, round: usize, unopened_index: usize, siblings: &[u8]) {
        let parties = self.parties;
        let depth = self.party_depth;
        let tree = self.round_mut(round);
        tree.fill(0);

        let mut node = parties - 1 + unopened_index;
        let mut level = depth;
        while level > 0 {
            level -= 1;
            let dst = sibling(node) * SEED_BYTES;
            tree[dst..dst + SEED_BYTES]
                .copy_from_slice(&siblings[level * SEED_BYTES..(level + 1) * SEED_BYTES]);
            node = parent(node);
        }

        for node in 0..parties - 1 {
            // The root slot is never filled; any node still equal to it sits
            // on the unopened path and must not be expanded.
            let node_seed = &tree[node * SEED_BYTES..(node + 1) * SEED_BYTES];
            if node_seed == &tree[..SEED_BYTES] {
                continue;
            }
            let mut seed = [0u8; SEED_BYTES];
            seed.copy_from_slice(node_seed);
            let dst = left_child(node) * SEED_BYTES;
            hash::expand(&seed, &mut tree[dst..dst + 2 * SEED_BYTES]);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.data.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Algorithm;

    #[test]
    fn fill_down_rebuilds_all_but_the_unopened_leaf() {
        let params = Algorithm::PowerFast.params();
        let mut source_tree = SeedTree::new(params);
        source_tree.generate(0);

        for unopened in 0..params.parties {
            let mut released = vec![0u8; params.party_depth * SEED_BYTES];
            source_tree.release_seeds(0, unopened, &mut released);

            let mut rebuilt = SeedTree::new(params);
            rebuilt.fill_down(0, unopened, &released);

            for leaf in 0..params.parties {
                let offset = source_tree.leaf_offset(leaf);
                let want = &source_tree.round(0)[offset..offset + SEED_BYTES];
                let got = &rebuilt.round(0)[offset..offset + SEED_BYTES];
                if leaf == unopened {
                    assert_eq!(got, [0u8; SEED_BYTES], "unopened leaf must stay hidden");
                    assert_ne!(want, got);
                } else {
                    assert_eq!(want, got, "leaf {leaf} with unopened {unopened}");
                }
            }
        }
    }

    #[test]
    fn released_seeds_exclude_the_unopened_path() {
        let params = Algorithm::PowerFast.params();
        let mut tree = SeedTree::new(params);
        tree.generate(0);

        let unopened = 5;
        let mut released = vec![0u8; params.party_depth * SEED_BYTES];
        tree.release_seeds(0, unopened, &mut released);

        let offset = tree.leaf_offset(unopened);
        let hidden = &tree.round(0)[offset..offset + SEED_BYTES];
        for chunk in released.chunks_exact(SEED_BYTES) {
            assert_ne!(chunk, hidden);
        }
    }

    #[test]
    fn rounds_are_independent() {
        let params = Algorithm::PowerFast.params();
        let mut tree = SeedTree::new(params);
        tree.generate(0);
        tree.generate(1);
        assert_ne!(
            &tree.round(0)[..SEED_BYTES],
            &tree.round(1)[..SEED_BYTES],
            "fresh random roots per round"
        );
    }
}
