//! The LegRoast signature scheme: an MPC-in-the-head proof of knowledge of a
//! Legendre/power-residue PRF key, made non-interactive with Fiat-Shamir.
//!
//! A signature is the transcript of a simulated three-challenge protocol:
//! the prover commits to secret shares held by `parties` virtual parties per
//! round (message1), answers a batch of PRF queries (message2), proves a
//! multiplicative relation with a sacrificed triple (message3), and finally
//! opens every party but one per round through the GGM seed tree (message4).
//! The verifier re-derives all three challenges from the transcript, rebuilds
//! the opened parties' shares and checks both commitment digests.
//!
//! Sign and verify allocate their own prover-state scratch, so a single
//! [`LegRoast`] value can serve concurrent calls on separate threads.

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::field;
use crate::hash;
use crate::matrix::FieldMatrix;
use crate::params::{
    Algorithm, Params, HASH_BYTES, MESSAGE1_DELTA_K, MESSAGE3_ALPHA, PK_BYTES, PRIME_BYTES,
    SEED_BYTES, SHARES_R, SHARES_TRIPLE, SHARE_K, SK_BYTES,
};
use crate::seed_tree::SeedTree;

fn read_elem(bytes: &[u8], offset: usize) -> u128 {
    u128::from_le_bytes(
        bytes[offset..offset + PRIME_BYTES]
            .try_into()
            .expect("field element slice"),
    )
}

fn write_elem(bytes: &mut [u8], offset: usize, value: u128) {
    bytes[offset..offset + PRIME_BYTES].copy_from_slice(&value.to_le_bytes());
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(bytes[offset..offset + 4].try_into().expect("u32 slice"))
}

/// Per-call scratch for one sign or verify: the per-round seed trees, every
/// party's expanded shares, the per-round share sums, and the challenge1
/// query points.
struct ProverState {
    seed_trees: SeedTree,
    /// `[n_rounds][parties][shares_per_party]`
    shares: FieldMatrix,
    /// `[n_rounds][shares_per_party]`
    sums: FieldMatrix,
    /// `[total_res_sym]` field elements derived from challenge1 indices.
    indices: Vec<u128>,
}

impl ProverState {
    fn new(params: &Params) -> Self {
        Self {
            seed_trees: SeedTree::new(params),
            shares: FieldMatrix::new(params.n_rounds, params.parties, params.shares_per_party),
            sums: FieldMatrix::new(params.n_rounds, 1, params.shares_per_party),
            indices: vec![0u128; params.total_res_sym],
        }
    }

    fn clear(&mut self) {
        self.seed_trees.clear();
        self.shares.clear();
        self.sums.clear();
        self.indices.fill(0);
    }
}

/// The operations the surrounding integration layer depends on. Callers that
/// need substitutability (keyring wiring, tests) take this trait instead of
/// the concrete type.
pub trait Scheme {
    /// Derives a key pair from a 16-byte seed, or from the OS RNG when no
    /// seed is given.
    fn keygen(&mut self, seed: Option<&[u8]>) -> Result<()>;
    /// Signs `message`, returning the fixed-size signature for this variant.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
    /// Verifies `signature` over `message` against the stored public key.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()>;
    /// Installs a public key for verification.
    fn set_public_key(&mut self, pk: &[u8]) -> Result<()>;
    fn public_key(&self) -> &[u8];
    fn params(&self) -> &'static Params;
}

/// A LegRoast key holder for one algorithm variant.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct LegRoast {
    #[zeroize(skip)]
    params: &'static Params,
    pk: [u8; PK_BYTES],
    sk: [u8; SK_BYTES],
}

impl LegRoast {
    pub fn new(alg: Algorithm) -> Self {
        Self {
            params: alg.params(),
            pk: [0u8; PK_BYTES],
            sk: [0u8; SK_BYTES],
        }
    }

    fn is_legendre(&self) -> bool {
        self.params.alg.is_legendre()
    }

    /// The public-key symbol at query index `n`: a Legendre bit or a
    /// power-residue byte depending on the variant family.
    fn pk_symbol(&self, n: u32) -> u8 {
        if self.is_legendre() {
            (self.pk[(n / 8) as usize] >> (n % 8)) & 1
        } else {
            self.pk[n as usize]
        }
    }

    /// Derives the key pair. The public key is the PRF evaluated at every
    /// query index: 2^15 Legendre bits packed into bytes, or 2^12
    /// power-residue bytes.
    pub fn keygen(&mut self, seed: Option<&[u8]>) -> Result<()> {
        match seed {
            None => OsRng.try_fill_bytes(&mut self.sk)?,
            Some(seed) => {
                if seed.len() != SK_BYTES {
                    return Err(Error::InvalidSeedLength {
                        expected: SK_BYTES,
                        found: seed.len(),
                    });
                }
                self.sk.copy_from_slice(seed);
            }
        }

        let key = field::sample_mod_p(&self.sk);
        self.pk = [0u8; PK_BYTES];

        if self.is_legendre() {
            for i in 0..(PK_BYTES * 8) as u32 {
                let mut point = field::derive_index(i);
                field::add_assign(&mut point, key);
                self.pk[(i / 8) as usize] |= field::legendre_symbol(point) << (i % 8);
            }
        } else {
            for i in 0..PK_BYTES as u32 {
                let mut point = field::derive_index(i);
                field::add_assign(&mut point, key);
                self.pk[i as usize] = field::power_residue_symbol(point);
            }
        }

        Ok(())
    }

    pub fn set_public_key(&mut self, pk: &[u8]) -> Result<()> {
        if pk.len() != PK_BYTES {
            return Err(Error::InvalidKeyLength {
                expected: PK_BYTES,
                found: pk.len(),
            });
        }
        self.pk.copy_from_slice(pk);
        Ok(())
    }

    pub fn public_key(&self) -> &[u8] {
        &self.pk
    }

    pub fn params(&self) -> &'static Params {
        self.params
    }

    /// Signs `message`, producing the four concatenated protocol messages.
    ///
    /// Challenges are derived by a running hash chain: hash #1 binds the
    /// message, and each subsequent challenge hashes the previous digest pair
    /// so every response is bound to the whole transcript so far.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        let params = self.params;
        let mut state = ProverState::new(params);
        let mut signature = vec![0u8; params.sig_bytes];
        let mut chain = [0u8; 4 * HASH_BYTES];
        let mut digest = [0u8; HASH_BYTES];

        hash::hash(message, &mut chain[..HASH_BYTES]);

        let (m1_end, m2_end, m3_end) = self.message_bounds();
        self.commit(&mut state, &mut signature[..m1_end]);

        hash::hash(&signature[..m1_end], &mut chain[HASH_BYTES..2 * HASH_BYTES]);
        hash::hash(&chain[..2 * HASH_BYTES], &mut digest);
        chain[HASH_BYTES..2 * HASH_BYTES].copy_from_slice(&digest);
        let challenge1 = self.generate_challenge1(&chain[HASH_BYTES..2 * HASH_BYTES]);

        {
            let (_, tail) = signature.split_at_mut(m1_end);
            self.respond1(&mut state, &challenge1, &mut tail[..params.message2_bytes]);
        }

        hash::hash(&signature[m1_end..m2_end], &mut chain[2 * HASH_BYTES..3 * HASH_BYTES]);
        hash::hash(&chain[HASH_BYTES..3 * HASH_BYTES], &mut digest);
        chain[2 * HASH_BYTES..3 * HASH_BYTES].copy_from_slice(&digest);
        let challenge2 = self.generate_challenge2(&chain[2 * HASH_BYTES..3 * HASH_BYTES]);

        {
            let (head, tail) = signature.split_at_mut(m2_end);
            self.respond2(
                &state,
                &challenge2,
                &head[m1_end..],
                &mut tail[..params.message3_bytes],
            );
        }

        hash::hash(&signature[m2_end..m3_end], &mut chain[3 * HASH_BYTES..]);
        hash::hash(&chain[2 * HASH_BYTES..], &mut digest);
        chain[3 * HASH_BYTES..].copy_from_slice(&digest);
        let challenge3 = self.generate_challenge3(&chain[3 * HASH_BYTES..]);

        self.respond3(&state, &challenge3, &mut signature[m3_end..]);

        Ok(signature)
    }

    /// Verifies `signature` over `message`.
    ///
    /// Structural checks run first; then the three challenges are re-derived
    /// exactly as in [`LegRoast::sign`] and both transcript commitments are
    /// recomputed from the opened parties.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let params = self.params;

        if message.is_empty() {
            return Err(Error::EmptyMessage);
        }
        if signature.len() != params.sig_bytes {
            return Err(Error::InvalidSignatureLength {
                expected: params.sig_bytes,
                found: signature.len(),
            });
        }
        if self.pk.iter().all(|&b| b == 0) {
            return Err(Error::PublicKeyNotSet);
        }

        let mut state = ProverState::new(params);
        let mut chain = [0u8; 4 * HASH_BYTES];
        let mut digest = [0u8; HASH_BYTES];

        hash::hash(message, &mut chain[..HASH_BYTES]);

        let (m1_end, m2_end, m3_end) = self.message_bounds();
        let message1 = &signature[..m1_end];
        let message2 = &signature[m1_end..m2_end];
        let message3 = &signature[m2_end..m3_end];
        let message4 = &signature[m3_end..];

        hash::hash(message1, &mut chain[HASH_BYTES..2 * HASH_BYTES]);
        hash::hash(&chain[..2 * HASH_BYTES], &mut digest);
        chain[HASH_BYTES..2 * HASH_BYTES].copy_from_slice(&digest);
        let challenge1 = self.generate_challenge1(&chain[HASH_BYTES..2 * HASH_BYTES]);

        hash::hash(message2, &mut chain[2 * HASH_BYTES..3 * HASH_BYTES]);
        hash::hash(&chain[HASH_BYTES..3 * HASH_BYTES], &mut digest);
        chain[2 * HASH_BYTES..3 * HASH_BYTES].copy_from_slice(&digest);
        let challenge2 = self.generate_challenge2(&chain[2 * HASH_BYTES..3 * HASH_BYTES]);

        hash::hash(message3, &mut chain[3 * HASH_BYTES..]);
        hash::hash(&chain[2 * HASH_BYTES..], &mut digest);
        chain[3 * HASH_BYTES..].copy_from_slice(&digest);
        let challenge3 = self.generate_challenge3(&chain[3 * HASH_BYTES..]);

        self.check(
            &mut state, message1, &challenge1, message2, &challenge2, message3, &challenge3,
            message4,
        )
    }

    /// Byte boundaries of messages 1..3 inside a signature.
    fn message_bounds(&self) -> (usize, usize, usize) {
        let m1 = self.params.message1_bytes;
        let m2 = m1 + self.params.message2_bytes;
        (m1, m2, m2 + self.params.message3_bytes)
    }

    /// Phase 2: per round, generate the seed tree, expand every party's
    /// shares and sum them, commit to each seed, record the residuosity
    /// symbol of each ΣR_i, and publish ΔKey/ΔTriple so the sums equal the
    /// true key and a valid multiplicative triple.
    fn commit(&self, state: &mut ProverState, message1: &mut [u8]) {
        let params = self.params;
        message1.fill(0);

        let key = field::sample_mod_p(&self.sk);
        let spp = params.shares_per_party;
        let mut commitments =
            vec![0u8; params.n_rounds * params.parties * HASH_BYTES + params.total_res_sym];
        let mut expanded = vec![0u8; spp * PRIME_BYTES];

        for n_round in 0..params.n_rounds {
            state.seed_trees.generate(n_round);
            let tree = state.seed_trees.round(n_round);
            let shares = state.shares.plane_mut(n_round);
            let sums = state.sums.plane_mut(n_round);
            let cmt_base = n_round * params.parties * HASH_BYTES;

            for n_party in 0..params.parties {
                let seed_off = (params.parties - 1 + n_party) * SEED_BYTES;
                let seed = &tree[seed_off..seed_off + SEED_BYTES];
                let cmt = cmt_base + n_party * HASH_BYTES;
                hash::hash(seed, &mut commitments[cmt..cmt + HASH_BYTES]);

                hash::expand(seed, &mut expanded);
                for j in 0..spp {
                    let share = read_elem(&expanded, j * PRIME_BYTES);
                    shares[n_party * spp + j] = share;
                    field::add_assign(&mut sums[j], share);
                }
            }

            for sum in sums.iter_mut() {
                *sum = field::reduce(*sum);
            }

            let sym_base =
                params.n_rounds * params.parties * HASH_BYTES + n_round * params.n_res_sym_per_round;
            for i in 0..params.n_res_sym_per_round {
                commitments[sym_base + i] = if self.is_legendre() {
                    field::legendre_symbol(sums[SHARES_R + i])
                } else {
                    field::power_residue_symbol(sums[SHARES_R + i])
                };
            }

            // ΔKey folds into party 0's key share so the shares now sum to
            // the real key; ΔTriple likewise completes the triple relation.
            let r_off = n_round * PRIME_BYTES;
            let mut delta_key = field::neg(sums[SHARE_K]);
            field::add_assign(&mut delta_key, key);
            delta_key = field::reduce(delta_key);
            field::add_assign(&mut shares[SHARE_K], delta_key);
            write_elem(message1, MESSAGE1_DELTA_K + r_off, delta_key);

            let mut delta_triple = field::neg(sums[SHARES_TRIPLE + 2]);
            field::mul_add(&mut delta_triple, sums[SHARES_TRIPLE], sums[SHARES_TRIPLE + 1]);
            delta_triple = field::reduce(delta_triple);
            field::add_assign(&mut shares[SHARES_TRIPLE + 2], delta_triple);
            write_elem(message1, params.message1_delta_triple + r_off, delta_triple);
        }

        hash::hash(&commitments, message1);
    }

    /// Expands the transcript digest into masked public-key query indices,
    /// one per (round, symbol) pair.
    fn generate_challenge1(&self, digest: &[u8]) -> Vec<u8> {
        let params = self.params;
        let mut challenge1 = vec![0u8; params.challenge1_bytes];
        hash::expand(digest, &mut challenge1);

        let mask: u32 = if self.is_legendre() {
            (1 << crate::params::PK_DEPTH) - 1
        } else {
            (1 << (crate::params::PK_DEPTH - 3)) - 1
        };
        for chunk in challenge1.chunks_exact_mut(4) {
            let index = u32::from_le_bytes(chunk.try_into().expect("u32 slice")) & mask;
            chunk.copy_from_slice(&index.to_le_bytes());
        }
        challenge1
    }

    /// Maps each challenge1 index to its query-point field element.
    fn compute_indices(&self, state: &mut ProverState, challenge1: &[u8]) {
        for i in 0..self.params.total_res_sym {
            state.indices[i] = field::derive_index(read_u32(challenge1, i * 4));
        }
    }

    /// Phase 4: answer each query with (key + queryPoint)·ΣR_i, which lets
    /// the verifier cross-check the committed symbol of ΣR_i against the
    /// public key without learning the key.
    fn respond1(&self, state: &mut ProverState, challenge1: &[u8], message2: &mut [u8]) {
        let params = self.params;
        self.compute_indices(state, challenge1);

        let key = field::sample_mod_p(&self.sk);
        for n_round in 0..params.n_rounds {
            let sums = state.sums.plane(n_round);
            for i in 0..params.n_res_sym_per_round {
                let index = n_round * params.n_res_sym_per_round + i;
                let mut key_plus_point = state.indices[index];
                field::add_assign(&mut key_plus_point, key);

                let mut output = 0u128;
                field::mul_add(&mut output, key_plus_point, sums[SHARES_R + i]);
                write_elem(message2, index * PRIME_BYTES, field::reduce(output));
            }
        }
    }

    /// Expands the transcript digest into per-round ε and λ coefficients.
    fn generate_challenge2(&self, digest: &[u8]) -> Vec<u8> {
        let mut challenge2 = vec![0u8; self.params.challenge2_bytes];
        hash::expand(digest, &mut challenge2);
        challenge2
    }

    /// Phase 6: the sacrificing check. Publishes α = ε·key + triple₀ and
    /// β = triple₁ + Σλᵢ·Rᵢ in the clear, then commits to every party's
    /// (α, β, v) shares, where the v shares sum to zero exactly when the
    /// committed triple is multiplicative and message2 was honest.
    fn respond2(
        &self,
        state: &ProverState,
        challenge2: &[u8],
        message2: &[u8],
        message3: &mut [u8],
    ) {
        let params = self.params;
        let spp = params.shares_per_party;
        let key = field::sample_mod_p(&self.sk);
        let mut openings = FieldMatrix::new(params.n_rounds, params.parties, 3);

        for n_round in 0..params.n_rounds {
            let sums = state.sums.plane(n_round);
            let shares = state.shares.plane(n_round);
            let openings_r = openings.plane_mut(n_round);
            let r_off = n_round * PRIME_BYTES;
            let epsilon = read_elem(challenge2, r_off);
            let lambda_base =
                params.challenge2_lambda + n_round * params.n_res_sym_per_round * PRIME_BYTES;

            let mut alpha = 0u128;
            field::mul_add(&mut alpha, epsilon, key);
            field::add_assign(&mut alpha, sums[SHARES_TRIPLE]);
            alpha = field::reduce(alpha);
            write_elem(message3, MESSAGE3_ALPHA + r_off, alpha);

            let mut beta = sums[SHARES_TRIPLE + 1];
            for i in 0..params.n_res_sym_per_round {
                let lambda = read_elem(challenge2, lambda_base + i * PRIME_BYTES);
                field::mul_add(&mut beta, lambda, sums[SHARES_R + i]);
            }
            beta = field::reduce(beta);
            write_elem(message3, params.message3_beta + r_off, beta);

            for n_party in 0..params.parties {
                let sh = n_party * spp;
                let op = n_party * 3;

                let mut alpha_share = 0u128;
                field::mul_add(&mut alpha_share, epsilon, shares[sh + SHARE_K]);
                field::add_assign(&mut alpha_share, shares[sh + SHARES_TRIPLE]);
                openings_r[op] = field::reduce(alpha_share);

                let mut z_share = 0u128;
                let mut beta_share = shares[sh + SHARES_TRIPLE + 1];
                for j in 0..params.n_res_sym_per_round {
                    let lambda = read_elem(challenge2, lambda_base + j * PRIME_BYTES);

                    field::mul_add(&mut beta_share, shares[sh + SHARES_R + j], lambda);
                    beta_share = field::reduce(beta_share);

                    let mut term = 0u128;
                    field::mul_add(&mut term, shares[sh + SHARES_R + j], lambda);
                    term = field::neg(field::reduce(term));
                    let point = state.indices[n_round * params.n_res_sym_per_round + j];
                    field::mul_add(&mut z_share, term, point);

                    if n_party == 0 {
                        let answer = read_elem(
                            message2,
                            (n_round * params.n_res_sym_per_round + j) * PRIME_BYTES,
                        );
                        field::mul_add(&mut z_share, lambda, answer);
                    }
                }
                openings_r[op + 1] = beta_share;

                let mut v_share = shares[sh + SHARES_TRIPLE + 2];
                if n_party == 0 {
                    field::mul_add(&mut v_share, alpha, beta);
                }
                v_share = field::neg(field::reduce(v_share));
                field::mul_add(&mut v_share, alpha, shares[sh + SHARES_TRIPLE + 1]);
                field::mul_add(&mut v_share, beta, shares[sh + SHARES_TRIPLE]);
                field::mul_add(&mut v_share, epsilon, z_share);
                openings_r[op + 2] = field::reduce(v_share);
            }
        }

        hash::hash(&openings.as_bytes(), message3);
    }

    /// Expands the transcript digest into one unopened-party index per round.
    fn generate_challenge3(&self, digest: &[u8]) -> Vec<u8> {
        let params = self.params;
        let mut challenge3 = vec![0u8; params.challenge3_bytes];
        hash::expand(digest, &mut challenge3);

        let mask = (params.parties - 1) as u32;
        for chunk in challenge3.chunks_exact_mut(4) {
            let party = u32::from_le_bytes(chunk.try_into().expect("u32 slice")) & mask;
            chunk.copy_from_slice(&party.to_le_bytes());
        }
        challenge3
    }

    /// Phase 8: per round, release the sibling seeds that open every party
    /// but the challenged one, plus the commitment of the unopened seed so
    /// its first-round commitment stays checkable.
    fn respond3(&self, state: &ProverState, challenge3: &[u8], message4: &mut [u8]) {
        let params = self.params;
        for n_round in 0..params.n_rounds {
            let unopened = read_u32(challenge3, n_round * 4) as usize;
            let out = n_round * params.party_depth * SEED_BYTES;
            state.seed_trees.release_seeds(
                n_round,
                unopened,
                &mut message4[out..out + params.party_depth * SEED_BYTES],
            );

            let leaf = state.seed_trees.leaf_offset(unopened);
            let tree = state.seed_trees.round(n_round);
            let cmt = params.message4_commitment + n_round * HASH_BYTES;
            hash::hash(
                &tree[leaf..leaf + SEED_BYTES],
                &mut message4[cmt..cmt + HASH_BYTES],
            );
        }
    }

    /// The verifier's side of phases 2-8: rebuild everything the openings
    /// allow and compare both transcript digests.
    #[allow(clippy::too_many_arguments)]
    fn check(
        &self,
        state: &mut ProverState,
        message1: &[u8],
        challenge1: &[u8],
        message2: &[u8],
        challenge2: &[u8],
        message3: &[u8],
        challenge3: &[u8],
        message4: &[u8],
    ) -> Result<()> {
        let params = self.params;
        let spp = params.shares_per_party;

        state.clear();
        self.compute_indices(state, challenge1);

        let unopened: Vec<usize> = (0..params.n_rounds)
            .map(|i| read_u32(challenge3, i * 4) as usize)
            .collect();

        // First commitment: seed commitments for every party (the unopened
        // one supplied by message4) and the residuosity symbol of each ΣR_i,
        // reconstructed from the message2 answers and the public key.
        let mut commitments =
            vec![0u8; params.n_rounds * params.parties * HASH_BYTES + params.total_res_sym];
        let mut expanded = vec![0u8; spp * PRIME_BYTES];

        for n_round in 0..params.n_rounds {
            let unopened_party = unopened[n_round];
            let seeds = n_round * params.party_depth * SEED_BYTES;
            state.seed_trees.fill_down(
                n_round,
                unopened_party,
                &message4[seeds..seeds + params.party_depth * SEED_BYTES],
            );
            let tree = state.seed_trees.round(n_round);
            let shares = state.shares.plane_mut(n_round);

            let cmt_base = n_round * params.parties * HASH_BYTES;
            let msg4_cmt = params.message4_commitment + n_round * HASH_BYTES;
            commitments[cmt_base + unopened_party * HASH_BYTES
                ..cmt_base + (unopened_party + 1) * HASH_BYTES]
                .copy_from_slice(&message4[msg4_cmt..msg4_cmt + HASH_BYTES]);

            for n_party in 0..params.parties {
                if n_party == unopened_party {
                    continue;
                }

                let seed_off = (params.parties - 1 + n_party) * SEED_BYTES;
                let seed = &tree[seed_off..seed_off + SEED_BYTES];
                let cmt = cmt_base + n_party * HASH_BYTES;
                hash::hash(seed, &mut commitments[cmt..cmt + HASH_BYTES]);

                hash::expand(seed, &mut expanded);
                for j in 0..spp {
                    shares[n_party * spp + j] = read_elem(&expanded, j * PRIME_BYTES);
                }

                if n_party == 0 {
                    let delta_key = read_elem(message1, MESSAGE1_DELTA_K + n_round * PRIME_BYTES);
                    field::add_assign(&mut shares[SHARE_K], delta_key);

                    let delta_triple = read_elem(
                        message1,
                        params.message1_delta_triple + n_round * PRIME_BYTES,
                    );
                    field::add_assign(&mut shares[SHARES_TRIPLE + 2], delta_triple);
                }
            }

            let sym_base =
                params.n_rounds * params.parties * HASH_BYTES + n_round * params.n_res_sym_per_round;
            for i in 0..params.n_res_sym_per_round {
                let index = n_round * params.n_res_sym_per_round + i;
                let answer = read_elem(message2, index * PRIME_BYTES);
                let query = read_u32(challenge1, index * 4);

                commitments[sym_base + i] = if self.is_legendre() {
                    field::legendre_symbol(answer) ^ self.pk_symbol(query)
                } else {
                    let symbol = field::power_residue_symbol(answer) as u16;
                    // 508 ≡ 0 (mod 254) and dominates any u8, so this stays
                    // subtraction-safe even for out-of-range key bytes.
                    ((symbol + 508 - self.pk_symbol(query) as u16) % 254) as u8
                };
            }
        }

        let mut digest = [0u8; HASH_BYTES];
        hash::hash(&commitments, &mut digest);
        if digest != message1[..HASH_BYTES] {
            return Err(Error::FirstCommitmentMismatch);
        }

        // Second commitment: recompute the opened parties' (α, β, v) shares
        // and solve for the unopened one from the published α and β (the v
        // shares must sum to zero).
        let mut openings = FieldMatrix::new(params.n_rounds, params.parties, 3);
        for n_round in 0..params.n_rounds {
            let shares = state.shares.plane(n_round);
            let openings_r = openings.plane_mut(n_round);
            let unopened_party = unopened[n_round];

            let r_off = n_round * PRIME_BYTES;
            let epsilon = read_elem(challenge2, r_off);
            let alpha = read_elem(message3, MESSAGE3_ALPHA + r_off);
            let beta = read_elem(message3, params.message3_beta + r_off);

            let mut sum_alpha = 0u128;
            let mut sum_beta = 0u128;
            let mut sum_v = 0u128;
            let sym_base = n_round * params.n_res_sym_per_round;
            let lambda_base = params.challenge2_lambda + sym_base * PRIME_BYTES;

            for n_party in 0..params.parties {
                if n_party == unopened_party {
                    continue;
                }

                let sh = n_party * spp;
                let op = n_party * 3;

                let mut alpha_share = 0u128;
                field::mul_add(&mut alpha_share, epsilon, shares[sh + SHARE_K]);
                field::add_assign(&mut alpha_share, shares[sh + SHARES_TRIPLE]);
                openings_r[op] = field::reduce(alpha_share);
                field::add_assign(&mut sum_alpha, openings_r[op]);

                let mut z_share = 0u128;
                let mut beta_share = shares[sh + SHARES_TRIPLE + 1];
                for j in 0..params.n_res_sym_per_round {
                    let lambda = read_elem(challenge2, lambda_base + j * PRIME_BYTES);

                    field::mul_add(&mut beta_share, shares[sh + SHARES_R + j], lambda);

                    let mut term = 0u128;
                    field::mul_add(&mut term, shares[sh + SHARES_R + j], lambda);
                    term = field::neg(field::reduce(term));
                    field::mul_add(&mut z_share, term, state.indices[sym_base + j]);

                    if n_party == 0 {
                        let answer = read_elem(message2, (sym_base + j) * PRIME_BYTES);
                        field::mul_add(&mut z_share, lambda, answer);
                    }
                }
                openings_r[op + 1] = field::reduce(beta_share);
                field::add_assign(&mut sum_beta, openings_r[op + 1]);

                let mut v_share = shares[sh + SHARES_TRIPLE + 2];
                if n_party == 0 {
                    field::mul_add(&mut v_share, alpha, beta);
                }
                v_share = field::neg(field::reduce(v_share));
                field::mul_add(&mut v_share, alpha, shares[sh + SHARES_TRIPLE + 1]);
                field::mul_add(&mut v_share, beta, shares[sh + SHARES_TRIPLE]);
                field::mul_add(&mut v_share, epsilon, z_share);
                openings_r[op + 2] = field::reduce(v_share);
                field::add_assign(&mut sum_v, openings_r[op + 2]);
            }

            sum_alpha = field::reduce(sum_alpha);
            sum_beta = field::reduce(sum_beta);
            sum_v = field::reduce(sum_v);

            let op = unopened_party * 3;
            let mut alpha_unopened = field::neg(sum_alpha);
            field::add_assign(&mut alpha_unopened, alpha);
            openings_r[op] = field::reduce(alpha_unopened);

            let mut beta_unopened = field::neg(sum_beta);
            field::add_assign(&mut beta_unopened, beta);
            openings_r[op + 1] = field::reduce(beta_unopened);

            openings_r[op + 2] = field::reduce(field::neg(sum_v));
        }

        hash::hash(&openings.as_bytes(), &mut digest);
        if digest != message3[..HASH_BYTES] {
            return Err(Error::SecondCommitmentMismatch);
        }

        Ok(())
    }
}

impl Scheme for LegRoast {
    fn keygen(&mut self, seed: Option<&[u8]>) -> Result<()> {
        LegRoast::keygen(self, seed)
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        LegRoast::sign(self, message)
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        LegRoast::verify(self, message, signature)
    }

    fn set_public_key(&mut self, pk: &[u8]) -> Result<()> {
        LegRoast::set_public_key(self, pk)
    }

    fn public_key(&self) -> &[u8] {
        LegRoast::public_key(self)
    }

    fn params(&self) -> &'static Params {
        LegRoast::params(self)
    }
}

/// Verifies a detached signature, inferring the algorithm variant from the
/// signature length, the only discriminator a signature carries.
pub fn verify(message: &[u8], public_key: &[u8], signature: &[u8]) -> Result<()> {
    let alg = Algorithm::by_sig_size(signature.len())?;
    let mut scheme = LegRoast::new(alg);
    scheme.set_public_key(public_key)?;
    scheme.verify(message, signature)
}
