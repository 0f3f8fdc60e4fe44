//! LegRoast algorithm variants and their derived parameter sets.
//!
//! Six variants cover two symbol families (Legendre bit, power residue byte)
//! at three speed/size trade-offs each. Every message, challenge and signature
//! byte-length is a pure function of the three base integers of a variant:
//! round count, residuosity symbols per round, and party-tree depth.

use crate::error::{Error, Result};
use std::fmt;

/// Field element and seed width in bytes.
pub const PRIME_BYTES: usize = 16;
/// Seed width of every node in the GGM tree and of the secret key.
pub const SEED_BYTES: usize = 16;
/// Width of every commitment/transcript digest.
pub const HASH_BYTES: usize = 32;
/// log2 of the public-key bit count; all variants share one key shape.
pub const PK_DEPTH: usize = 15;

/// Public key byte size, identical across variants.
pub const PK_BYTES: usize = 1 << (PK_DEPTH - 3);
/// Secret key (seed) byte size.
pub const SK_BYTES: usize = SEED_BYTES;

// Order of a party's shares in memory: the key share, the three shares of the
// multiplicative triple, then the residuosity values R_1..R_S.
pub(crate) const SHARE_K: usize = 0;
pub(crate) const SHARES_TRIPLE: usize = SHARE_K + 1;
pub(crate) const SHARES_R: usize = SHARES_TRIPLE + 3;

// Fixed leading offsets inside message1/message3: a 32-byte digest, then the
// per-round payloads.
pub(crate) const MESSAGE1_DELTA_K: usize = HASH_BYTES;
pub(crate) const MESSAGE3_ALPHA: usize = HASH_BYTES;

/// The supported LegRoast algorithm variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    LegendreFast,
    LegendreMiddle,
    LegendreCompact,
    PowerFast,
    PowerMiddle,
    PowerCompact,
}

/// Variant used when no algorithm name is given.
pub const DEFAULT_ALGORITHM: Algorithm = Algorithm::LegendreMiddle;

impl Algorithm {
    /// All variants, in signature-table order.
    pub const ALL: [Algorithm; 6] = [
        Algorithm::LegendreFast,
        Algorithm::LegendreMiddle,
        Algorithm::LegendreCompact,
        Algorithm::PowerFast,
        Algorithm::PowerMiddle,
        Algorithm::PowerCompact,
    ];

    /// Whether this variant uses the Legendre (bit) symbol family.
    pub fn is_legendre(self) -> bool {
        matches!(
            self,
            Algorithm::LegendreFast | Algorithm::LegendreMiddle | Algorithm::LegendreCompact
        )
    }

    /// The derived parameter set for this variant.
    pub fn params(self) -> &'static Params {
        &PARAMS[self as usize]
    }

    /// The stable name of this variant.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::LegendreFast => "LegendreFast",
            Algorithm::LegendreMiddle => "LegendreMiddle",
            Algorithm::LegendreCompact => "LegendreCompact",
            Algorithm::PowerFast => "PowerFast",
            Algorithm::PowerMiddle => "PowerMiddle",
            Algorithm::PowerCompact => "PowerCompact",
        }
    }

    /// Looks up a variant by name. An empty name selects [`DEFAULT_ALGORITHM`].
    pub fn from_name(name: &str) -> Result<Algorithm> {
        if name.is_empty() {
            return Ok(DEFAULT_ALGORITHM);
        }
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.name() == name)
            .ok_or_else(|| Error::UnknownAlgorithm(name.to_owned()))
    }

    /// Infers the variant from a signature byte length. This is the only
    /// variant discriminator available to a verifier.
    pub fn by_sig_size(sig_size: usize) -> Result<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .find(|alg| alg.params().sig_bytes == sig_size)
            .ok_or(Error::UnknownSignatureSize(sig_size))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Derived parameters of one algorithm variant.
///
/// All byte lengths and offsets follow from `(n_rounds, n_res_sym_per_round,
/// party_depth)`; nothing here is mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub alg: Algorithm,
    /// Number of cut-and-choose rounds R.
    pub n_rounds: usize,
    /// Residuosity symbols checked per round S.
    pub n_res_sym_per_round: usize,
    /// Depth of the per-round party seed tree.
    pub party_depth: usize,

    /// Total symbol count R·S.
    pub total_res_sym: usize,
    /// Virtual parties per round, 2^depth.
    pub parties: usize,
    /// Field elements expanded from each party seed: key share, triple
    /// shares, and S residuosity shares.
    pub shares_per_party: usize,

    /// Offset of the ΔTriple block inside message1.
    pub message1_delta_triple: usize,
    pub message1_bytes: usize,
    pub challenge1_bytes: usize,
    pub message2_bytes: usize,
    /// Offset of the λ coefficients inside challenge2.
    pub challenge2_lambda: usize,
    pub challenge2_bytes: usize,
    /// Offset of the β block inside message3.
    pub message3_beta: usize,
    pub message3_bytes: usize,
    pub challenge3_bytes: usize,
    /// Offset of the unopened-party commitments inside message4.
    pub message4_commitment: usize,
    pub message4_bytes: usize,
    /// Total signature length; unique per variant.
    pub sig_bytes: usize,
}

impl Params {
    const fn derive(
        alg: Algorithm,
        n_rounds: usize,
        n_res_sym_per_round: usize,
        party_depth: usize,
    ) -> Params {
        let total_res_sym = n_rounds * n_res_sym_per_round;
        let parties = 1 << party_depth;
        let shares_per_party = SHARES_R + n_res_sym_per_round;

        let message1_delta_triple = MESSAGE1_DELTA_K + n_rounds * PRIME_BYTES;
        let message1_bytes = message1_delta_triple + n_rounds * PRIME_BYTES;
        let challenge1_bytes = total_res_sym * 4;

        let message2_bytes = total_res_sym * PRIME_BYTES;
        let challenge2_lambda = n_rounds * PRIME_BYTES;
        let challenge2_bytes = challenge2_lambda + total_res_sym * PRIME_BYTES;

        let message3_beta = MESSAGE3_ALPHA + n_rounds * PRIME_BYTES;
        let message3_bytes = message3_beta + n_rounds * PRIME_BYTES;
        let challenge3_bytes = n_rounds * 4;

        let message4_commitment = n_rounds * party_depth * SEED_BYTES;
        let message4_bytes = message4_commitment + n_rounds * HASH_BYTES;
        let sig_bytes = message1_bytes + message2_bytes + message3_bytes + message4_bytes;

        Params {
            alg,
            n_rounds,
            n_res_sym_per_round,
            party_depth,
            total_res_sym,
            parties,
            shares_per_party,
            message1_delta_triple,
            message1_bytes,
            challenge1_bytes,
            message2_bytes,
            challenge2_lambda,
            challenge2_bytes,
            message3_beta,
            message3_bytes,
            challenge3_bytes,
            message4_commitment,
            message4_bytes,
            sig_bytes,
        }
    }
}

static PARAMS: [Params; 6] = [
    Params::derive(Algorithm::LegendreFast, 54, 9, 4),
    Params::derive(Algorithm::LegendreMiddle, 37, 12, 6),
    Params::derive(Algorithm::LegendreCompact, 26, 16, 8),
    Params::derive(Algorithm::PowerFast, 39, 4, 4),
    Params::derive(Algorithm::PowerMiddle, 27, 5, 6),
    Params::derive(Algorithm::PowerCompact, 21, 5, 8),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_sizes_are_the_published_table() {
        let expected = [
            (Algorithm::LegendreFast, 16480),
            (Algorithm::LegendreMiddle, 14272),
            (Algorithm::LegendreCompact, 12544),
            (Algorithm::PowerFast, 8800),
            (Algorithm::PowerMiddle, 7408),
            (Algorithm::PowerCompact, 6448),
        ];
        for (alg, size) in expected {
            assert_eq!(alg.params().sig_bytes, size, "{alg}");
        }
    }

    #[test]
    fn by_sig_size_inverts_the_table() {
        for alg in Algorithm::ALL {
            assert_eq!(Algorithm::by_sig_size(alg.params().sig_bytes).unwrap(), alg);
        }
        assert_eq!(
            Algorithm::by_sig_size(100),
            Err(Error::UnknownSignatureSize(100))
        );
    }

    #[test]
    fn names_round_trip() {
        for alg in Algorithm::ALL {
            assert_eq!(Algorithm::from_name(alg.name()).unwrap(), alg);
            assert_eq!(alg.to_string(), alg.name());
        }
        assert_eq!(Algorithm::from_name("").unwrap(), DEFAULT_ALGORITHM);
        assert!(matches!(
            Algorithm::from_name("LegendreTurbo"),
            Err(Error::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn public_key_shape_is_variant_independent() {
        assert_eq!(PK_BYTES, 4096);
        for alg in Algorithm::ALL {
            let params = alg.params();
            assert_eq!(params.parties, 1 << params.party_depth);
            assert_eq!(params.total_res_sym, params.n_rounds * params.n_res_sym_per_round);
            assert_eq!(params.shares_per_party, 4 + params.n_res_sym_per_round);
        }
    }

    #[test]
    fn message_offsets_partition_the_signature() {
        for alg in Algorithm::ALL {
            let p = alg.params();
            assert_eq!(
                p.sig_bytes,
                p.message1_bytes + p.message2_bytes + p.message3_bytes + p.message4_bytes
            );
            assert_eq!(p.message1_bytes, HASH_BYTES + 2 * p.n_rounds * PRIME_BYTES);
            assert_eq!(p.message3_bytes, HASH_BYTES + 2 * p.n_rounds * PRIME_BYTES);
            assert_eq!(
                p.message4_bytes,
                p.n_rounds * (p.party_depth * SEED_BYTES + HASH_BYTES)
            );
        }
    }
}
