//! SHAKE128 helpers shared by the whole protocol.
//!
//! Every hash and every pseudorandom expansion in LegRoast is a single
//! SHAKE128 invocation: `hash` produces the fixed 32-byte commitment/transcript
//! digest, `expand` fills a caller-sized buffer (seed-tree node expansion,
//! share derivation, challenge generation).

use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128,
};

use crate::params::HASH_BYTES;

/// Fills `output` with SHAKE128(`input`).
pub(crate) fn expand(input: &[u8], output: &mut [u8]) {
    let mut hasher = Shake128::default();
    hasher.update(input);
    let mut reader = hasher.finalize_xof();
    reader.read(output);
}

/// Writes the fixed-size digest SHAKE128(`input`) into `output[..HASH_BYTES]`.
pub(crate) fn hash(input: &[u8], output: &mut [u8]) {
    expand(input, &mut output[..HASH_BYTES]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_is_a_prefix_of_longer_expand() {
        let mut short = [0u8; 16];
        let mut long = [0u8; 64];
        expand(b"legroast xof", &mut short);
        expand(b"legroast xof", &mut long);
        assert_eq!(short, long[..16]);
    }

    #[test]
    fn hash_writes_exactly_hash_bytes() {
        let mut out = [0xAAu8; HASH_BYTES + 4];
        hash(b"digest", &mut out);
        assert_ne!(out[..HASH_BYTES], [0xAAu8; HASH_BYTES]);
        assert_eq!(out[HASH_BYTES..], [0xAAu8; 4]);
    }
}
