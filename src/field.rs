//! Arithmetic over the Mersenne prime field Z/pZ with p = 2^127 − 1.
//!
//! Field elements travel in a native `u128`. Values are allowed to sit above
//! `p` between operations; every multiplication reduces its inputs first, and
//! [`reduce`] canonicalises into `[0, p)`. Overflow past 128 bits is folded
//! with the identity 2^128 ≡ 2 (mod p).
//!
//! The Legendre and power-residue symbol ladders run a fixed number of
//! squarings and multiplications for any input, so their control flow does not
//! depend on secret values.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::hash;

/// The field modulus, 2^127 − 1.
pub const P: u128 = (1 << 127) - 1;

/// Primitive 254-th root of unity generating the power-residue symbol group:
/// γ = −2^44 mod p.
const GAMMA: u128 = P - (1 << 44);

/// Number of distinct power-residue symbol values.
pub const PRS_ORDER: u8 = 254;

/// Canonicalises `a` into `[0, p)`.
#[inline]
pub(crate) fn reduce(a: u128) -> u128 {
    a % P
}

/// Returns p − a for a reduced `a`, i.e. the additive inverse representative.
#[inline]
pub(crate) fn neg(a: u128) -> u128 {
    debug_assert!(a <= P);
    P - a
}

/// `acc += b (mod p)`, folding a 128-bit carry as +2.
///
/// The result may exceed `p` by a small margin; callers reduce before any
/// value leaves the arithmetic core.
#[inline]
pub(crate) fn add_assign(acc: &mut u128, b: u128) {
    let (sum, carry) = acc.overflowing_add(b);
    *acc = if carry { sum % P + 2 } else { sum };
}

/// Returns a² (mod p), partially reduced.
pub(crate) fn square(a: u128) -> u128 {
    let a = reduce(a);
    let lo = a as u64 as u128;
    let hi = (a >> 64) as u64 as u128;

    // a² = lo² + 2^64·(2·lo·hi) + 2^128·hi², with 2^128 ≡ 2 and the middle
    // term split across the 2^64 boundary.
    let mid = (lo * hi) << 1;
    let high = ((hi * hi) + (mid >> 64)) << 1;

    let mut out = lo * lo;
    add_assign(&mut out, high);
    add_assign(&mut out, mid << 64);
    out
}

/// `acc += a·b (mod p)`, partially reduced.
pub(crate) fn mul_add(acc: &mut u128, a: u128, b: u128) {
    let a = reduce(a);
    let b = reduce(b);
    let a_lo = a as u64 as u128;
    let a_hi = (a >> 64) as u64 as u128;
    let b_lo = b as u64 as u128;
    let b_hi = (b >> 64) as u64 as u128;

    let low = a_lo * b_lo;
    let mid = a_lo * b_hi + b_lo * a_hi;
    let high = (a_hi * b_hi + (mid >> 64)) << 1;

    add_assign(acc, low);
    add_assign(acc, high);
    add_assign(acc, mid << 64);
}

/// Computes the Legendre symbol of `a` as a bit: 0 for a quadratic residue
/// (and zero), 1 for a non-residue.
///
/// Raises `a` to (p−1)/2 = 2^126 − 1 through a fixed addition chain: five
/// square-and-multiply steps building a^(2^6−1), then twenty rounds of six
/// squarings and one multiplication. The sequence of field operations is the
/// same for every input.
pub(crate) fn legendre_symbol(a: u128) -> u8 {
    let mut out = a;
    for _ in 0..5 {
        let t = square(out);
        out = 0;
        mul_add(&mut out, t, a);
    }
    let base = out;

    for _ in 0..20 {
        let mut t = square(out);
        for _ in 0..5 {
            t = square(t);
        }
        out = 0;
        mul_add(&mut out, t, base);
    }

    let lo = reduce(out) as u64;
    // out is 1 (residue) or p−1 (non-residue); map to 0/1 without branching.
    (lo.wrapping_neg().wrapping_add(1) >> 1) as u8
}

/// Symbol table mapping the 254-th roots of unity γ^k to their exponent k.
fn root_symbols() -> &'static HashMap<u128, u8> {
    static ROOTS: OnceLock<HashMap<u128, u8>> = OnceLock::new();
    ROOTS.get_or_init(|| {
        let mut map = HashMap::with_capacity(PRS_ORDER as usize);
        let mut root: u128 = 1;
        for k in 0..PRS_ORDER {
            map.insert(root, k);
            let mut next = 0;
            mul_add(&mut next, root, GAMMA);
            root = reduce(next);
        }
        map
    })
}

/// Computes the power-residue symbol of `a`, a value in `[0, 254)`.
///
/// Raises `a` to (p−1)/254 through a fixed ladder of seventeen rounds of
/// seven squarings and one multiplication, then maps the resulting root of
/// unity to its discrete log base γ. Inputs whose power lands outside the
/// root group (only 0) map to symbol 0.
pub(crate) fn power_residue_symbol(a: u128) -> u8 {
    let mut out = a;
    for _ in 0..17 {
        let mut t = square(out);
        for _ in 0..6 {
            t = square(t);
        }
        out = 0;
        mul_add(&mut out, t, a);
    }

    let out = reduce(out);
    root_symbols().get(&out).copied().unwrap_or(0)
}

/// Samples a field element from a seed: SHAKE128(seed) → 16 LE bytes → mod p.
pub(crate) fn sample_mod_p(seed: &[u8]) -> u128 {
    let mut out = [0u8; 16];
    hash::expand(seed, &mut out);
    reduce(u128::from_le_bytes(out))
}

/// Derives the (unreduced) query-point field element for public-key index `a`.
pub(crate) fn derive_index(a: u32) -> u128 {
    let mut out = [0u8; 16];
    hash::expand(&a.to_le_bytes(), &mut out);
    u128::from_le_bytes(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};

    /// Reference modular multiplication built only on `%` and the modular
    /// shift identity x·2^64 ≡ (x >> 63) + ((x mod 2^63) << 64) (mod p),
    /// independent of the `mul_add` code path.
    fn mod_mul_ref(a: u128, b: u128) -> u128 {
        fn shift64(x: u128) -> u128 {
            let folded = (x >> 63) + ((x & ((1 << 63) - 1)) << 64);
            folded % P
        }
        let (a, b) = (a % P, b % P);
        let (a_lo, a_hi) = (a as u64 as u128, (a >> 64) as u64 as u128);
        let (b_lo, b_hi) = (b as u64 as u128, (b >> 64) as u64 as u128);

        let mut acc = (a_lo * b_lo) % P;
        acc = (acc + shift64((a_lo * b_hi + b_lo * a_hi) % P)) % P;
        acc = (acc + shift64(shift64((a_hi * b_hi) % P))) % P;
        acc
    }

    #[test]
    fn add_assign_matches_reference() {
        let mut rng = thread_rng();
        for _ in 0..1000 {
            let a: u128 = rng.gen();
            let b: u128 = rng.gen();
            let mut acc = a;
            add_assign(&mut acc, b);
            assert_eq!(reduce(acc), (a % P + b % P) % P);
            assert!(reduce(acc) < P);
        }
    }

    #[test]
    fn mul_add_matches_reference() {
        let mut rng = thread_rng();
        for _ in 0..1000 {
            let a: u128 = rng.gen();
            let b: u128 = rng.gen();
            let mut acc = 0;
            mul_add(&mut acc, a, b);
            assert_eq!(reduce(acc), mod_mul_ref(a, b));
        }
    }

    #[test]
    fn mul_add_accumulates() {
        let mut rng = thread_rng();
        for _ in 0..100 {
            let start: u128 = rng.gen::<u128>() % P;
            let a: u128 = rng.gen();
            let b: u128 = rng.gen();
            let mut acc = start;
            mul_add(&mut acc, a, b);
            assert_eq!(reduce(acc), (start + mod_mul_ref(a, b)) % P);
        }
    }

    #[test]
    fn square_matches_mul() {
        let mut rng = thread_rng();
        for _ in 0..1000 {
            let a: u128 = rng.gen();
            assert_eq!(reduce(square(a)), mod_mul_ref(a, a));
        }
    }

    #[test]
    fn reduce_stays_in_field() {
        let mut rng = thread_rng();
        for _ in 0..1000 {
            let a: u128 = rng.gen();
            assert!(reduce(a) < P);
            assert_eq!(reduce(a), a % P);
        }
        assert_eq!(reduce(P), 0);
        assert_eq!(reduce(P + 1), 1);
        assert_eq!(reduce(u128::MAX), u128::MAX - 2 * P);
    }

    #[test]
    fn legendre_of_squares_is_zero() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let x = 1 + rng.gen::<u128>() % (P - 1);
            let sq = mod_mul_ref(x, x);
            assert_eq!(legendre_symbol(sq), 0);
        }
    }

    #[test]
    fn legendre_known_values() {
        assert_eq!(legendre_symbol(0), 0);
        assert_eq!(legendre_symbol(1), 0);
        assert_eq!(legendre_symbol(4), 0);
        // p ≡ 3 (mod 4), so −1 is a non-residue.
        assert_eq!(legendre_symbol(P - 1), 1);
    }

    #[test]
    fn legendre_is_multiplicative() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let a = 1 + rng.gen::<u128>() % (P - 1);
            let b = 1 + rng.gen::<u128>() % (P - 1);
            let ab = mod_mul_ref(a, b);
            assert_eq!(
                legendre_symbol(ab),
                legendre_symbol(a) ^ legendre_symbol(b)
            );
        }
    }

    #[test]
    fn power_residue_known_values() {
        assert_eq!(power_residue_symbol(0), 0);
        assert_eq!(power_residue_symbol(1), 0);
        assert_eq!(power_residue_symbol(GAMMA), 145);
        assert_eq!(power_residue_symbol(2), 214);
        assert_eq!(power_residue_symbol(4), 174);
        assert_eq!(power_residue_symbol(P - 1), 127);
    }

    #[test]
    fn power_residue_is_additive_mod_254() {
        let mut rng = thread_rng();
        for _ in 0..50 {
            let a = 1 + rng.gen::<u128>() % (P - 1);
            let b = 1 + rng.gen::<u128>() % (P - 1);
            let ab = mod_mul_ref(a, b);
            let expected =
                (power_residue_symbol(a) as u16 + power_residue_symbol(b) as u16) % 254;
            assert_eq!(power_residue_symbol(ab) as u16, expected);
        }
    }

    #[test]
    fn legendre_refines_power_residue() {
        // The quadratic character is the parity of the 254-symbol.
        let mut rng = thread_rng();
        for _ in 0..50 {
            let a = 1 + rng.gen::<u128>() % (P - 1);
            assert_eq!(legendre_symbol(a), power_residue_symbol(a) & 1);
        }
    }

    #[test]
    fn sample_mod_p_is_reduced_and_deterministic() {
        let seed = [7u8; 16];
        let a = sample_mod_p(&seed);
        let b = sample_mod_p(&seed);
        assert_eq!(a, b);
        assert!(a < P);
    }
}
