//! # LegRoast
//!
//! Post-quantum digital signatures based on the Legendre and power-residue
//! pseudorandom functions over the Mersenne prime field p = 2^127 − 1,
//! following the LegRoast construction of Beullens and Delpech de Saint Guilhem:
//! an MPC-in-the-head proof of PRF-key knowledge made non-interactive with the
//! Fiat-Shamir transform.
//!
//! Six [`params::Algorithm`] variants are available: Legendre- and
//! power-residue-based families, each at a Fast/Middle/Compact trade-off.
//! Every variant shares the same 16-byte secret seed and 4096-byte public
//! key; signature lengths differ per variant and are the sole discriminator
//! a verifier needs.
//!
//! ```rust
//! use legroast::{Algorithm, LegRoast};
//!
//! let mut scheme = LegRoast::new(Algorithm::LegendreMiddle);
//! scheme.keygen(None).expect("keygen failed");
//!
//! let message = b"post-quantum signed message";
//! let signature = scheme.sign(message).expect("signing failed");
//!
//! legroast::verify(message, scheme.public_key(), &signature).expect("rejected");
//! ```

mod field;
mod hash;
mod matrix;
mod seed_tree;

pub mod legroast;
pub mod params;

mod error;

pub use crate::error::{Error, Result};
pub use crate::legroast::{verify, LegRoast, Scheme};
pub use crate::params::{Algorithm, Params, DEFAULT_ALGORITHM, PK_BYTES, SK_BYTES};
