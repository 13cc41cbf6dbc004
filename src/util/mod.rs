//! Arithmetic and sampling primitives underneath the CKKS engine:
//! modular arithmetic, number theory, NTT, RNS helpers, Galois
//! automorphisms, RLWE sampling, hashing and the CSPRNG.
#![allow(missing_docs)]

mod basic;
pub(crate) mod dwthandler;
mod galois;
pub(crate) mod hash;
pub mod he_standard_params;
mod number_theory;
mod ntt;
pub(crate) mod polysmallmod;
mod rns;
mod uintsmallmod;
pub mod rlwe;
mod random_generator;

pub use basic::*;
pub use ntt::*;
pub use number_theory::*;
pub use rns::*;
pub use uintsmallmod::*;
pub use galois::*;
pub use random_generator::{BlakeRNGFactory, BlakeRNG, PRNGSeed};
