#![cfg_attr(not(feature = "std"), no_std)]

//! Secret sharing and distributed key generation for threshold BBS+ signing:
//! - [`shamir`]: `(t, n)` Shamir sharing over an arbitrary id set
//! - [`pedersen_vss`]: Pedersen verifiable secret sharing with two committed polynomials
//! - [`pedersen_dkg`]: fail-stop DKG where every party deals a Pedersen VSS and the
//!   shared secret is the sum of the dealt secrets. Used both for the long lived
//!   signing key and for the per-signature nonce/mask sub-protocols.

pub mod common;
pub mod error;
pub mod pedersen_dkg;
pub mod pedersen_vss;
pub mod shamir;
