#![cfg_attr(not(feature = "std"), no_std)]
#![allow(non_snake_case)]

//! BBS+ signatures following "Anonymous Attestation Using the Strong Diffie Hellman
//! Assumption Revisited" (<https://eprint.iacr.org/2016/663>), with signatures in G1.
//! The implementation keeps the paper's variable names, violating Rust naming
//! conventions at places.
//!
//! - [`setup`]: signature params, secret key and public key
//! - [`signature`]: signature creation (including partially blind) and verification
//! - [`proof`]: proof of knowledge of a signature with selective disclosure of messages
//! - [`threshold`]: distributed signing where a quorum of key-share holders produces
//!   the same signatures without any of them holding the signing key

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod error;
pub mod proof;
pub mod setup;
pub mod signature;
pub mod threshold;

pub mod prelude {
    pub use crate::{
        error::BBSPlusError,
        proof::{PoKOfSignatureG1Proof, PoKOfSignatureG1Protocol},
        setup::{Keypair, PublicKeyG2, SecretKey, SignatureParamsG1},
        signature::SignatureG1,
    };
}
