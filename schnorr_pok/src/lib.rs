#![cfg_attr(not(feature = "std"), no_std)]

//! Schnorr protocol for proving knowledge of one or more discrete logs in zero knowledge.
//!
//! To prove knowledge of `x_1, ..., x_k` in `y = g_1*x_1 + g_2*x_2 + ... + g_k*x_k`:
//! 1. Prover samples blindings `r_1, ..., r_k` and sends `t = g_1*r_1 + ... + g_k*r_k`.
//! 2. Verifier sends a random challenge `c` (or it is derived by Fiat-Shamir).
//! 3. Prover sends responses `s_i = r_i + x_i*c`.
//! 4. Verifier accepts iff `g_1*s_1 + ... + g_k*s_k - y*c = t`.
//!
//! [`SchnorrCommitment`]/[`SchnorrResponse`] implement the vector form used by the BBS+
//! proof of knowledge; [`discrete_log`] has the single-witness form used for proving
//! knowledge of a secret key in a public key.

use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{cfg_iter, io::Write, ops::Add, vec::Vec};
use digest::Digest;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SchnorrError;
use crypto_utils::{
    expect_equality, hashing_utils::field_elem_from_try_and_incr, serde_utils::ArkObjectBytes,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub mod discrete_log;
pub mod error;

/// Implemented by protocols that feed bytes into a combined Fiat-Shamir challenge
pub trait SchnorrChallengeContributor {
    fn challenge_contribution<W: Write>(&self, writer: W) -> Result<(), SchnorrError>;
}

/// Step-1 commitment to the blindings, one blinding per witness
#[serde_as]
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    Zeroize,
    ZeroizeOnDrop,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct SchnorrCommitment<G: AffineRepr> {
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub blindings: Vec<G::ScalarField>,
    /// `bases[0]*blindings[0] + ... + bases[k]*blindings[k]`
    #[zeroize(skip)]
    #[serde_as(as = "ArkObjectBytes")]
    pub t: G,
}

impl<G: AffineRepr> SchnorrCommitment<G> {
    pub fn new(bases: &[G], blindings: Vec<G::ScalarField>) -> Self {
        let t = G::Group::msm_unchecked(bases, &blindings).into_affine();
        Self { blindings, t }
    }

    /// Step-3 responses, `s_i = r_i + x_i*c`
    pub fn response(
        &self,
        witnesses: &[G::ScalarField],
        challenge: &G::ScalarField,
    ) -> Result<SchnorrResponse<G>, SchnorrError> {
        expect_equality!(
            self.blindings.len(),
            witnesses.len(),
            SchnorrError::ExpectedSameSizeSequences
        );
        let responses = cfg_iter!(self.blindings)
            .zip(cfg_iter!(witnesses))
            .map(|(b, w)| *b + (*w * *challenge))
            .collect::<Vec<_>>();
        Ok(SchnorrResponse(responses))
    }
}

impl<G: AffineRepr> SchnorrChallengeContributor for SchnorrCommitment<G> {
    /// Only the commitment `t` is written; the bases and the instance `y` must be fed
    /// into the challenge by the caller.
    fn challenge_contribution<W: Write>(&self, writer: W) -> Result<(), SchnorrError> {
        self.t.serialize_compressed(writer).map_err(|e| e.into())
    }
}

/// Step-3 responses, one per witness
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SchnorrResponse<G: AffineRepr>(
    #[serde_as(as = "Vec<ArkObjectBytes>")] pub Vec<G::ScalarField>,
);

impl<G: AffineRepr> SchnorrResponse<G> {
    /// Check `bases[0]*responses[0] + ... + bases[k]*responses[k] - y*challenge == t`
    pub fn is_valid(
        &self,
        bases: &[G],
        y: &G,
        t: &G,
        challenge: &G::ScalarField,
    ) -> Result<(), SchnorrError> {
        expect_equality!(
            self.0.len(),
            bases.len(),
            SchnorrError::ExpectedSameSizeSequences
        );
        if (G::Group::msm_unchecked(bases, &self.0)
            .add(y.mul_bigint((-*challenge).into_bigint())))
        .into_affine()
            == *t
        {
            Ok(())
        } else {
            Err(SchnorrError::InvalidResponse)
        }
    }

    pub fn get_response(&self, idx: usize) -> Result<&G::ScalarField, SchnorrError> {
        if idx >= self.0.len() {
            Err(SchnorrError::IndexOutOfBounds(idx, self.0.len()))
        } else {
            Ok(&self.0[idx])
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Derive a Fiat-Shamir challenge by hashing the accumulated transcript bytes
pub fn compute_random_oracle_challenge<F: PrimeField, D: Digest>(challenge_bytes: &[u8]) -> F {
    field_elem_from_try_and_incr::<F, D>(challenge_bytes)
}
