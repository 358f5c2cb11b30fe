//! Proof of knowledge of a single discrete log, i.e. of `x` in `y = base * x`, as a
//! one-base instance of the vector protocol at the crate root. Used for proving
//! knowledge of a secret key in a public key.

use crate::{error::SchnorrError, SchnorrCommitment, SchnorrResponse};
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{io::Write, vec};
use core::slice;
use crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Pre-challenge state of the protocol. Holds the witness so must not leave the prover.
#[serde_as]
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
    ZeroizeOnDrop,
)]
#[serde(bound = "")]
pub struct PokDiscreteLogProtocol<G: AffineRepr> {
    commitment: SchnorrCommitment<G>,
    #[serde_as(as = "ArkObjectBytes")]
    witness: G::ScalarField,
}

/// Proof of knowledge of the discrete log
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct PokDiscreteLog<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub announcement: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub response: G::ScalarField,
}

/// Feed the public instance `(base, y)` and the prover's announcement into a
/// Fiat-Shamir transcript
pub fn challenge_transcript<G: AffineRepr, W: Write>(
    base: &G,
    y: &G,
    announcement: &G,
    mut writer: W,
) -> Result<(), SchnorrError> {
    for point in [base, y, announcement] {
        point.serialize_compressed(&mut writer)?;
    }
    Ok(())
}

impl<G: AffineRepr> PokDiscreteLogProtocol<G> {
    pub fn init(witness: G::ScalarField, blinding: G::ScalarField, base: &G) -> Self {
        Self {
            commitment: SchnorrCommitment::new(slice::from_ref(base), vec![blinding]),
            witness,
        }
    }

    pub fn challenge_contribution<W: Write>(
        &self,
        base: &G,
        y: &G,
        writer: W,
    ) -> Result<(), SchnorrError> {
        challenge_transcript(base, y, &self.commitment.t, writer)
    }

    pub fn gen_proof(self, challenge: &G::ScalarField) -> PokDiscreteLog<G> {
        let response = self.commitment.blindings[0] + (self.witness * *challenge);
        PokDiscreteLog {
            announcement: self.commitment.t,
            response,
        }
    }
}

impl<G: AffineRepr> PokDiscreteLog<G> {
    pub fn challenge_contribution<W: Write>(
        &self,
        base: &G,
        y: &G,
        writer: W,
    ) -> Result<(), SchnorrError> {
        challenge_transcript(base, y, &self.announcement, writer)
    }

    /// Accept iff `base * response - y * challenge` equals the announcement
    pub fn verify(&self, y: &G, base: &G, challenge: &G::ScalarField) -> bool {
        SchnorrResponse(vec![self.response])
            .is_valid(slice::from_ref(base), y, &self.announcement, challenge)
            .is_ok()
    }
}
