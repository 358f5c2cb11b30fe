#![allow(non_snake_case)]

//! Proof of knowledge of a signature with selective disclosure of the signed messages,
//! section 4.5 of the paper. The signature is randomized and two Schnorr proofs tie the
//! randomization and the hidden messages together:
//! - relation 1: `A_bar - d = A' * -e + h_0 * r2`
//! - relation 2: `g_1 + sum(h_i * m_i)` over disclosed `i` equals
//!   `d * r3 - h_0 * s' - sum(h_j * m_j)` over hidden `j`, proven with the negations
//!   moved to the public side so hidden messages keep positive exponents
//!
//! The protocol runs in two phases: `init` produces the commitments feeding the
//! Fiat-Shamir challenge and `gen_proof` finishes after the challenge is fixed.
//! Several protocol instances can share one challenge, which makes proofs over
//! multiple credentials linkable by shared message responses.

use crate::{
    error::BBSPlusError,
    setup::{PublicKeyG2, SignatureParamsG1},
    signature::SignatureG1,
};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{Field, One, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    collections::{BTreeMap, BTreeSet},
    io::Write,
    ops::Neg,
    rand::RngCore,
    vec,
    vec::Vec,
    UniformRand,
};
use crypto_utils::serde_utils::ArkObjectBytes;
use schnorr_pok::{SchnorrCommitment, SchnorrResponse};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Pre-challenge state. Holds the Schnorr witnesses, so it must stay with the prover;
/// only the commitments inside feed the challenge.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PoKOfSignatureG1Protocol<E: Pairing> {
    #[zeroize(skip)]
    pub A_prime: E::G1Affine,
    #[zeroize(skip)]
    pub A_bar: E::G1Affine,
    #[zeroize(skip)]
    pub d: E::G1Affine,
    /// For relation 1
    pub sc_comm_1: SchnorrCommitment<E::G1Affine>,
    sc_wits_1: [E::ScalarField; 2],
    /// For relation 2
    pub sc_comm_2: SchnorrCommitment<E::G1Affine>,
    sc_wits_2: Vec<E::ScalarField>,
}

/// Proof of knowledge of a signature over a multi-message, disclosing an arbitrary
/// subset of the messages
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct PoKOfSignatureG1Proof<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub A_prime: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub A_bar: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub d: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub T1: E::G1Affine,
    pub sc_resp_1: SchnorrResponse<E::G1Affine>,
    #[serde_as(as = "ArkObjectBytes")]
    pub T2: E::G1Affine,
    pub sc_resp_2: SchnorrResponse<E::G1Affine>,
}

impl<E: Pairing> PoKOfSignatureG1Protocol<E> {
    /// Start the protocol: randomize the signature and commit to the blindings of both
    /// Schnorr relations. `blindings` can fix the blinding of chosen messages, which
    /// makes their responses equal across proofs sharing a challenge; missing blindings
    /// are sampled here. Blindings passed for revealed messages are ignored.
    pub fn init<R: RngCore>(
        rng: &mut R,
        signature: &SignatureG1<E>,
        params: &SignatureParamsG1<E>,
        messages: &[E::ScalarField],
        mut blindings: BTreeMap<usize, E::ScalarField>,
        revealed_msg_indices: BTreeSet<usize>,
    ) -> Result<Self, BBSPlusError> {
        if messages.len() != params.supported_message_count() {
            return Err(BBSPlusError::MessageCountIncompatibleWithSigParams(
                messages.len(),
                params.supported_message_count(),
            ));
        }
        for idx in &revealed_msg_indices {
            if *idx >= messages.len() {
                return Err(BBSPlusError::InvalidMessageIdx(*idx));
            }
        }

        for i in 0..messages.len() {
            if !revealed_msg_indices.contains(&i) && !blindings.contains_key(&i) {
                blindings.insert(i, E::ScalarField::rand(rng));
            }
        }

        let mut r1 = E::ScalarField::rand(rng);
        while r1.is_zero() {
            r1 = E::ScalarField::rand(rng);
        }
        let r2 = E::ScalarField::rand(rng);
        // r1 is nonzero
        let r3 = r1.inverse().unwrap();

        let b = params.b(messages.iter().enumerate().collect(), &signature.s)?;

        // A' = A * r1
        let A_prime = signature.A.mul_bigint(r1.into_bigint());
        // A_bar = b * r1 - A' * e
        let b_r1 = b * r1;
        let A_bar = b_r1 - (A_prime * signature.e);
        // d = b * r1 - h_0 * r2
        let d = b_r1 - params.h_0.mul_bigint(r2.into_bigint());
        let mut affine = E::G1::normalize_batch(&[A_prime, A_bar, d]);
        let d_affine = affine.pop().unwrap();
        let A_bar_affine = affine.pop().unwrap();
        let A_prime_affine = affine.pop().unwrap();
        // s' = s - r2 * r3
        let s_prime = signature.s - (r2 * r3);

        let bases_1 = [A_prime_affine, params.h_0];
        let wits_1 = [-signature.e, r2];
        let sc_comm_1 = SchnorrCommitment::new(
            &bases_1,
            vec![E::ScalarField::rand(rng), E::ScalarField::rand(rng)],
        );

        let hidden_count = messages.len() - revealed_msg_indices.len();
        let mut bases_2 = Vec::with_capacity(2 + hidden_count);
        let mut scalars_2 = Vec::with_capacity(2 + hidden_count);
        let mut wits_2 = Vec::with_capacity(2 + hidden_count);
        bases_2.push(d_affine);
        scalars_2.push(E::ScalarField::rand(rng));
        wits_2.push(-r3);
        bases_2.push(params.h_0);
        scalars_2.push(E::ScalarField::rand(rng));
        wits_2.push(s_prime);
        for (i, message) in messages.iter().enumerate() {
            if !revealed_msg_indices.contains(&i) {
                bases_2.push(params.h[i]);
                scalars_2.push(blindings.remove(&i).unwrap());
                wits_2.push(*message);
            }
        }
        let sc_comm_2 = SchnorrCommitment::new(&bases_2, scalars_2);

        Ok(Self {
            A_prime: A_prime_affine,
            A_bar: A_bar_affine,
            d: d_affine,
            sc_comm_1,
            sc_wits_1: wits_1,
            sc_comm_2,
            sc_wits_2: wits_2,
        })
    }

    /// The prover's contribution to a combined Fiat-Shamir challenge
    pub fn challenge_contribution<W: Write>(
        &self,
        revealed_msgs: &BTreeMap<usize, E::ScalarField>,
        params: &SignatureParamsG1<E>,
        writer: W,
    ) -> Result<(), BBSPlusError> {
        Self::compute_challenge_contribution(
            &self.A_prime,
            &self.A_bar,
            &self.d,
            &self.sc_comm_1.t,
            &self.sc_comm_2.t,
            revealed_msgs,
            params,
            writer,
        )
    }

    /// Finish after the challenge is fixed
    pub fn gen_proof(
        self,
        challenge: &E::ScalarField,
    ) -> Result<PoKOfSignatureG1Proof<E>, BBSPlusError> {
        let resp_1 = self.sc_comm_1.response(&self.sc_wits_1, challenge)?;
        let resp_2 = self.sc_comm_2.response(&self.sc_wits_2, challenge)?;
        Ok(PoKOfSignatureG1Proof {
            A_prime: self.A_prime,
            A_bar: self.A_bar,
            d: self.d,
            T1: self.sc_comm_1.t,
            sc_resp_1: resp_1,
            T2: self.sc_comm_2.t,
            sc_resp_2: resp_2,
        })
    }

    /// Serializes the randomized signature, both Schnorr commitments and the public
    /// parts of both relations, binding the revealed messages
    pub fn compute_challenge_contribution<W: Write>(
        A_prime: &E::G1Affine,
        A_bar: &E::G1Affine,
        d: &E::G1Affine,
        T1: &E::G1Affine,
        T2: &E::G1Affine,
        revealed_msgs: &BTreeMap<usize, E::ScalarField>,
        params: &SignatureParamsG1<E>,
        mut writer: W,
    ) -> Result<(), BBSPlusError> {
        A_bar.serialize_compressed(&mut writer)?;

        // Relation 1
        A_prime.serialize_compressed(&mut writer)?;
        params.h_0.serialize_compressed(&mut writer)?;
        let A_bar_minus_d = (A_bar.into_group() - d.into_group()).into_affine();
        A_bar_minus_d.serialize_compressed(&mut writer)?;
        T1.serialize_compressed(&mut writer)?;

        // Relation 2, `g1 + sum(h_i * m_i)` over the disclosed messages
        let mut bases_disclosed = Vec::with_capacity(1 + revealed_msgs.len());
        let mut exponents = Vec::with_capacity(1 + revealed_msgs.len());
        params.g1.serialize_compressed(&mut writer)?;
        bases_disclosed.push(params.g1);
        exponents.push(E::ScalarField::one());
        for (i, msg) in revealed_msgs {
            if *i >= params.h.len() {
                return Err(BBSPlusError::InvalidMessageIdx(*i));
            }
            params.h[*i].serialize_compressed(&mut writer)?;
            msg.serialize_compressed(&mut writer)?;
            bases_disclosed.push(params.h[*i]);
            exponents.push(*msg);
        }
        E::G1::msm_unchecked(&bases_disclosed, &exponents)
            .serialize_compressed(&mut writer)?;
        T2.serialize_compressed(&mut writer).map_err(|e| e.into())
    }
}

impl<E: Pairing> PoKOfSignatureG1Proof<E> {
    /// Verify the proof against the public key and the revealed messages, given the
    /// challenge both sides derived from the transcript
    pub fn verify(
        &self,
        revealed_msgs: &BTreeMap<usize, E::ScalarField>,
        challenge: &E::ScalarField,
        pk: &PublicKeyG2<E>,
        params: &SignatureParamsG1<E>,
    ) -> Result<(), BBSPlusError> {
        if self.A_prime.is_zero() {
            return Err(BBSPlusError::ZeroSignature);
        }

        // The randomized signature still satisfies the pairing equation:
        // e(A', W) == e(A_bar, g2)
        if !E::multi_pairing(
            [self.A_prime, self.A_bar.into_group().neg().into_affine()],
            [pk.0, params.g2],
        )
        .is_zero()
        {
            return Err(BBSPlusError::PairingCheckFailed);
        }

        // Relation 1: A_bar - d over bases [A', h_0]
        let bases_1 = [self.A_prime, params.h_0];
        let A_bar_minus_d = (self.A_bar.into_group() - self.d.into_group()).into_affine();
        if self
            .sc_resp_1
            .is_valid(&bases_1, &A_bar_minus_d, &self.T1, challenge)
            .is_err()
        {
            return Err(BBSPlusError::FirstSchnorrVerificationFailed);
        }

        // Relation 2: -(g1 + sum(h_i * m_i)) over bases [d, h_0, hidden h_j]
        let mut bases_2 =
            Vec::with_capacity(2 + params.supported_message_count() - revealed_msgs.len());
        bases_2.push(self.d);
        bases_2.push(params.h_0);
        let mut bases_disclosed = Vec::with_capacity(1 + revealed_msgs.len());
        let mut exponents = Vec::with_capacity(1 + revealed_msgs.len());
        bases_disclosed.push(params.g1);
        exponents.push(E::ScalarField::one());
        for i in 0..params.supported_message_count() {
            if let Some(message) = revealed_msgs.get(&i) {
                bases_disclosed.push(params.h[i]);
                exponents.push(*message);
            } else {
                bases_2.push(params.h[i]);
            }
        }
        let pr = E::G1::msm_unchecked(&bases_disclosed, &exponents)
            .neg()
            .into_affine();
        if self
            .sc_resp_2
            .is_valid(&bases_2, &pr, &self.T2, challenge)
            .is_err()
        {
            return Err(BBSPlusError::SecondSchnorrVerificationFailed);
        }

        Ok(())
    }

    /// For the verifier to independently derive the challenge
    pub fn challenge_contribution<W: Write>(
        &self,
        revealed_msgs: &BTreeMap<usize, E::ScalarField>,
        params: &SignatureParamsG1<E>,
        writer: W,
    ) -> Result<(), BBSPlusError> {
        PoKOfSignatureG1Protocol::compute_challenge_contribution(
            &self.A_prime,
            &self.A_bar,
            &self.d,
            &self.T1,
            &self.T2,
            revealed_msgs,
            params,
            writer,
        )
    }

    /// Schnorr response of the message at `msg_idx`, used to check message equality
    /// across proofs sharing a challenge
    pub fn get_resp_for_message(
        &self,
        msg_idx: usize,
        revealed_msg_ids: &BTreeSet<usize>,
    ) -> Result<&E::ScalarField, BBSPlusError> {
        // Revealed messages are not part of the Schnorr protocol
        if revealed_msg_ids.contains(&msg_idx) {
            return Err(BBSPlusError::InvalidMsgIdxForResponse(msg_idx));
        }
        // Shift the index past the revealed messages and the 2 fixed witnesses
        let mut adjusted_idx = 2 + msg_idx;
        for i in revealed_msg_ids {
            if *i < msg_idx {
                adjusted_idx -= 1;
            }
        }
        let r = self.sc_resp_2.get_response(adjusted_idx)?;
        Ok(r)
    }
}
