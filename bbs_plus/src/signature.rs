#![allow(non_snake_case)]

//! Signature creation and verification, section 4.3 of the paper.
//!
//! ```ignore
//! use ark_bls12_381::Bls12_381;
//! use blake2::Blake2b512;
//! use bbs_plus::setup::{SignatureParamsG1, Keypair};
//! use bbs_plus::signature::SignatureG1;
//!
//! let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(5).unwrap();
//! let keypair = Keypair::<Bls12_381>::generate_using_rng(&mut rng, &params);
//!
//! // `messages` are scalar field elements
//! let sig = SignatureG1::<Bls12_381>::new(&mut rng, &messages, &keypair.secret_key, &params).unwrap();
//! sig.verify(&messages, &keypair.public_key, &params).unwrap();
//!
//! // For a partially blind signature, the requester commits to the messages hidden
//! // from the signer and proves knowledge of the commitment opening (not shown):
//! let commitment = params.commit_to_messages(committed_messages, &blinding).unwrap();
//! let blinded_sig = SignatureG1::<Bls12_381>::new_with_committed_messages(
//!     &mut rng, &commitment, uncommitted_messages, &keypair.secret_key, &params,
//! ).unwrap();
//! let sig = blinded_sig.unblind(&blinding);
//! sig.verify(&messages, &keypair.public_key, &params).unwrap();
//! ```

use crate::{
    error::BBSPlusError,
    setup::{PublicKeyG2, SecretKey, SignatureParamsG1},
};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{Field, PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{collections::BTreeMap, ops::Neg, rand::RngCore, UniformRand};
use crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::Zeroize;

/// Signature of the signer over a multi-message. Serializes to 112 bytes compressed:
/// 48 for `A`, 32 each for `e` and `s`.
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SignatureG1<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub A: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub e: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub s: E::ScalarField,
}

impl<E: Pairing> SignatureG1<E> {
    /// Create a signature with all messages known to the signer
    pub fn new<R: RngCore>(
        rng: &mut R,
        messages: &[E::ScalarField],
        sk: &SecretKey<E::ScalarField>,
        params: &SignatureParamsG1<E>,
    ) -> Result<Self, BBSPlusError> {
        if messages.is_empty() {
            return Err(BBSPlusError::NoMessageToSign);
        }
        if messages.len() != params.supported_message_count() {
            return Err(BBSPlusError::MessageCountIncompatibleWithSigParams(
                messages.len(),
                params.supported_message_count(),
            ));
        }
        let msg_map: BTreeMap<usize, &E::ScalarField> = messages.iter().enumerate().collect();
        Self::new_with_committed_messages(rng, &E::G1Affine::zero(), msg_map, sk, params)
    }

    /// Create a (partially) blind signature where the messages missing from
    /// `uncommitted_messages` are hidden from the signer inside `commitment`.
    /// E.g. when signing `[m_0, m_1, m_2, m_3]` with `m_0`, `m_2` committed by the
    /// requester, `uncommitted_messages` is `(1 -> m_1), (3 -> m_3)`. The signer is
    /// assumed to have checked a proof of knowledge of the commitment opening.
    pub fn new_with_committed_messages<R: RngCore>(
        rng: &mut R,
        commitment: &E::G1Affine,
        uncommitted_messages: BTreeMap<usize, &E::ScalarField>,
        sk: &SecretKey<E::ScalarField>,
        params: &SignatureParamsG1<E>,
    ) -> Result<Self, BBSPlusError> {
        if uncommitted_messages.is_empty() {
            return Err(BBSPlusError::NoMessageToSign);
        }
        // `>` since the commitment carries the remaining messages
        if uncommitted_messages.len() > params.supported_message_count() {
            return Err(BBSPlusError::MessageCountIncompatibleWithSigParams(
                uncommitted_messages.len(),
                params.supported_message_count(),
            ));
        }

        let s = E::ScalarField::rand(rng);
        // Signature on the known messages, `b = g_1 + h_0 * s + sum(h_i * m_i)`
        let b = params.b(uncommitted_messages, &s)?;

        // Resample `e` in the (cryptographically unreachable) case `x + e = 0`
        let mut e = E::ScalarField::rand(rng);
        let mut e_plus_x_inv = (e + sk.0).inverse();
        while e_plus_x_inv.is_none() {
            e = E::ScalarField::rand(rng);
            e_plus_x_inv = (e + sk.0).inverse();
        }
        let mut e_plus_x_inv = e_plus_x_inv.unwrap();

        // A = (commitment + b) * 1/(e + x)
        let A = (b + commitment) * e_plus_x_inv;
        e_plus_x_inv.zeroize();
        Ok(Self {
            A: A.into_affine(),
            e,
            s,
        })
    }

    /// Used by the requester to unblind a blind signature received from a signer
    pub fn unblind(self, blinding: &E::ScalarField) -> Self {
        Self {
            A: self.A,
            s: self.s + blinding,
            e: self.e,
        }
    }

    /// Check the pairing equation `e(A, W + g2 * e) = e(b, g2)`. Deterministic in all
    /// its inputs.
    pub fn verify(
        &self,
        messages: &[E::ScalarField],
        pk: &PublicKeyG2<E>,
        params: &SignatureParamsG1<E>,
    ) -> Result<(), BBSPlusError> {
        if messages.is_empty() {
            return Err(BBSPlusError::NoMessageToSign);
        }
        if messages.len() != params.supported_message_count() {
            return Err(BBSPlusError::MessageCountIncompatibleWithSigParams(
                messages.len(),
                params.supported_message_count(),
            ));
        }
        if !self.is_non_zero() {
            return Err(BBSPlusError::ZeroSignature);
        }

        let b = params.b(messages.iter().enumerate().collect(), &self.s)?;
        // W + g2 * e
        let g2_e = (params.g2.mul_bigint(self.e.into_bigint()) + pk.0).into_affine();
        // e(A, W + g2*e) * e(-b, g2) == 1
        if !E::multi_pairing(
            [self.A, b.neg().into_affine()],
            [g2_e, params.g2],
        )
        .is_zero()
        {
            return Err(BBSPlusError::InvalidSignature);
        }
        Ok(())
    }

    /// The identity element is never a valid signature
    pub fn is_non_zero(&self) -> bool {
        !self.A.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::Keypair;
    use ark_bls12_381::Bls12_381;
    use ark_std::{
        collections::BTreeSet,
        rand::{rngs::StdRng, SeedableRng},
    };
    use blake2::Blake2b512;
    use test_utils::{test_serialization, Fr};

    #[test]
    fn signature_verification() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let message_count = 20;
        let messages: Vec<Fr> = (0..message_count).map(|_| Fr::rand(&mut rng)).collect();

        let params =
            SignatureParamsG1::<Bls12_381>::generate_using_rng(&mut rng, message_count).unwrap();
        let keypair = Keypair::<Bls12_381>::generate_using_rng(&mut rng, &params);

        let sig =
            SignatureG1::<Bls12_381>::new(&mut rng, &messages, &keypair.secret_key, &params)
                .unwrap();
        sig.verify(&messages, &keypair.public_key, &params).unwrap();

        // Verification is deterministic
        sig.verify(&messages, &keypair.public_key, &params).unwrap();

        // Tampering with any message fails verification
        let mut tampered = messages.clone();
        tampered[3] += Fr::from(1u64);
        assert!(sig.verify(&tampered, &keypair.public_key, &params).is_err());

        // A signature with identity `A` is rejected
        let mut zero_sig = sig.clone();
        zero_sig.A = <Bls12_381 as Pairing>::G1Affine::zero();
        assert!(matches!(
            zero_sig
                .verify(&messages, &keypair.public_key, &params)
                .unwrap_err(),
            BBSPlusError::ZeroSignature
        ));

        // Wrong message count
        assert!(sig
            .verify(&messages[1..], &keypair.public_key, &params)
            .is_err());

        test_serialization!(SignatureG1<Bls12_381>, sig);

        // Compressed signature is A || e || s, 112 bytes
        let mut bytes = vec![];
        sig.serialize_compressed(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 112);
    }

    #[test]
    fn blind_signature() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let message_count = 10;
        let messages: Vec<Fr> = (0..message_count).map(|_| Fr::rand(&mut rng)).collect();

        let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(message_count).unwrap();
        let keypair = Keypair::<Bls12_381>::generate_using_rng(&mut rng, &params);

        // Requester hides messages 0, 1, 4, 9 in a commitment
        let blinding = Fr::rand(&mut rng);
        let committed_indices = [0usize, 1, 4, 9].into_iter().collect::<BTreeSet<_>>();
        let committed_messages = committed_indices
            .iter()
            .map(|i| (*i, &messages[*i]))
            .collect::<BTreeMap<_, _>>();
        let commitment = params
            .commit_to_messages(committed_messages, &blinding)
            .unwrap();

        let uncommitted_messages = messages
            .iter()
            .enumerate()
            .filter(|(i, _)| !committed_indices.contains(i))
            .collect::<BTreeMap<_, _>>();

        let blinded_sig = SignatureG1::<Bls12_381>::new_with_committed_messages(
            &mut rng,
            &commitment,
            uncommitted_messages,
            &keypair.secret_key,
            &params,
        )
        .unwrap();

        // Fails until unblinded
        assert!(blinded_sig
            .verify(&messages, &keypair.public_key, &params)
            .is_err());

        let sig = blinded_sig.unblind(&blinding);
        sig.verify(&messages, &keypair.public_key, &params).unwrap();
    }

    #[test]
    fn out_of_bounds_commitment_index() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(3).unwrap();
        let m = Fr::rand(&mut rng);
        let blinding = Fr::rand(&mut rng);
        let mut msgs = BTreeMap::new();
        msgs.insert(5usize, &m);
        assert!(matches!(
            params.commit_to_messages(msgs, &blinding).unwrap_err(),
            BBSPlusError::MessageIndexOutOfBounds(5, 3)
        ));
    }
}
