#![allow(non_snake_case)]

//! Setup parameters and keys.
//!
//! All generators are derived by hashing a public label so that no discrete log
//! relations between them are known. The message generators `h_0, h_1, ..., h_L` use
//! the fixed domain tag [`GENERATOR_DOMAIN_TAG`] concatenated with the little-endian
//! encoding of their index.
//!
//! ```ignore
//! use ark_bls12_381::Bls12_381;
//! use blake2::Blake2b512;
//! use bbs_plus::setup::{SignatureParamsG1, Keypair, SecretKey, PublicKeyG2};
//!
//! let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(5).unwrap();
//! let keypair = Keypair::<Bls12_381>::generate_using_rng(&mut rng, &params);
//!
//! // Or deterministically from a secret seed
//! let sk = SecretKey::generate_using_seed::<Blake2b512>(&seed);
//! let pk = PublicKeyG2::generate_using_secret_key(&sk, &params);
//! ```

use crate::error::BBSPlusError;
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{
    field_hashers::{DefaultFieldHasher, HashToField},
    PrimeField,
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    cfg_into_iter, cfg_iter, collections::BTreeMap, rand::RngCore, vec::Vec, UniformRand,
};
use digest::{Digest, DynDigest};
use zeroize::Zeroize;

use crypto_utils::{
    concat_slices, hashing_utils::projective_group_elem_from_try_and_incr,
    serde_utils::ArkObjectBytes,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Domain tag all message generators are derived under
pub const GENERATOR_DOMAIN_TAG: &[u8; 11] = b"BBS+-GEN-v1";

/// Secret key of the signer, a nonzero scalar
#[serde_as]
#[derive(
    Clone,
    PartialEq,
    Eq,
    Debug,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
    Zeroize,
)]
pub struct SecretKey<F: PrimeField>(#[serde_as(as = "ArkObjectBytes")] pub F);

impl<F: PrimeField> Drop for SecretKey<F> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<F: PrimeField> SecretKey<F> {
    pub fn generate_using_rng<R: RngCore>(rng: &mut R) -> Self {
        let mut secret = F::rand(rng);
        while secret.is_zero() {
            secret = F::rand(rng);
        }
        Self(secret)
    }

    /// The same seed deterministically yields the same key
    pub fn generate_using_seed<D>(seed: &[u8]) -> Self
    where
        D: Default + DynDigest + Clone,
    {
        let hasher = <DefaultFieldHasher<D> as HashToField<F>>::new(b"BBS-SIG-KEYGEN-SALT");
        Self(hasher.hash_to_field(seed, 1).pop().unwrap())
    }
}

/// Signature params used while signing, verifying and proving knowledge of a signature.
/// Several signers can share the same params when signing multi-messages of the same
/// size, each with its own key. Size of the params is proportional to the number of
/// messages.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct SignatureParamsG1<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub g1: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub g2: E::G2Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub h_0: E::G1Affine,
    /// One generator per message of the multi-message
    #[serde_as(as = "Vec<ArkObjectBytes>")]
    pub h: Vec<E::G1Affine>,
}

impl<E: Pairing> SignatureParamsG1<E> {
    /// Generate params deterministically under the fixed generator domain tag. The
    /// hashing is not constant time, which is fine since everything hashed is public.
    pub fn new<D: Digest>(message_count: usize) -> Result<Self, BBSPlusError> {
        Self::new_using_label::<D>(GENERATOR_DOMAIN_TAG, message_count)
    }

    /// Generate params under a caller-chosen label
    pub fn new_using_label<D: Digest>(
        label: &[u8],
        message_count: usize,
    ) -> Result<Self, BBSPlusError> {
        if message_count == 0 {
            return Err(BBSPlusError::NoMessageToSign);
        }
        // h_0 at index 0, h_i at index i
        let mut h = cfg_into_iter!((0..=message_count))
            .map(|i| {
                projective_group_elem_from_try_and_incr::<E::G1Affine, D>(&concat_slices![
                    label,
                    (i as u32).to_le_bytes()
                ])
            })
            .collect::<Vec<E::G1>>();
        h.insert(
            0,
            projective_group_elem_from_try_and_incr::<E::G1Affine, D>(&concat_slices![
                label, b" : g1"
            ]),
        );
        let mut h = E::G1::normalize_batch(&h);
        let g1 = h.remove(0);
        let h_0 = h.remove(0);

        let g2 = projective_group_elem_from_try_and_incr::<E::G2Affine, D>(&concat_slices![
            label, b" : g2"
        ])
        .into_affine();
        Ok(Self { g1, g2, h_0, h })
    }

    /// Random params, only useful in tests
    pub fn generate_using_rng<R: RngCore>(
        rng: &mut R,
        message_count: usize,
    ) -> Result<Self, BBSPlusError> {
        if message_count == 0 {
            return Err(BBSPlusError::NoMessageToSign);
        }
        let h = (0..message_count)
            .map(|_| E::G1::rand(rng))
            .collect::<Vec<E::G1>>();
        Ok(Self {
            g1: E::G1::rand(rng).into_affine(),
            g2: E::G2::rand(rng).into_affine(),
            h_0: E::G1::rand(rng).into_affine(),
            h: E::G1::normalize_batch(&h),
        })
    }

    /// A verifier must check validity before using params received from elsewhere
    pub fn is_valid(&self) -> bool {
        !(self.g1.is_zero()
            || self.g2.is_zero()
            || self.h_0.is_zero()
            || cfg_iter!(self.h).any(|v| v.is_zero()))
    }

    pub fn supported_message_count(&self) -> usize {
        self.h.len()
    }

    /// Pedersen commitment `h_0 * blinding + sum(h_i * m_i)` over the given subset of
    /// messages, keyed by 0-based message index. Used for blind signature requests and
    /// inside the proof of knowledge.
    pub fn commit_to_messages(
        &self,
        messages: BTreeMap<usize, &E::ScalarField>,
        blinding: &E::ScalarField,
    ) -> Result<E::G1Affine, BBSPlusError> {
        let mut bases = Vec::with_capacity(1 + messages.len());
        let mut scalars = Vec::with_capacity(1 + messages.len());
        for (i, msg) in messages {
            if i >= self.h.len() {
                return Err(BBSPlusError::MessageIndexOutOfBounds(i, self.h.len()));
            }
            bases.push(self.h[i]);
            scalars.push(*msg);
        }
        bases.push(self.h_0);
        scalars.push(*blinding);
        Ok(E::G1::msm_unchecked(&bases, &scalars).into_affine())
    }

    /// `b` from the paper, `g_1 + h_0 * s + sum(h_i * m_i)`, equivalently `A * (e + x)`
    pub fn b(
        &self,
        messages: BTreeMap<usize, &E::ScalarField>,
        s: &E::ScalarField,
    ) -> Result<E::G1, BBSPlusError> {
        let commitment = self.commit_to_messages(messages, s)?;
        Ok(commitment + self.g1)
    }
}

/// Public key of the signer, `g2 * secret_key`
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct PublicKeyG2<E: Pairing>(#[serde_as(as = "ArkObjectBytes")] pub E::G2Affine);

impl<E: Pairing> PublicKeyG2<E> {
    pub fn generate_using_secret_key(
        secret_key: &SecretKey<E::ScalarField>,
        params: &SignatureParamsG1<E>,
    ) -> Self {
        Self(params.g2.mul_bigint(secret_key.0.into_bigint()).into_affine())
    }

    /// A verifier must reject the identity element before use
    pub fn is_valid(&self) -> bool {
        !self.0.is_zero()
    }
}

#[derive(
    Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct Keypair<E: Pairing> {
    pub secret_key: SecretKey<E::ScalarField>,
    pub public_key: PublicKeyG2<E>,
}

impl<E: Pairing> Keypair<E> {
    pub fn generate_using_rng<R: RngCore>(rng: &mut R, params: &SignatureParamsG1<E>) -> Self {
        let secret_key = SecretKey::generate_using_rng(rng);
        let public_key = PublicKeyG2::generate_using_secret_key(&secret_key, params);
        Self {
            secret_key,
            public_key,
        }
    }

    pub fn generate_using_seed<D>(seed: &[u8], params: &SignatureParamsG1<E>) -> Self
    where
        D: DynDigest + Default + Clone,
    {
        let secret_key = SecretKey::<E::ScalarField>::generate_using_seed::<D>(seed);
        let public_key = PublicKeyG2::generate_using_secret_key(&secret_key, params);
        Self {
            secret_key,
            public_key,
        }
    }
}
