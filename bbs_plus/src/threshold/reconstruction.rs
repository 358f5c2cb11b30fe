//! Combining signature shares into a complete signature. `e` and `s` interpolate in
//! the scalar field, `A` in the exponent of G1. The combiner verifies the result
//! before release and stays silent about which share was bad when verification fails,
//! there is no identifiable abort.

use ark_ec::{pairing::Pairing, CurveGroup, VariableBaseMSM};
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use secret_sharing::common::{lagrange_basis_at_0_for_all, ParticipantId, ShareId};

use super::SessionId;
use crate::{
    error::BBSPlusError,
    setup::{PublicKeyG2, SignatureParamsG1},
    signature::SignatureG1,
};

/// One signer's contribution to a signature: its share of the signature element in the
/// group and its scalar shares of the nonces
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct SignatureShare<E: Pairing> {
    pub session_id: SessionId,
    pub id: ParticipantId,
    pub threshold: ShareId,
    #[serde_as(as = "ArkObjectBytes")]
    pub A: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub e: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub s: E::ScalarField,
}

impl<E: Pairing> SignatureShare<E> {
    /// Interpolate the shares at 0. Needs shares from `2 * threshold - 1` distinct
    /// signers of the same session.
    pub fn combine(shares: &[Self]) -> Result<SignatureG1<E>, BBSPlusError> {
        if shares.is_empty() {
            return Err(BBSPlusError::TooFewShares(0, 1));
        }
        let threshold = shares[0].threshold;
        let session_id = shares[0].session_id;
        if threshold == 0 {
            return Err(secret_sharing::error::SSError::InvalidThresholdOrTotal(
                threshold,
                shares.len() as u16,
            )
            .into());
        }
        let need = 2 * threshold - 1;
        if (shares.len() as u16) < need {
            return Err(BBSPlusError::TooFewShares(shares.len() as u16, need));
        }
        let mut ids = Vec::with_capacity(shares.len());
        for share in shares {
            if share.threshold != threshold {
                return Err(BBSPlusError::UnequalThresholdInShares(
                    threshold,
                    share.threshold,
                ));
            }
            if share.session_id != session_id {
                return Err(BBSPlusError::WrongSessionId);
            }
            if ids.contains(&share.id) {
                return Err(BBSPlusError::DuplicateShare(share.id));
            }
            ids.push(share.id);
        }

        let basis = lagrange_basis_at_0_for_all::<E::ScalarField>(ids)?;
        let mut e = E::ScalarField::zero();
        let mut s = E::ScalarField::zero();
        let mut elements = Vec::with_capacity(shares.len());
        for (lambda, share) in basis.iter().zip(shares.iter()) {
            e += *lambda * share.e;
            s += *lambda * share.s;
            elements.push(share.A);
        }
        let A = E::G1::msm_unchecked(&elements, &basis).into_affine();
        Ok(SignatureG1 { A, e, s })
    }

    /// Combine and gate the result on verification. A failure reveals only that the
    /// signature is invalid, not which share caused it.
    pub fn combine_and_verify(
        shares: &[Self],
        messages: &[E::ScalarField],
        pk: &PublicKeyG2<E>,
        params: &SignatureParamsG1<E>,
    ) -> Result<SignatureG1<E>, BBSPlusError> {
        let signature = Self::combine(shares)?;
        signature
            .verify(messages, pk, params)
            .map_err(|_| BBSPlusError::ReconstructedSignatureInvalid)?;
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::{
        inversion_phase::Phase2, new_session_id, randomness_phase::Phase1, SessionId,
    };
    use ark_bls12_381::Bls12_381;
    use ark_ec::AffineRepr;
    use ark_ff::PrimeField;
    use ark_std::{
        collections::{BTreeMap, BTreeSet},
        rand::{rngs::StdRng, SeedableRng},
        UniformRand,
    };
    use blake2::Blake2b512;
    use crypto_utils::commitment::PedersenCommitmentKey;
    use secret_sharing::{
        common::VerifiableShares,
        pedersen_dkg::{DkgOutput, Round1},
    };
    use test_utils::{test_serialization, Fr, G1, G2};

    /// All parties run the key-generating DKG, commitments in G1 and the public key
    /// in G2
    fn run_keygen(
        rng: &mut StdRng,
        threshold: u16,
        total: u16,
        comm_key: &PedersenCommitmentKey<G1>,
        params: &SignatureParamsG1<Bls12_381>,
    ) -> (Vec<DkgOutput<G2>>, PublicKeyG2<Bls12_381>) {
        let participants = (1..=total).collect::<BTreeSet<_>>();
        let mut round1s = vec![];
        let mut all_shares = vec![];
        let mut all_comms = vec![];
        for i in 1..=total {
            let (round1, shares, comms) =
                Round1::<G1>::init(rng, i, threshold, participants.clone(), comm_key).unwrap();
            round1s.push(round1);
            all_shares.push(shares);
            all_comms.push(comms);
        }
        for i in 0..total as usize {
            for j in 0..total as usize {
                if i != j {
                    let share = all_shares[j].get(&((i + 1) as u16)).unwrap().clone();
                    round1s[i]
                        .receive_share((j + 1) as u16, share, all_comms[j].clone(), comm_key)
                        .unwrap();
                }
            }
        }
        let mut round2s = vec![];
        let mut contributions = vec![];
        for round1 in round1s {
            let (round2, contribution) = round1
                .finish_with_public_key::<_, G2, Blake2b512>(rng, &params.g2, comm_key)
                .unwrap();
            round2s.push(round2);
            contributions.push(contribution);
        }
        for i in 0..total as usize {
            for j in 0..total as usize {
                if i != j {
                    round2s[i]
                        .receive_contribution::<Blake2b512>(&contributions[j], comm_key)
                        .unwrap();
                }
            }
        }
        let outputs: Vec<DkgOutput<G2>> =
            round2s.into_iter().map(|r| r.finish().unwrap()).collect();
        let pk = PublicKeyG2::<Bls12_381>(outputs[0].public_key);
        (outputs, pk)
    }

    /// The quorum signs `messages`, returning one share per signer
    fn run_signing_session(
        rng: &mut StdRng,
        session_id: SessionId,
        threshold: u16,
        quorum: &BTreeSet<u16>,
        key_outputs: &[DkgOutput<G2>],
        messages: &[Fr],
        params: &SignatureParamsG1<Bls12_381>,
        comm_key: &PedersenCommitmentKey<G1>,
    ) -> Vec<SignatureShare<Bls12_381>> {
        // Phase 1: nonce and mask sub-protocols
        let mut phase1s = BTreeMap::new();
        let mut broadcasts = BTreeMap::new();
        let mut unicasts = BTreeMap::new();
        for i in quorum.iter() {
            let (p, bcast, unis) =
                Phase1::<G1>::init(rng, session_id, *i, threshold, quorum.clone(), comm_key)
                    .unwrap();
            phase1s.insert(*i, p);
            broadcasts.insert(*i, bcast);
            unicasts.insert(*i, unis);
        }
        for i in quorum.iter() {
            for j in quorum.iter() {
                if i != j {
                    let bcast = broadcasts.get(j).unwrap().clone();
                    let uni = unicasts.get(j).unwrap().get(i).unwrap().clone();
                    phase1s
                        .get_mut(i)
                        .unwrap()
                        .receive_shares(&bcast, uni, comm_key)
                        .unwrap();
                }
            }
        }
        let mut phase2s = BTreeMap::new();
        let mut openings = BTreeMap::new();
        let mut products = BTreeMap::new();
        for (i, p) in phase1s {
            let (out, opening) = p.finish().unwrap();
            let x_share = key_outputs[(i - 1) as usize].share.secret_share;
            let (p2, product) = Phase2::init(&out, &x_share);
            phase2s.insert(i, p2);
            openings.insert(i, opening);
            products.insert(i, product);
        }
        // Phase 2: open nonces, exchange masked products
        for i in quorum.iter() {
            for j in quorum.iter() {
                if i != j {
                    let opening = openings.get(j).unwrap().clone();
                    let product = products.get(j).unwrap().clone();
                    let p2 = phase2s.get_mut(i).unwrap();
                    p2.receive_opening(&opening).unwrap();
                    p2.receive_masked_product(&product).unwrap();
                }
            }
        }
        phase2s
            .values()
            .map(|p| p.finish(messages, params).unwrap())
            .collect()
    }

    #[test]
    fn threshold_signing_small_committee() {
        // 2-of-3 keys, 1 message, the whole committee signs
        let mut rng = StdRng::seed_from_u64(0x42);
        let (threshold, total) = (2u16, 3u16);
        let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(1).unwrap();
        let comm_key = PedersenCommitmentKey::<G1>::new::<Blake2b512>(b"threshold-bbs-plus-dkg");
        let (key_outputs, pk) = run_keygen(&mut rng, threshold, total, &comm_key, &params);

        let messages = vec![Fr::from(0x01u64)];
        let quorum = (1..=total).collect::<BTreeSet<_>>();
        let session_id = new_session_id(&mut rng);
        let shares = run_signing_session(
            &mut rng,
            session_id,
            threshold,
            &quorum,
            &key_outputs,
            &messages,
            &params,
            &comm_key,
        );

        let sig = SignatureShare::combine_and_verify(&shares, &messages, &pk, &params).unwrap();
        sig.verify(&messages, &pk, &params).unwrap();

        let share = shares[0].clone();
        test_serialization!(SignatureShare<Bls12_381>, share);
    }

    #[test]
    fn threshold_signing_larger_committee() {
        // 3-of-5 keys, 3 messages; a tampered message fails verification
        let mut rng = StdRng::seed_from_u64(0x42);
        let (threshold, total) = (3u16, 5u16);
        let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(3).unwrap();
        let comm_key = PedersenCommitmentKey::<G1>::new::<Blake2b512>(b"threshold-bbs-plus-dkg");
        let (key_outputs, pk) = run_keygen(&mut rng, threshold, total, &comm_key, &params);

        let messages = vec![Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        let quorum = (1..=total).collect::<BTreeSet<_>>();
        let session_id = new_session_id(&mut rng);
        let shares = run_signing_session(
            &mut rng,
            session_id,
            threshold,
            &quorum,
            &key_outputs,
            &messages,
            &params,
            &comm_key,
        );

        let sig = SignatureShare::combine_and_verify(&shares, &messages, &pk, &params).unwrap();

        let mut tampered = messages.clone();
        tampered[1] += Fr::from(1u64);
        assert!(sig.verify(&tampered, &pk, &params).is_err());

        // The distributed signature is a plain signature, 112 bytes compressed
        let mut bytes = vec![];
        sig.serialize_compressed(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 112);

        // The key shares interpolate to a secret key matching the public key,
        // regardless of which quorum is used
        let all_shares =
            VerifiableShares(key_outputs.iter().map(|o| o.share.clone()).collect());
        let (x, _) = all_shares.reconstruct_secret().unwrap();
        assert_eq!(
            pk.0,
            params.g2.mul_bigint(x.into_bigint()).into_affine()
        );
    }

    #[test]
    fn too_few_or_duplicate_shares() {
        let mut rng = StdRng::seed_from_u64(0x42);
        let (threshold, total) = (3u16, 5u16);
        let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(2).unwrap();
        let comm_key = PedersenCommitmentKey::<G1>::new::<Blake2b512>(b"threshold-bbs-plus-dkg");
        let (key_outputs, pk) = run_keygen(&mut rng, threshold, total, &comm_key, &params);

        let messages = vec![Fr::rand(&mut rng), Fr::rand(&mut rng)];
        let quorum = (1..=total).collect::<BTreeSet<_>>();
        let session_id = new_session_id(&mut rng);
        let shares = run_signing_session(
            &mut rng,
            session_id,
            threshold,
            &quorum,
            &key_outputs,
            &messages,
            &params,
            &comm_key,
        );

        // 2 * threshold - 2 shares are not enough
        assert!(matches!(
            SignatureShare::combine(&shares[..4]).unwrap_err(),
            BBSPlusError::TooFewShares(4, 5)
        ));
        assert!(matches!(
            SignatureShare::<Bls12_381>::combine(&[]).unwrap_err(),
            BBSPlusError::TooFewShares(0, 1)
        ));

        // Two submissions from the same signer
        let mut with_duplicate = shares[..4].to_vec();
        with_duplicate.push(shares[0].clone());
        assert!(matches!(
            SignatureShare::combine(&with_duplicate).unwrap_err(),
            BBSPlusError::DuplicateShare(1)
        ));

        // The full set still combines fine
        SignatureShare::combine_and_verify(&shares, &messages, &pk, &params).unwrap();
    }

    #[test]
    fn inversion_failure_and_masking_refresh() {
        // Force the joint mask to 0, then recover with a fresh mask dealing
        let mut rng = StdRng::seed_from_u64(0x42);
        let (threshold, total) = (2u16, 3u16);
        let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(1).unwrap();
        let comm_key = PedersenCommitmentKey::<G1>::new::<Blake2b512>(b"threshold-bbs-plus-dkg");
        let (key_outputs, pk) = run_keygen(&mut rng, threshold, total, &comm_key, &params);

        let messages = vec![Fr::from(5u64)];
        let quorum = (1..=total).collect::<BTreeSet<_>>();
        let session_id = [3u8; 16];

        // Deal nonces normally but every signer deals 0 as its mask contribution, so
        // the joint mask interpolates to 0
        let deal_joint = |rng: &mut StdRng, zero: bool| -> BTreeMap<u16, Fr> {
            let mut round1s = BTreeMap::new();
            let mut all_shares = BTreeMap::new();
            let mut all_comms = BTreeMap::new();
            for i in quorum.iter() {
                let (r, shares, comms) = if zero {
                    Round1::<G1>::init_with_secret(
                        rng,
                        *i,
                        Fr::zero(),
                        threshold,
                        quorum.clone(),
                        &comm_key,
                    )
                    .unwrap()
                } else {
                    Round1::<G1>::init(rng, *i, threshold, quorum.clone(), &comm_key).unwrap()
                };
                round1s.insert(*i, r);
                all_shares.insert(*i, shares);
                all_comms.insert(*i, comms);
            }
            for i in quorum.iter() {
                for j in quorum.iter() {
                    if i != j {
                        let share = all_shares.get(j).unwrap().get(i).unwrap().clone();
                        let comms = all_comms.get(j).unwrap().clone();
                        round1s
                            .get_mut(i)
                            .unwrap()
                            .receive_share(*j, share, comms, &comm_key)
                            .unwrap();
                    }
                }
            }
            round1s
                .into_iter()
                .map(|(i, r)| (i, r.finish().unwrap().secret_share))
                .collect()
        };

        let e_shares = deal_joint(&mut rng, false);
        let s_shares = deal_joint(&mut rng, false);
        let zero_mask_shares = deal_joint(&mut rng, true);

        let mut phase2s = BTreeMap::new();
        let mut openings = BTreeMap::new();
        let mut products = BTreeMap::new();
        for i in quorum.iter() {
            let phase1_out = crate::threshold::Phase1Output {
                session_id,
                id: *i,
                threshold,
                quorum: quorum.iter().copied().collect(),
                e_share: *e_shares.get(i).unwrap(),
                s_share: *s_shares.get(i).unwrap(),
                rho_share: *zero_mask_shares.get(i).unwrap(),
            };
            let x_share = key_outputs[(*i - 1) as usize].share.secret_share;
            let (p2, product) = Phase2::init(&phase1_out, &x_share);
            openings.insert(
                *i,
                crate::threshold::NonceOpening {
                    session_id,
                    sender: *i,
                    e: phase1_out.e_share,
                    s: phase1_out.s_share,
                },
            );
            phase2s.insert(*i, p2);
            products.insert(*i, product);
        }
        for i in quorum.iter() {
            for j in quorum.iter() {
                if i != j {
                    let p2 = phase2s.get_mut(i).unwrap();
                    p2.receive_opening(openings.get(j).unwrap()).unwrap();
                    p2.receive_masked_product(products.get(j).unwrap()).unwrap();
                }
            }
        }

        // The zero mask makes every signer's inversion fail
        for p2 in phase2s.values() {
            assert!(matches!(
                p2.finish(&messages, &params).unwrap_err(),
                BBSPlusError::InversionFailed
            ));
        }

        // Rerun only the mask sub-protocol and retry
        let fresh_mask_shares = deal_joint(&mut rng, false);
        let mut fresh_products = BTreeMap::new();
        for i in quorum.iter() {
            let product = phase2s
                .get_mut(i)
                .unwrap()
                .refresh_masking(*fresh_mask_shares.get(i).unwrap());
            fresh_products.insert(*i, product);
        }
        for i in quorum.iter() {
            for j in quorum.iter() {
                if i != j {
                    phase2s
                        .get_mut(i)
                        .unwrap()
                        .receive_masked_product(fresh_products.get(j).unwrap())
                        .unwrap();
                }
            }
        }

        let shares = phase2s
            .values()
            .map(|p| p.finish(&messages, &params).unwrap())
            .collect::<Vec<_>>();
        SignatureShare::combine_and_verify(&shares, &messages, &pk, &params).unwrap();
    }

    #[test]
    fn quorum_can_be_any_large_enough_subset() {
        // 2-of-4 keys; the quorum {2, 3, 4} signs without party 1
        let mut rng = StdRng::seed_from_u64(0x42);
        let (threshold, total) = (2u16, 4u16);
        let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(2).unwrap();
        let comm_key = PedersenCommitmentKey::<G1>::new::<Blake2b512>(b"threshold-bbs-plus-dkg");
        let (key_outputs, pk) = run_keygen(&mut rng, threshold, total, &comm_key, &params);

        let messages = vec![Fr::rand(&mut rng), Fr::rand(&mut rng)];
        let quorum = [2u16, 3, 4].into_iter().collect::<BTreeSet<_>>();
        let session_id = new_session_id(&mut rng);
        let shares = run_signing_session(
            &mut rng,
            session_id,
            threshold,
            &quorum,
            &key_outputs,
            &messages,
            &params,
            &comm_key,
        );
        SignatureShare::combine_and_verify(&shares, &messages, &pk, &params).unwrap();
    }

    #[test]
    fn mixed_sessions_rejected() {
        let mut rng = StdRng::seed_from_u64(0x42);
        let (threshold, total) = (2u16, 3u16);
        let params = SignatureParamsG1::<Bls12_381>::new::<Blake2b512>(1).unwrap();
        let comm_key = PedersenCommitmentKey::<G1>::new::<Blake2b512>(b"threshold-bbs-plus-dkg");
        let (key_outputs, _) = run_keygen(&mut rng, threshold, total, &comm_key, &params);

        let messages = vec![Fr::rand(&mut rng)];
        let quorum = (1..=total).collect::<BTreeSet<_>>();
        let shares_a = run_signing_session(
            &mut rng,
            [1u8; 16],
            threshold,
            &quorum,
            &key_outputs,
            &messages,
            &params,
            &comm_key,
        );
        let shares_b = run_signing_session(
            &mut rng,
            [2u8; 16],
            threshold,
            &quorum,
            &key_outputs,
            &messages,
            &params,
            &comm_key,
        );

        let mut mixed = shares_a[..2].to_vec();
        mixed.push(shares_b[2].clone());
        assert!(matches!(
            SignatureShare::combine(&mixed).unwrap_err(),
            BBSPlusError::WrongSessionId
        ));
    }
}
