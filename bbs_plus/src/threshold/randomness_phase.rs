//! Phase 1 of a signing session: the quorum deals three fresh joint secrets, the
//! signature nonces `e` and `s` and the inversion mask, through the fail-stop
//! Pedersen-VSS machinery. Commitments travel in one broadcast per sender, the three
//! shares for each receiver in one private message.

use ark_ec::AffineRepr;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    collections::{BTreeMap, BTreeSet},
    rand::RngCore,
    vec::Vec,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crypto_utils::commitment::PedersenCommitmentKey;
use secret_sharing::{
    common::{CommitmentToCoefficients, ParticipantId, ShareId, VerifiableShare},
    pedersen_dkg::Round1,
};

use super::SessionId;
use crate::error::BBSPlusError;

/// Coefficient commitments of one sender's three sub-protocol dealings
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Round1Broadcast<G: AffineRepr> {
    pub session_id: SessionId,
    pub sender: ParticipantId,
    pub comms_e: CommitmentToCoefficients<G>,
    pub comms_s: CommitmentToCoefficients<G>,
    pub comms_rho: CommitmentToCoefficients<G>,
}

/// One sender's three dealt shares for a single receiver. Sent over the private
/// channel to that receiver only.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Round1Unicast<F: PrimeField> {
    pub session_id: SessionId,
    pub sender: ParticipantId,
    pub e_share: VerifiableShare<F>,
    pub s_share: VerifiableShare<F>,
    pub rho_share: VerifiableShare<F>,
}

/// Opening of a signer's nonce shares, broadcast once phase 1 finishes. `e` and `s`
/// are public components of the final signature, so opening their shares to the quorum
/// leaks nothing beyond the signature itself.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct NonceOpening<F: PrimeField> {
    pub session_id: SessionId,
    pub sender: ParticipantId,
    pub e: F,
    pub s: F,
}

/// A signer's state during phase 1: one fail-stop sub-protocol per joint secret
#[derive(Clone, Debug, PartialEq)]
pub struct Phase1<G: AffineRepr> {
    pub session_id: SessionId,
    pub id: ParticipantId,
    pub threshold: ShareId,
    pub quorum: Vec<ParticipantId>,
    e_dkg: Round1<G>,
    s_dkg: Round1<G>,
    rho_dkg: Round1<G>,
}

/// Secret result of phase 1: this signer's shares of `e`, `s` and the mask
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize, Zeroize, ZeroizeOnDrop)]
pub struct Phase1Output<F: PrimeField> {
    #[zeroize(skip)]
    pub session_id: SessionId,
    #[zeroize(skip)]
    pub id: ParticipantId,
    #[zeroize(skip)]
    pub threshold: ShareId,
    #[zeroize(skip)]
    pub quorum: Vec<ParticipantId>,
    pub e_share: F,
    pub s_share: F,
    pub rho_share: F,
}

impl<G: AffineRepr> Phase1<G> {
    /// Start phase 1. The quorum must have at least `2 * threshold - 1` members so the
    /// masked products of phase 2 can be interpolated. Returns the commitment broadcast
    /// and the per-receiver share messages.
    pub fn init<R: RngCore>(
        rng: &mut R,
        session_id: SessionId,
        id: ParticipantId,
        threshold: ShareId,
        quorum: BTreeSet<ParticipantId>,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<
        (
            Self,
            Round1Broadcast<G>,
            BTreeMap<ParticipantId, Round1Unicast<G::ScalarField>>,
        ),
        BBSPlusError,
    > {
        if threshold == 0 {
            return Err(secret_sharing::error::SSError::InvalidThresholdOrTotal(
                threshold,
                quorum.len() as ShareId,
            )
            .into());
        }
        let need = 2 * threshold - 1;
        if (quorum.len() as ShareId) < need {
            return Err(BBSPlusError::InsufficientQuorum(quorum.len() as u16, need));
        }
        let (e_dkg, mut e_shares, comms_e) =
            Round1::init(rng, id, threshold, quorum.clone(), comm_key)?;
        let (s_dkg, mut s_shares, comms_s) =
            Round1::init(rng, id, threshold, quorum.clone(), comm_key)?;
        let (rho_dkg, mut rho_shares, comms_rho) =
            Round1::init(rng, id, threshold, quorum.clone(), comm_key)?;

        let mut unicasts = BTreeMap::new();
        for receiver in quorum.iter() {
            if *receiver == id {
                continue;
            }
            unicasts.insert(
                *receiver,
                Round1Unicast {
                    session_id,
                    sender: id,
                    e_share: e_shares.remove(receiver).unwrap(),
                    s_share: s_shares.remove(receiver).unwrap(),
                    rho_share: rho_shares.remove(receiver).unwrap(),
                },
            );
        }
        Ok((
            Self {
                session_id,
                id,
                threshold,
                quorum: quorum.into_iter().collect(),
                e_dkg,
                s_dkg,
                rho_dkg,
            },
            Round1Broadcast {
                session_id,
                sender: id,
                comms_e,
                comms_s,
                comms_rho,
            },
            unicasts,
        ))
    }

    /// Process another signer's commitment broadcast together with the shares it dealt
    /// to this signer. An inconsistent share aborts the session (fail-stop).
    pub fn receive_shares(
        &mut self,
        broadcast: &Round1Broadcast<G>,
        unicast: Round1Unicast<G::ScalarField>,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<(), BBSPlusError> {
        if broadcast.session_id != self.session_id || unicast.session_id != self.session_id {
            return Err(BBSPlusError::WrongSessionId);
        }
        if broadcast.sender != unicast.sender {
            return Err(BBSPlusError::UnexpectedParticipant(unicast.sender));
        }
        let sender = unicast.sender;
        let Round1Unicast {
            e_share,
            s_share,
            rho_share,
            ..
        } = unicast;
        self.e_dkg
            .receive_share(sender, e_share, broadcast.comms_e.clone(), comm_key)?;
        self.s_dkg
            .receive_share(sender, s_share, broadcast.comms_s.clone(), comm_key)?;
        self.rho_dkg
            .receive_share(sender, rho_share, broadcast.comms_rho.clone(), comm_key)?;
        Ok(())
    }

    /// Finish once every quorum member's shares arrived. Returns the secret share
    /// bundle and the nonce opening to broadcast.
    pub fn finish(
        self,
    ) -> Result<(Phase1Output<G::ScalarField>, NonceOpening<G::ScalarField>), BBSPlusError> {
        let e_share = self.e_dkg.finish()?;
        let s_share = self.s_dkg.finish()?;
        let rho_share = self.rho_dkg.finish()?;
        let output = Phase1Output {
            session_id: self.session_id,
            id: self.id,
            threshold: self.threshold,
            quorum: self.quorum,
            e_share: e_share.secret_share,
            s_share: s_share.secret_share,
            rho_share: rho_share.secret_share,
        };
        let opening = NonceOpening {
            session_id: output.session_id,
            sender: output.id,
            e: output.e_share,
            s: output.s_share,
        };
        Ok((output, opening))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::G1Affine;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use blake2::Blake2b512;
    use secret_sharing::error::SSError;

    #[test]
    fn quorum_too_small() {
        let mut rng = StdRng::seed_from_u64(0x42);
        let comm_key = PedersenCommitmentKey::<G1Affine>::new::<Blake2b512>(b"test");
        // threshold 3 needs 5 signers
        let quorum = (1..=4u16).collect::<BTreeSet<_>>();
        let err = Phase1::init(&mut rng, [1u8; 16], 1, 3, quorum, &comm_key).unwrap_err();
        assert!(matches!(err, BBSPlusError::InsufficientQuorum(4, 5)));
    }

    #[test]
    fn session_and_sender_checks() {
        let mut rng = StdRng::seed_from_u64(0x42);
        let comm_key = PedersenCommitmentKey::<G1Affine>::new::<Blake2b512>(b"test");
        let session_id = [7u8; 16];
        let quorum = (1..=3u16).collect::<BTreeSet<_>>();

        let (mut p1, _, _) =
            Phase1::init(&mut rng, session_id, 1, 2, quorum.clone(), &comm_key).unwrap();
        let (_, bcast_2, unicasts_2) =
            Phase1::init(&mut rng, session_id, 2, 2, quorum.clone(), &comm_key).unwrap();

        // Mismatched session id
        let mut wrong_session = bcast_2.clone();
        wrong_session.session_id = [8u8; 16];
        assert!(matches!(
            p1.receive_shares(&wrong_session, unicasts_2.get(&1).unwrap().clone(), &comm_key)
                .unwrap_err(),
            BBSPlusError::WrongSessionId
        ));

        // Broadcast and unicast from different senders
        let mut wrong_sender = unicasts_2.get(&1).unwrap().clone();
        wrong_sender.sender = 3;
        assert!(matches!(
            p1.receive_shares(&bcast_2, wrong_sender, &comm_key).unwrap_err(),
            BBSPlusError::UnexpectedParticipant(3)
        ));

        // Valid delivery
        p1.receive_shares(&bcast_2, unicasts_2.get(&1).unwrap().clone(), &comm_key)
            .unwrap();

        // Cannot finish with a member missing
        assert!(matches!(
            p1.finish().unwrap_err(),
            BBSPlusError::SSError(SSError::MissingContributionFrom(3))
        ));
    }
}
