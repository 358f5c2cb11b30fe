//! Fail-stop distributed key generation built on Pedersen verifiable secret sharing,
//! following "Non-interactive and information-theoretic secure verifiable secret
//! sharing" section 5. Every participant deals a random secret through [`crate::pedersen_vss`]
//! and the shared secret is the sum of all dealt secrets, so a participant's final
//! share is the sum of the shares it received.
//!
//! A share failing verification is the complaint of the original protocol; since this
//! design is fail-stop, the caller aborts the instance on [`SSError::InconsistentShare`]
//! and no recovery round exists.
//!
//! When the generated secret is a signing key, each participant additionally broadcasts
//! its public key piece `base * a_0` (`a_0` being its dealt secret) with a proof that the
//! piece is consistent with the Pedersen commitment to `a_0`. The public key piece can
//! live in a different group than the share commitments, e.g. commitments in G1 and the
//! public key in G2. Nonce sub-protocols skip this round entirely ([`Round1::finish`]).

use ark_ec::{AffineRepr, CurveGroup, VariableBaseMSM};
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    collections::{BTreeMap, BTreeSet},
    rand::RngCore,
    vec,
    vec::Vec,
    UniformRand,
};
use digest::Digest;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crypto_utils::{commitment::PedersenCommitmentKey, serde_utils::ArkObjectBytes};
use schnorr_pok::compute_random_oracle_challenge;

use crate::{
    common,
    common::{CommitmentToCoefficients, ParticipantId, ShareId, VerifiableShare},
    error::SSError,
    pedersen_vss,
};

/// Write-once log of the shares and coefficient commitments a participant has received,
/// keyed by dealer. Rejects duplicates, self-sends and mismatched ids or thresholds.
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct SharesAccumulator<G: AffineRepr> {
    pub participant_id: ParticipantId,
    pub threshold: ShareId,
    pub shares: BTreeMap<ParticipantId, VerifiableShare<G::ScalarField>>,
    pub coeff_comms: BTreeMap<ParticipantId, CommitmentToCoefficients<G>>,
}

impl<G: AffineRepr> SharesAccumulator<G> {
    pub fn new(id: ParticipantId, threshold: ShareId) -> Self {
        Self {
            participant_id: id,
            threshold,
            shares: BTreeMap::new(),
            coeff_comms: BTreeMap::new(),
        }
    }

    /// Record the share this participant dealt to itself
    pub fn add_self_share(
        &mut self,
        share: VerifiableShare<G::ScalarField>,
        commitment_coeffs: CommitmentToCoefficients<G>,
    ) {
        self.update_unchecked(self.participant_id, share, commitment_coeffs)
    }

    /// Record a share received from another participant after verifying it against the
    /// dealer's coefficient commitments
    pub fn add_received_share(
        &mut self,
        sender_id: ParticipantId,
        share: VerifiableShare<G::ScalarField>,
        commitment_coeffs: CommitmentToCoefficients<G>,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<(), SSError> {
        if sender_id == self.participant_id {
            return Err(SSError::SenderIdSameAsReceiver(
                sender_id,
                self.participant_id,
            ));
        }
        if sender_id == 0 {
            return Err(SSError::InvalidParticipantId(0));
        }
        if self.shares.contains_key(&sender_id) {
            return Err(SSError::AlreadyProcessedFromSender(sender_id));
        }
        self.update(sender_id, share, commitment_coeffs, comm_key)
    }

    /// Sum the accumulated shares into this participant's share of the joint secret.
    /// Every id in `expected` must have contributed, the protocol is not run with a
    /// partial dealer set.
    pub fn finalize(
        self,
        expected: &[ParticipantId],
    ) -> Result<VerifiableShare<G::ScalarField>, SSError> {
        for id in expected {
            if !self.shares.contains_key(id) {
                return Err(SSError::MissingContributionFrom(*id));
            }
        }
        let mut secret_share = G::ScalarField::zero();
        let mut blinding_share = G::ScalarField::zero();
        for share in self.shares.values() {
            secret_share += share.secret_share;
            blinding_share += share.blinding_share;
        }
        Ok(VerifiableShare {
            id: self.participant_id,
            threshold: self.threshold,
            secret_share,
            blinding_share,
        })
    }

    fn update(
        &mut self,
        sender_id: ParticipantId,
        share: VerifiableShare<G::ScalarField>,
        commitment_coeffs: CommitmentToCoefficients<G>,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<(), SSError> {
        if share.id != self.participant_id {
            return Err(SSError::UnequalParticipantAndShareId(
                self.participant_id,
                share.id,
            ));
        }
        if share.threshold != self.threshold {
            return Err(SSError::UnequalThresholdInReceivedShare(
                self.threshold,
                share.threshold,
            ));
        }
        if !commitment_coeffs.supports_threshold(self.threshold) {
            return Err(SSError::DoesNotSupportThreshold(self.threshold));
        }
        share
            .verify(&commitment_coeffs, comm_key)
            .map_err(|_| SSError::InconsistentShare(sender_id, self.participant_id))?;
        self.update_unchecked(sender_id, share, commitment_coeffs);
        Ok(())
    }

    fn update_unchecked(
        &mut self,
        sender_id: ParticipantId,
        share: VerifiableShare<G::ScalarField>,
        commitment_coeffs: CommitmentToCoefficients<G>,
    ) {
        self.shares.insert(sender_id, share);
        self.coeff_comms.insert(sender_id, commitment_coeffs);
    }
}

/// Dealing round of the DKG. Each participant samples a secret and a blinding, deals
/// both through Pedersen VSS over the participant id set and accumulates the shares it
/// receives from the other dealers.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize, Zeroize, ZeroizeOnDrop)]
pub struct Round1<G: AffineRepr> {
    #[zeroize(skip)]
    pub participants: Vec<ParticipantId>,
    secret: G::ScalarField,
    blinding: G::ScalarField,
    #[zeroize(skip)]
    pub accumulator: SharesAccumulator<G>,
}

/// A participant's public key piece `base * a_0` with the proof tying it to the
/// Pedersen commitment `C_0 = g * a_0 + h * b_0` it broadcast in round 1
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct PublicKeyContribution<PKG: AffineRepr, CMG: AffineRepr<ScalarField = PKG::ScalarField>>
{
    pub sender: ParticipantId,
    #[serde_as(as = "ArkObjectBytes")]
    pub value: PKG,
    pub proof: ConsistencyProof<PKG, CMG>,
}

/// Schnorr AND-proof of knowledge of `(a, b)` such that `C = g * a + h * b` and
/// `V = base * a`, with a shared response for `a` across the two groups. Both groups
/// must share the scalar field, which holds for G1/G2 of a pairing.
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct ConsistencyProof<PKG: AffineRepr, CMG: AffineRepr<ScalarField = PKG::ScalarField>> {
    #[serde_as(as = "ArkObjectBytes")]
    pub t_comm: CMG,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_value: PKG,
    #[serde_as(as = "ArkObjectBytes")]
    pub resp_secret: PKG::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub resp_blinding: PKG::ScalarField,
}

/// Final state of a key-generating DKG run: this participant's share of the joint
/// secret and the joint public key
#[serde_as]
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct DkgOutput<G: AffineRepr> {
    pub id: ParticipantId,
    pub threshold: ShareId,
    pub share: VerifiableShare<G::ScalarField>,
    #[serde_as(as = "ArkObjectBytes")]
    pub public_key: G,
}

/// Public key release round, run only when the generated secret is a signing key.
/// `PKG` is the public key group, `CMG` the group of the round-1 commitments.
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Round2<PKG: AffineRepr, CMG: AffineRepr<ScalarField = PKG::ScalarField>> {
    pub id: ParticipantId,
    pub threshold: ShareId,
    pub participants: Vec<ParticipantId>,
    pub share: VerifiableShare<PKG::ScalarField>,
    pub public_key_base: PKG,
    pub coeff_comms: BTreeMap<ParticipantId, CommitmentToCoefficients<CMG>>,
    pub contributions: BTreeMap<ParticipantId, PKG>,
}

impl<G: AffineRepr> Round1<G> {
    /// Start the dealing round with a random secret. Returns the shares to send to the
    /// other participants, keyed by recipient, and the coefficient commitments to
    /// broadcast.
    pub fn init<R: RngCore>(
        rng: &mut R,
        id: ParticipantId,
        threshold: ShareId,
        participants: BTreeSet<ParticipantId>,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<
        (
            Self,
            BTreeMap<ParticipantId, VerifiableShare<G::ScalarField>>,
            CommitmentToCoefficients<G>,
        ),
        SSError,
    > {
        let secret = G::ScalarField::rand(rng);
        Self::init_with_secret(rng, id, secret, threshold, participants, comm_key)
    }

    /// Same as `init` but the dealt secret is chosen by the caller
    pub fn init_with_secret<R: RngCore>(
        rng: &mut R,
        id: ParticipantId,
        secret: G::ScalarField,
        threshold: ShareId,
        participants: BTreeSet<ParticipantId>,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<
        (
            Self,
            BTreeMap<ParticipantId, VerifiableShare<G::ScalarField>>,
            CommitmentToCoefficients<G>,
        ),
        SSError,
    > {
        if participants.contains(&0) {
            return Err(SSError::InvalidParticipantId(0));
        }
        if !participants.contains(&id) {
            return Err(SSError::ParticipantNotInGroup(id));
        }
        let participants = participants.into_iter().collect::<Vec<_>>();
        let (blinding, shares, comms, _, _) =
            pedersen_vss::deal_secret_with_ids(rng, secret, threshold, &participants, comm_key)?;
        let mut accumulator = SharesAccumulator::new(id, threshold);
        let mut for_others = BTreeMap::new();
        for share in shares.0 {
            if share.id == id {
                accumulator.add_self_share(share, comms.clone());
            } else {
                for_others.insert(share.id, share);
            }
        }
        Ok((
            Self {
                participants,
                secret,
                blinding,
                accumulator,
            },
            for_others,
            comms,
        ))
    }

    /// Process a share received from another dealer. An `InconsistentShare` error is
    /// the complaint; the instance must be abandoned when it occurs.
    pub fn receive_share(
        &mut self,
        sender_id: ParticipantId,
        share: VerifiableShare<G::ScalarField>,
        commitment_coeffs: CommitmentToCoefficients<G>,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<(), SSError> {
        if !self.participants.contains(&sender_id) {
            return Err(SSError::ParticipantNotInGroup(sender_id));
        }
        self.accumulator
            .add_received_share(sender_id, share, commitment_coeffs, comm_key)
    }

    /// Finish a run whose secret never gets a public key, e.g. a nonce or masking
    /// sub-protocol. Requires a contribution from every participant.
    pub fn finish(self) -> Result<VerifiableShare<G::ScalarField>, SSError> {
        self.accumulator.clone().finalize(&self.participants)
    }

    /// Finish a key-generating run: compute the final share, broadcast the public key
    /// piece with its consistency proof and move to the release round
    pub fn finish_with_public_key<R: RngCore, PKG: AffineRepr<ScalarField = G::ScalarField>, D: Digest>(
        self,
        rng: &mut R,
        public_key_base: &PKG,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<(Round2<PKG, G>, PublicKeyContribution<PKG, G>), SSError> {
        let id = self.accumulator.participant_id;
        let threshold = self.accumulator.threshold;
        let coeff_comms = self.accumulator.coeff_comms.clone();
        let share = self.accumulator.clone().finalize(&self.participants)?;

        let value = public_key_base
            .mul_bigint(self.secret.into_bigint())
            .into_affine();
        let commitment_to_secret = coeff_comms
            .get(&id)
            .map(|c| *c.commitment_to_secret())
            .ok_or(SSError::MissingContributionFrom(id))?;
        let proof = ConsistencyProof::new::<R, D>(
            rng,
            &self.secret,
            &self.blinding,
            &commitment_to_secret,
            &value,
            public_key_base,
            comm_key,
        );
        let contribution = PublicKeyContribution {
            sender: id,
            value,
            proof,
        };
        let mut contributions = BTreeMap::new();
        contributions.insert(id, value);
        Ok((
            Round2 {
                id,
                threshold,
                participants: self.participants.clone(),
                share,
                public_key_base: *public_key_base,
                coeff_comms,
                contributions,
            },
            contribution,
        ))
    }

    pub fn self_id(&self) -> ParticipantId {
        self.accumulator.participant_id
    }
}

impl<PKG: AffineRepr, CMG: AffineRepr<ScalarField = PKG::ScalarField>> ConsistencyProof<PKG, CMG> {
    pub fn new<R: RngCore, D: Digest>(
        rng: &mut R,
        secret: &PKG::ScalarField,
        blinding: &PKG::ScalarField,
        commitment_to_secret: &CMG,
        value: &PKG,
        public_key_base: &PKG,
        comm_key: &PedersenCommitmentKey<CMG>,
    ) -> Self {
        let r_secret = PKG::ScalarField::rand(rng);
        let r_blinding = PKG::ScalarField::rand(rng);
        let t_comm = comm_key.commit(&r_secret, &r_blinding);
        let t_value = public_key_base
            .mul_bigint(r_secret.into_bigint())
            .into_affine();
        let challenge = Self::challenge::<D>(
            comm_key,
            public_key_base,
            commitment_to_secret,
            value,
            &t_comm,
            &t_value,
        );
        Self {
            t_comm,
            t_value,
            resp_secret: r_secret + challenge * secret,
            resp_blinding: r_blinding + challenge * blinding,
        }
    }

    pub fn verify<D: Digest>(
        &self,
        commitment_to_secret: &CMG,
        value: &PKG,
        public_key_base: &PKG,
        comm_key: &PedersenCommitmentKey<CMG>,
    ) -> bool {
        let challenge = Self::challenge::<D>(
            comm_key,
            public_key_base,
            commitment_to_secret,
            value,
            &self.t_comm,
            &self.t_value,
        );
        // g * z_a + h * z_b == T_c + C * c
        if comm_key.commit_as_projective(&self.resp_secret, &self.resp_blinding)
            != commitment_to_secret.mul_bigint(challenge.into_bigint()) + self.t_comm
        {
            return false;
        }
        // base * z_a == T_v + V * c
        public_key_base.mul_bigint(self.resp_secret.into_bigint())
            == value.mul_bigint(challenge.into_bigint()) + self.t_value
    }

    fn challenge<D: Digest>(
        comm_key: &PedersenCommitmentKey<CMG>,
        public_key_base: &PKG,
        commitment_to_secret: &CMG,
        value: &PKG,
        t_comm: &CMG,
        t_value: &PKG,
    ) -> PKG::ScalarField {
        let mut bytes = vec![];
        comm_key.g.serialize_compressed(&mut bytes).unwrap();
        comm_key.h.serialize_compressed(&mut bytes).unwrap();
        public_key_base.serialize_compressed(&mut bytes).unwrap();
        commitment_to_secret
            .serialize_compressed(&mut bytes)
            .unwrap();
        value.serialize_compressed(&mut bytes).unwrap();
        t_comm.serialize_compressed(&mut bytes).unwrap();
        t_value.serialize_compressed(&mut bytes).unwrap();
        compute_random_oracle_challenge::<PKG::ScalarField, D>(&bytes)
    }
}

impl<PKG: AffineRepr, CMG: AffineRepr<ScalarField = PKG::ScalarField>> Round2<PKG, CMG> {
    /// Process another participant's public key piece after checking its proof against
    /// the commitment that participant broadcast in round 1
    pub fn receive_contribution<D: Digest>(
        &mut self,
        contribution: &PublicKeyContribution<PKG, CMG>,
        comm_key: &PedersenCommitmentKey<CMG>,
    ) -> Result<(), SSError> {
        let sender = contribution.sender;
        if sender == self.id {
            return Err(SSError::SenderIdSameAsReceiver(sender, self.id));
        }
        if !self.participants.contains(&sender) {
            return Err(SSError::ParticipantNotInGroup(sender));
        }
        if self.contributions.contains_key(&sender) {
            return Err(SSError::AlreadyProcessedFromSender(sender));
        }
        let commitment_to_secret = self
            .coeff_comms
            .get(&sender)
            .map(|c| *c.commitment_to_secret())
            .ok_or(SSError::MissingContributionFrom(sender))?;
        if !contribution.proof.verify::<D>(
            &commitment_to_secret,
            &contribution.value,
            &self.public_key_base,
            comm_key,
        ) {
            return Err(SSError::InvalidPublicKeyContribution(sender));
        }
        self.contributions.insert(sender, contribution.value);
        Ok(())
    }

    /// Sum the public key pieces of all participants into the joint public key
    pub fn finish(self) -> Result<DkgOutput<PKG>, SSError> {
        for id in &self.participants {
            if !self.contributions.contains_key(id) {
                return Err(SSError::MissingContributionFrom(*id));
            }
        }
        let public_key = self
            .contributions
            .values()
            .fold(PKG::Group::zero(), |acc, v| acc + *v)
            .into_affine();
        Ok(DkgOutput {
            id: self.id,
            threshold: self.threshold,
            share: self.share,
            public_key,
        })
    }
}

impl<G: AffineRepr> DkgOutput<G> {
    /// This participant's public key share `base * x_i`. Any `threshold` of these
    /// interpolate to the joint public key, see [`reconstruct_threshold_public_key`].
    pub fn public_key_share(&self, base: &G) -> G {
        base.mul_bigint(self.share.secret_share.into_bigint())
            .into_affine()
    }
}

/// Interpolate the joint public key at 0 from per-participant public key shares,
/// i.e. Lagrange in the exponent. Assumes the ids are unique.
pub fn reconstruct_threshold_public_key<G: AffineRepr>(
    public_keys: Vec<(ShareId, G)>,
    threshold: ShareId,
) -> Result<G, SSError> {
    let len = public_keys.len() as ShareId;
    if threshold > len {
        return Err(SSError::BelowThreshold(threshold, len));
    }
    let pkt = &public_keys[0..threshold as usize];
    let pk_ids = pkt.iter().map(|(i, _)| *i).collect::<Vec<_>>();
    let pks = pkt.iter().map(|(_, pk)| *pk).collect::<Vec<_>>();
    let lcs = common::lagrange_basis_at_0_for_all::<G::ScalarField>(pk_ids)?;
    Ok(G::Group::msm_unchecked(&pks, &lcs).into_affine())
}
