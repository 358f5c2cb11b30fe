//! Phase 2 of a signing session: distributed inversion of `x + e` and emission of the
//! signature element share.
//!
//! Each signer holds Shamir shares `x_i` of the key, `e_i` of the nonce and `mask_i`
//! of the inversion mask, all at evaluation point `i` with degree `threshold - 1`.
//! It broadcasts `alpha_i = (x_i + e_i) * mask_i`, a share on a degree
//! `2 * threshold - 2` polynomial whose value at 0 is `(x + e) * mask`. That value is
//! uniformly random, so revealing it leaks nothing about `x + e`. After interpolating `alpha`,
//! each signer's `u_i = mask_i / alpha` is a degree `threshold - 1` share of
//! `1 / (x + e)` and `A_i = b * u_i` interpolates in the exponent to the signature
//! element `A = b^{1/(x+e)}`.
//!
//! `alpha = 0` happens only if the mask (or `x + e`) was dealt as 0; the session then
//! reruns the mask sub-protocol and calls [`Phase2::refresh_masking`], everything else
//! is kept.

use ark_ec::{pairing::Pairing, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{collections::BTreeMap, vec::Vec};
use zeroize::{Zeroize, ZeroizeOnDrop};

use secret_sharing::common::{lagrange_basis_at_0_for_all, ParticipantId, ShareId};

use super::{
    randomness_phase::{NonceOpening, Phase1Output},
    reconstruction::SignatureShare,
    SessionId,
};
use crate::{error::BBSPlusError, setup::SignatureParamsG1};

/// Broadcast of one signer's masked key-share product `alpha_i`
#[derive(Clone, Debug, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct MaskedProductBroadcast<F: PrimeField> {
    pub session_id: SessionId,
    pub sender: ParticipantId,
    pub value: F,
}

/// A signer's state during phase 2
#[derive(Clone, Debug, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct Phase2<F: PrimeField> {
    #[zeroize(skip)]
    pub session_id: SessionId,
    #[zeroize(skip)]
    pub id: ParticipantId,
    #[zeroize(skip)]
    pub threshold: ShareId,
    #[zeroize(skip)]
    pub quorum: Vec<ParticipantId>,
    signing_key_share: F,
    e_share: F,
    s_share: F,
    mask_share: F,
    /// Nonce openings received so far, `(e_i, s_i)` keyed by sender
    #[zeroize(skip)]
    openings: BTreeMap<ParticipantId, (F, F)>,
    #[zeroize(skip)]
    masked_products: BTreeMap<ParticipantId, F>,
}

impl<F: PrimeField> Phase2<F> {
    /// Move from phase 1 into the inversion phase. Returns the own masked product to
    /// broadcast.
    pub fn init(phase1: &Phase1Output<F>, signing_key_share: &F) -> (Self, MaskedProductBroadcast<F>) {
        let alpha = (*signing_key_share + phase1.e_share) * phase1.rho_share;
        let mut openings = BTreeMap::new();
        openings.insert(phase1.id, (phase1.e_share, phase1.s_share));
        let mut masked_products = BTreeMap::new();
        masked_products.insert(phase1.id, alpha);
        (
            Self {
                session_id: phase1.session_id,
                id: phase1.id,
                threshold: phase1.threshold,
                quorum: phase1.quorum.clone(),
                signing_key_share: *signing_key_share,
                e_share: phase1.e_share,
                s_share: phase1.s_share,
                mask_share: phase1.rho_share,
                openings,
                masked_products,
            },
            MaskedProductBroadcast {
                session_id: phase1.session_id,
                sender: phase1.id,
                value: alpha,
            },
        )
    }

    pub fn receive_opening(&mut self, opening: &NonceOpening<F>) -> Result<(), BBSPlusError> {
        if opening.session_id != self.session_id {
            return Err(BBSPlusError::WrongSessionId);
        }
        if !self.quorum.contains(&opening.sender) {
            return Err(BBSPlusError::UnexpectedParticipant(opening.sender));
        }
        if self.openings.contains_key(&opening.sender) {
            return Err(BBSPlusError::AlreadyProcessedFromSender(opening.sender));
        }
        self.openings
            .insert(opening.sender, (opening.e, opening.s));
        Ok(())
    }

    pub fn receive_masked_product(
        &mut self,
        product: &MaskedProductBroadcast<F>,
    ) -> Result<(), BBSPlusError> {
        if product.session_id != self.session_id {
            return Err(BBSPlusError::WrongSessionId);
        }
        if !self.quorum.contains(&product.sender) {
            return Err(BBSPlusError::UnexpectedParticipant(product.sender));
        }
        if self.masked_products.contains_key(&product.sender) {
            return Err(BBSPlusError::AlreadyProcessedFromSender(product.sender));
        }
        self.masked_products.insert(product.sender, product.value);
        Ok(())
    }

    /// Swap in a share of a freshly dealt mask after [`BBSPlusError::InversionFailed`].
    /// All collected products belong to the old mask and are dropped; the nonce
    /// openings stay valid.
    pub fn refresh_masking(&mut self, mask_share: F) -> MaskedProductBroadcast<F> {
        self.mask_share = mask_share;
        let alpha = (self.signing_key_share + self.e_share) * self.mask_share;
        self.masked_products.clear();
        self.masked_products.insert(self.id, alpha);
        MaskedProductBroadcast {
            session_id: self.session_id,
            sender: self.id,
            value: alpha,
        }
    }

    /// Emit this signer's signature share once every quorum member's opening and
    /// masked product arrived. Does not consume the state so the session can retry
    /// after an inversion failure.
    pub fn finish<E: Pairing<ScalarField = F>>(
        &self,
        messages: &[F],
        params: &SignatureParamsG1<E>,
    ) -> Result<SignatureShare<E>, BBSPlusError> {
        if messages.is_empty() {
            return Err(BBSPlusError::NoMessageToSign);
        }
        if messages.len() != params.supported_message_count() {
            return Err(BBSPlusError::MessageCountIncompatibleWithSigParams(
                messages.len(),
                params.supported_message_count(),
            ));
        }
        for id in &self.quorum {
            if !self.openings.contains_key(id) || !self.masked_products.contains_key(id) {
                return Err(BBSPlusError::MissingContributionFrom(*id));
            }
        }

        let basis = lagrange_basis_at_0_for_all::<F>(self.quorum.clone())?;
        let mut e = F::zero();
        let mut s = F::zero();
        let mut alpha = F::zero();
        for (lambda, id) in basis.iter().zip(self.quorum.iter()) {
            let (e_i, s_i) = self.openings.get(id).unwrap();
            e += *lambda * e_i;
            s += *lambda * s_i;
            alpha += *lambda * self.masked_products.get(id).unwrap();
        }

        // alpha = (x + e) * mask; uniformly random, 0 only for a zero mask or key
        let alpha_inv = alpha.inverse().ok_or(BBSPlusError::InversionFailed)?;
        let u = self.mask_share * alpha_inv;

        let b = params.b(messages.iter().enumerate().collect(), &s)?;
        let A = (b * u).into_affine();
        Ok(SignatureShare {
            session_id: self.session_id,
            id: self.id,
            threshold: self.threshold,
            A,
            e: self.e_share,
            s: self.s_share,
        })
    }
}
