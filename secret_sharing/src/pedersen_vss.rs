//! Pedersen verifiable secret sharing, following "Non-interactive and information-theoretic
//! secure verifiable secret sharing" section 4:
//! - The dealer shares a secret `s` with a random blinding `t` in `k-of-n` manner
//! - Secret polynomial `F(x)` with `F(0) = s` and blinding polynomial `G(x)` with `G(0) = t`
//! - Coefficient pairs are committed as `C_k = g*F_k + h*G_k` and broadcast
//! - Participant `i` receives `(F(i), G(i))` and checks
//!   `g*F(i) + h*G(i) == C_0 + C_1*i + C_2*i^2 + ...`

use ark_ec::{AffineRepr, VariableBaseMSM};
use ark_ff::PrimeField;
use ark_poly::univariate::DensePolynomial;
use ark_std::{cfg_into_iter, rand::RngCore, vec::Vec, UniformRand};

use crypto_utils::{commitment::PedersenCommitmentKey, ff::powers};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    common::{CommitmentToCoefficients, Share, ShareId, Shares, VerifiableShare, VerifiableShares},
    error::SSError,
    shamir,
};

/// Generate a random secret and deal it verifiably. Returns the secret, the blinding,
/// the shares, the coefficient commitments and both polynomials.
pub fn deal_random_secret<R: RngCore, G: AffineRepr>(
    rng: &mut R,
    threshold: ShareId,
    total: ShareId,
    comm_key: &PedersenCommitmentKey<G>,
) -> Result<
    (
        G::ScalarField,
        G::ScalarField,
        VerifiableShares<G::ScalarField>,
        CommitmentToCoefficients<G>,
        DensePolynomial<G::ScalarField>,
        DensePolynomial<G::ScalarField>,
    ),
    SSError,
> {
    let secret = G::ScalarField::rand(rng);
    let (t, shares, coeff_comms, s_poly, t_poly) =
        deal_secret(rng, secret, threshold, total, comm_key)?;
    Ok((secret, t, shares, coeff_comms, s_poly, t_poly))
}

/// Same as `deal_random_secret` but accepts the secret, with shares at ids `1..=total`
pub fn deal_secret<R: RngCore, G: AffineRepr>(
    rng: &mut R,
    secret: G::ScalarField,
    threshold: ShareId,
    total: ShareId,
    comm_key: &PedersenCommitmentKey<G>,
) -> Result<
    (
        G::ScalarField,
        VerifiableShares<G::ScalarField>,
        CommitmentToCoefficients<G>,
        DensePolynomial<G::ScalarField>,
        DensePolynomial<G::ScalarField>,
    ),
    SSError,
> {
    let ids = (1..=total).collect::<Vec<ShareId>>();
    deal_secret_with_ids(rng, secret, threshold, &ids, comm_key)
}

/// Deal the secret with share evaluations at an explicit id set
pub fn deal_secret_with_ids<R: RngCore, G: AffineRepr>(
    rng: &mut R,
    secret: G::ScalarField,
    threshold: ShareId,
    ids: &[ShareId],
    comm_key: &PedersenCommitmentKey<G>,
) -> Result<
    (
        G::ScalarField,
        VerifiableShares<G::ScalarField>,
        CommitmentToCoefficients<G>,
        DensePolynomial<G::ScalarField>,
        DensePolynomial<G::ScalarField>,
    ),
    SSError,
> {
    let (s_shares, s_poly) = shamir::deal_secret_with_ids(rng, secret, threshold, ids)?;
    let blinding = G::ScalarField::rand(rng);
    let (t_shares, t_poly) = shamir::deal_secret_with_ids(rng, blinding, threshold, ids)?;
    let coeff_comms = comm_key.commit_to_a_batch(&s_poly.coeffs, &t_poly.coeffs);

    Ok((
        blinding,
        VerifiableShares(
            cfg_into_iter!(s_shares.0)
                .zip(cfg_into_iter!(t_shares.0))
                .map(|(s, t)| VerifiableShare {
                    id: s.id,
                    threshold,
                    secret_share: s.share,
                    blinding_share: t.share,
                })
                .collect(),
        ),
        coeff_comms.into(),
        s_poly,
        t_poly,
    ))
}

impl<F: PrimeField> VerifiableShare<F> {
    /// Executed by a participant on its share received from the dealer. Also run by a
    /// reconstructor over each share before interpolation.
    pub fn verify<G: AffineRepr<ScalarField = F>>(
        &self,
        commitment_coeffs: &CommitmentToCoefficients<G>,
        comm_key: &PedersenCommitmentKey<G>,
    ) -> Result<(), SSError> {
        let len = commitment_coeffs.0.len() as ShareId;
        if self.threshold > len {
            return Err(SSError::BelowThreshold(self.threshold, len));
        }
        let powers = powers(&G::ScalarField::from(self.id as u64), self.threshold as u32);
        if G::Group::msm_unchecked(&commitment_coeffs.0, &powers).into()
            != comm_key.commit(&self.secret_share, &self.blinding_share)
        {
            return Err(SSError::InvalidShare);
        }
        Ok(())
    }
}

impl<F: PrimeField> VerifiableShares<F> {
    pub fn reconstruct_secret(&self) -> Result<(F, F), SSError> {
        let threshold = self.threshold();
        let mut s_shares = Vec::with_capacity(self.0.len());
        let mut t_shares = Vec::with_capacity(self.0.len());
        for share in &self.0 {
            s_shares.push(Share {
                id: share.id,
                threshold,
                share: share.secret_share,
            });
            t_shares.push(Share {
                id: share.id,
                threshold,
                share: share.blinding_share,
            });
        }
        let s = Shares(s_shares).reconstruct_secret()?;
        let t = Shares(t_shares).reconstruct_secret()?;

        Ok((s, t))
    }

    pub fn threshold(&self) -> ShareId {
        self.0[0].threshold
    }
}
