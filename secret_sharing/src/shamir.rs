//! Shamir secret sharing

use ark_ff::PrimeField;
use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Polynomial};
use ark_std::{cfg_into_iter, rand::RngCore, vec::Vec};

use crate::{
    common,
    common::{ShareId, Shares},
    error::SSError,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Generate a random secret and share it `threshold`-of-`total`. Returns the secret,
/// the shares and the polynomial whose constant term is the secret.
pub fn deal_random_secret<R: RngCore, F: PrimeField>(
    rng: &mut R,
    threshold: ShareId,
    total: ShareId,
) -> Result<(F, Shares<F>, DensePolynomial<F>), SSError> {
    let secret = F::rand(rng);
    let (shares, poly) = deal_secret(rng, secret, threshold, total)?;
    Ok((secret, shares, poly))
}

/// Same as `deal_random_secret` but accepts the secret to share. Shares are evaluated
/// at ids `1..=total`.
pub fn deal_secret<R: RngCore, F: PrimeField>(
    rng: &mut R,
    secret: F,
    threshold: ShareId,
    total: ShareId,
) -> Result<(Shares<F>, DensePolynomial<F>), SSError> {
    let ids = (1..=total).collect::<Vec<ShareId>>();
    deal_secret_with_ids(rng, secret, threshold, &ids)
}

/// Share the secret with evaluations at the given id set. Needed when the receivers
/// are a strict subset of a larger party set and must keep their original ids, e.g.
/// a signing quorum sharing a fresh nonce.
pub fn deal_secret_with_ids<R: RngCore, F: PrimeField>(
    rng: &mut R,
    secret: F,
    threshold: ShareId,
    ids: &[ShareId],
) -> Result<(Shares<F>, DensePolynomial<F>), SSError> {
    let total = ids.len() as ShareId;
    if threshold > total || total < 2 || threshold < 1 {
        return Err(SSError::InvalidThresholdOrTotal(threshold, total));
    }
    common::ensure_distinct_nonzero_ids(ids)?;
    let mut coeffs = Vec::with_capacity(threshold as usize);
    coeffs.push(secret);
    coeffs.append(&mut (0..threshold - 1).map(|_| F::rand(rng)).collect());
    let poly = DensePolynomial::from_coefficients_vec(coeffs);
    let shares = cfg_into_iter!(ids)
        .map(|i| (*i, threshold, poly.evaluate(&F::from(*i as u64))).into())
        .collect::<Vec<_>>();
    Ok((Shares(shares), poly))
}

impl<F: PrimeField> Shares<F> {
    /// Interpolate the secret at 0. Assumes the shares have unique nonzero ids and a
    /// common threshold.
    pub fn reconstruct_secret(&self) -> Result<F, SSError> {
        let threshold = self.threshold();
        let len = self.0.len() as ShareId;
        if threshold > len {
            return Err(SSError::BelowThreshold(threshold, len));
        }
        let shares = &self.0[0..threshold as usize];
        let share_ids = shares.iter().map(|s| s.id).collect::<Vec<_>>();
        let basis = common::lagrange_basis_at_0_for_all::<F>(share_ids)?;
        Ok(cfg_into_iter!(basis)
            .zip(cfg_into_iter!(shares))
            .map(|(b, s)| b * s.share)
            .sum::<F>())
    }
}
