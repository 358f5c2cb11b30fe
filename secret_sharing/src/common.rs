use ark_ec::AffineRepr;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{cfg_into_iter, cfg_iter, vec::Vec};
use crypto_utils::serde_utils::ArkObjectBytes;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SSError;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// ShareId must be greater than 0 as shares are polynomial evaluations at the id
pub type ShareId = u16;

/// ParticipantId must be greater than 0
pub type ParticipantId = u16;

/// Share from Shamir secret sharing
#[serde_as]
#[derive(
    Default,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Zeroize,
    ZeroizeOnDrop,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Share<F: PrimeField> {
    #[zeroize(skip)]
    pub id: ShareId,
    #[zeroize(skip)]
    pub threshold: ShareId,
    #[serde_as(as = "ArkObjectBytes")]
    pub share: F,
}

/// Collection of `Share`s, expected to have unique ids and a common threshold
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct Shares<F: PrimeField>(pub Vec<Share<F>>);

/// Share from Pedersen verifiable secret sharing: an evaluation of the secret
/// polynomial together with the matching evaluation of the blinding polynomial
#[serde_as]
#[derive(
    Default,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Zeroize,
    ZeroizeOnDrop,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct VerifiableShare<F: PrimeField> {
    #[zeroize(skip)]
    pub id: ShareId,
    #[zeroize(skip)]
    pub threshold: ShareId,
    #[serde_as(as = "ArkObjectBytes")]
    pub secret_share: F,
    #[serde_as(as = "ArkObjectBytes")]
    pub blinding_share: F,
}

/// Collection of `VerifiableShare`s, expected to have unique ids and a common threshold
#[derive(
    Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct VerifiableShares<F: PrimeField>(pub Vec<VerifiableShare<F>>);

/// Commitments to the coefficients of a share polynomial. For Pedersen VSS each entry
/// commits to a (secret, blinding) coefficient pair.
#[serde_as]
#[derive(
    Default,
    Clone,
    Debug,
    PartialEq,
    Eq,
    CanonicalSerialize,
    CanonicalDeserialize,
    Serialize,
    Deserialize,
)]
pub struct CommitmentToCoefficients<G: AffineRepr>(
    #[serde_as(as = "Vec<ArkObjectBytes>")] pub Vec<G>,
);

impl<F: PrimeField> From<(ShareId, ShareId, F)> for Share<F> {
    fn from((i, t, s): (ShareId, ShareId, F)) -> Self {
        Share {
            id: i,
            threshold: t,
            share: s,
        }
    }
}

impl<F: PrimeField> Shares<F> {
    pub fn threshold(&self) -> ShareId {
        self.0[0].threshold
    }
}

impl<G: AffineRepr> From<Vec<G>> for CommitmentToCoefficients<G> {
    fn from(coeffs: Vec<G>) -> Self {
        CommitmentToCoefficients(coeffs)
    }
}

impl<G: AffineRepr> CommitmentToCoefficients<G> {
    /// The constant coefficient is the secret, this returns the commitment to it
    pub fn commitment_to_secret(&self) -> &G {
        &self.0[0]
    }

    pub fn poly_degree(&self) -> usize {
        self.0.len() - 1
    }

    pub fn supports_threshold(&self, threshold: ShareId) -> bool {
        threshold as usize - 1 == self.poly_degree()
    }
}

/// Lagrange basis polynomial of the member `i` evaluated at 0, over the given
/// x-coordinates: `prod_{j != i}(x_j / (x_j - i))`. Fails if any coordinate is 0 or
/// repeated.
pub fn lagrange_basis_at_0<F: PrimeField>(x_coords: &[ShareId], i: ShareId) -> Result<F, SSError> {
    ensure_distinct_nonzero_ids(x_coords)?;
    let mut numerator = F::one();
    let mut denominator = F::one();
    let i_f = F::from(i as u64);
    for x in x_coords {
        if *x == i {
            continue;
        }
        let x = F::from(*x as u64);
        numerator *= x;
        denominator *= x - i_f;
    }
    denominator.inverse_in_place().unwrap();
    Ok(numerator * denominator)
}

/// Lagrange basis polynomial at 0 for every given x-coordinate. Equivalent to calling
/// `lagrange_basis_at_0` for each coordinate but shares the product of all coordinates.
pub fn lagrange_basis_at_0_for_all<F: PrimeField>(
    x_coords: Vec<ShareId>,
) -> Result<Vec<F>, SSError> {
    // A duplicate would zero a denominator product below
    ensure_distinct_nonzero_ids(&x_coords)?;
    let x = cfg_into_iter!(x_coords.as_slice())
        .map(|x| F::from(*x as u64))
        .collect::<Vec<_>>();

    // \prod_{i}(x_i)
    let product = cfg_iter!(x).product::<F>();

    let r = cfg_into_iter!(x.clone())
        .map(move |i| {
            let mut denominator = cfg_iter!(x)
                .filter(|&j| &i != j)
                .map(|&j| j - i)
                .product::<F>();
            denominator.inverse_in_place().unwrap();

            // The numerator is the product of all x except x_i
            let numerator = product * i.inverse().unwrap();

            denominator * numerator
        })
        .collect::<Vec<_>>();
    Ok(r)
}

/// Check that the ids are distinct and nonzero, as required of any set of share ids
/// that will be interpolated at 0
pub fn ensure_distinct_nonzero_ids(ids: &[ShareId]) -> Result<(), SSError> {
    for (idx, id) in ids.iter().enumerate() {
        if *id == 0 {
            return Err(SSError::XCordCantBeZero);
        }
        if ids[..idx].contains(id) {
            return Err(SSError::DuplicateShareId(*id));
        }
    }
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use ark_bls12_381::Fr;
    use ark_ff::One;
    use ark_std::{
        cfg_iter,
        rand::{prelude::StdRng, SeedableRng},
        UniformRand,
    };

    #[test]
    fn cannot_compute_lagrange_basis_at_0_with_0_as_x_coordinate() {
        assert!(lagrange_basis_at_0::<Fr>(&[0, 1, 2, 4], 2).is_err());
        assert!(lagrange_basis_at_0::<Fr>(&[1, 0, 2, 4], 2).is_err());
        assert!(lagrange_basis_at_0_for_all::<Fr>(vec![1, 0, 2, 4]).is_err());
        assert!(lagrange_basis_at_0_for_all::<Fr>(vec![1, 3, 0, 4]).is_err());
    }

    #[test]
    fn compare_lagrange_basis_at_0() {
        let mut rng = StdRng::seed_from_u64(0u64);

        let count = 20;
        let mut x = Vec::with_capacity(count);
        while x.len() < count {
            let candidate = ShareId::rand(&mut rng);
            if candidate != 0 && !x.contains(&candidate) {
                x.push(candidate);
            }
        }

        let single = cfg_iter!(x)
            .map(|i| lagrange_basis_at_0(&x, *i).unwrap())
            .collect::<Vec<Fr>>();
        let multiple = lagrange_basis_at_0_for_all(x).unwrap();
        assert_eq!(single, multiple);
    }

    #[test]
    fn lagrange_basis_sums_to_one() {
        // The basis polynomials of any set partition unity at every evaluation point
        let basis = lagrange_basis_at_0_for_all::<Fr>(vec![1, 2, 3, 4, 5]).unwrap();
        assert_eq!(basis.iter().sum::<Fr>(), Fr::one());
        let basis = lagrange_basis_at_0_for_all::<Fr>(vec![2, 4, 7]).unwrap();
        assert_eq!(basis.iter().sum::<Fr>(), Fr::one());
    }

    #[test]
    fn distinct_nonzero_ids() {
        assert!(ensure_distinct_nonzero_ids(&[1, 2, 3]).is_ok());
        assert!(ensure_distinct_nonzero_ids(&[]).is_ok());
        assert!(ensure_distinct_nonzero_ids(&[1, 0, 3]).is_err());
        assert!(ensure_distinct_nonzero_ids(&[1, 2, 2]).is_err());
    }
}
