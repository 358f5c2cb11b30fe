use crate::{concat_slices, hashing_utils::affine_group_elem_from_try_and_incr};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use digest::Digest;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::serde_utils::ArkObjectBytes;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use ark_std::cfg_into_iter;

/// A pair of independent generators for Pedersen commitments, `commit(m, r) = g*m + h*r`.
/// Both generators are derived by hashing a public label so no discrete log relation
/// between them is known.
#[serde_as]
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
pub struct PedersenCommitmentKey<G: AffineRepr> {
    #[serde_as(as = "ArkObjectBytes")]
    pub g: G,
    #[serde_as(as = "ArkObjectBytes")]
    pub h: G,
}

impl<G: AffineRepr> PedersenCommitmentKey<G> {
    /// Derive a new commitment key by hashing the given label
    pub fn new<D: Digest>(label: &[u8]) -> Self {
        let g = affine_group_elem_from_try_and_incr::<G, D>(&concat_slices!(label, b" : G"));
        let h = affine_group_elem_from_try_and_incr::<G, D>(&concat_slices!(label, b" : H"));
        Self { g, h }
    }

    /// Commit to the message `m` with randomness `r`
    pub fn commit(&self, m: &G::ScalarField, r: &G::ScalarField) -> G {
        self.commit_as_projective(m, r).into_affine()
    }

    pub fn commit_as_projective(&self, m: &G::ScalarField, r: &G::ScalarField) -> G::Group {
        self.g.mul_bigint(m.into_bigint()) + self.h.mul_bigint(r.into_bigint())
    }

    /// Commit to a batch of message/randomness pairs, normalizing all results at once.
    /// `messages` and `randomness` must have the same length.
    pub fn commit_to_a_batch(
        &self,
        messages: &[G::ScalarField],
        randomness: &[G::ScalarField],
    ) -> Vec<G> {
        debug_assert_eq!(messages.len(), randomness.len());
        G::Group::normalize_batch(
            &cfg_into_iter!(0..messages.len())
                .map(|i| self.commit_as_projective(&messages[i], &randomness[i]))
                .collect::<Vec<_>>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::{Fr, G1Affine};
    use ark_std::{
        rand::{rngs::StdRng, SeedableRng},
        UniformRand,
    };
    use blake2::Blake2b512;

    #[test]
    fn commitment_key_from_label() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let comm_key = PedersenCommitmentKey::<G1Affine>::new::<Blake2b512>(b"test");
        assert_ne!(comm_key.g, comm_key.h);
        assert_eq!(
            comm_key,
            PedersenCommitmentKey::<G1Affine>::new::<Blake2b512>(b"test")
        );

        let m = Fr::rand(&mut rng);
        let r = Fr::rand(&mut rng);
        let comm = comm_key.commit(&m, &r);
        assert_eq!(
            comm,
            (comm_key.g.mul_bigint(m.into_bigint()) + comm_key.h.mul_bigint(r.into_bigint()))
                .into_affine()
        );

        let ms = (0..5).map(|_| Fr::rand(&mut rng)).collect::<Vec<_>>();
        let rs = (0..5).map(|_| Fr::rand(&mut rng)).collect::<Vec<_>>();
        let comms = comm_key.commit_to_a_batch(&ms, &rs);
        for i in 0..5 {
            assert_eq!(comms[i], comm_key.commit(&ms[i], &rs[i]));
        }
    }
}
