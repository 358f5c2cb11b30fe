use crate::concat_slices;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use digest::Digest;

/// Try-and-increment search: hash the domain, feed the digest to `decode`, and on a
/// decoding miss re-hash with an attempt counter appended until `decode` accepts.
/// Not constant time, so only meant for public inputs such as setup labels and
/// Fiat-Shamir transcripts.
fn search_digest<D: Digest, T>(domain: &[u8], decode: impl Fn(&[u8]) -> Option<T>) -> T {
    if let Some(found) = decode(&D::digest(domain)) {
        return found;
    }
    let mut attempt = 1u64;
    loop {
        let digest = D::digest(&concat_slices!(domain, b"-attempt-", attempt.to_le_bytes()));
        if let Some(found) = decode(&digest) {
            return found;
        }
        attempt += 1;
    }
}

/// Hash bytes to a group element, returned in projective coordinates
pub fn projective_group_elem_from_try_and_incr<G: AffineRepr, D: Digest>(bytes: &[u8]) -> G::Group {
    search_digest::<D, G>(bytes, |digest| G::from_random_bytes(digest)).mul_by_cofactor_to_group()
}

/// Hash bytes to a group element, returned in affine coordinates
pub fn affine_group_elem_from_try_and_incr<G: AffineRepr, D: Digest>(bytes: &[u8]) -> G {
    projective_group_elem_from_try_and_incr::<G, D>(bytes).into_affine()
}

/// Hash bytes to a field element
pub fn field_elem_from_try_and_incr<F: PrimeField, D: Digest>(bytes: &[u8]) -> F {
    search_digest::<D, F>(bytes, |digest| F::from_random_bytes(digest))
}
