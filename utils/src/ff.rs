use ark_ff::PrimeField;
use ark_std::vec::Vec;

/// Return the vector `[1, x, x^2, ..., x^{n-1}]`
pub fn powers<F: PrimeField>(x: &F, n: u32) -> Vec<F> {
    let mut out = Vec::with_capacity(n as usize);
    if n > 0 {
        out.push(F::one());
        let mut cur = *x;
        for _ in 1..n {
            out.push(cur);
            cur *= x;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bls12_381::Fr;
    use ark_std::{
        rand::{rngs::StdRng, SeedableRng},
        UniformRand,
    };

    #[test]
    fn check_powers() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let x = Fr::rand(&mut rng);
        assert!(powers::<Fr>(&x, 0).is_empty());
        assert_eq!(powers(&x, 1), ark_std::vec![Fr::from(1u64)]);
        let p = powers(&x, 5);
        assert_eq!(p.len(), 5);
        for i in 1..5 {
            assert_eq!(p[i], p[i - 1] * x);
        }
    }
}
