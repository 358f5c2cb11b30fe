//! Threshold BBS+ signing. A committee holds Shamir shares of the signing key,
//! produced by the fail-stop DKG in [`secret_sharing::pedersen_dkg`] with the public
//! key in G2. Any quorum of `2 * threshold - 1` share holders can then sign:
//!
//! 1. [`randomness_phase::Phase1`]: the quorum runs three Pedersen-VSS sub-protocols
//!    dealing fresh joint secrets, the signature nonces `e` and `s` and an inversion
//!    mask. The nonces are public components of the final signature, so their shares
//!    are opened at the end of the phase.
//! 2. [`inversion_phase::Phase2`]: each signer broadcasts the product of its masked key
//!    share `(x_i + e_i) * mask_i`. The interpolated product reveals only
//!    `(x + e) * mask`, which is uniformly random; dividing the own mask share by it
//!    gives a share of `1 / (x + e)` and the signer emits its signature element
//!    `A_i = b * u_i`. Products of two degree-`threshold - 1` sharings lie on a
//!    degree-`2 * threshold - 2` polynomial, hence the quorum size.
//! 3. [`reconstruction`]: anyone holding the quorum's shares interpolates `A`, `e` and
//!    `s` at 0 (in the exponent for `A`) and verifies the signature before release.
//!
//! The result is a standard signature, indistinguishable from one created by a single
//! signer holding the key. No party ever learns the key, any fewer than `threshold`
//! shares reveal nothing about it.
//!
//! Messages are tagged with a 16-byte session id chosen by whoever convenes the
//! signing session; mixing sessions is rejected.

use ark_std::rand::RngCore;

pub mod inversion_phase;
pub mod randomness_phase;
pub mod reconstruction;

pub use inversion_phase::{MaskedProductBroadcast, Phase2};
pub use randomness_phase::{NonceOpening, Phase1, Phase1Output, Round1Broadcast, Round1Unicast};
pub use reconstruction::SignatureShare;

/// Identifies one signing session across all its messages
pub type SessionId = [u8; 16];

pub fn new_session_id<R: RngCore>(rng: &mut R) -> SessionId {
    let mut id = [0u8; 16];
    rng.fill_bytes(&mut id);
    id
}
