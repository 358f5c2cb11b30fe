use ark_serialize::SerializationError;
use ark_std::fmt::Debug;
use crypto_utils::serde_utils::ArkSerializationError;
use schnorr_pok::error::SchnorrError;
use secret_sharing::{common::ParticipantId, error::SSError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub enum BBSPlusError {
    NoMessageToSign,
    MessageCountIncompatibleWithSigParams(usize, usize),
    MessageIndexOutOfBounds(usize, usize),
    /// Signature's `A` is the identity element
    ZeroSignature,
    InvalidSignature,
    /// Pairing check failed during verification of proof of knowledge of signature
    PairingCheckFailed,
    /// 1st Schnorr proof failed during verification of proof of knowledge of signature
    FirstSchnorrVerificationFailed,
    /// 2nd Schnorr proof failed during verification of proof of knowledge of signature
    SecondSchnorrVerificationFailed,
    InvalidMessageIdx(usize),
    InvalidMsgIdxForResponse(usize),
    /// A signing quorum needs `2 * threshold - 1` members to interpolate the masked
    /// products; first element is the quorum size, second the required size
    InsufficientQuorum(u16, u16),
    UnexpectedParticipant(ParticipantId),
    WrongSessionId,
    AlreadyProcessedFromSender(ParticipantId),
    MissingContributionFrom(ParticipantId),
    /// The joint mask product interpolated to 0; retriable with a fresh masking
    /// sub-protocol in the same session
    InversionFailed,
    TooFewShares(u16, u16),
    DuplicateShare(ParticipantId),
    UnequalThresholdInShares(u16, u16),
    /// The reconstructed signature failed verification. Intentionally silent about
    /// which share was bad.
    ReconstructedSignatureInvalid,
    SSError(SSError),
    SchnorrError(SchnorrError),
    #[serde(with = "ArkSerializationError")]
    Serialization(SerializationError),
}

impl From<SSError> for BBSPlusError {
    fn from(e: SSError) -> Self {
        Self::SSError(e)
    }
}

impl From<SchnorrError> for BBSPlusError {
    fn from(e: SchnorrError) -> Self {
        Self::SchnorrError(e)
    }
}

impl From<SerializationError> for BBSPlusError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}
