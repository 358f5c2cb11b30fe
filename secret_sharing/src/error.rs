use crate::common::{ParticipantId, ShareId};
use schnorr_pok::error::SchnorrError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub enum SSError {
    InvalidThresholdOrTotal(ShareId, ShareId),
    BelowThreshold(ShareId, ShareId),
    /// Share ids are evaluation points of the share polynomial so 0 would reveal the secret
    XCordCantBeZero,
    DuplicateShareId(ShareId),
    /// A dealt share does not open the dealer's coefficient commitments
    InvalidShare,
    /// Share received from the first party failed verification at the second party.
    /// The DKG is fail-stop, so this aborts the instance.
    InconsistentShare(ParticipantId, ParticipantId),
    InvalidParticipantId(ParticipantId),
    ParticipantNotInGroup(ParticipantId),
    AlreadyProcessedFromSender(ParticipantId),
    MissingContributionFrom(ParticipantId),
    SenderIdSameAsReceiver(ParticipantId, ParticipantId),
    UnequalThresholdInReceivedShare(ShareId, ShareId),
    DoesNotSupportThreshold(ShareId),
    UnequalParticipantAndShareId(ParticipantId, ShareId),
    /// The broadcast public key piece is not consistent with the sender's committed secret
    InvalidPublicKeyContribution(ParticipantId),
    SchnorrError(SchnorrError),
}

impl From<SchnorrError> for SSError {
    fn from(e: SchnorrError) -> Self {
        Self::SchnorrError(e)
    }
}
