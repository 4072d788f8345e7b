//! Individual token issuance and validation.
//!
//! Issuance is deliberately unconditional: the server derives a token for
//! whatever identity is presented, with no authorization gate. The trust
//! model is that downstream verifiers check possession of the nonce, not
//! that the server vets who may ask. Validation likewise never "fails" a
//! request — a wrong token is a first-class `status = 1` verdict.

use crate::sas::{Identity, Sas};
use crate::wire::{WireMessage, STATUS_FAIL, STATUS_PASS};

/// Issue an individual token.
///
/// Derives the token for the presented identity and echoes the identity
/// back alongside it. Infallible: every well-formed request gets a token.
pub fn issue(identity: Identity) -> WireMessage {
    tracing::debug!(
        student_id = identity.student_id(),
        nonce = identity.nonce(),
        "issuing individual token"
    );
    WireMessage::IndividualResponse(Sas::derive(identity))
}

/// Validate a submitted SAS.
///
/// Recomputes the derivation and replies with the submitted SAS plus a
/// pass/fail status byte. A mismatch is a normal outcome, not an error.
pub fn validate(sas: Sas) -> WireMessage {
    let status = if sas.verify() { STATUS_PASS } else { STATUS_FAIL };
    tracing::debug!(
        student_id = sas.identity().student_id(),
        nonce = sas.identity().nonce(),
        status,
        "validated individual token"
    );
    WireMessage::IndividualValidateResponse { sas, status }
}
