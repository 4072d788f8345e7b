//! Group token issuance and validation.
//!
//! Issuance verifies **every** member SAS before computing the aggregate.
//! One bad member rejects the whole request with `InvalidSingleToken` and
//! no group token is issued — an aggregate over an unverified member
//! would be a proof of nothing.
//!
//! Validation is the opposite: it checks only the byte-level aggregate
//! hash. Members are not individually re-derived, because aggregate
//! validity is defined over the bytes that were hashed at issuance time,
//! and those bytes already bound each member's claimed token.

use crate::error::ProtocolError;
use crate::sas::{Gas, Sas};
use crate::wire::{WireMessage, STATUS_FAIL, STATUS_PASS};

/// Issue a group token over an ordered member list.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidSingleToken`] naming the first member
/// whose individual token fails verification. The count and length
/// consistency checks happened at decode time.
pub fn issue(members: Vec<Sas>) -> Result<WireMessage, ProtocolError> {
    for sas in &members {
        if !sas.verify() {
            tracing::warn!(
                student_id = sas.identity().student_id(),
                nonce = sas.identity().nonce(),
                "group request contains an invalid member token"
            );
            return Err(ProtocolError::InvalidSingleToken(
                sas.identity().student_id().to_string(),
            ));
        }
    }

    let count = members.len();
    let gas = Gas::derive(members)?;
    tracing::debug!(count, token = gas.token(), "issued group token");
    Ok(WireMessage::GroupResponse(gas))
}

/// Validate a submitted GAS.
///
/// Recomputes the aggregate over the members' raw blocks and replies with
/// the submitted GAS plus a pass/fail status byte.
pub fn validate(gas: Gas) -> WireMessage {
    let status = if gas.verify() { STATUS_PASS } else { STATUS_FAIL };
    tracing::debug!(count = gas.members().len(), status, "validated group token");
    WireMessage::GroupValidateResponse { gas, status }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::Identity;

    fn good_sas(id: &str, nonce: u32) -> Sas {
        Sas::derive(Identity::new(id, nonce).unwrap())
    }

    fn bad_sas(id: &str, nonce: u32) -> Sas {
        Sas::new(Identity::new(id, nonce).unwrap(), "0".repeat(64)).unwrap()
    }

    #[test]
    fn issue_over_verified_members() {
        let members = vec![good_sas("A1", 1), good_sas("B2", 2)];
        match issue(members.clone()).unwrap() {
            WireMessage::GroupResponse(gas) => {
                assert_eq!(gas.members(), members.as_slice());
                assert_eq!(gas.token(), Gas::derive(members).unwrap().token());
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn one_bad_member_suppresses_the_response() {
        // The whole request is rejected — no group token is ever issued
        // over an unverified member, regardless of position.
        let err = issue(vec![good_sas("A1", 1), bad_sas("B2", 2)]).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidSingleToken("B2".into()));
        assert_eq!(err.wire_code(), 4);

        let err = issue(vec![bad_sas("A1", 1), good_sas("B2", 2)]).unwrap_err();
        assert_eq!(err, ProtocolError::InvalidSingleToken("A1".into()));
    }

    #[test]
    fn validate_passes_derived_gas() {
        let gas = Gas::derive(vec![good_sas("A1", 1), good_sas("B2", 2)]).unwrap();
        match validate(gas) {
            WireMessage::GroupValidateResponse { status, .. } => {
                assert_eq!(status, STATUS_PASS)
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn validate_fails_reordered_members() {
        let gas = Gas::derive(vec![good_sas("A1", 1), good_sas("B2", 2)]).unwrap();
        let reordered = Gas::new(
            vec![good_sas("B2", 2), good_sas("A1", 1)],
            gas.token().to_string(),
        )
        .unwrap();
        match validate(reordered) {
            WireMessage::GroupValidateResponse { status, .. } => {
                assert_eq!(status, STATUS_FAIL)
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn validate_does_not_reverify_members() {
        // A GAS whose members carry bogus individual tokens still passes
        // aggregate validation when the aggregate covers those exact bytes.
        let members = vec![bad_sas("A1", 1)];
        let gas = Gas::derive(members).unwrap();
        match validate(gas) {
            WireMessage::GroupValidateResponse { status, .. } => {
                assert_eq!(status, STATUS_PASS)
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
