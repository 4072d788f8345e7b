//! The dispatcher: one datagram in, one reply out, no exceptions.
//!
//! [`dispatch`] is total over arbitrary byte input. Decode failures,
//! handler rejections, and unroutable message types all collapse into an
//! encoded `Error(code)` reply — the server's receive loop calls this
//! function and sends whatever comes back, so a malformed datagram can
//! never take the process down. There is no catch-all exception barrier
//! here because there is nothing to catch: every failure path is a typed
//! [`ProtocolError`] that pattern-matching turns into a reply.

use crate::error::ProtocolError;
use crate::wire::WireMessage;

use super::{group, individual};

/// Produce the reply bytes for one request datagram.
///
/// Routes tags 1, 3, 5, and 7 to their handlers. Anything else — unknown
/// tags, response-type messages sent at the server, malformed payloads —
/// becomes an `Error` reply carrying the matching taxonomy code.
pub fn dispatch(datagram: &[u8]) -> Vec<u8> {
    let reply = match handle(datagram) {
        Ok(reply) => reply,
        Err(err) => {
            tracing::warn!(code = err.wire_code(), %err, "request rejected");
            WireMessage::Error(err.wire_code())
        }
    };
    reply.encode()
}

/// Decode and route. Every failure is a typed [`ProtocolError`].
fn handle(datagram: &[u8]) -> Result<WireMessage, ProtocolError> {
    let request = WireMessage::decode(datagram)?;
    match request {
        WireMessage::IndividualRequest(identity) => Ok(individual::issue(identity)),
        WireMessage::IndividualValidate(sas) => Ok(individual::validate(sas)),
        WireMessage::GroupRequest(members) => group::issue(members),
        WireMessage::GroupValidate(gas) => Ok(group::validate(gas)),
        // Well-formed but not a request: a client echoing responses back
        // at the server gets the same treatment as an unknown tag.
        other => Err(ProtocolError::InvalidMessageCode(other.tag())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::{Gas, Identity, Sas};
    use crate::token::derive_individual;
    use crate::wire::{STATUS_FAIL, STATUS_PASS};

    fn decode_reply(bytes: &[u8]) -> WireMessage {
        WireMessage::decode(bytes).expect("server replies are always well-formed")
    }

    #[test]
    fn routes_individual_request() {
        let request = WireMessage::IndividualRequest(Identity::new("A00123456", 42).unwrap());
        let reply = decode_reply(&dispatch(&request.encode()));
        match reply {
            WireMessage::IndividualResponse(sas) => {
                assert_eq!(sas.token(), derive_individual("A00123456", 42));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn routes_individual_validate() {
        let sas = Sas::derive(Identity::new("A1", 1).unwrap());
        let reply = decode_reply(&dispatch(&WireMessage::IndividualValidate(sas).encode()));
        assert!(matches!(
            reply,
            WireMessage::IndividualValidateResponse {
                status: STATUS_PASS,
                ..
            }
        ));
    }

    #[test]
    fn routes_group_request_and_validate() {
        let members = vec![
            Sas::derive(Identity::new("A1", 1).unwrap()),
            Sas::derive(Identity::new("B2", 2).unwrap()),
        ];
        let reply = decode_reply(&dispatch(
            &WireMessage::GroupRequest(members.clone()).encode(),
        ));
        let gas = match reply {
            WireMessage::GroupResponse(gas) => gas,
            other => panic!("unexpected reply: {:?}", other),
        };

        let reply = decode_reply(&dispatch(&WireMessage::GroupValidate(gas).encode()));
        assert!(matches!(
            reply,
            WireMessage::GroupValidateResponse {
                status: STATUS_PASS,
                ..
            }
        ));
    }

    #[test]
    fn bad_group_member_yields_error_4_and_no_response() {
        let members = vec![
            Sas::derive(Identity::new("A1", 1).unwrap()),
            Sas::new(Identity::new("B2", 2).unwrap(), "0".repeat(64)).unwrap(),
        ];
        let reply = decode_reply(&dispatch(&WireMessage::GroupRequest(members).encode()));
        assert_eq!(reply, WireMessage::Error(4));
    }

    #[test]
    fn tampered_gas_is_a_fail_verdict_not_an_error() {
        let gas = Gas::new(
            vec![Sas::derive(Identity::new("A1", 1).unwrap())],
            "f".repeat(64),
        )
        .unwrap();
        let reply = decode_reply(&dispatch(&WireMessage::GroupValidate(gas).encode()));
        assert!(matches!(
            reply,
            WireMessage::GroupValidateResponse {
                status: STATUS_FAIL,
                ..
            }
        ));
    }

    #[test]
    fn unknown_tag_yields_error_1() {
        let mut buf = 99u16.to_be_bytes().to_vec();
        buf.extend_from_slice(&[0u8; 16]);
        assert_eq!(decode_reply(&dispatch(&buf)), WireMessage::Error(1));
    }

    #[test]
    fn response_tags_are_not_routable() {
        let sas = Sas::derive(Identity::new("A1", 1).unwrap());
        let echoed = WireMessage::IndividualResponse(sas).encode();
        assert_eq!(decode_reply(&dispatch(&echoed)), WireMessage::Error(1));
    }

    #[test]
    fn wrong_length_yields_error_2() {
        let mut buf = 1u16.to_be_bytes().to_vec();
        buf.extend_from_slice(&[b'A'; 15]);
        assert_eq!(decode_reply(&dispatch(&buf)), WireMessage::Error(2));
    }

    #[test]
    fn dispatch_is_total_over_garbage() {
        // Empty, short, and random datagrams all still produce a reply.
        for garbage in [&[][..], &[7][..], &[0xFF; 300][..]] {
            let reply = decode_reply(&dispatch(garbage));
            assert!(matches!(reply, WireMessage::Error(_)));
        }
    }
}
