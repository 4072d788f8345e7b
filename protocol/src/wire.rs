//! # Wire Codec
//!
//! Translates between [`WireMessage`] values and raw datagram bytes. This
//! is the trust boundary: every byte that arrives over UDP goes through
//! [`WireMessage::decode`] before anything else looks at it, and decode
//! rejects — never panics on — malformed input.
//!
//! ## Layouts
//!
//! All integers are big-endian. The leading u16 is the type tag.
//!
//! | Tag | Message                    | Payload                                  |
//! |-----|----------------------------|------------------------------------------|
//! | 1   | IndividualRequest          | id(12) ‖ nonce(4)                        |
//! | 2   | IndividualResponse         | id(12) ‖ nonce(4) ‖ token(64)            |
//! | 3   | IndividualValidate         | id(12) ‖ nonce(4) ‖ token(64)            |
//! | 4   | IndividualValidateResponse | sas(80) ‖ status(1)                      |
//! | 5   | GroupRequest               | count(2) ‖ n × sas(80)                   |
//! | 6   | GroupResponse              | count(2) ‖ n × sas(80) ‖ token(64)       |
//! | 7   | GroupValidate              | count(2) ‖ n × sas(80) ‖ token(64)       |
//! | 8   | GroupValidateResponse      | count(2) ‖ n × sas(80) ‖ token(64) ‖ status(1) |
//! | 256 | Error                      | code(2)                                  |
//!
//! ## Length contracts
//!
//! Decode enforces exact lengths: a fixed-layout message with one byte too
//! many or too few is `IncorrectMessageLength`; a group message whose
//! declared count disagrees with the remaining bytes is `InvalidParameter`;
//! non-ASCII bytes in a text field are `AsciiDecodeError`. Encode is the
//! structural inverse — `decode(encode(m)) == m` for every well-formed `m`.

use crate::config::{
    GROUP_VALIDATE_MIN_LEN, INDIVIDUAL_REQUEST_LEN, MSG_ERROR, MSG_GROUP_REQUEST,
    MSG_GROUP_RESPONSE, MSG_GROUP_VALIDATE, MSG_GROUP_VALIDATE_RESPONSE, MSG_INDIVIDUAL_REQUEST,
    MSG_INDIVIDUAL_RESPONSE, MSG_INDIVIDUAL_VALIDATE, MSG_INDIVIDUAL_VALIDATE_RESPONSE, SAS_LEN,
    TOKEN_LEN,
};
use crate::error::ProtocolError;
use crate::sas::{Gas, Identity, Sas};

/// Validation verdict carried in the status byte of validation responses:
/// `0` is a pass, `1` is a fail.
pub const STATUS_PASS: u8 = 0;

/// Fail verdict. See [`STATUS_PASS`].
pub const STATUS_FAIL: u8 = 1;

/// One SASP datagram, in semantic form.
///
/// Requests flow client → server (tags 1, 3, 5, 7), responses flow back
/// (tags 2, 4, 6, 8), and `Error` (tag 256) replaces any response the
/// server could not produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    /// Request an individual token for an identity.
    IndividualRequest(Identity),
    /// An issued individual token, echoing the requested identity.
    IndividualResponse(Sas),
    /// Ask the server to check a SAS.
    IndividualValidate(Sas),
    /// Verdict on an [`IndividualValidate`](Self::IndividualValidate):
    /// the submitted SAS plus a status byte.
    IndividualValidateResponse {
        /// The SAS exactly as submitted.
        sas: Sas,
        /// [`STATUS_PASS`] or [`STATUS_FAIL`].
        status: u8,
    },
    /// Request an aggregate token over an ordered member list.
    GroupRequest(Vec<Sas>),
    /// An issued group token: the members plus the aggregate.
    GroupResponse(Gas),
    /// Ask the server to check a GAS.
    GroupValidate(Gas),
    /// Verdict on a [`GroupValidate`](Self::GroupValidate).
    GroupValidateResponse {
        /// The GAS exactly as submitted.
        gas: Gas,
        /// [`STATUS_PASS`] or [`STATUS_FAIL`].
        status: u8,
    },
    /// Structured failure reply. The code is from the closed taxonomy in
    /// [`crate::error`].
    Error(u16),
}

impl WireMessage {
    /// The wire tag for this message.
    pub fn tag(&self) -> u16 {
        match self {
            WireMessage::IndividualRequest(_) => MSG_INDIVIDUAL_REQUEST,
            WireMessage::IndividualResponse(_) => MSG_INDIVIDUAL_RESPONSE,
            WireMessage::IndividualValidate(_) => MSG_INDIVIDUAL_VALIDATE,
            WireMessage::IndividualValidateResponse { .. } => MSG_INDIVIDUAL_VALIDATE_RESPONSE,
            WireMessage::GroupRequest(_) => MSG_GROUP_REQUEST,
            WireMessage::GroupResponse(_) => MSG_GROUP_RESPONSE,
            WireMessage::GroupValidate(_) => MSG_GROUP_VALIDATE,
            WireMessage::GroupValidateResponse { .. } => MSG_GROUP_VALIDATE_RESPONSE,
            WireMessage::Error(_) => MSG_ERROR,
        }
    }

    /// Encode to datagram bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(&self.tag().to_be_bytes());
        match self {
            WireMessage::IndividualRequest(identity) => {
                buf.extend_from_slice(&identity.padded_id());
                buf.extend_from_slice(&identity.nonce().to_be_bytes());
            }
            WireMessage::IndividualResponse(sas) | WireMessage::IndividualValidate(sas) => {
                buf.extend_from_slice(&sas.to_bytes());
            }
            WireMessage::IndividualValidateResponse { sas, status } => {
                buf.extend_from_slice(&sas.to_bytes());
                buf.push(*status);
            }
            WireMessage::GroupRequest(members) => {
                buf.extend_from_slice(&(members.len() as u16).to_be_bytes());
                for sas in members {
                    buf.extend_from_slice(&sas.to_bytes());
                }
            }
            WireMessage::GroupResponse(gas) | WireMessage::GroupValidate(gas) => {
                encode_gas(&mut buf, gas);
            }
            WireMessage::GroupValidateResponse { gas, status } => {
                encode_gas(&mut buf, gas);
                buf.push(*status);
            }
            WireMessage::Error(code) => {
                buf.extend_from_slice(&code.to_be_bytes());
            }
        }
        buf
    }

    /// Total encoded size in bytes, including the type tag.
    pub fn encoded_len(&self) -> usize {
        2 + match self {
            WireMessage::IndividualRequest(_) => INDIVIDUAL_REQUEST_LEN,
            WireMessage::IndividualResponse(_) | WireMessage::IndividualValidate(_) => SAS_LEN,
            WireMessage::IndividualValidateResponse { .. } => SAS_LEN + 1,
            WireMessage::GroupRequest(members) => 2 + SAS_LEN * members.len(),
            WireMessage::GroupResponse(gas) | WireMessage::GroupValidate(gas) => {
                2 + SAS_LEN * gas.members().len() + TOKEN_LEN
            }
            WireMessage::GroupValidateResponse { gas, .. } => {
                2 + SAS_LEN * gas.members().len() + TOKEN_LEN + 1
            }
            WireMessage::Error(_) => 2,
        }
    }

    /// Decode a datagram.
    ///
    /// Rejects anything that does not match a known layout exactly. The
    /// error variant tells the dispatcher which wire code to reply with.
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() < 2 {
            return Err(ProtocolError::IncorrectMessageLength {
                expected: 2,
                got: buf.len(),
            });
        }
        let tag = u16::from_be_bytes([buf[0], buf[1]]);
        let payload = &buf[2..];

        match tag {
            MSG_INDIVIDUAL_REQUEST => {
                expect_len(payload, INDIVIDUAL_REQUEST_LEN)?;
                Ok(WireMessage::IndividualRequest(Identity::from_wire(payload)?))
            }
            MSG_INDIVIDUAL_RESPONSE => {
                expect_len(payload, SAS_LEN)?;
                Ok(WireMessage::IndividualResponse(Sas::from_bytes(payload)?))
            }
            MSG_INDIVIDUAL_VALIDATE => {
                expect_len(payload, SAS_LEN)?;
                Ok(WireMessage::IndividualValidate(Sas::from_bytes(payload)?))
            }
            MSG_INDIVIDUAL_VALIDATE_RESPONSE => {
                expect_len(payload, SAS_LEN + 1)?;
                Ok(WireMessage::IndividualValidateResponse {
                    sas: Sas::from_bytes(&payload[..SAS_LEN])?,
                    status: payload[SAS_LEN],
                })
            }
            MSG_GROUP_REQUEST => {
                let (count, rest) = read_count(payload)?;
                if SAS_LEN * count != rest.len() {
                    return Err(ProtocolError::InvalidParameter(format!(
                        "group count {} disagrees with {} payload bytes",
                        count,
                        payload.len()
                    )));
                }
                Ok(WireMessage::GroupRequest(decode_members(rest, count)?))
            }
            MSG_GROUP_RESPONSE => Ok(WireMessage::GroupResponse(decode_gas(payload)?)),
            MSG_GROUP_VALIDATE => {
                if payload.len() < GROUP_VALIDATE_MIN_LEN {
                    return Err(ProtocolError::IncorrectMessageLength {
                        expected: GROUP_VALIDATE_MIN_LEN,
                        got: payload.len(),
                    });
                }
                Ok(WireMessage::GroupValidate(decode_gas(payload)?))
            }
            MSG_GROUP_VALIDATE_RESPONSE => {
                if payload.len() < GROUP_VALIDATE_MIN_LEN + 1 {
                    return Err(ProtocolError::IncorrectMessageLength {
                        expected: GROUP_VALIDATE_MIN_LEN + 1,
                        got: payload.len(),
                    });
                }
                let (body, status) = payload.split_at(payload.len() - 1);
                Ok(WireMessage::GroupValidateResponse {
                    gas: decode_gas(body)?,
                    status: status[0],
                })
            }
            MSG_ERROR => {
                expect_len(payload, 2)?;
                Ok(WireMessage::Error(u16::from_be_bytes([
                    payload[0], payload[1],
                ])))
            }
            other => Err(ProtocolError::InvalidMessageCode(other)),
        }
    }
}

/// Exact-length check shared by the fixed-layout messages.
fn expect_len(payload: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if payload.len() != expected {
        return Err(ProtocolError::IncorrectMessageLength {
            expected,
            got: payload.len(),
        });
    }
    Ok(())
}

/// Read and sanity-check the u16 member count that leads group payloads.
fn read_count(payload: &[u8]) -> Result<(usize, &[u8]), ProtocolError> {
    if payload.len() < 2 {
        return Err(ProtocolError::IncorrectMessageLength {
            expected: 2,
            got: payload.len(),
        });
    }
    let count = u16::from_be_bytes([payload[0], payload[1]]) as usize;
    if count == 0 {
        return Err(ProtocolError::InvalidParameter(
            "group count must be at least 1".into(),
        ));
    }
    Ok((count, &payload[2..]))
}

/// Decode `count` consecutive 80-byte SAS blocks. The caller has already
/// established that the slice length is exactly `count * SAS_LEN`.
fn decode_members(bytes: &[u8], count: usize) -> Result<Vec<Sas>, ProtocolError> {
    debug_assert_eq!(bytes.len(), count * SAS_LEN);
    bytes.chunks_exact(SAS_LEN).map(Sas::from_bytes).collect()
}

/// Decode a count-prefixed GAS payload: count ‖ members ‖ aggregate token.
fn decode_gas(payload: &[u8]) -> Result<Gas, ProtocolError> {
    let (count, rest) = read_count(payload)?;
    if SAS_LEN * count + TOKEN_LEN != rest.len() {
        return Err(ProtocolError::InvalidParameter(format!(
            "group count {} disagrees with {} payload bytes",
            count,
            payload.len()
        )));
    }
    let (member_bytes, token_field) = rest.split_at(SAS_LEN * count);
    let members = decode_members(member_bytes, count)?;
    if !token_field.is_ascii() {
        return Err(ProtocolError::AsciiDecodeError("token"));
    }
    let token = std::str::from_utf8(token_field)
        .map_err(|_| ProtocolError::AsciiDecodeError("token"))?;
    Gas::new(members, token)
}

/// Append a GAS body (count ‖ members ‖ token) to `buf`.
fn encode_gas(buf: &mut Vec<u8>, gas: &Gas) {
    buf.extend_from_slice(&(gas.members().len() as u16).to_be_bytes());
    for sas in gas.members() {
        buf.extend_from_slice(&sas.to_bytes());
    }
    buf.extend_from_slice(gas.token().as_bytes());
}
