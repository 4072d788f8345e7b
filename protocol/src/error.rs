//! Error types for the SASP wire protocol.
//!
//! The taxonomy is deliberately closed: five codes, fixed at 1–5, carried
//! on the wire as the payload of an `Error` (type 256) message. A token
//! that fails verification is **not** an error — validation responses
//! carry a pass/fail status byte instead. Errors are reserved for
//! requests the server could not process at all.

use thiserror::Error;

/// Errors that can occur while decoding or servicing a SASP request.
///
/// Every variant maps to exactly one wire code via [`wire_code`]
/// (ProtocolError::wire_code). The dispatcher converts any of these into
/// an `Error` reply; none of them ever takes the server down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The leading type tag of a datagram is not one of the request
    /// types the server understands.
    #[error("invalid message code: {0}")]
    InvalidMessageCode(u16),

    /// The payload length does not match what the declared message type
    /// requires.
    #[error("incorrect message length: expected {expected}, got {got}")]
    IncorrectMessageLength {
        /// The length the message type requires.
        expected: usize,
        /// The length that actually arrived.
        got: usize,
    },

    /// A fixed-width field failed to parse — a truncated integer, a zero
    /// member count, or a group count that disagrees with the payload size.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A member SAS inside a group request failed individual verification.
    /// The group token is never issued over an unverified member.
    #[error("invalid single token for student '{0}'")]
    InvalidSingleToken(String),

    /// A text field (student id or token) contains non-ASCII bytes.
    #[error("ascii decode error in field '{0}'")]
    AsciiDecodeError(&'static str),
}

impl ProtocolError {
    /// The u16 code this error carries on the wire.
    pub fn wire_code(&self) -> u16 {
        match self {
            ProtocolError::InvalidMessageCode(_) => 1,
            ProtocolError::IncorrectMessageLength { .. } => 2,
            ProtocolError::InvalidParameter(_) => 3,
            ProtocolError::InvalidSingleToken(_) => 4,
            ProtocolError::AsciiDecodeError(_) => 5,
        }
    }

    /// Human-readable name for a wire code, used by the client when it
    /// receives an `Error` reply and has nothing but the code to show.
    pub fn describe_wire_code(code: u16) -> &'static str {
        match code {
            1 => "invalid message code",
            2 => "incorrect message length",
            3 => "invalid parameter",
            4 => "invalid single token",
            5 => "ascii decode error",
            _ => "unknown error",
        }
    }
}
