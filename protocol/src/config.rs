//! # Protocol Configuration & Constants
//!
//! Every magic number in SASP lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! These values define the wire format. Changing any of them breaks
//! compatibility with every deployed client and server, so don't.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Field Sizes
// ---------------------------------------------------------------------------

/// Student ID field width on the wire. IDs shorter than 12 bytes are
/// right-padded with ASCII spaces; IDs longer than 12 bytes don't exist.
pub const ID_LEN: usize = 12;

/// Nonce field width. A big-endian u32, so 4 bytes.
pub const NONCE_LEN: usize = 4;

/// Token field width. A SHA-256 digest rendered as lowercase hex is
/// always 64 ASCII characters. If yours isn't, something has gone
/// terribly wrong.
pub const TOKEN_LEN: usize = 64;

/// Full SAS block width: id (12) + nonce (4) + token (64).
pub const SAS_LEN: usize = ID_LEN + NONCE_LEN + TOKEN_LEN;

/// Payload size of an individual token request: id (12) + nonce (4).
pub const INDIVIDUAL_REQUEST_LEN: usize = ID_LEN + NONCE_LEN;

/// Minimum payload size of a group validation: count (2) + one SAS (80)
/// + aggregate token (64). A group of zero members proves nothing.
pub const GROUP_VALIDATE_MIN_LEN: usize = 2 + SAS_LEN + TOKEN_LEN;

/// Largest datagram we will ever read. UDP caps payloads at 65,507 bytes
/// over IPv4; we round up to the u16 limit and let the kernel truncate.
pub const MAX_DATAGRAM_LEN: usize = 65535;

// ---------------------------------------------------------------------------
// Message Type Tags
// ---------------------------------------------------------------------------

/// Client → server: request an individual token.
pub const MSG_INDIVIDUAL_REQUEST: u16 = 1;

/// Server → client: issued individual token.
pub const MSG_INDIVIDUAL_RESPONSE: u16 = 2;

/// Client → server: validate an individual token.
pub const MSG_INDIVIDUAL_VALIDATE: u16 = 3;

/// Server → client: individual validation verdict.
pub const MSG_INDIVIDUAL_VALIDATE_RESPONSE: u16 = 4;

/// Client → server: request a group token over N member SAS blocks.
pub const MSG_GROUP_REQUEST: u16 = 5;

/// Server → client: issued group token.
pub const MSG_GROUP_RESPONSE: u16 = 6;

/// Client → server: validate a group token.
pub const MSG_GROUP_VALIDATE: u16 = 7;

/// Server → client: group validation verdict.
pub const MSG_GROUP_VALIDATE_RESPONSE: u16 = 8;

/// Server → client: something went wrong. Carries a u16 error code from
/// the closed taxonomy in [`crate::error`].
pub const MSG_ERROR: u16 = 256;

// ---------------------------------------------------------------------------
// Networking
// ---------------------------------------------------------------------------

/// Default UDP port the server binds. An arbitrary choice that stopped
/// being arbitrary the day the first client hardcoded it.
pub const DEFAULT_PORT: u16 = 51001;

// ---------------------------------------------------------------------------
// Client Retry Policy
// ---------------------------------------------------------------------------

/// How long the client waits for a reply before resending a request.
/// UDP drops packets; 20 seconds is generous for a one-datagram exchange.
pub const RETRY_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(20);

/// Cumulative ceiling across all attempts. Once this much time has
/// elapsed since the first send, the client gives up instead of
/// resending forever.
pub const RETRY_GIVE_UP_AFTER: Duration = Duration::from_secs(50);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sas_block_is_80_bytes() {
        // The 80-byte SAS block is the unit everything else is measured
        // in. If this moves, the whole wire format moves with it.
        assert_eq!(SAS_LEN, 80);
        assert_eq!(INDIVIDUAL_REQUEST_LEN, 16);
        assert_eq!(GROUP_VALIDATE_MIN_LEN, 144);
    }

    #[test]
    fn message_tags_are_distinct() {
        let tags = [
            MSG_INDIVIDUAL_REQUEST,
            MSG_INDIVIDUAL_RESPONSE,
            MSG_INDIVIDUAL_VALIDATE,
            MSG_INDIVIDUAL_VALIDATE_RESPONSE,
            MSG_GROUP_REQUEST,
            MSG_GROUP_RESPONSE,
            MSG_GROUP_VALIDATE,
            MSG_GROUP_VALIDATE_RESPONSE,
            MSG_ERROR,
        ];
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn retry_policy_sanity() {
        // A single attempt must fit inside the cumulative ceiling,
        // otherwise the client would never retry at all.
        assert!(RETRY_ATTEMPT_TIMEOUT < RETRY_GIVE_UP_AFTER);
    }
}
