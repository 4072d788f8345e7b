//! # SAS & GAS — Authentication Strings
//!
//! The two artifacts this protocol exists to mint and check:
//!
//! - **SAS** (Student Authentication String) — an identity plus its
//!   derived individual token.
//! - **GAS** (Group Authentication String) — an ordered, non-empty list
//!   of SAS entries plus an aggregate token over their raw bytes.
//!
//! Each has exactly two encodings, and both are fixed:
//!
//! ```text
//! SAS text    id:nonce:token
//! SAS binary  id(12, space-padded) ‖ nonce(4, BE) ‖ token(64)   = 80 bytes
//! GAS text    sas_1+sas_2+..+sas_n+aggregate_token
//! GAS binary  count(2, BE) ‖ n × sas(80) ‖ aggregate_token(64)
//! ```
//!
//! The text form is what humans pass on the command line; the binary form
//! is what travels inside datagrams. The 80-byte SAS block is also the
//! input unit of the group hash, so the binary encoding is load-bearing
//! for cryptography, not just for transport.

use std::fmt;
use std::str::FromStr;

use crate::config::{ID_LEN, NONCE_LEN, SAS_LEN, TOKEN_LEN};
use crate::error::ProtocolError;
use crate::token;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A student identity: an ASCII id of at most 12 bytes and a caller-chosen
/// 32-bit nonce. Immutable once constructed — the constructor is the only
/// place validation happens, so a held `Identity` is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    student_id: String,
    nonce: u32,
}

impl Identity {
    /// Construct an identity, validating the id.
    ///
    /// The id must be ASCII and fit in the 12-byte wire field. The nonce
    /// is unconstrained — it is the caller's request binding, not a secret.
    pub fn new(student_id: impl Into<String>, nonce: u32) -> Result<Self, ProtocolError> {
        let student_id = student_id.into();
        if !student_id.is_ascii() {
            return Err(ProtocolError::AsciiDecodeError("student_id"));
        }
        if student_id.len() > ID_LEN {
            return Err(ProtocolError::InvalidParameter(format!(
                "student id '{}' exceeds {} bytes",
                student_id, ID_LEN
            )));
        }
        Ok(Self { student_id, nonce })
    }

    /// The trimmed student id.
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    /// The request nonce.
    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    /// The id as it appears on the wire: right-padded with spaces to 12 bytes.
    pub fn padded_id(&self) -> [u8; ID_LEN] {
        let mut out = [b' '; ID_LEN];
        out[..self.student_id.len()].copy_from_slice(self.student_id.as_bytes());
        out
    }

    /// Decode an identity from the wire fields: a 12-byte padded id
    /// followed by a 4-byte big-endian nonce.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != ID_LEN + NONCE_LEN {
            return Err(ProtocolError::IncorrectMessageLength {
                expected: ID_LEN + NONCE_LEN,
                got: bytes.len(),
            });
        }
        let id_field = &bytes[..ID_LEN];
        if !id_field.is_ascii() {
            return Err(ProtocolError::AsciiDecodeError("student_id"));
        }
        let student_id = std::str::from_utf8(id_field)
            .map_err(|_| ProtocolError::AsciiDecodeError("student_id"))?
            .trim_end_matches(' ')
            .to_string();
        let nonce_field: [u8; NONCE_LEN] = bytes[ID_LEN..]
            .try_into()
            .map_err(|_| ProtocolError::InvalidParameter("nonce".into()))?;
        let nonce = u32::from_be_bytes(nonce_field);
        Ok(Self { student_id, nonce })
    }
}

// ---------------------------------------------------------------------------
// Sas
// ---------------------------------------------------------------------------

/// An individual authentication string: identity plus token.
///
/// Holding a `Sas` does not mean the token is correct — construction only
/// checks shape (64 ASCII bytes). Whether the token actually matches the
/// identity is [`verify`](Self::verify)'s job, and a mismatch there is a
/// normal outcome, not a malformed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sas {
    identity: Identity,
    token: String,
}

impl Sas {
    /// Construct from an identity and a claimed token.
    pub fn new(identity: Identity, token: impl Into<String>) -> Result<Self, ProtocolError> {
        let token = token.into();
        if !token.is_ascii() {
            return Err(ProtocolError::AsciiDecodeError("token"));
        }
        if token.len() != TOKEN_LEN {
            return Err(ProtocolError::InvalidParameter(format!(
                "token must be {} characters, got {}",
                TOKEN_LEN,
                token.len()
            )));
        }
        Ok(Self { identity, token })
    }

    /// Derive the correct token for an identity and wrap both in a `Sas`.
    pub fn derive(identity: Identity) -> Self {
        let token = token::derive_individual(identity.student_id(), identity.nonce());
        Self { identity, token }
    }

    /// The identity this SAS binds.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The claimed token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Recompute the derivation and check the claimed token against it.
    pub fn verify(&self) -> bool {
        token::verify_individual(self.identity.student_id(), self.identity.nonce(), &self.token)
    }

    /// Encode as the fixed 80-byte wire block.
    pub fn to_bytes(&self) -> [u8; SAS_LEN] {
        let mut out = [0u8; SAS_LEN];
        out[..ID_LEN].copy_from_slice(&self.identity.padded_id());
        out[ID_LEN..ID_LEN + NONCE_LEN].copy_from_slice(&self.identity.nonce().to_be_bytes());
        out[ID_LEN + NONCE_LEN..].copy_from_slice(self.token.as_bytes());
        out
    }

    /// Decode a SAS from exactly 80 wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != SAS_LEN {
            return Err(ProtocolError::IncorrectMessageLength {
                expected: SAS_LEN,
                got: bytes.len(),
            });
        }
        let identity = Identity::from_wire(&bytes[..ID_LEN + NONCE_LEN])?;
        let token_field = &bytes[ID_LEN + NONCE_LEN..];
        if !token_field.is_ascii() {
            return Err(ProtocolError::AsciiDecodeError("token"));
        }
        let token = std::str::from_utf8(token_field)
            .map_err(|_| ProtocolError::AsciiDecodeError("token"))?
            .to_string();
        Ok(Self { identity, token })
    }
}

/// Text form: `id:nonce:token`.
impl fmt::Display for Sas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.identity.student_id(),
            self.identity.nonce(),
            self.token
        )
    }
}

impl FromStr for Sas {
    type Err = ProtocolError;

    /// Parse the text form `id:nonce:token`. The token is the last
    /// colon-separated field; the id itself never contains a colon.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (id, nonce, token) = match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(nonce), Some(token)) => (id, nonce, token),
            _ => {
                return Err(ProtocolError::InvalidParameter(format!(
                    "malformed SAS text '{}': expected id:nonce:token",
                    s
                )))
            }
        };
        let nonce: u32 = nonce.parse().map_err(|_| {
            ProtocolError::InvalidParameter(format!("nonce '{}' is not a u32", nonce))
        })?;
        Sas::new(Identity::new(id, nonce)?, token)
    }
}

// ---------------------------------------------------------------------------
// Gas
// ---------------------------------------------------------------------------

/// A group authentication string: an ordered, non-empty list of SAS
/// entries plus the aggregate token over their concatenated wire blocks.
///
/// Order matters. The aggregate hash runs over the blocks in list order,
/// so `[a, b]` and `[b, a]` are different groups with different tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gas {
    members: Vec<Sas>,
    token: String,
}

impl Gas {
    /// Construct from members and a claimed aggregate token.
    pub fn new(members: Vec<Sas>, token: impl Into<String>) -> Result<Self, ProtocolError> {
        if members.is_empty() {
            return Err(ProtocolError::InvalidParameter(
                "group must contain at least one SAS".into(),
            ));
        }
        if members.len() > u16::MAX as usize {
            return Err(ProtocolError::InvalidParameter(format!(
                "group of {} members exceeds the u16 count field",
                members.len()
            )));
        }
        let token = token.into();
        if !token.is_ascii() {
            return Err(ProtocolError::AsciiDecodeError("token"));
        }
        if token.len() != TOKEN_LEN {
            return Err(ProtocolError::InvalidParameter(format!(
                "aggregate token must be {} characters, got {}",
                TOKEN_LEN,
                token.len()
            )));
        }
        Ok(Self { members, token })
    }

    /// Derive the aggregate token for an ordered member list.
    pub fn derive(members: Vec<Sas>) -> Result<Self, ProtocolError> {
        if members.is_empty() {
            return Err(ProtocolError::InvalidParameter(
                "group must contain at least one SAS".into(),
            ));
        }
        let blocks: Vec<[u8; SAS_LEN]> = members.iter().map(Sas::to_bytes).collect();
        let token = token::derive_group(blocks.iter().map(|b| b.as_slice()));
        Ok(Self { members, token })
    }

    /// The ordered member list.
    pub fn members(&self) -> &[Sas] {
        &self.members
    }

    /// The claimed aggregate token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Recompute the aggregate over the members' wire blocks and check the
    /// claimed token. Does **not** re-verify the members' own tokens —
    /// aggregate validity is a byte-level property.
    pub fn verify(&self) -> bool {
        let blocks: Vec<[u8; SAS_LEN]> = self.members.iter().map(Sas::to_bytes).collect();
        token::verify_group(blocks.iter().map(|b| b.as_slice()), &self.token)
    }
}

/// Text form: `sas_1+sas_2+..+sas_n+token`.
impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sas in &self.members {
            write!(f, "{}+", sas)?;
        }
        write!(f, "{}", self.token)
    }
}

impl FromStr for Gas {
    type Err = ProtocolError;

    /// Parse the `'+'`-joined text form. The last segment is the aggregate
    /// token; everything before it is a SAS.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('+').collect();
        if segments.len() < 2 {
            return Err(ProtocolError::InvalidParameter(
                "malformed GAS text: expected sas_1+..+sas_n+token".into(),
            ));
        }
        let (token, sas_texts) = segments.split_last().expect("len checked above");
        let members = sas_texts
            .iter()
            .map(|t| t.parse::<Sas>())
            .collect::<Result<Vec<_>, _>>()?;
        Gas::new(members, *token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sas(id: &str, nonce: u32) -> Sas {
        Sas::derive(Identity::new(id, nonce).unwrap())
    }

    #[test]
    fn identity_rejects_oversized_id() {
        assert!(Identity::new("THIRTEENCHARS", 0).is_err());
        assert!(Identity::new("TWELVECHARSS", 0).is_ok());
    }

    #[test]
    fn identity_rejects_non_ascii() {
        let err = Identity::new("ábc", 0).unwrap_err();
        assert_eq!(err.wire_code(), 5);
    }

    #[test]
    fn padded_id_is_space_filled() {
        let id = Identity::new("A1", 7).unwrap();
        let padded = id.padded_id();
        assert_eq!(&padded[..2], b"A1");
        assert!(padded[2..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn sas_binary_roundtrip() {
        let sas = sample_sas("A00123456", 42);
        let bytes = sas.to_bytes();
        assert_eq!(bytes.len(), SAS_LEN);
        let decoded = Sas::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, sas);
    }

    #[test]
    fn sas_text_roundtrip() {
        let sas = sample_sas("A00123456", 42);
        let text = sas.to_string();
        assert!(text.starts_with("A00123456:42:"));
        let parsed: Sas = text.parse().unwrap();
        assert_eq!(parsed, sas);
    }

    #[test]
    fn sas_from_bytes_rejects_non_ascii_token() {
        let mut bytes = sample_sas("A1", 1).to_bytes();
        bytes[SAS_LEN - 1] = 0xFF;
        let err = Sas::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.wire_code(), 5);
    }

    #[test]
    fn sas_from_bytes_rejects_wrong_length() {
        let bytes = sample_sas("A1", 1).to_bytes();
        assert!(Sas::from_bytes(&bytes[..79]).is_err());
    }

    #[test]
    fn malformed_sas_text_rejected() {
        assert!("justanid".parse::<Sas>().is_err());
        assert!("id:notanumber:token".parse::<Sas>().is_err());
        assert!("id:1:tooshort".parse::<Sas>().is_err());
    }

    #[test]
    fn derived_sas_verifies() {
        let sas = sample_sas("A1", 1);
        assert!(sas.verify());

        let bad = Sas::new(Identity::new("A1", 1).unwrap(), "0".repeat(64)).unwrap();
        assert!(!bad.verify());
    }

    #[test]
    fn gas_text_roundtrip() {
        let gas = Gas::derive(vec![sample_sas("A1", 1), sample_sas("B2", 2)]).unwrap();
        let text = gas.to_string();
        assert_eq!(text.matches('+').count(), 2);
        let parsed: Gas = text.parse().unwrap();
        assert_eq!(parsed, gas);
        assert!(parsed.verify());
    }

    #[test]
    fn gas_known_aggregate() {
        // Precomputed: sha256(raw80(A1:1:t1) ++ raw80(B2:2:t2)).
        let gas = Gas::derive(vec![sample_sas("A1", 1), sample_sas("B2", 2)]).unwrap();
        assert_eq!(
            gas.token(),
            "ec4b56d1796516d82a2568c45c679097a1123fa80303e6dc97376276b24fb8b0"
        );
    }

    #[test]
    fn gas_order_changes_token() {
        let forward = Gas::derive(vec![sample_sas("A1", 1), sample_sas("B2", 2)]).unwrap();
        let backward = Gas::derive(vec![sample_sas("B2", 2), sample_sas("A1", 1)]).unwrap();
        assert_ne!(forward.token(), backward.token());
    }

    #[test]
    fn empty_gas_rejected() {
        assert!(Gas::derive(vec![]).is_err());
        assert!(Gas::new(vec![], "0".repeat(64)).is_err());
        assert!("justatoken".parse::<Gas>().is_err());
    }

    #[test]
    fn gas_verify_detects_tampering() {
        let gas = Gas::derive(vec![sample_sas("A1", 1)]).unwrap();
        let tampered = Gas::new(gas.members().to_vec(), "f".repeat(64)).unwrap();
        assert!(!tampered.verify());
    }
}
