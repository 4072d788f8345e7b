//! # Token Authority
//!
//! The deterministic heart of SASP. Everything in here is a pure function
//! from bytes to bytes — no socket, no clock, no state. The server, the
//! client, and the tests all call through the same four functions, which
//! is the only reason they ever agree on what a valid token looks like.
//!
//! ## Derivation format
//!
//! ```text
//! individual: hex(sha256(trimmed_id ++ decimal_ascii(nonce)))
//! group:      hex(sha256(sas_block_1 ++ .. ++ sas_block_n))
//! ```
//!
//! The individual derivation concatenates the *trimmed* student id with
//! the nonce rendered as decimal text — no separator, no padding, no
//! binary encoding of the nonce. `("A1", 23)` hashes the ASCII bytes
//! `A123`. This is a fixed, compatibility-critical format: every deployed
//! verifier recomputes exactly this string, so changing it (or "fixing"
//! it with an HMAC) silently invalidates every token in the field.
//!
//! ## No server secret
//!
//! Note what is *not* an input: a key. Tokens are derived solely from the
//! id and the nonce, so anyone who knows both can forge a token offline.
//! That is the protocol's documented trust model — possession of the
//! nonce is the credential — not an oversight to patch here.

use sha2::{Digest, Sha256};

use crate::config::SAS_LEN;

/// Derive an individual token for a student id and nonce.
///
/// Returns the 64-character lowercase hex encoding of
/// `sha256(id ++ decimal(nonce))`. The id is used as given; callers are
/// expected to pass the trimmed form (wire decoding strips the padding
/// before it gets here).
///
/// # Example
///
/// ```
/// use sasp_protocol::token::derive_individual;
///
/// let token = derive_individual("A00123456", 42);
/// assert_eq!(token.len(), 64);
/// ```
pub fn derive_individual(student_id: &str, nonce: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(student_id.as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Check an individual token against the id and nonce it claims to bind.
///
/// Recomputes the derivation and compares in constant time. Returns
/// `true` on a match. A mismatch is a normal outcome (the status byte in
/// a validation response), never an error.
pub fn verify_individual(student_id: &str, nonce: u32, token: &str) -> bool {
    let expected = derive_individual(student_id, nonce);
    constant_time_eq(expected.as_bytes(), token.as_bytes())
}

/// Derive an aggregate token over an ordered sequence of raw SAS blocks.
///
/// The hash runs over the concatenation of the 80-byte blocks in list
/// order, excluding any leading count field. Order is significant:
/// permuting the members produces a different aggregate, which is exactly
/// the point — the token proves *this* group in *this* order.
pub fn derive_group<'a, I>(blocks: I) -> String
where
    I: IntoIterator<Item = &'a [u8]>,
{
    // Feeding the blocks into the hasher one at a time gives the same
    // digest as hashing the concatenation, without the temporary buffer.
    let mut hasher = Sha256::new();
    for block in blocks {
        debug_assert_eq!(block.len(), SAS_LEN);
        hasher.update(block);
    }
    hex::encode(hasher.finalize())
}

/// Check a claimed aggregate token against the raw SAS blocks it covers.
///
/// Aggregate validity is defined purely over the byte-level hash — the
/// members' own individual tokens are not re-derived here. Constant-time
/// comparison, same as [`verify_individual`].
pub fn verify_group<'a, I>(blocks: I, claimed: &str) -> bool
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let expected = derive_group(blocks);
    constant_time_eq(expected.as_bytes(), claimed.as_bytes())
}

/// Compare two byte slices without leaking where they differ.
///
/// An early-exit `==` tells an attacker, one timing measurement at a
/// time, how many leading characters of their guessed token are right.
/// The XOR-fold below touches every byte regardless. Length is checked
/// up front — the length of a token is public, its content is not.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
