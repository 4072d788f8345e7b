// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # SASP Protocol — Core Library
//!
//! SASP (Student Authentication String Protocol) is a stateless UDP
//! service that issues and verifies cryptographic proof tokens — for one
//! identity (a **SAS**) or for an ordered group of identities (a **GAS**).
//! Downstream systems treat it as a trust root: present the token later
//! and the verifier recomputes one SHA-256 instead of re-deriving the
//! world from scratch.
//!
//! ## Architecture
//!
//! The crate is layered leaves-first, and each layer only looks down:
//!
//! - **config** — Wire constants. The numbers that can never change.
//! - **error** — The closed five-code error taxonomy.
//! - **token** — Pure derivation and verification. No I/O, no state.
//! - **sas** — SAS/GAS types with their text and binary codecs.
//! - **wire** — Datagram encode/decode with exact-length contracts.
//! - **service** — Request handlers and the dispatcher.
//! - **server** — The socket-owning context and receive loop.
//! - **client** — Bounded-retry exchange for the caller side.
//!
//! ## Design Philosophy
//!
//! 1. Every request is transient: decode, compute, reply, forget.
//!    The only process-wide state anywhere is the bound socket.
//! 2. Malformed input is rejected with a typed error, never a panic.
//!    The dispatcher is total over arbitrary bytes.
//! 3. A wrong token is a verdict, not an error. Status bytes and error
//!    codes are different channels and never mix.
//! 4. The derivation format is frozen. It has no server secret — that is
//!    the documented trust model, not a bug to fix in a point release.

pub mod client;
pub mod config;
pub mod error;
pub mod sas;
pub mod server;
pub mod service;
pub mod token;
pub mod wire;
