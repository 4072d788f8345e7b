//! # Request Handlers
//!
//! The service layer sits between the wire codec and the token authority.
//! By the time a handler runs, the codec has already enforced the length
//! and ASCII contracts, so handlers work with typed values and only two
//! things can still happen: a verdict (status byte) or, for group
//! issuance, an `InvalidSingleToken` rejection.
//!
//! Handlers are pure request → response functions. They hold no state,
//! touch no socket, and can be exercised in tests without any I/O — the
//! [`dispatch`] module is the only place that sees raw datagrams.

pub mod dispatch;
pub mod group;
pub mod individual;

pub use dispatch::dispatch;
