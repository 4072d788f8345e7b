//! # Client-Side Exchange & Bounded Retry
//!
//! UDP loses datagrams and tells nobody. The protocol's answer lives
//! entirely on the client: send the request, wait a bounded time for the
//! reply, resend on silence, and give up once a cumulative ceiling has
//! elapsed since the first attempt. The server keeps no in-flight state,
//! so "cancellation" is simply stopping the resends.
//!
//! The retry logic is an explicit state machine ([`RetryState`]) rather
//! than timing code scattered through the send loop, so the transition
//! rules are unit-testable without a socket or a clock:
//!
//! ```text
//! Idle ──send──► AwaitingReply ──reply──► done
//!                    │  ▲
//!            timeout │  │ resend (elapsed < ceiling)
//!                    ▼  │
//!               Decision ──give up (elapsed ≥ ceiling)──► failed
//! ```

use std::time::Duration;

use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Instant};

use crate::config::{MAX_DATAGRAM_LEN, RETRY_ATTEMPT_TIMEOUT, RETRY_GIVE_UP_AFTER};
use crate::error::ProtocolError;
use crate::wire::WireMessage;

// ---------------------------------------------------------------------------
// Policy & State Machine
// ---------------------------------------------------------------------------

/// The two knobs of the retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// How long one attempt waits for a reply before resending.
    pub attempt_timeout: Duration,
    /// Cumulative elapsed time since the first send after which the
    /// client stops resending and reports failure.
    pub give_up_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempt_timeout: RETRY_ATTEMPT_TIMEOUT,
            give_up_after: RETRY_GIVE_UP_AFTER,
        }
    }
}

/// What to do after an attempt timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Send the request again and keep waiting.
    Resend,
    /// The cumulative ceiling is spent; stop.
    GiveUp,
}

/// The client's position in the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Nothing sent yet.
    Idle,
    /// A request is on the wire; `attempt` counts sends so far (1-based).
    AwaitingReply {
        /// Number of sends performed, including the first.
        attempt: u32,
    },
}

impl RetryState {
    /// Fresh machine, nothing sent.
    pub fn new() -> Self {
        RetryState::Idle
    }

    /// Record a send. Valid from `Idle` (first attempt) or from
    /// `AwaitingReply` (a resend).
    pub fn on_send(&mut self) {
        *self = match *self {
            RetryState::Idle => RetryState::AwaitingReply { attempt: 1 },
            RetryState::AwaitingReply { attempt } => RetryState::AwaitingReply {
                attempt: attempt + 1,
            },
        };
    }

    /// Decide what a timeout means given how long the whole exchange has
    /// been running. The ceiling is measured from the *first* send, so a
    /// slow series of timeouts exhausts it just like one long silence.
    pub fn on_timeout(&self, elapsed_since_first_send: Duration, policy: &RetryPolicy) -> RetryDecision {
        debug_assert!(matches!(self, RetryState::AwaitingReply { .. }));
        if elapsed_since_first_send >= policy.give_up_after {
            RetryDecision::GiveUp
        } else {
            RetryDecision::Resend
        }
    }

    /// Number of sends performed so far.
    pub fn attempts(&self) -> u32 {
        match *self {
            RetryState::Idle => 0,
            RetryState::AwaitingReply { attempt } => attempt,
        }
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Exchange
// ---------------------------------------------------------------------------

/// Errors surfaced by a client exchange.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// No reply arrived before the cumulative ceiling ran out.
    #[error("no reply after {attempts} attempts over {elapsed:?}")]
    TimedOut {
        /// How many times the request was sent.
        attempts: u32,
        /// Total time spent waiting.
        elapsed: Duration,
    },

    /// The socket failed underneath us.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// The server sent bytes that do not decode as any SASP message.
    #[error("malformed reply: {0}")]
    Malformed(#[from] ProtocolError),
}

/// Perform one request/reply exchange with bounded retry.
///
/// The socket must already be connected to the server address — replies
/// are read with `recv`, so the kernel filters out datagrams from other
/// peers. Resends reuse the same encoded request bytes; the server is
/// stateless, so a duplicate delivery just produces a duplicate reply.
pub async fn exchange(
    socket: &UdpSocket,
    request: &WireMessage,
    policy: RetryPolicy,
) -> Result<WireMessage, ExchangeError> {
    let bytes = request.encode();
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];
    let mut state = RetryState::new();
    let started = Instant::now();

    loop {
        socket.send(&bytes).await?;
        state.on_send();
        tracing::debug!(
            tag = request.tag(),
            attempt = state.attempts(),
            "request sent"
        );

        match timeout(policy.attempt_timeout, socket.recv(&mut buf)).await {
            Ok(received) => {
                let n = received?;
                let reply = WireMessage::decode(&buf[..n])?;
                tracing::debug!(tag = reply.tag(), bytes = n, "reply received");
                return Ok(reply);
            }
            Err(_) => {
                let elapsed = started.elapsed();
                match state.on_timeout(elapsed, &policy) {
                    RetryDecision::Resend => {
                        tracing::debug!(?elapsed, "attempt timed out, resending");
                    }
                    RetryDecision::GiveUp => {
                        tracing::warn!(?elapsed, attempts = state.attempts(), "giving up");
                        return Err(ExchangeError::TimedOut {
                            attempts: state.attempts(),
                            elapsed,
                        });
                    }
                }
            }
        }
    }
}
