//! RateDesk Negotiation Decision Engine
//!
//! Deterministic rate-negotiation policy for inbound carrier calls at a
//! freight brokerage: given a load's board rate, the carrier's spoken ask,
//! the round number, and caller-carried memory of prior counters, decide
//! whether to accept, counter, issue a final counter, ask for confirmation
//! of a suspiciously low ask, or reject — and compute the exact counter
//! value.
//!
//! The engine (`evaluate_offer`) is a pure function with no internal state;
//! `NegotiationSession` is the caller-side wrapper that threads memory
//! between rounds and keeps the offer trail.

pub mod cli;
pub mod error;
pub mod negotiation;
pub mod types;

// Re-export commonly used types and functions
pub use error::{RateDeskError, Result};
pub use negotiation::{
    evaluate_offer, Decision, NegotiationInput, NegotiationMemory, NegotiationSession,
    PolicyConfig, SessionState, Verdict,
};
pub use types::{Load, LoadId, Party, SessionId};
