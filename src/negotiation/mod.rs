//! Negotiation module: the decision engine and the session wrapper around it

pub mod engine;
pub mod policy;
pub mod session;
pub mod types;

pub use engine::evaluate_offer;
pub use policy::{snap_to_tick, Bounds, PolicyConfig};
pub use session::{NegotiationSession, SessionState};
pub use types::{Decision, NegotiationInput, NegotiationMemory, RateOffer, Verdict};
