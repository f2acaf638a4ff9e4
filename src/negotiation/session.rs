//! Caller-side negotiation session.
//!
//! The engine is stateless; this is the piece that owns the cross-round
//! memory. A surrounding service would persist one of these per call (or
//! its `memory()` snapshot) between webhook invocations.

use std::time::SystemTime;

use tracing::info;

use crate::error::{RateDeskError, Result};
use crate::types::{Load, LoadId, Party, SessionId};

use super::engine::evaluate_offer;
use super::policy::PolicyConfig;
use super::types::{Decision, NegotiationInput, NegotiationMemory, RateOffer, Verdict};

/// Session state machine
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// Offers and counters are being exchanged
    Negotiating,
    /// A suspiciously low ask is waiting on verbal confirmation
    PendingLowConfirm { quoted: f64 },
    /// Our take-it-or-leave-it number is on the table
    FinalCountered { rate: f64 },
    /// Load booked at the agreed rate
    Booked { rate: f64 },
    /// Negotiation over without agreement
    Closed { reason: String },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Booked { .. } | SessionState::Closed { .. })
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

/// One inbound call's negotiation over a single load
#[derive(Clone, Debug)]
pub struct NegotiationSession {
    session_id: SessionId,
    load_id: LoadId,
    loadboard_rate: f64,
    miles: Option<f64>,
    policy: PolicyConfig,
    memory: NegotiationMemory,
    offers: Vec<RateOffer>,
    state: SessionState,
    _created_at: SystemTime,
}

impl NegotiationSession {
    pub fn new(
        session_id: SessionId,
        load_id: LoadId,
        loadboard_rate: f64,
        miles: Option<f64>,
        policy: PolicyConfig,
    ) -> Self {
        Self {
            session_id,
            load_id,
            loadboard_rate,
            miles,
            policy,
            memory: NegotiationMemory::fresh(),
            offers: Vec::new(),
            state: SessionState::Negotiating,
            _created_at: SystemTime::now(),
        }
    }

    /// Start a session from a load the search collaborator returned
    pub fn for_load(session_id: SessionId, load: &Load, policy: PolicyConfig) -> Self {
        Self::new(
            session_id,
            load.load_id.clone(),
            load.loadboard_rate,
            load.miles,
            policy,
        )
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn load_id(&self) -> &LoadId {
        &self.load_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Append-only trail of every rate spoken on the call
    pub fn offers(&self) -> &[RateOffer] {
        &self.offers
    }

    /// Memory snapshot to persist between webhook calls
    pub fn memory(&self) -> NegotiationMemory {
        self.memory
    }

    /// Rounds consumed so far
    pub fn rounds_used(&self) -> u32 {
        self.memory.round_num.saturating_sub(1)
    }

    /// Our most recent counter, if any
    pub fn latest_counter(&self) -> Option<f64> {
        self.memory.prev_counter
    }

    pub fn is_booked(&self) -> bool {
        matches!(self.state, SessionState::Booked { .. })
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Run one carrier ask through the engine and advance the session.
    ///
    /// `carrier_offer == 0.0` is the probe ("what does it pay?"). Errors only
    /// when the session is already terminal or mid-confirmation.
    pub fn handle_offer(&mut self, carrier_offer: f64) -> Result<Decision> {
        match &self.state {
            SessionState::Booked { .. } | SessionState::Closed { .. } => {
                return Err(RateDeskError::SessionClosed(self.session_id.0.clone()));
            }
            SessionState::PendingLowConfirm { .. } => {
                return Err(RateDeskError::InvalidStateTransition(format!(
                    "session {} is awaiting lowball confirmation",
                    self.session_id
                )));
            }
            SessionState::Negotiating | SessionState::FinalCountered { .. } => {}
        }

        let input = NegotiationInput::new(self.loadboard_rate, carrier_offer, self.memory.round_num)
            .with_miles(self.miles)
            .with_memory(self.memory);
        let decision = evaluate_offer(&input, &self.policy);

        if carrier_offer > 0.0 {
            self.offers.push(RateOffer {
                party: Party::Carrier,
                value: carrier_offer,
                round: self.memory.round_num,
            });
        }

        match decision.verdict {
            Verdict::Accept => {
                self.offers.push(RateOffer {
                    party: Party::Agent,
                    value: decision.counter_rate,
                    round: self.memory.round_num,
                });
                self.state = SessionState::Booked {
                    rate: decision.counter_rate,
                };
                info!(
                    session = %self.session_id,
                    load = %self.load_id,
                    rate = decision.counter_rate,
                    "load booked"
                );
            }
            Verdict::Counter | Verdict::CounterFinal => {
                self.offers.push(RateOffer {
                    party: Party::Agent,
                    value: decision.counter_rate,
                    round: self.memory.round_num,
                });
                if decision.verdict == Verdict::CounterFinal {
                    self.state = SessionState::FinalCountered {
                        rate: decision.counter_rate,
                    };
                }
                info!(
                    session = %self.session_id,
                    round = self.memory.round_num,
                    counter = decision.counter_rate,
                    final_round = decision.verdict == Verdict::CounterFinal,
                    "countered"
                );
            }
            Verdict::ConfirmLow => {
                self.state = SessionState::PendingLowConfirm {
                    quoted: decision.counter_rate,
                };
                info!(
                    session = %self.session_id,
                    quoted = decision.counter_rate,
                    "ask implausibly low, asking for confirmation"
                );
            }
            Verdict::Reject => {
                self.state = SessionState::Closed {
                    reason: "no usable board rate".to_string(),
                };
            }
        }

        self.memory = decision.memory();
        Ok(decision)
    }

    /// Resolve a pending lowball confirmation.
    ///
    /// Confirmed: the carrier really meant that number, book it. Denied: the
    /// number was misheard, resume negotiating and wait for a restated ask.
    pub fn confirm_low(&mut self, confirmed: bool) -> Result<()> {
        let quoted = match self.state {
            SessionState::PendingLowConfirm { quoted } => quoted,
            _ => {
                return Err(RateDeskError::NoPendingConfirmation(
                    self.session_id.0.clone(),
                ));
            }
        };

        if confirmed {
            self.offers.push(RateOffer {
                party: Party::Carrier,
                value: quoted,
                round: self.memory.round_num,
            });
            self.state = SessionState::Booked { rate: quoted };
            info!(session = %self.session_id, rate = quoted, "lowball confirmed, booked");
        } else {
            self.state = SessionState::Negotiating;
            info!(session = %self.session_id, "lowball denied, awaiting restated ask");
        }
        Ok(())
    }

    /// Close without agreement (carrier walked, call dropped, etc.)
    pub fn close(&mut self, reason: impl Into<String>) -> Result<()> {
        if self.state.is_terminal() {
            return Err(RateDeskError::InvalidStateTransition(format!(
                "session {} is already terminal",
                self.session_id
            )));
        }
        let reason = reason.into();
        info!(session = %self.session_id, %reason, "session closed");
        self.state = SessionState::Closed { reason };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> NegotiationSession {
        NegotiationSession::new(
            SessionId("sess_test".to_string()),
            LoadId("L-100".to_string()),
            1000.0,
            None,
            PolicyConfig::default(),
        )
    }

    #[test]
    fn test_new_session_is_active() {
        let s = session();
        assert_eq!(*s.state(), SessionState::Negotiating);
        assert!(s.state().is_active());
        assert_eq!(s.memory(), NegotiationMemory::fresh());
        assert!(s.offers().is_empty());
    }

    #[test]
    fn test_probe_then_accept() {
        let mut s = session();

        let d = s.handle_offer(0.0).unwrap();
        assert_eq!(d.verdict, Verdict::Counter);
        assert_eq!(d.counter_rate, 945.0);
        // Probe itself is not a carrier offer; only our counter is on the trail
        assert_eq!(s.offers().len(), 1);
        assert_eq!(s.offers()[0].party, Party::Agent);

        let d = s.handle_offer(945.0).unwrap();
        assert_eq!(d.verdict, Verdict::Accept);
        assert!(s.is_booked());
        assert_eq!(*s.state(), SessionState::Booked { rate: 945.0 });
    }

    #[test]
    fn test_hold_through_final_round() {
        let mut s = session();

        // Carrier opens high and keeps backtracking upward
        let d = s.handle_offer(995.0).unwrap();
        assert_eq!(d.verdict, Verdict::Counter);
        assert_eq!(d.counter_rate, 975.0);

        let d = s.handle_offer(1050.0).unwrap();
        assert_eq!(d.verdict, Verdict::Counter);
        assert_eq!(d.counter_rate, 975.0);

        let d = s.handle_offer(1020.0).unwrap();
        assert_eq!(d.verdict, Verdict::CounterFinal);
        assert_eq!(d.counter_rate, 975.0);
        assert_eq!(*s.state(), SessionState::FinalCountered { rate: 975.0 });

        // Carrier takes the final number
        let d = s.handle_offer(975.0).unwrap();
        assert_eq!(d.verdict, Verdict::Accept);
        assert_eq!(d.counter_rate, 975.0);
        assert!(s.is_booked());

        // Trail: 4 carrier asks + 4 agent responses
        assert_eq!(s.offers().len(), 8);
    }

    #[test]
    fn test_lowball_confirm_books() {
        let mut s = session();

        let d = s.handle_offer(400.0).unwrap();
        assert_eq!(d.verdict, Verdict::ConfirmLow);
        assert_eq!(
            *s.state(),
            SessionState::PendingLowConfirm { quoted: 400.0 }
        );

        // New offers are refused while confirmation is pending
        assert!(matches!(
            s.handle_offer(900.0),
            Err(RateDeskError::InvalidStateTransition(_))
        ));

        s.confirm_low(true).unwrap();
        assert_eq!(*s.state(), SessionState::Booked { rate: 400.0 });
    }

    #[test]
    fn test_lowball_denied_resumes() {
        let mut s = session();

        s.handle_offer(400.0).unwrap();
        s.confirm_low(false).unwrap();
        assert_eq!(*s.state(), SessionState::Negotiating);

        // No round was consumed; the restated ask is still round 1
        let d = s.handle_offer(950.0).unwrap();
        assert_eq!(d.verdict, Verdict::Accept);
        assert_eq!(d.counter_rate, 950.0);
    }

    #[test]
    fn test_confirm_without_pending_errors() {
        let mut s = session();
        assert!(matches!(
            s.confirm_low(true),
            Err(RateDeskError::NoPendingConfirmation(_))
        ));
    }

    #[test]
    fn test_closed_session_refuses_offers() {
        let mut s = session();
        s.close("carrier hung up").unwrap();

        assert!(s.is_terminal());
        assert!(matches!(
            s.handle_offer(950.0),
            Err(RateDeskError::SessionClosed(_))
        ));
        assert!(s.close("again").is_err());
    }

    #[test]
    fn test_for_load_carries_miles() {
        let load = Load {
            miles: Some(500.0),
            ..Load::with_rate("L-200", 1000.0)
        };
        let mut s = NegotiationSession::for_load(
            SessionId::generate(),
            &load,
            PolicyConfig::default(),
        );

        // 500-mile lane widens tolerance to 35: a full-board ask is accepted
        let d = s.handle_offer(1000.0).unwrap();
        assert_eq!(d.verdict, Verdict::Accept);
    }

    #[test]
    fn test_memory_threads_between_rounds() {
        let mut s = session();
        let d = s.handle_offer(995.0).unwrap();

        assert_eq!(s.memory().round_num, 2);
        assert_eq!(s.memory().prev_counter, Some(d.counter_rate));
        assert_eq!(s.memory().anchor_high, Some(d.counter_rate));
        assert_eq!(s.rounds_used(), 1);
        assert_eq!(s.latest_counter(), Some(d.counter_rate));
    }
}
