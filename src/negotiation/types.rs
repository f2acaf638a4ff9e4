//! Negotiation inputs, decisions, and caller-carried memory

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The five possible outcomes of an offer evaluation.
///
/// Wire names match the voice-agent webhook contract
/// (`accept`, `counter`, `counter-final`, `confirm-low`, `reject`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Book the load at `counter_rate`
    Accept,
    /// Counter with `counter_rate`, more rounds remain
    Counter,
    /// Take-it-or-leave-it counter at `counter_rate`
    CounterFinal,
    /// The ask is implausibly low; read `counter_rate` back for confirmation
    ConfirmLow,
    /// Cannot negotiate (no usable board rate)
    Reject,
}

impl Verdict {
    /// Terminal verdicts end the negotiation; no further calls are expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, Verdict::Accept | Verdict::Reject)
    }
}

/// Memory the caller round-trips between engine calls.
///
/// The engine itself holds no state; whatever `Decision::memory` returns is
/// what the next `evaluate_offer` call must receive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NegotiationMemory {
    pub round_num: u32,
    pub prev_counter: Option<f64>,
    pub anchor_high: Option<f64>,
}

impl NegotiationMemory {
    /// Fresh negotiation: round 1, no prior counters
    pub fn fresh() -> Self {
        Self {
            round_num: 1,
            prev_counter: None,
            anchor_high: None,
        }
    }
}

/// One evaluation's inputs, caller-supplied
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationInput {
    /// Posted rate for the load; source of ceiling and floor
    pub loadboard_rate: f64,
    /// Carrier's spoken ask; `0.0` means "no number yet" (probe)
    pub carrier_offer: f64,
    /// 1-based; the engine clamps into `[1, max_rounds]`
    pub round_num: u32,
    /// Lane distance, widens tolerance on long lanes
    pub miles: Option<f64>,
    /// Last counter this engine issued, if any
    pub prev_counter: Option<f64>,
    /// Highest price this engine has ever offered in the session
    pub anchor_high: Option<f64>,
}

impl NegotiationInput {
    pub fn new(loadboard_rate: f64, carrier_offer: f64, round_num: u32) -> Self {
        Self {
            loadboard_rate,
            carrier_offer,
            round_num,
            miles: None,
            prev_counter: None,
            anchor_high: None,
        }
    }

    pub fn with_miles(mut self, miles: Option<f64>) -> Self {
        self.miles = miles;
        self
    }

    pub fn with_memory(mut self, memory: NegotiationMemory) -> Self {
        self.round_num = memory.round_num;
        self.prev_counter = memory.prev_counter;
        self.anchor_high = memory.anchor_high;
        self
    }

    /// Build an input from a loose JSON object, the shape voice webhooks
    /// actually send: numbers may arrive as strings, memory fields as `""`,
    /// `"null"`, or `0`. Unusable values coerce rather than error.
    pub fn from_json(payload: &Value) -> Self {
        Self {
            loadboard_rate: coerce_rate(payload.get("loadboard_rate")),
            carrier_offer: coerce_rate(payload.get("carrier_offer")),
            round_num: coerce_round(payload.get("round_num")),
            miles: coerce_memory(payload.get("miles")),
            prev_counter: coerce_memory(payload.get("prev_counter")),
            anchor_high: coerce_memory(payload.get("anchor_high")),
        }
    }
}

/// The engine's answer for one round
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "decision")]
    pub verdict: Verdict,
    /// The broker's number this round; meaning depends on the verdict
    pub counter_rate: f64,
    /// Echoed floor for caller bookkeeping
    pub floor: f64,
    /// Echoed round cap for caller bookkeeping
    pub max_rounds: u32,
    pub next_round_num: u32,
    pub next_prev_counter: Option<f64>,
    pub next_anchor_high: Option<f64>,
}

impl Decision {
    /// No further engine calls expected after this decision
    pub fn is_terminal(&self) -> bool {
        self.verdict.is_terminal()
    }

    /// Memory to thread into the next call
    pub fn memory(&self) -> NegotiationMemory {
        NegotiationMemory {
            round_num: self.next_round_num,
            prev_counter: self.next_prev_counter,
            anchor_high: self.next_anchor_high,
        }
    }
}

/// One entry in a session's append-only offer trail
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateOffer {
    pub party: crate::types::Party,
    pub value: f64,
    pub round: u32,
}

/// Coerce a loose JSON value to a rate; anything unusable becomes `0.0`
pub fn coerce_rate(value: Option<&Value>) -> f64 {
    loose_float(value).filter(|f| f.is_finite()).unwrap_or(0.0)
}

/// Coerce a loose JSON value to a round number; blank or junk defaults to 1
pub fn coerce_round(value: Option<&Value>) -> u32 {
    match loose_float(value) {
        Some(f) if f.is_finite() && f >= 1.0 => f as u32,
        _ => 1,
    }
}

/// Coerce a loose JSON value to optional memory; `null`, `""`, `"null"`,
/// non-numeric, and non-positive all mean "absent"
pub fn coerce_memory(value: Option<&Value>) -> Option<f64> {
    loose_float(value).filter(|f| f.is_finite() && *f > 0.0)
}

fn loose_float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verdict_wire_names() {
        assert_eq!(serde_json::to_string(&Verdict::Accept).unwrap(), "\"accept\"");
        assert_eq!(
            serde_json::to_string(&Verdict::CounterFinal).unwrap(),
            "\"counter-final\""
        );
        assert_eq!(
            serde_json::to_string(&Verdict::ConfirmLow).unwrap(),
            "\"confirm-low\""
        );

        let v: Verdict = serde_json::from_str("\"counter-final\"").unwrap();
        assert_eq!(v, Verdict::CounterFinal);
    }

    #[test]
    fn test_verdict_terminality() {
        assert!(Verdict::Accept.is_terminal());
        assert!(Verdict::Reject.is_terminal());
        assert!(!Verdict::Counter.is_terminal());
        assert!(!Verdict::CounterFinal.is_terminal());
        assert!(!Verdict::ConfirmLow.is_terminal());
    }

    #[test]
    fn test_decision_serializes_decision_field() {
        let decision = Decision {
            verdict: Verdict::Counter,
            counter_rate: 945.0,
            floor: 900.0,
            max_rounds: 3,
            next_round_num: 2,
            next_prev_counter: Some(945.0),
            next_anchor_high: Some(945.0),
        };

        let v: Value = serde_json::to_value(decision).unwrap();
        assert_eq!(v["decision"], "counter");
        assert_eq!(v["counter_rate"], 945.0);
    }

    #[test]
    fn test_input_from_loose_json() {
        let payload = json!({
            "loadboard_rate": "1000",
            "carrier_offer": " 950.5 ",
            "round_num": "2",
            "miles": 480,
            "prev_counter": "null",
            "anchor_high": 0,
        });

        let input = NegotiationInput::from_json(&payload);
        assert_eq!(input.loadboard_rate, 1000.0);
        assert_eq!(input.carrier_offer, 950.5);
        assert_eq!(input.round_num, 2);
        assert_eq!(input.miles, Some(480.0));
        assert_eq!(input.prev_counter, None);
        assert_eq!(input.anchor_high, None);
    }

    #[test]
    fn test_input_from_junk_json() {
        let payload = json!({
            "loadboard_rate": "not a number",
            "carrier_offer": "",
            "round_num": null,
        });

        let input = NegotiationInput::from_json(&payload);
        assert_eq!(input.loadboard_rate, 0.0);
        assert_eq!(input.carrier_offer, 0.0);
        assert_eq!(input.round_num, 1);
        assert_eq!(input.prev_counter, None);
    }

    #[test]
    fn test_coerce_memory_placeholders() {
        assert_eq!(coerce_memory(Some(&json!(""))), None);
        assert_eq!(coerce_memory(Some(&json!("null"))), None);
        assert_eq!(coerce_memory(Some(&json!(0))), None);
        assert_eq!(coerce_memory(Some(&json!(-40))), None);
        assert_eq!(coerce_memory(None), None);
        assert_eq!(coerce_memory(Some(&json!(920.0))), Some(920.0));
        assert_eq!(coerce_memory(Some(&json!("920"))), Some(920.0));
    }

    #[test]
    fn test_memory_threading() {
        let decision = Decision {
            verdict: Verdict::Counter,
            counter_rate: 945.0,
            floor: 900.0,
            max_rounds: 3,
            next_round_num: 2,
            next_prev_counter: Some(945.0),
            next_anchor_high: Some(945.0),
        };

        let input = NegotiationInput::new(1000.0, 960.0, 1).with_memory(decision.memory());
        assert_eq!(input.round_num, 2);
        assert_eq!(input.prev_counter, Some(945.0));
        assert_eq!(input.anchor_high, Some(945.0));
    }
}
