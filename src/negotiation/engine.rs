//! Offer evaluation: the deterministic negotiation decision function.
//!
//! `evaluate_offer` is a pure function. Cross-call memory (`prev_counter`,
//! `anchor_high`, `round_num`) travels in and out through the caller; the
//! engine holds nothing, so unrelated negotiations can be evaluated
//! concurrently without coordination.

use tracing::debug;

use super::policy::{Bounds, PolicyConfig};
use super::types::{Decision, NegotiationInput, Verdict};

/// Evaluate a carrier's ask for one round and decide how to respond.
///
/// Never fails: unusable numbers coerce, a missing board rate becomes a
/// policy-level `reject`, and every path resolves to one of the five
/// verdicts. Identical inputs always produce identical decisions.
pub fn evaluate_offer(input: &NegotiationInput, policy: &PolicyConfig) -> Decision {
    let max_rounds = policy.effective_max_rounds();
    let round = input.round_num.clamp(1, max_rounds);

    let loadboard_rate = finite_or_zero(input.loadboard_rate);
    let offer = positive_or_zero(input.carrier_offer);
    let miles = input.miles.filter(|m| m.is_finite() && *m > 0.0);
    let prev_counter = input.prev_counter.filter(|p| p.is_finite() && *p > 0.0);
    let anchor_high = input.anchor_high.filter(|a| a.is_finite() && *a > 0.0);

    let Some(bounds) = policy.resolve_bounds(loadboard_rate) else {
        debug!(loadboard_rate, "no usable board rate, rejecting");
        return Decision {
            verdict: Verdict::Reject,
            counter_rate: 0.0,
            floor: 0.0,
            max_rounds,
            next_round_num: round,
            next_prev_counter: prev_counter,
            next_anchor_high: anchor_high,
        };
    };

    let eval = Eval {
        policy,
        bounds,
        max_rounds,
        round,
        tol: policy.effective_tolerance(miles),
        target: policy.concession_target(bounds, offer, round, prev_counter),
        offer,
        prev_counter,
        anchor_high,
    };

    // Probe: no number on the table yet, open with our target.
    if offer <= 0.0 {
        return eval.countered(eval.target);
    }

    // First-round lowball guard: an ask this far under the board rate is
    // more likely a transcription error than a windfall. Read it back.
    if round == 1 {
        let implausibly_low = offer < bounds.floor * policy.low_confirm_ratio
            || offer < loadboard_rate * policy.min_ratio_vs_board;
        if implausibly_low {
            debug!(offer, floor = bounds.floor, "lowball guard tripped");
            return eval.confirm_low();
        }
    }

    // Guard chain, first match wins.
    if let Some(decision) = eval
        .anchor_return()
        .or_else(|| eval.meet_previous())
        .or_else(|| eval.below_floor())
        .or_else(|| eval.within_target())
        .or_else(|| eval.regression_hold())
    {
        return decision;
    }

    if round >= max_rounds {
        eval.final_resolution()
    } else {
        eval.normal_counter()
    }
}

fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

fn positive_or_zero(x: f64) -> f64 {
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

/// One evaluation's working set, computed once before the guards run
struct Eval<'a> {
    policy: &'a PolicyConfig,
    bounds: Bounds,
    max_rounds: u32,
    round: u32,
    tol: f64,
    target: f64,
    offer: f64,
    prev_counter: Option<f64>,
    anchor_high: Option<f64>,
}

impl Eval<'_> {
    /// Guard 1: the carrier returned to (near) a number this engine itself
    /// put on the table earlier in the call. Take it instead of whiplashing.
    fn anchor_return(&self) -> Option<Decision> {
        let anchor = self.anchor_high?;
        if self.offer <= self.bounds.ceiling && (self.offer - anchor).abs() <= self.tol {
            debug!(offer = self.offer, anchor, "anchor return");
            return Some(self.accepted(self.policy.snap(self.offer)));
        }
        None
    }

    /// Guard 2: the ask meets (or, leniently, nearly meets) our last counter
    fn meet_previous(&self) -> Option<Decision> {
        let prev = self.prev_counter?;
        let slack = if self.policy.accept_close_to_prev {
            self.tol
        } else {
            0.0
        };
        if self.offer <= prev + slack {
            return Some(self.accepted(self.policy.snap(self.offer.min(prev))));
        }
        None
    }

    /// Guard 3: the ask sits below our floor. Paying less is fine, but a
    /// first-round ask far under the floor stays with the lowball flow.
    fn below_floor(&self) -> Option<Decision> {
        if !self.policy.accept_below_floor || self.offer >= self.bounds.floor {
            return None;
        }
        if self.round > 1 || self.bounds.floor - self.offer <= self.tol {
            return Some(self.accepted(self.policy.snap(self.offer)));
        }
        None
    }

    /// Guard 4: the ask is within tolerance of this round's target
    fn within_target(&self) -> Option<Decision> {
        if self.offer <= self.bounds.ceiling && self.offer <= self.target + self.tol {
            return Some(self.accepted(self.policy.snap(self.offer)));
        }
        None
    }

    /// Guard 5: the carrier backtracked upward past our last counter.
    /// Hold the line at that counter; never concede because they asked for more.
    fn regression_hold(&self) -> Option<Decision> {
        let prev = self.prev_counter?;
        if self.offer > prev + self.tol {
            debug!(offer = self.offer, prev, "regression hold");
            return Some(self.countered(prev));
        }
        None
    }

    /// Final round, no guard matched: the strongest defensible number that
    /// does not exceed the carrier's ask. Close or stand firm, never a
    /// plain non-terminal counter.
    fn final_resolution(&self) -> Decision {
        let mut candidates = vec![self.target, self.bounds.floor];
        if let Some(prev) = self.prev_counter {
            candidates.push(prev.min(self.offer));
        }
        if let Some(anchor) = self.anchor_high {
            candidates.push(anchor.min(self.offer));
        }

        let best = candidates
            .into_iter()
            .filter(|c| *c <= self.offer + 0.01)
            .fold(f64::NEG_INFINITY, f64::max);

        if best == f64::NEG_INFINITY {
            // Ask below a floor we are not allowed to accept: final stand at the floor.
            return self.countered(self.bounds.floor);
        }
        if (self.offer - best).abs() <= 0.01 {
            return self.accepted(self.policy.snap(self.offer));
        }
        self.countered(best)
    }

    /// Non-final round, no guard matched: counter at the target, capped by
    /// the ask and any previous counter, floored at the floor.
    fn normal_counter(&self) -> Decision {
        let mut counter = self.target.min(self.offer);
        if let Some(prev) = self.prev_counter {
            counter = counter.min(prev);
        }
        counter = self.policy.snap(counter.max(self.bounds.floor));

        // Never counter at or above what's already on the table.
        if counter >= self.offer {
            return self.accepted(self.policy.snap(self.offer));
        }
        self.countered(counter)
    }

    /// Terminal accept; memory passes through untouched
    fn accepted(&self, rate: f64) -> Decision {
        Decision {
            verdict: Verdict::Accept,
            counter_rate: rate,
            floor: self.bounds.floor,
            max_rounds: self.max_rounds,
            next_round_num: self.round,
            next_prev_counter: self.prev_counter,
            next_anchor_high: self.anchor_high,
        }
    }

    /// Ask for verbal confirmation of a suspicious ask; the round is not
    /// consumed and memory passes through untouched
    fn confirm_low(&self) -> Decision {
        Decision {
            verdict: Verdict::ConfirmLow,
            counter_rate: self.policy.snap(self.offer),
            floor: self.bounds.floor,
            max_rounds: self.max_rounds,
            next_round_num: self.round,
            next_prev_counter: self.prev_counter,
            next_anchor_high: self.anchor_high,
        }
    }

    /// Issue a counter (final when no rounds remain) and evolve
    /// memory: the counter becomes `prev_counter`, the anchor only rises
    fn countered(&self, rate: f64) -> Decision {
        let rate = self.policy.snap(rate);
        let verdict = if self.round >= self.max_rounds {
            Verdict::CounterFinal
        } else {
            Verdict::Counter
        };
        Decision {
            verdict,
            counter_rate: rate,
            floor: self.bounds.floor,
            max_rounds: self.max_rounds,
            next_round_num: self.round + 1,
            next_prev_counter: Some(rate),
            next_anchor_high: Some(self.anchor_high.map_or(rate, |a| a.max(rate))),
        }
    }
}
