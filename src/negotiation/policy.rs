//! Negotiation policy configuration, price bounds, and the concession curve

use serde::{Deserialize, Serialize};

/// Tunable negotiation policy.
///
/// All fields have compiled-in defaults; JSON policy files may override any
/// subset (`#[serde(default)]` merges the rest).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum we aim to pay, as a fraction of the ceiling
    pub floor_pct: f64,
    /// Maximum number of offer/counter exchanges
    pub max_rounds: u32,
    /// Base acceptance tolerance in dollars
    pub tol: f64,
    /// Monetary granularity counters are snapped to
    pub tick: f64,
    /// Maximum we will pay; defaults to the posted board rate
    pub ceiling: Option<f64>,
    /// First-round asks below `floor * low_confirm_ratio` need verbal confirmation
    pub low_confirm_ratio: f64,
    /// First-round asks below `loadboard_rate * min_ratio_vs_board` need confirmation
    pub min_ratio_vs_board: f64,
    /// Accept asks that land below the floor (cheaper is fine for us)
    pub accept_below_floor: bool,
    /// Accept asks within tolerance of our previous counter
    pub accept_close_to_prev: bool,
    /// Widen tolerance on long lanes (spoken numbers round coarser)
    pub dynamic_tol_by_miles: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            floor_pct: 0.90,
            max_rounds: 3,
            tol: 15.0,
            tick: 5.0,
            ceiling: None,
            low_confirm_ratio: 0.85,
            min_ratio_vs_board: 0.50,
            accept_below_floor: true,
            accept_close_to_prev: true,
            dynamic_tol_by_miles: true,
        }
    }
}

/// Resolved price bounds for one evaluation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub ceiling: f64,
    pub floor: f64,
}

impl PolicyConfig {
    /// Max rounds, never below 1
    pub fn effective_max_rounds(&self) -> u32 {
        self.max_rounds.max(1)
    }

    /// Resolve ceiling and floor from the board rate.
    ///
    /// Returns `None` when no board rate is available, which the engine maps
    /// to a policy-level reject rather than an error.
    pub fn resolve_bounds(&self, loadboard_rate: f64) -> Option<Bounds> {
        if !loadboard_rate.is_finite() || loadboard_rate <= 0.0 {
            return None;
        }
        let ceiling = match self.ceiling {
            Some(c) if c.is_finite() && c > 0.0 => c,
            _ => loadboard_rate,
        };
        let floor = round_cents(ceiling * self.floor_pct).clamp(0.0, ceiling);
        Some(Bounds { ceiling, floor })
    }

    /// Acceptance tolerance, widened on long lanes
    pub fn effective_tolerance(&self, miles: Option<f64>) -> f64 {
        let mut tol = self.tol;
        if self.dynamic_tol_by_miles {
            if let Some(mi) = miles.filter(|m| m.is_finite()) {
                if mi > 150.0 {
                    tol += 10.0;
                }
                if mi > 400.0 {
                    tol += 10.0;
                }
            }
        }
        tol
    }

    /// Portion of the ceiling→floor gap conceded by the given round
    pub fn round_progress(&self, round: u32) -> f64 {
        match round {
            1 => 0.33,
            2 => 0.60,
            3 => 0.80,
            _ if round >= self.effective_max_rounds() => 0.80,
            _ => 0.60,
        }
    }

    /// Weight on the schedule target when blending toward the carrier's ask.
    /// The final round ignores the ask entirely.
    pub fn blend_weight(&self, round: u32) -> f64 {
        if round >= self.effective_max_rounds() {
            1.0
        } else if round == 2 {
            0.75
        } else {
            0.65
        }
    }

    /// This round's target price: schedule position blended toward the
    /// clamped ask, never above a previous counter, snapped into bounds.
    pub fn concession_target(
        &self,
        bounds: Bounds,
        carrier_offer: f64,
        round: u32,
        prev_counter: Option<f64>,
    ) -> f64 {
        let gap = bounds.ceiling - bounds.floor;
        let base_target = (bounds.ceiling - gap * self.round_progress(round))
            .clamp(bounds.floor, bounds.ceiling);

        let offer_clamped = carrier_offer.clamp(bounds.floor, bounds.ceiling);
        let w = self.blend_weight(round);
        let mut target = w * base_target + (1.0 - w) * offer_clamped;

        if let Some(prev) = prev_counter {
            target = target.min(prev);
        }

        snap_to_tick(target, self.tick).clamp(bounds.floor, bounds.ceiling)
    }

    /// Snap a monetary value to this policy's tick
    pub fn snap(&self, value: f64) -> f64 {
        snap_to_tick(value, self.tick)
    }
}

/// Round to the nearest multiple of `tick` (half away from zero), then to
/// cents. A non-positive tick disables snapping and only rounds to cents.
pub fn snap_to_tick(value: f64, tick: f64) -> f64 {
    if !tick.is_finite() || tick <= 0.0 {
        return round_cents(value);
    }
    round_cents((value / tick).round() * tick)
}

/// Round to cents, half away from zero
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
