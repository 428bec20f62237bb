//! # Parametric Decay Curves
//!
//! Closed-form alternative to the empirical table: expected season points at
//! an overall pick follow `base * exp(-decay * (adjusted_pick - 1))`. Curves
//! extrapolate to any pick number but are measured in raw points, so values
//! derived from them (the legacy ratio metric) are not comparable with
//! residual values and are always reported under their own label.

use crate::config::CurveConfig;
use crate::ranges::PositionPerformance;
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Exponential-decay expected-points curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayCurve {
    pub base: f64,
    pub decay: f64,
    /// First overall pick at which the position is typically drafted
    pub draft_start: u32,
}

impl DecayCurve {
    /// Single league-wide curve starting at the first pick
    pub fn global(config: &CurveConfig) -> Self {
        Self { base: config.global_base, decay: config.global_decay, draft_start: 1 }
    }

    /// Hand-tuned curve used when a position has no history
    pub fn default_for(position: Position) -> Self {
        let (base, decay, draft_start) = match position {
            Position::QB => (180.0, 0.012, 40),
            Position::RB => (140.0, 0.018, 5),
            Position::WR => (135.0, 0.016, 8),
            Position::TE => (100.0, 0.015, 30),
            Position::K => (80.0, 0.010, 120),
            Position::DST => (85.0, 0.010, 110),
        };
        Self { base, decay, draft_start }
    }

    /// Fit a position curve from its pick-range performance.
    ///
    /// The base is the best bucket average, the start is the typical draft
    /// start, and the decay is solved so that the curve passes through the
    /// latest bucket's average at `config.tail_pick`.
    pub fn fit(position: Position, performance: &PositionPerformance, config: &CurveConfig) -> Self {
        let defaults = Self::default_for(position);
        let Some(tail) = performance.ranges.last() else {
            return defaults;
        };

        let base = if performance.peak_performance > 0.0 {
            performance.peak_performance
        } else {
            performance.ranges.iter().map(|r| r.avg_points).fold(defaults.base, f64::max)
        };

        let draft_start = performance.typical_draft_start.max(1);
        let tail_avg = if tail.avg_points != 0.0 {
            tail.avg_points
        } else {
            defaults.base * (-defaults.decay * 120.0).exp()
        };

        let target_pick = config.tail_pick.saturating_sub(draft_start).saturating_add(1).max(1);
        let safe_base = base.max(1.0);
        let safe_tail = tail_avg.max(1.0);
        let decay = if target_pick > 1 {
            (safe_base / safe_tail).ln() / f64::from(target_pick - 1)
        } else {
            defaults.decay
        };

        Self { base: safe_base, decay, draft_start }
    }

    /// Pick number relative to the position's draft start, at least 1
    pub fn adjusted_pick(&self, overall_pick: u32) -> u32 {
        overall_pick.saturating_sub(self.draft_start).saturating_add(1).max(1)
    }

    /// Expected season points at an overall pick
    pub fn expected_points(&self, overall_pick: u32) -> f64 {
        let steps = f64::from(self.adjusted_pick(overall_pick) - 1);
        self.base * (-self.decay * steps).exp()
    }

    /// Legacy ratio metric: actual points over curve expectation.
    ///
    /// Returns `0.0` when the curve expects nothing.
    pub fn ratio(&self, actual_points: f64, overall_pick: u32) -> f64 {
        let expected = self.expected_points(overall_pick);
        if expected > 0.0 && expected.is_finite() {
            actual_points / expected
        } else {
            0.0
        }
    }
}

/// Fit a curve for every position
pub fn fit_position_curves(
    performance: &BTreeMap<Position, PositionPerformance>,
    config: &CurveConfig,
) -> BTreeMap<Position, DecayCurve> {
    Position::ALL
        .iter()
        .map(|position| {
            let curve = match performance.get(position) {
                Some(perf) => DecayCurve::fit(*position, perf, config),
                None => DecayCurve::default_for(*position),
            };
            (*position, curve)
        })
        .collect()
}
