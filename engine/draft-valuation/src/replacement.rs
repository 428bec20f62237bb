//! # Replacement Level Estimation
//!
//! Replacement level is the season output of the player sitting right at the
//! league's roster depth for a position. It is measured per season and then
//! averaged across seasons.

use crate::aggregator::ResolvedPick;
use crate::config::ReplacementThresholds;
use crate::types::{Position, SeasonId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Replacement-level season points per position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplacementLevels {
    levels: BTreeMap<Position, f64>,
    season_samples: BTreeMap<Position, usize>,
}

impl ReplacementLevels {
    /// Estimate replacement levels from drafted players' season totals.
    ///
    /// Within a season the drafted players of a position are sorted by points
    /// (descending) and the sample is the mean of the values at rank
    /// `threshold` and `threshold + 1`, both clamped to the last available
    /// rank. The level is the mean of those samples over every season that
    /// drafted the position, floored at zero.
    pub fn estimate(picks: &[ResolvedPick], thresholds: &ReplacementThresholds) -> Self {
        let mut by_season: BTreeMap<(SeasonId, Position), Vec<f64>> = BTreeMap::new();
        for resolved in picks {
            by_season
                .entry((resolved.pick.season_id, resolved.position))
                .or_default()
                .push(resolved.points);
        }

        let mut samples: BTreeMap<Position, Vec<f64>> = BTreeMap::new();
        for ((_, position), mut points) in by_season {
            points.sort_by(|a, b| b.total_cmp(a));
            if let Some(sample) = season_sample(&points, thresholds.for_position(position)) {
                samples.entry(position).or_default().push(sample);
            }
        }

        let mut levels = BTreeMap::new();
        let mut season_samples = BTreeMap::new();
        for position in Position::ALL {
            let position_samples = samples.get(&position).map(Vec::as_slice).unwrap_or(&[]);
            let level = if position_samples.is_empty() {
                0.0
            } else {
                let mean = position_samples.iter().sum::<f64>() / position_samples.len() as f64;
                mean.max(0.0)
            };
            levels.insert(position, level);
            season_samples.insert(position, position_samples.len());
        }

        Self { levels, season_samples }
    }

    /// Replacement level for a position, `0.0` without history
    pub fn level(&self, position: Position) -> f64 {
        self.levels.get(&position).copied().unwrap_or(0.0)
    }

    /// Number of seasons that contributed a sample for a position
    pub fn season_samples(&self, position: Position) -> usize {
        self.season_samples.get(&position).copied().unwrap_or(0)
    }

    /// All six positions with their level
    pub fn levels(&self) -> &BTreeMap<Position, f64> {
        &self.levels
    }
}

/// Season sample from points sorted descending; `None` for an empty season
fn season_sample(sorted_desc: &[f64], threshold: usize) -> Option<f64> {
    let last = sorted_desc.len().checked_sub(1)?;
    let at_rank = threshold.max(1).min(sorted_desc.len()) - 1;
    let neighbor = (at_rank + 1).min(last);
    Some((sorted_desc[at_rank] + sorted_desc[neighbor]) / 2.0)
}
