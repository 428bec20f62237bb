//! # Pick Valuation and Calibration
//!
//! Runs the derived-state pipeline for one corpus snapshot:
//! dedup -> points -> replacement levels -> expected-value table, and values
//! every pick as its residual (observed VOR minus expected VOR at its slot).
//! Calibration rescales a working set of residuals so their mean magnitude
//! hits a fixed target.

use crate::aggregator::{resolve_picks, PointsTable, ResolvedPick};
use crate::config::ValuationConfig;
use crate::expected_value::{vor, Expectation, ExpectationBasis, ExpectedValueTable};
use crate::replacement::ReplacementLevels;
use crate::store::Corpus;
use crate::types::{DraftPick, Position};
use std::collections::HashSet;
use tracing::debug;

/// Collapse picks recorded more than once.
///
/// Rows sharing (season, player, team, overall pick) describe the same draft
/// event; the first occurrence is kept and input order is preserved. Returns
/// the unique picks and the number of rows dropped.
pub fn dedup_picks(picks: &[DraftPick]) -> (Vec<DraftPick>, usize) {
    let mut seen = HashSet::with_capacity(picks.len());
    let unique: Vec<DraftPick> = picks.iter().filter(|p| seen.insert(p.key())).cloned().collect();
    let dropped = picks.len() - unique.len();
    (unique, dropped)
}

/// A pick with its residual value
#[derive(Debug, Clone, PartialEq)]
pub struct ValuedPick {
    pub pick: DraftPick,
    pub position: Position,
    pub actual_points: f64,
    pub vor: f64,
    pub expected: Expectation,
    /// `vor - expected.value`, before calibration
    pub residual: f64,
    /// Expectation came from the fallback window, no data or a sparse exact
    /// cell, or the replacement level rests on too few seasons
    pub low_confidence: bool,
}

/// Derived state for one corpus snapshot
#[derive(Debug, Clone)]
pub struct ValuationContext {
    pub points: PointsTable,
    pub replacement: ReplacementLevels,
    pub expected: ExpectedValueTable,
    /// Deduplicated picks whose player is known
    pub resolved: Vec<ResolvedPick>,
    /// Rows removed by deduplication
    pub duplicate_picks: usize,
    /// Deduplicated picks skipped for an unknown player
    pub skipped_picks: usize,
    min_replacement_seasons: usize,
    min_cell_samples: usize,
}

impl ValuationContext {
    /// Recompute every derived table from the corpus
    pub fn build(corpus: &Corpus, config: &ValuationConfig) -> Self {
        let (unique, duplicate_picks) = dedup_picks(&corpus.draft_picks);
        if duplicate_picks > 0 {
            debug!("Dropped {} duplicate draft pick rows", duplicate_picks);
        }

        let points = PointsTable::from_entries(&corpus.roster_entries);
        let index = corpus.index();
        let (resolved, skipped_picks) = resolve_picks(&unique, &index, &points);

        let replacement = ReplacementLevels::estimate(&resolved, &config.replacement);
        let expected = ExpectedValueTable::build(&resolved, &replacement, config.expected.window);

        debug!(
            "Valuation context: {} picks, {} expected-value cells",
            resolved.len(),
            expected.cell_count()
        );

        Self {
            points,
            replacement,
            expected,
            resolved,
            duplicate_picks,
            skipped_picks,
            min_replacement_seasons: config.expected.min_replacement_seasons,
            min_cell_samples: config.expected.min_cell_samples,
        }
    }

    /// Value a single resolved pick
    pub fn value(&self, resolved: &ResolvedPick) -> ValuedPick {
        let vor = vor(resolved, &self.replacement);
        let expected = self.expected.lookup(resolved.position, resolved.pick.overall_pick);
        let thin_replacement =
            self.replacement.season_samples(resolved.position) < self.min_replacement_seasons;
        let sparse_cell = matches!(
            expected.basis,
            ExpectationBasis::Exact { samples } if samples < self.min_cell_samples
        );

        ValuedPick {
            pick: resolved.pick.clone(),
            position: resolved.position,
            actual_points: resolved.points,
            vor,
            expected,
            residual: vor - expected.value,
            low_confidence: expected.basis.is_low_confidence() || sparse_cell || thin_replacement,
        }
    }

    /// Value every resolved pick, in corpus order
    pub fn valued_picks(&self) -> Vec<ValuedPick> {
        self.resolved.iter().map(|r| self.value(r)).collect()
    }
}

/// Linear rescaling of residual values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub scale: f64,
    /// Mean absolute residual of the working set before scaling
    pub mean_abs: f64,
    pub sample_size: usize,
}

impl Calibration {
    /// Fit the scale over exactly the working set that will be displayed.
    ///
    /// `scale = target_avg_abs / mean(|residual|)`; an empty set or an
    /// all-zero set keeps a scale of `1.0`.
    pub fn fit<I>(residuals: I, target_avg_abs: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let (sum_abs, sample_size) =
            residuals.into_iter().fold((0.0, 0usize), |(sum, n), r| (sum + r.abs(), n + 1));

        if sample_size == 0 {
            return Self { scale: 1.0, mean_abs: 0.0, sample_size };
        }

        let mean_abs = sum_abs / sample_size as f64;
        let scale = if mean_abs > 0.0 && mean_abs.is_finite() {
            target_avg_abs / mean_abs
        } else {
            debug!("Degenerate calibration set of {} residuals, scale left at 1.0", sample_size);
            1.0
        };

        Self { scale, mean_abs, sample_size }
    }

    pub fn apply(&self, residual: f64) -> f64 {
        residual * self.scale
    }
}
