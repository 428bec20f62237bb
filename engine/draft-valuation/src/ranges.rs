//! # Pick Range Analysis
//!
//! Actual season points grouped into fixed overall-pick buckets, league-wide
//! and per position. The per-position view feeds the parametric curve fit.

use crate::aggregator::ResolvedPick;
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An inclusive overall-pick bucket; `max_pick == None` is open-ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickRange {
    pub min_pick: u32,
    pub max_pick: Option<u32>,
}

impl PickRange {
    const fn new(min_pick: u32, max_pick: Option<u32>) -> Self {
        Self { min_pick, max_pick }
    }

    pub fn contains(&self, overall_pick: u32) -> bool {
        overall_pick >= self.min_pick && self.max_pick.map_or(true, |max| overall_pick <= max)
    }

    pub fn label(&self) -> String {
        match self.max_pick {
            Some(max) => format!("{}-{}", self.min_pick, max),
            None => format!("{}+", self.min_pick),
        }
    }
}

/// Buckets used by every range report
pub const PICK_RANGES: [PickRange; 8] = [
    PickRange::new(1, Some(10)),
    PickRange::new(11, Some(20)),
    PickRange::new(21, Some(30)),
    PickRange::new(31, Some(50)),
    PickRange::new(51, Some(75)),
    PickRange::new(76, Some(100)),
    PickRange::new(101, Some(150)),
    PickRange::new(151, None),
];

/// Picks at or after this overall pick count as late picks
pub const LATE_PICK_START: u32 = 150;

/// Point statistics for one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeStats {
    pub label: String,
    pub min_pick: u32,
    pub max_pick: Option<u32>,
    pub avg_points: f64,
    pub min_points: f64,
    pub max_points: f64,
    pub count: usize,
}

impl RangeStats {
    fn from_points(range: &PickRange, points: &[f64]) -> Self {
        let summary = PointSummary::from_points(points);
        Self {
            label: range.label(),
            min_pick: range.min_pick,
            max_pick: range.max_pick,
            avg_points: summary.avg_points,
            min_points: summary.min_points,
            max_points: summary.max_points,
            count: summary.count,
        }
    }
}

/// Average/min/max of a point sample; all zero when empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSummary {
    pub avg_points: f64,
    pub min_points: f64,
    pub max_points: f64,
    pub count: usize,
}

impl PointSummary {
    pub fn from_points(points: &[f64]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let sum: f64 = points.iter().sum();
        Self {
            avg_points: sum / points.len() as f64,
            min_points: points.iter().copied().fold(f64::INFINITY, f64::min),
            max_points: points.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count: points.len(),
        }
    }
}

/// League-wide points by pick range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickRangeReport {
    /// Every bucket, including empty ones
    pub ranges: Vec<RangeStats>,
    /// First overall picks
    pub first_pick: PointSummary,
    /// Picks at or after [`LATE_PICK_START`]
    pub late_picks: PointSummary,
}

/// Points by pick range for one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPerformance {
    pub position: Position,
    /// Non-empty buckets only
    pub ranges: Vec<RangeStats>,
    /// Lower bound of the first bucket with enough picks to be typical
    pub typical_draft_start: u32,
    /// Highest bucket average
    pub peak_performance: f64,
    pub total_picks: usize,
}

fn bucket_points<'a>(picks: impl Iterator<Item = &'a ResolvedPick>) -> Vec<Vec<f64>> {
    let mut buckets = vec![Vec::new(); PICK_RANGES.len()];
    for resolved in picks {
        if let Some(slot) = PICK_RANGES.iter().position(|r| r.contains(resolved.pick.overall_pick)) {
            buckets[slot].push(resolved.points);
        }
    }
    buckets
}

/// Points by pick range across all positions
pub fn pick_range_report(picks: &[ResolvedPick]) -> PickRangeReport {
    let buckets = bucket_points(picks.iter());
    let ranges = PICK_RANGES
        .iter()
        .zip(&buckets)
        .map(|(range, points)| RangeStats::from_points(range, points))
        .collect();

    let first: Vec<f64> =
        picks.iter().filter(|r| r.pick.overall_pick == 1).map(|r| r.points).collect();
    let late: Vec<f64> = picks
        .iter()
        .filter(|r| r.pick.overall_pick >= LATE_PICK_START)
        .map(|r| r.points)
        .collect();

    PickRangeReport {
        ranges,
        first_pick: PointSummary::from_points(&first),
        late_picks: PointSummary::from_points(&late),
    }
}

/// Points by pick range for every position
pub fn position_performance(
    picks: &[ResolvedPick],
    typical_start_min_picks: usize,
) -> BTreeMap<Position, PositionPerformance> {
    Position::ALL
        .iter()
        .map(|position| {
            let buckets = bucket_points(picks.iter().filter(|r| r.position == *position));

            let typical_draft_start = PICK_RANGES
                .iter()
                .zip(&buckets)
                .find(|(_, points)| points.len() >= typical_start_min_picks.max(1))
                .map(|(range, _)| range.min_pick)
                .unwrap_or(1);

            let ranges: Vec<RangeStats> = PICK_RANGES
                .iter()
                .zip(&buckets)
                .filter(|(_, points)| !points.is_empty())
                .map(|(range, points)| RangeStats::from_points(range, points))
                .collect();

            let peak_performance =
                ranges.iter().map(|r| r.avg_points).fold(0.0_f64, f64::max);
            let total_picks = buckets.iter().map(Vec::len).sum();

            let performance = PositionPerformance {
                position: *position,
                ranges,
                typical_draft_start,
                peak_performance,
                total_picks,
            };
            (*position, performance)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DraftPick;

    fn resolved(position: Position, overall_pick: u32, points: f64) -> ResolvedPick {
        ResolvedPick {
            pick: DraftPick {
                season_id: 1,
                team_id: 1,
                player_id: overall_pick,
                round: 1,
                pick: 1,
                overall_pick,
            },
            position,
            points,
        }
    }

    #[test]
    fn test_range_labels_and_membership() {
        assert_eq!(PICK_RANGES[0].label(), "1-10");
        assert_eq!(PICK_RANGES[7].label(), "151+");
        assert!(PICK_RANGES[6].contains(150));
        assert!(!PICK_RANGES[6].contains(151));
        assert!(PICK_RANGES[7].contains(400));
    }

    #[test]
    fn test_pick_range_report() {
        let picks = vec![
            resolved(Position::RB, 1, 300.0),
            resolved(Position::WR, 1, 250.0),
            resolved(Position::WR, 8, 200.0),
            resolved(Position::K, 150, 110.0),
            resolved(Position::DST, 160, 90.0),
        ];

        let report = pick_range_report(&picks);

        assert_eq!(report.ranges.len(), PICK_RANGES.len());
        assert_eq!(report.ranges[0].count, 3);
        assert_eq!(report.ranges[0].avg_points, 250.0);
        assert_eq!(report.ranges[0].min_points, 200.0);
        assert_eq!(report.ranges[0].max_points, 300.0);
        assert_eq!(report.ranges[1].count, 0);
        assert_eq!(report.ranges[1].avg_points, 0.0);

        assert_eq!(report.first_pick.count, 2);
        assert_eq!(report.first_pick.avg_points, 275.0);
        assert_eq!(report.late_picks.count, 2);
        assert_eq!(report.late_picks.avg_points, 100.0);
    }

    #[test]
    fn test_position_performance_typical_start_and_peak() {
        let mut picks: Vec<ResolvedPick> =
            (0..3).map(|i| resolved(Position::QB, 5 + i, 320.0)).collect();
        picks.extend((0..5).map(|i| resolved(Position::QB, 35 + i, 280.0)));
        picks.push(resolved(Position::QB, 120, 150.0));

        let performance = position_performance(&picks, 5);
        let qb = &performance[&Position::QB];

        // the 1-10 bucket has only three picks, 31-50 is the first with five
        assert_eq!(qb.typical_draft_start, 31);
        assert_eq!(qb.peak_performance, 320.0);
        assert_eq!(qb.total_picks, 9);
        assert_eq!(qb.ranges.len(), 3);

        let te = &performance[&Position::TE];
        assert!(te.ranges.is_empty());
        assert_eq!(te.typical_draft_start, 1);
        assert_eq!(te.peak_performance, 0.0);
    }
}
