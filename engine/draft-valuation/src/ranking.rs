//! # Ranking and Query Layer
//!
//! Read-only views over one corpus snapshot. Every view that ranks or sums
//! residual values calibrates over exactly the working set it reports on.
//! Numbers are rounded to two decimals here and nowhere earlier.

use crate::config::ValuationConfig;
use crate::curve::{fit_position_curves, DecayCurve};
use crate::ranges::{self, PickRangeReport, PositionPerformance, PointSummary, RangeStats};
use crate::store::{Corpus, CorpusIndex};
use crate::types::*;
use crate::valuation::{Calibration, ValuationContext, ValuedPick};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Label carried by every legacy ratio row
pub const LEGACY_RATIO_METRIC: &str = "legacy_ratio";

/// Round to two decimals for display
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// A valued pick as shown on pick leaderboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickValue {
    pub season_id: SeasonId,
    pub year: u32,
    pub overall_pick: u32,
    pub round: u32,
    pub pick: u32,
    pub player_id: PlayerId,
    pub player_name: String,
    pub position: Position,
    pub team_id: TeamId,
    pub team_name: String,
    pub actual_points: f64,
    pub vor: f64,
    pub expected_vor: f64,
    /// Calibrated residual value
    pub value: f64,
    pub low_confidence: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRanking {
    pub owner_id: OwnerId,
    pub owner_name: String,
    pub avg_value: f64,
    pub total_picks: usize,
    pub total_seasons: usize,
}

/// One fantasy team's draft, scored by mean calibrated pick value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRanking {
    pub team_id: TeamId,
    pub team_name: String,
    pub season_id: SeasonId,
    pub year: u32,
    pub owner_id: OwnerId,
    /// `None` when the team's owner is not in the corpus
    pub owner_name: Option<String>,
    pub avg_value: f64,
    pub total_picks: usize,
}

/// Draft activity and value for one position in one season
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearPositionValue {
    pub total_picks: usize,
    /// Mean overall pick spent on the position; 0 when none were drafted
    pub avg_overall_pick: f64,
    /// Mean calibrated value; 0 when none were drafted
    pub avg_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAverage {
    pub position: Position,
    /// Mean calibrated value mapped into the configured display band
    pub avg_value: f64,
    pub avg_round: f64,
    pub total_picks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTotal {
    pub player_id: PlayerId,
    pub player_name: String,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NflTeamTotal {
    pub nfl_team: String,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCount {
    pub player_id: PlayerId,
    pub player_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NflTeamCount {
    pub nfl_team: String,
    pub count: usize,
}

/// Corpus-level counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSummary {
    /// Unique picks after deduplication
    pub total_picks: usize,
    pub duplicate_picks: usize,
    /// Unique picks left out of ranked views for a missing player, team,
    /// season or owner
    pub skipped_picks: usize,
    pub total_seasons: usize,
    pub total_teams: usize,
    pub total_owners: usize,
    pub total_players: usize,
    pub total_roster_entries: usize,
}

/// Pick scored with the legacy curve ratio; not comparable with `PickValue`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPickRatio {
    pub metric: String,
    pub season_id: SeasonId,
    pub year: u32,
    pub overall_pick: u32,
    pub player_id: PlayerId,
    pub player_name: String,
    pub position: Position,
    pub team_name: String,
    pub actual_points: f64,
    pub expected_points: f64,
    pub ratio: f64,
}

/// A valued pick whose player, team and season all resolve
#[derive(Debug, Clone)]
struct RankedPick<'a> {
    valued: ValuedPick,
    player: &'a Player,
    team: &'a Team,
    season: &'a Season,
}

impl RankedPick<'_> {
    fn tie_key(&self) -> (u32, u32, PlayerId) {
        (self.season.year, self.valued.pick.overall_pick, self.valued.pick.player_id)
    }

    fn to_pick_value(&self, calibration: &Calibration) -> PickValue {
        let valued = &self.valued;
        PickValue {
            season_id: self.season.id,
            year: self.season.year,
            overall_pick: valued.pick.overall_pick,
            round: valued.pick.round,
            pick: valued.pick.pick,
            player_id: self.player.id,
            player_name: self.player.name.clone(),
            position: valued.position,
            team_id: self.team.id,
            team_name: self.team.name.clone(),
            actual_points: round2(valued.actual_points),
            vor: round2(valued.vor),
            expected_vor: round2(valued.expected.value),
            value: round2(calibration.apply(valued.residual)),
            low_confidence: valued.low_confidence,
        }
    }
}

fn nfl_team_of(player: &Player) -> Option<&str> {
    player.nfl_team.as_deref().map(str::trim).filter(|t| !t.is_empty())
}

/// Highest total; ties go to the smallest key
fn arg_max<K: Ord + Clone, V: PartialOrd + Copy>(totals: &BTreeMap<K, V>) -> Option<(K, V)> {
    totals
        .iter()
        .fold(None::<(&K, V)>, |best, (key, total)| match best {
            Some((_, best_total)) if *total <= best_total => best,
            _ => Some((key, *total)),
        })
        .map(|(key, total)| (key.clone(), total))
}

/// Query views over one corpus snapshot
pub struct DraftAnalytics<'a> {
    corpus: &'a Corpus,
    config: &'a ValuationConfig,
    index: CorpusIndex<'a>,
    context: ValuationContext,
}

impl<'a> DraftAnalytics<'a> {
    /// Run the full derived-state pipeline for a corpus
    pub fn new(corpus: &'a Corpus, config: &'a ValuationConfig) -> Self {
        let context = ValuationContext::build(corpus, config);
        Self { corpus, config, index: corpus.index(), context }
    }

    pub fn context(&self) -> &ValuationContext {
        &self.context
    }

    /// Valued picks whose references all resolve, optionally for one position
    fn working_set(&self, position: Option<Position>) -> Vec<RankedPick<'a>> {
        let mut missing = 0usize;
        let ranked: Vec<RankedPick<'a>> = self
            .context
            .resolved
            .iter()
            .filter(|r| position.map_or(true, |p| r.position == p))
            .filter_map(|resolved| {
                let lookup = (
                    self.index.player(resolved.pick.player_id),
                    self.index.team(resolved.pick.team_id),
                    self.index.season(resolved.pick.season_id),
                );
                match lookup {
                    (Some(player), Some(team), Some(season)) => Some(RankedPick {
                        valued: self.context.value(resolved),
                        player,
                        team,
                        season,
                    }),
                    _ => {
                        missing += 1;
                        None
                    }
                }
            })
            .collect();

        if missing > 0 {
            debug!("Left {} picks with unknown team or season out of the working set", missing);
        }
        ranked
    }

    fn calibrate(&self, picks: &[RankedPick<'_>]) -> Calibration {
        Calibration::fit(
            picks.iter().map(|p| p.valued.residual),
            self.config.calibration.target_avg_abs,
        )
    }

    fn ranked_picks(&self, limit: usize, position: Option<Position>, best_first: bool) -> Vec<PickValue> {
        let mut picks = self.working_set(position);
        let calibration = self.calibrate(&picks);

        picks.sort_by(|a, b| {
            let by_value = if best_first {
                b.valued.residual.total_cmp(&a.valued.residual)
            } else {
                a.valued.residual.total_cmp(&b.valued.residual)
            };
            by_value.then_with(|| a.tie_key().cmp(&b.tie_key()))
        });

        picks.iter().take(limit).map(|p| p.to_pick_value(&calibration)).collect()
    }

    /// Best picks by calibrated residual value
    pub fn top_picks(&self, limit: usize, position: Option<Position>) -> Vec<PickValue> {
        self.ranked_picks(limit, position, true)
    }

    /// Worst picks by calibrated residual value, most negative first
    pub fn worst_picks(&self, limit: usize, position: Option<Position>) -> Vec<PickValue> {
        self.ranked_picks(limit, position, false)
    }

    /// Owners by mean calibrated pick value.
    ///
    /// Owners with fewer than `min_picks` picks (configured default when
    /// `None`) are excluded before calibration.
    pub fn owner_rankings(
        &self,
        limit: usize,
        position: Option<Position>,
        min_picks: Option<usize>,
    ) -> Vec<OwnerRanking> {
        let min_picks = min_picks.unwrap_or(self.config.ranking.min_picks);

        let mut by_owner: BTreeMap<OwnerId, (&Owner, Vec<RankedPick<'a>>)> = BTreeMap::new();
        for ranked in self.working_set(position) {
            let Some(owner) = self.index.owner(ranked.team.owner_id) else {
                debug!("Skipping pick for team {}: unknown owner {}", ranked.team.id, ranked.team.owner_id);
                continue;
            };
            by_owner.entry(owner.id).or_insert_with(|| (owner, Vec::new())).1.push(ranked);
        }
        by_owner.retain(|_, (_, picks)| picks.len() >= min_picks);

        let eligible: Vec<&RankedPick<'_>> =
            by_owner.values().flat_map(|(_, picks)| picks.iter()).collect();
        let calibration = Calibration::fit(
            eligible.iter().map(|p| p.valued.residual),
            self.config.calibration.target_avg_abs,
        );

        let mut rankings: Vec<(OwnerRanking, f64)> = by_owner
            .values()
            .map(|(owner, picks)| {
                let total: f64 = picks.iter().map(|p| calibration.apply(p.valued.residual)).sum();
                let avg = if picks.is_empty() { 0.0 } else { total / picks.len() as f64 };
                let seasons: BTreeSet<SeasonId> = picks.iter().map(|p| p.season.id).collect();
                let ranking = OwnerRanking {
                    owner_id: owner.id,
                    owner_name: owner.display_name.clone(),
                    avg_value: round2(avg),
                    total_picks: picks.len(),
                    total_seasons: seasons.len(),
                };
                (ranking, avg)
            })
            .collect();

        rankings.sort_by(|(a, a_avg), (b, b_avg)| {
            b_avg.total_cmp(a_avg).then_with(|| a.owner_id.cmp(&b.owner_id))
        });
        rankings.into_iter().take(limit).map(|(ranking, _)| ranking).collect()
    }

    /// Fantasy teams by mean calibrated pick value.
    ///
    /// Each team is one season's roster. Teams with fewer than `min_picks`
    /// picks (configured `team_min_picks` when `None`) are excluded before
    /// calibration.
    pub fn team_rankings(
        &self,
        limit: usize,
        position: Option<Position>,
        min_picks: Option<usize>,
    ) -> Vec<TeamRanking> {
        let min_picks = min_picks.unwrap_or(self.config.ranking.team_min_picks);

        let mut by_team: BTreeMap<TeamId, Vec<RankedPick<'a>>> = BTreeMap::new();
        for ranked in self.working_set(position) {
            by_team.entry(ranked.team.id).or_default().push(ranked);
        }
        by_team.retain(|_, picks| picks.len() >= min_picks);

        let calibration = Calibration::fit(
            by_team.values().flatten().map(|p| p.valued.residual),
            self.config.calibration.target_avg_abs,
        );

        let mut rankings: Vec<(TeamRanking, f64, (u32, TeamId))> = by_team
            .values()
            .filter_map(|picks| {
                let first = picks.first()?;
                let (team, season) = (first.team, first.season);
                let total: f64 = picks.iter().map(|p| calibration.apply(p.valued.residual)).sum();
                let avg = total / picks.len() as f64;
                let ranking = TeamRanking {
                    team_id: team.id,
                    team_name: team.name.clone(),
                    season_id: season.id,
                    year: season.year,
                    owner_id: team.owner_id,
                    owner_name: self.index.owner(team.owner_id).map(|o| o.display_name.clone()),
                    avg_value: round2(avg),
                    total_picks: picks.len(),
                };
                Some((ranking, avg, (season.year, team.id)))
            })
            .collect();

        rankings.sort_by(|(_, a_avg, a_key), (_, b_avg, b_key)| {
            b_avg.total_cmp(a_avg).then_with(|| a_key.cmp(b_key))
        });
        rankings.into_iter().take(limit).map(|(ranking, _, _)| ranking).collect()
    }

    /// Picks and value per position for every drafted season, keyed by
    /// season year.
    ///
    /// Calibrated over every ranked pick. All six positions are present for
    /// each year.
    pub fn draft_value_by_year(&self) -> BTreeMap<u32, BTreeMap<Position, YearPositionValue>> {
        let picks = self.working_set(None);
        let calibration = self.calibrate(&picks);

        let mut grouped: BTreeMap<u32, BTreeMap<Position, Vec<&RankedPick<'_>>>> = BTreeMap::new();
        for ranked in &picks {
            grouped
                .entry(ranked.season.year)
                .or_default()
                .entry(ranked.valued.position)
                .or_default()
                .push(ranked);
        }

        grouped
            .into_iter()
            .map(|(year, by_position)| {
                let positions = Position::ALL
                    .iter()
                    .map(|position| {
                        let value = match by_position.get(position) {
                            Some(picks) if !picks.is_empty() => {
                                let count = picks.len() as f64;
                                let overall: f64 =
                                    picks.iter().map(|p| f64::from(p.valued.pick.overall_pick)).sum();
                                let value: f64 =
                                    picks.iter().map(|p| calibration.apply(p.valued.residual)).sum();
                                YearPositionValue {
                                    total_picks: picks.len(),
                                    avg_overall_pick: round2(overall / count),
                                    avg_value: round2(value / count),
                                }
                            }
                            _ => YearPositionValue::default(),
                        };
                        (*position, value)
                    })
                    .collect();
                (year, positions)
            })
            .collect()
    }

    /// Average value, round and pick count for one position.
    ///
    /// Calibrated over every position's picks so positions can be compared.
    pub fn position_average(&self, position: Position) -> PositionAverage {
        let picks = self.working_set(None);
        let calibration = self.calibrate(&picks);
        self.position_average_with(&picks, &calibration, position)
    }

    /// [`DraftAnalytics::position_average`] for all six positions
    pub fn position_averages(&self) -> Vec<PositionAverage> {
        let picks = self.working_set(None);
        let calibration = self.calibrate(&picks);
        Position::ALL
            .iter()
            .map(|position| self.position_average_with(&picks, &calibration, *position))
            .collect()
    }

    fn position_average_with(
        &self,
        picks: &[RankedPick<'_>],
        calibration: &Calibration,
        position: Position,
    ) -> PositionAverage {
        let at_position: Vec<&RankedPick<'_>> =
            picks.iter().filter(|p| p.valued.position == position).collect();

        if at_position.is_empty() {
            return PositionAverage { position, avg_value: 0.0, avg_round: 0.0, total_picks: 0 };
        }

        let count = at_position.len() as f64;
        let mean_value =
            at_position.iter().map(|p| calibration.apply(p.valued.residual)).sum::<f64>() / count;
        let mean_round = at_position.iter().map(|p| f64::from(p.valued.pick.round)).sum::<f64>() / count;

        let band = &self.config.ranking;
        let banded = (band.band_center + mean_value).clamp(band.band_min, band.band_max);

        PositionAverage {
            position,
            avg_value: round2(banded),
            avg_round: round2(mean_round),
            total_picks: at_position.len(),
        }
    }

    /// Player with the largest summed calibrated value
    pub fn most_valuable_player(&self) -> Option<PlayerTotal> {
        let picks = self.working_set(None);
        let calibration = self.calibrate(&picks);

        let mut totals: BTreeMap<PlayerId, f64> = BTreeMap::new();
        for ranked in &picks {
            *totals.entry(ranked.player.id).or_insert(0.0) += calibration.apply(ranked.valued.residual);
        }

        let (player_id, total) = arg_max(&totals)?;
        let player = self.index.player(player_id)?;
        Some(PlayerTotal { player_id, player_name: player.name.clone(), total_value: round2(total) })
    }

    /// NFL team whose drafted players sum to the largest calibrated value
    pub fn most_valuable_nfl_team(&self) -> Option<NflTeamTotal> {
        let picks = self.working_set(None);
        let calibration = self.calibrate(&picks);

        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for ranked in &picks {
            if let Some(nfl_team) = nfl_team_of(ranked.player) {
                *totals.entry(nfl_team.to_string()).or_insert(0.0) +=
                    calibration.apply(ranked.valued.residual);
            }
        }

        let (nfl_team, total) = arg_max(&totals)?;
        Some(NflTeamTotal { nfl_team, total_value: round2(total) })
    }

    /// Player drafted most often
    pub fn most_drafted_player(&self) -> Option<PlayerCount> {
        let mut counts: BTreeMap<PlayerId, usize> = BTreeMap::new();
        for ranked in self.working_set(None) {
            *counts.entry(ranked.player.id).or_insert(0) += 1;
        }

        let (player_id, count) = arg_max(&counts)?;
        let player = self.index.player(player_id)?;
        Some(PlayerCount { player_id, player_name: player.name.clone(), count })
    }

    /// NFL team whose players were drafted most often
    pub fn most_drafted_nfl_team(&self) -> Option<NflTeamCount> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for ranked in self.working_set(None) {
            if let Some(nfl_team) = nfl_team_of(ranked.player) {
                *counts.entry(nfl_team.to_string()).or_insert(0) += 1;
            }
        }

        let (nfl_team, count) = arg_max(&counts)?;
        Some(NflTeamCount { nfl_team, count })
    }

    /// Replacement level per position
    pub fn replacement_levels(&self) -> BTreeMap<Position, f64> {
        self.context
            .replacement
            .levels()
            .iter()
            .map(|(position, level)| (*position, round2(*level)))
            .collect()
    }

    /// Populated expected-VOR cells per position
    pub fn expected_value_table(&self) -> BTreeMap<Position, BTreeMap<u32, f64>> {
        self.context
            .expected
            .to_map()
            .into_iter()
            .map(|(position, picks)| {
                let picks = picks.into_iter().map(|(pick, value)| (pick, round2(value))).collect();
                (position, picks)
            })
            .collect()
    }

    /// Corpus-level counts
    pub fn draft_summary(&self) -> DraftSummary {
        let ranked = self.working_set(None);
        let ownerless = ranked.iter().filter(|r| self.index.owner(r.team.owner_id).is_none()).count();
        let unresolved = self.context.resolved.len() - ranked.len();
        DraftSummary {
            total_picks: self.corpus.draft_picks.len() - self.context.duplicate_picks,
            duplicate_picks: self.context.duplicate_picks,
            skipped_picks: self.context.skipped_picks + unresolved + ownerless,
            total_seasons: self.corpus.seasons.len(),
            total_teams: self.corpus.teams.len(),
            total_owners: self.corpus.owners.len(),
            total_players: self.corpus.players.len(),
            total_roster_entries: self.corpus.roster_entries.len(),
        }
    }

    /// Actual points by overall-pick bucket
    pub fn pick_range_performance(&self) -> PickRangeReport {
        let report = ranges::pick_range_report(&self.context.resolved);
        PickRangeReport {
            ranges: report.ranges.into_iter().map(round_range).collect(),
            first_pick: round_summary(report.first_pick),
            late_picks: round_summary(report.late_picks),
        }
    }

    /// Actual points by overall-pick bucket, per position
    pub fn position_performance(&self) -> BTreeMap<Position, PositionPerformance> {
        self.raw_position_performance()
            .into_iter()
            .map(|(position, perf)| {
                let perf = PositionPerformance {
                    ranges: perf.ranges.into_iter().map(round_range).collect(),
                    peak_performance: round2(perf.peak_performance),
                    ..perf
                };
                (position, perf)
            })
            .collect()
    }

    fn raw_position_performance(&self) -> BTreeMap<Position, PositionPerformance> {
        ranges::position_performance(&self.context.resolved, self.config.curve.typical_start_min_picks)
    }

    /// Fitted decay curve per position; decay keeps five decimals
    pub fn position_curves(&self) -> BTreeMap<Position, DecayCurve> {
        fit_position_curves(&self.raw_position_performance(), &self.config.curve)
            .into_iter()
            .map(|(position, curve)| {
                let curve = DecayCurve {
                    base: round2(curve.base),
                    decay: round_to(curve.decay, 5),
                    draft_start: curve.draft_start,
                };
                (position, curve)
            })
            .collect()
    }

    /// Picks ranked by the legacy ratio against the global curve
    pub fn legacy_pick_ratios(&self, limit: usize, position: Option<Position>) -> Vec<LegacyPickRatio> {
        let curve = DecayCurve::global(&self.config.curve);
        let mut rows: Vec<(LegacyPickRatio, f64, (u32, u32, PlayerId))> = self
            .working_set(position)
            .iter()
            .map(|ranked| {
                let valued = &ranked.valued;
                let ratio = curve.ratio(valued.actual_points, valued.pick.overall_pick);
                let row = LegacyPickRatio {
                    metric: LEGACY_RATIO_METRIC.to_string(),
                    season_id: ranked.season.id,
                    year: ranked.season.year,
                    overall_pick: valued.pick.overall_pick,
                    player_id: ranked.player.id,
                    player_name: ranked.player.name.clone(),
                    position: valued.position,
                    team_name: ranked.team.name.clone(),
                    actual_points: round2(valued.actual_points),
                    expected_points: round2(curve.expected_points(valued.pick.overall_pick)),
                    ratio: round2(ratio),
                };
                (row, ratio, ranked.tie_key())
            })
            .collect();

        rows.sort_by(|(_, a, a_key), (_, b, b_key)| {
            b.partial_cmp(a).unwrap_or(Ordering::Equal).then_with(|| a_key.cmp(b_key))
        });
        rows.into_iter().take(limit).map(|(row, _, _)| row).collect()
    }
}

fn round_range(range: RangeStats) -> RangeStats {
    RangeStats {
        avg_points: round2(range.avg_points),
        min_points: round2(range.min_points),
        max_points: round2(range.max_points),
        ..range
    }
}

fn round_summary(summary: PointSummary) -> PointSummary {
    PointSummary {
        avg_points: round2(summary.avg_points),
        min_points: round2(summary.min_points),
        max_points: round2(summary.max_points),
        count: summary.count,
    }
}
