//! # Command Line Interface
//!
//! CLI for querying draft valuations from a JSON data directory.

use crate::config::ValuationConfig;
use crate::ranking::{LegacyPickRatio, PickValue};
use crate::service::ValuationService;
use crate::store::JsonDirStore;
use crate::types::Position;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Draft valuation CLI
#[derive(Parser)]
#[command(name = "draft-valuation-cli")]
#[command(about = "Rank fantasy draft picks, owners and positions by value over expectation")]
pub struct Cli {
    /// Directory holding the league's JSON record files
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Best picks by calibrated value
    TopPicks {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, value_parser = parse_position)]
        position: Option<Position>,
    },
    /// Worst picks by calibrated value
    WorstPicks {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, value_parser = parse_position)]
        position: Option<Position>,
    },
    /// Owners by average pick value
    Owners {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, value_parser = parse_position)]
        position: Option<Position>,
        /// Minimum picks for an owner to be ranked
        #[arg(short, long)]
        min_picks: Option<usize>,
    },
    /// Fantasy teams (one season's roster) by average pick value
    Teams {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, value_parser = parse_position)]
        position: Option<Position>,
        /// Minimum picks for a team to be ranked
        #[arg(short, long)]
        min_picks: Option<usize>,
    },
    /// Picks and value per position for each season
    ByYear,
    /// Average value per position
    Positions {
        /// Single position instead of all six
        #[arg(short, long, value_parser = parse_position)]
        position: Option<Position>,
    },
    /// Most valuable player and NFL team
    MostValuable,
    /// Most drafted player and NFL team
    MostDrafted,
    /// Replacement level per position
    Replacement,
    /// Expected VOR per position and overall pick
    ExpectedTable,
    /// Actual points by pick range
    PickRanges,
    /// Actual points by pick range for each position
    PositionPerformance,
    /// Fitted decay curve per position
    Curves,
    /// Picks ranked by the legacy points-over-curve ratio
    LegacyRatios {
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, value_parser = parse_position)]
        position: Option<Position>,
    },
    /// Corpus counts
    Summary,
}

/// Strict position parser for user input; unknown labels are rejected
fn parse_position(raw: &str) -> std::result::Result<Position, String> {
    Position::parse_known(raw)
        .ok_or_else(|| format!("unknown position '{raw}' (expected QB, RB, WR, TE, K, DST, D/ST or DEF)"))
}

/// CLI handler
pub struct CliHandler {
    service: ValuationService,
    json: bool,
}

impl CliHandler {
    /// Create a handler reading from the configured data directory
    pub fn new(config: ValuationConfig, json: bool) -> Self {
        let store = Arc::new(JsonDirStore::new(&config.store.data_dir));
        Self { service: ValuationService::new(store, config), json }
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::TopPicks { limit, position } => {
                let picks = self.service.top_picks(limit, position).await?;
                self.emit(&picks, || print_picks("Top Picks", &picks))?;
            }
            Commands::WorstPicks { limit, position } => {
                let picks = self.service.worst_picks(limit, position).await?;
                self.emit(&picks, || print_picks("Worst Picks", &picks))?;
            }
            Commands::Owners { limit, position, min_picks } => {
                let rankings = self.service.owner_rankings(limit, position, min_picks).await?;
                self.emit(&rankings, || {
                    print_header("Owner Rankings");
                    for (rank, owner) in rankings.iter().enumerate() {
                        println!(
                            "{:>3}. {:<24} avg {:>8.2}  picks {:>4}  seasons {:>2}",
                            rank + 1,
                            owner.owner_name,
                            owner.avg_value,
                            owner.total_picks,
                            owner.total_seasons
                        );
                    }
                })?;
            }
            Commands::Teams { limit, position, min_picks } => {
                let rankings = self.service.team_rankings(limit, position, min_picks).await?;
                self.emit(&rankings, || {
                    print_header("Team Rankings");
                    for (rank, team) in rankings.iter().enumerate() {
                        println!(
                            "{:>3}. {} {:<24} {:<20} avg {:>8.2}  picks {:>3}",
                            rank + 1,
                            team.year,
                            team.team_name,
                            team.owner_name.as_deref().unwrap_or("-"),
                            team.avg_value,
                            team.total_picks
                        );
                    }
                })?;
            }
            Commands::ByYear => {
                let by_year = self.service.draft_value_by_year().await?;
                self.emit(&by_year, || {
                    print_header("Draft Value by Year");
                    for (year, positions) in &by_year {
                        println!("{}", year);
                        for (position, value) in positions {
                            println!(
                                "  {:<4} picks {:>3}  avg pick {:>6.2}  avg value {:>7.2}",
                                position.as_str(),
                                value.total_picks,
                                value.avg_overall_pick,
                                value.avg_value
                            );
                        }
                    }
                })?;
            }
            Commands::Positions { position } => {
                let averages = match position {
                    Some(position) => vec![self.service.position_average(position).await?],
                    None => self.service.position_averages().await?,
                };
                self.emit(&averages, || {
                    print_header("Position Averages");
                    for avg in &averages {
                        println!(
                            "{:<4} value {:>6.2}  avg round {:>5.2}  picks {:>5}",
                            avg.position.as_str(),
                            avg.avg_value,
                            avg.avg_round,
                            avg.total_picks
                        );
                    }
                })?;
            }
            Commands::MostValuable => {
                let player = self.service.most_valuable_player().await?;
                let nfl_team = self.service.most_valuable_nfl_team().await?;
                let both = serde_json::json!({ "player": player, "nfl_team": nfl_team });
                self.emit(&both, || {
                    print_header("Most Valuable");
                    match &player {
                        Some(p) => println!("Player:   {} ({:.2})", p.player_name, p.total_value),
                        None => println!("Player:   none"),
                    }
                    match &nfl_team {
                        Some(t) => println!("NFL team: {} ({:.2})", t.nfl_team, t.total_value),
                        None => println!("NFL team: none"),
                    }
                })?;
            }
            Commands::MostDrafted => {
                let player = self.service.most_drafted_player().await?;
                let nfl_team = self.service.most_drafted_nfl_team().await?;
                let both = serde_json::json!({ "player": player, "nfl_team": nfl_team });
                self.emit(&both, || {
                    print_header("Most Drafted");
                    match &player {
                        Some(p) => println!("Player:   {} ({} picks)", p.player_name, p.count),
                        None => println!("Player:   none"),
                    }
                    match &nfl_team {
                        Some(t) => println!("NFL team: {} ({} picks)", t.nfl_team, t.count),
                        None => println!("NFL team: none"),
                    }
                })?;
            }
            Commands::Replacement => {
                let levels = self.service.replacement_levels().await?;
                self.emit(&levels, || {
                    print_header("Replacement Levels");
                    for (position, level) in &levels {
                        println!("{:<4} {:>8.2}", position.as_str(), level);
                    }
                })?;
            }
            Commands::ExpectedTable => {
                let table = self.service.expected_value_table().await?;
                self.emit(&table, || {
                    print_header("Expected VOR by Pick");
                    for (position, cells) in &table {
                        println!("{} ({} cells)", position, cells.len());
                        for (pick, value) in cells {
                            println!("  #{:<4} {:>8.2}", pick, value);
                        }
                    }
                })?;
            }
            Commands::PickRanges => {
                let report = self.service.pick_range_performance().await?;
                self.emit(&report, || {
                    print_header("Points by Pick Range");
                    for range in &report.ranges {
                        println!(
                            "{:<8} avg {:>7.2}  min {:>7.2}  max {:>7.2}  picks {:>5}",
                            range.label, range.avg_points, range.min_points, range.max_points, range.count
                        );
                    }
                    println!(
                        "First pick avg {:.2} over {} drafts",
                        report.first_pick.avg_points, report.first_pick.count
                    );
                    println!(
                        "Late picks avg {:.2} over {} picks",
                        report.late_picks.avg_points, report.late_picks.count
                    );
                })?;
            }
            Commands::PositionPerformance => {
                let performance = self.service.position_performance().await?;
                self.emit(&performance, || {
                    print_header("Position Performance");
                    for perf in performance.values() {
                        println!(
                            "{} typical start #{}  peak {:.2}  picks {}",
                            perf.position, perf.typical_draft_start, perf.peak_performance, perf.total_picks
                        );
                        for range in &perf.ranges {
                            println!("  {:<8} avg {:>7.2}  picks {:>4}", range.label, range.avg_points, range.count);
                        }
                    }
                })?;
            }
            Commands::Curves => {
                let curves = self.service.position_curves().await?;
                self.emit(&curves, || {
                    print_header("Position Decay Curves");
                    for (position, curve) in &curves {
                        println!(
                            "{:<4} base {:>7.2}  decay {:.5}  start #{}",
                            position.as_str(),
                            curve.base,
                            curve.decay,
                            curve.draft_start
                        );
                    }
                })?;
            }
            Commands::LegacyRatios { limit, position } => {
                let rows = self.service.legacy_pick_ratios(limit, position).await?;
                self.emit(&rows, || print_legacy_ratios(&rows))?;
            }
            Commands::Summary => {
                let summary = self.service.draft_summary().await?;
                self.emit(&summary, || {
                    print_header("Draft Summary");
                    println!("Picks:          {}", summary.total_picks);
                    println!("Duplicates:     {}", summary.duplicate_picks);
                    println!("Skipped:        {}", summary.skipped_picks);
                    println!("Seasons:        {}", summary.total_seasons);
                    println!("Teams:          {}", summary.total_teams);
                    println!("Owners:         {}", summary.total_owners);
                    println!("Players:        {}", summary.total_players);
                    println!("Roster entries: {}", summary.total_roster_entries);
                })?;
            }
        }
        Ok(())
    }

    /// Print JSON when requested, the text rendering otherwise
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }
}

fn print_header(title: &str) {
    println!("{}", title);
    println!("{}", "=".repeat(50));
}

fn print_picks(title: &str, picks: &[PickValue]) {
    print_header(title);
    if picks.is_empty() {
        println!("No picks found");
        return;
    }
    for pick in picks {
        println!(
            "{} #{:<4} {:<4} {:<24} {:<20} value {:>8.2}  vor {:>8.2}  expected {:>8.2}{}",
            pick.year,
            pick.overall_pick,
            pick.position.as_str(),
            pick.player_name,
            pick.team_name,
            pick.value,
            pick.vor,
            pick.expected_vor,
            if pick.low_confidence { "  (low confidence)" } else { "" }
        );
    }
}

fn print_legacy_ratios(rows: &[LegacyPickRatio]) {
    print_header("Legacy Ratio (points over curve)");
    if rows.is_empty() {
        println!("No picks found");
        return;
    }
    for row in rows {
        println!(
            "{} #{:<4} {:<4} {:<24} ratio {:>6.2}  points {:>7.2}  curve {:>7.2}",
            row.year,
            row.overall_pick,
            row.position.as_str(),
            row.player_name,
            row.ratio,
            row.actual_points,
            row.expected_points
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_picks_with_position() {
        let cli = Cli::try_parse_from(["draft-valuation-cli", "--json", "top-picks", "-l", "5", "-p", "wr"]).unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::TopPicks { limit, position } => {
                assert_eq!(limit, Some(5));
                assert_eq!(position, Some(Position::WR));
            }
            _ => panic!("expected top-picks"),
        }
    }

    #[test]
    fn test_parse_owners_defaults() {
        let cli = Cli::try_parse_from(["draft-valuation-cli", "-d", "/tmp/league", "owners"]).unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/league")));
        assert!(matches!(cli.command, Commands::Owners { limit: None, position: None, min_picks: None }));
    }

    #[test]
    fn test_position_flag_rejects_unknown_labels() {
        assert!(Cli::try_parse_from(["draft-valuation-cli", "top-picks", "-p", "qbb"]).is_err());
        assert!(Cli::try_parse_from(["draft-valuation-cli", "teams", "--position", ""]).is_err());

        let cli = Cli::try_parse_from(["draft-valuation-cli", "worst-picks", "-p", "D/ST"]).unwrap();
        assert!(matches!(cli.command, Commands::WorstPicks { position: Some(Position::DST), .. }));
    }

    #[test]
    fn test_parse_teams_and_by_year() {
        let cli = Cli::try_parse_from(["draft-valuation-cli", "teams", "-m", "12", "-p", "te"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Teams { limit: None, position: Some(Position::TE), min_picks: Some(12) }
        ));

        let cli = Cli::try_parse_from(["draft-valuation-cli", "by-year"]).unwrap();
        assert!(matches!(cli.command, Commands::ByYear));
    }

    #[tokio::test]
    async fn test_summary_on_empty_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ValuationConfig::default();
        config.store.data_dir = dir.path().to_path_buf();

        let handler = CliHandler::new(config, true);
        handler.handle_command(Commands::Summary).await.unwrap();
    }
}
