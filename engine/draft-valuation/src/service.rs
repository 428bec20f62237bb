//! # Draft Valuation Service
//!
//! Async entry point for every query. Each call reloads the corpus from the
//! record store and recomputes all derived state, so results always reflect
//! the store at call time.

use crate::config::ValuationConfig;
use crate::curve::DecayCurve;
use crate::error::Result;
use crate::ranges::{PickRangeReport, PositionPerformance};
use crate::ranking::*;
use crate::store::{Corpus, RecordStore};
use crate::types::Position;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Draft valuation queries over a record store
pub struct ValuationService {
    store: Arc<dyn RecordStore>,
    config: ValuationConfig,
}

impl ValuationService {
    pub fn new(store: Arc<dyn RecordStore>, config: ValuationConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Load a fresh snapshot of the corpus
    pub async fn snapshot(&self) -> Result<Corpus> {
        Corpus::load(self.store.as_ref()).await
    }

    fn limit_or_default(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.config.ranking.default_limit)
    }

    pub async fn top_picks(&self, limit: Option<usize>, position: Option<Position>) -> Result<Vec<PickValue>> {
        let limit = self.limit_or_default(limit);
        info!("Ranking top {} picks (position: {:?})", limit, position);
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).top_picks(limit, position))
    }

    pub async fn worst_picks(&self, limit: Option<usize>, position: Option<Position>) -> Result<Vec<PickValue>> {
        let limit = self.limit_or_default(limit);
        info!("Ranking worst {} picks (position: {:?})", limit, position);
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).worst_picks(limit, position))
    }

    pub async fn owner_rankings(
        &self,
        limit: Option<usize>,
        position: Option<Position>,
        min_picks: Option<usize>,
    ) -> Result<Vec<OwnerRanking>> {
        let limit = self.limit_or_default(limit);
        info!(
            "Ranking {} owners (position: {:?}, min picks: {})",
            limit,
            position,
            min_picks.unwrap_or(self.config.ranking.min_picks)
        );
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).owner_rankings(limit, position, min_picks))
    }

    pub async fn team_rankings(
        &self,
        limit: Option<usize>,
        position: Option<Position>,
        min_picks: Option<usize>,
    ) -> Result<Vec<TeamRanking>> {
        let limit = self.limit_or_default(limit);
        info!(
            "Ranking {} teams (position: {:?}, min picks: {})",
            limit,
            position,
            min_picks.unwrap_or(self.config.ranking.team_min_picks)
        );
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).team_rankings(limit, position, min_picks))
    }

    pub async fn draft_value_by_year(&self) -> Result<BTreeMap<u32, BTreeMap<Position, YearPositionValue>>> {
        info!("Computing draft value by year and position");
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).draft_value_by_year())
    }

    pub async fn position_average(&self, position: Position) -> Result<PositionAverage> {
        info!("Computing position average for {}", position);
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).position_average(position))
    }

    pub async fn position_averages(&self) -> Result<Vec<PositionAverage>> {
        info!("Computing position averages");
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).position_averages())
    }

    pub async fn most_valuable_player(&self) -> Result<Option<PlayerTotal>> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).most_valuable_player())
    }

    pub async fn most_valuable_nfl_team(&self) -> Result<Option<NflTeamTotal>> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).most_valuable_nfl_team())
    }

    pub async fn most_drafted_player(&self) -> Result<Option<PlayerCount>> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).most_drafted_player())
    }

    pub async fn most_drafted_nfl_team(&self) -> Result<Option<NflTeamCount>> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).most_drafted_nfl_team())
    }

    pub async fn replacement_levels(&self) -> Result<BTreeMap<Position, f64>> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).replacement_levels())
    }

    pub async fn expected_value_table(&self) -> Result<BTreeMap<Position, BTreeMap<u32, f64>>> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).expected_value_table())
    }

    pub async fn draft_summary(&self) -> Result<DraftSummary> {
        let corpus = self.snapshot().await?;
        let summary = DraftAnalytics::new(&corpus, &self.config).draft_summary();
        info!(
            "Draft summary: {} picks ({} duplicates, {} skipped) over {} seasons",
            summary.total_picks, summary.duplicate_picks, summary.skipped_picks, summary.total_seasons
        );
        Ok(summary)
    }

    pub async fn pick_range_performance(&self) -> Result<PickRangeReport> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).pick_range_performance())
    }

    pub async fn position_performance(&self) -> Result<BTreeMap<Position, PositionPerformance>> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).position_performance())
    }

    pub async fn position_curves(&self) -> Result<BTreeMap<Position, DecayCurve>> {
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).position_curves())
    }

    pub async fn legacy_pick_ratios(
        &self,
        limit: Option<usize>,
        position: Option<Position>,
    ) -> Result<Vec<LegacyPickRatio>> {
        let limit = self.limit_or_default(limit);
        info!("Ranking {} picks by legacy ratio (position: {:?})", limit, position);
        let corpus = self.snapshot().await?;
        Ok(DraftAnalytics::new(&corpus, &self.config).legacy_pick_ratios(limit, position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValuationError;
    use crate::store::InMemoryStore;
    use crate::types::*;

    struct FailingStore;

    #[async_trait::async_trait]
    impl RecordStore for FailingStore {
        async fn draft_picks(&self) -> Result<Vec<DraftPick>> {
            Err(ValuationError::store("draft picks unavailable"))
        }

        async fn players(&self) -> Result<Vec<Player>> {
            Ok(Vec::new())
        }

        async fn roster_entries(&self) -> Result<Vec<RosterEntry>> {
            Ok(Vec::new())
        }

        async fn teams(&self) -> Result<Vec<Team>> {
            Ok(Vec::new())
        }

        async fn seasons(&self) -> Result<Vec<Season>> {
            Ok(Vec::new())
        }

        async fn owners(&self) -> Result<Vec<Owner>> {
            Ok(Vec::new())
        }
    }

    fn two_pick_corpus() -> Corpus {
        Corpus {
            seasons: vec![Season { id: 1, year: 2022, league_id: None }],
            owners: vec![Owner { id: 1, display_name: "Alex".to_string() }],
            teams: vec![Team { id: 1, season_id: 1, owner_id: 1, name: "Gridiron".to_string(), final_standing: None }],
            players: vec![
                Player { id: 1, name: "Josh Allen".to_string(), position: "QB".to_string(), nfl_team: Some("BUF".to_string()) },
                Player { id: 2, name: "Travis Kelce".to_string(), position: "TE".to_string(), nfl_team: Some("KC".to_string()) },
            ],
            draft_picks: vec![
                DraftPick { season_id: 1, team_id: 1, player_id: 1, round: 1, pick: 1, overall_pick: 1 },
                DraftPick { season_id: 1, team_id: 1, player_id: 2, round: 2, pick: 1, overall_pick: 2 },
            ],
            roster_entries: vec![
                RosterEntry { team_id: 1, player_id: 1, season_id: 1, week: Some(1), points: 30.0 },
                RosterEntry { team_id: 1, player_id: 1, season_id: 1, week: Some(2), points: 25.5 },
                RosterEntry { team_id: 1, player_id: 2, season_id: 1, week: Some(1), points: 12.0 },
            ],
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let service = ValuationService::new(Arc::new(FailingStore), ValuationConfig::default());

        let result = service.top_picks(None, None).await;
        assert!(matches!(result, Err(ValuationError::Store(_))));
    }

    #[tokio::test]
    async fn test_queries_against_in_memory_store() {
        let store = Arc::new(InMemoryStore::new(two_pick_corpus()));
        let service = ValuationService::new(store, ValuationConfig::default());

        let top = service.top_picks(Some(5), None).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].player_name, "Josh Allen");
        assert_eq!(top[0].actual_points, 55.5);

        let qbs = service.top_picks(None, Some(Position::QB)).await.unwrap();
        assert_eq!(qbs.len(), 1);

        let summary = service.draft_summary().await.unwrap();
        assert_eq!(summary.total_picks, 2);
        assert_eq!(summary.total_roster_entries, 3);

        let drafted = service.most_drafted_nfl_team().await.unwrap().unwrap();
        assert_eq!(drafted.nfl_team, "BUF");

        let averages = service.position_averages().await.unwrap();
        assert_eq!(averages.len(), 6);

        let teams = service.team_rankings(None, None, None).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team_name, "Gridiron");
        assert_eq!(teams[0].total_picks, 2);

        let by_year = service.draft_value_by_year().await.unwrap();
        assert_eq!(by_year[&2022][&Position::QB].total_picks, 1);
        assert_eq!(by_year[&2022][&Position::TE].avg_overall_pick, 2.0);
    }

    #[tokio::test]
    async fn test_owner_rankings_use_configured_min_picks() {
        let store = Arc::new(InMemoryStore::new(two_pick_corpus()));
        let mut config = ValuationConfig::default();
        config.ranking.min_picks = 3;
        let service = ValuationService::new(store, config);

        assert!(service.owner_rankings(None, None, None).await.unwrap().is_empty());

        let rankings = service.owner_rankings(None, None, Some(2)).await.unwrap();
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].owner_name, "Alex");
        assert_eq!(rankings[0].total_picks, 2);
        assert_eq!(rankings[0].total_seasons, 1);
    }
}
