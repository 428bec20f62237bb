//! End-to-end valuation scenarios through the public service API

use draft_valuation::config::ReplacementThresholds;
use draft_valuation::expected_value::ExpectationBasis;
use draft_valuation::types::*;
use draft_valuation::{Corpus, DraftAnalytics, InMemoryStore, ValuationConfig, ValuationService};
use std::sync::Arc;

/// One WR drafted at overall picks 1..=4 in each season, scored with the
/// given season totals
fn wr_league(season_points: &[[f64; 4]]) -> Corpus {
    let mut corpus = Corpus {
        owners: vec![Owner { id: 1, display_name: "Jordan".to_string() }],
        ..Default::default()
    };

    for (s, points) in season_points.iter().enumerate() {
        let season_id = s as u32 + 1;
        corpus.seasons.push(Season { id: season_id, year: 2020 + season_id, league_id: None });
        corpus.teams.push(Team {
            id: season_id * 100,
            season_id,
            owner_id: 1,
            name: format!("Jordan {}", 2020 + season_id),
            final_standing: None,
        });

        for (i, pts) in points.iter().enumerate() {
            let player_id = season_id * 10 + i as u32;
            let overall_pick = i as u32 + 1;
            corpus.players.push(Player {
                id: player_id,
                name: format!("Receiver {player_id}"),
                position: "WR".to_string(),
                nfl_team: None,
            });
            corpus.draft_picks.push(DraftPick {
                season_id,
                team_id: season_id * 100,
                player_id,
                round: 1,
                pick: overall_pick,
                overall_pick,
            });
            corpus.roster_entries.push(RosterEntry {
                team_id: season_id * 100,
                player_id,
                season_id,
                week: None,
                points: *pts,
            });
        }
    }
    corpus
}

fn threshold_two() -> ValuationConfig {
    let mut config = ValuationConfig::default();
    config.replacement = ReplacementThresholds::uniform(2);
    config
}

fn service(corpus: Corpus, config: ValuationConfig) -> ValuationService {
    ValuationService::new(Arc::new(InMemoryStore::new(corpus)), config)
}

#[tokio::test]
async fn test_single_season_replacement_level() {
    let service = service(wr_league(&[[100.0, 80.0, 50.0, 10.0]]), threshold_two());

    let levels = service.replacement_levels().await.unwrap();

    assert_eq!(levels[&Position::WR], 65.0);
    for position in [Position::QB, Position::RB, Position::TE, Position::K, Position::DST] {
        assert_eq!(levels[&position], 0.0);
    }
}

#[tokio::test]
async fn test_replacement_level_is_cross_season_mean() {
    // second season sample is avg(90, 70) = 80
    let service = service(
        wr_league(&[[100.0, 80.0, 50.0, 10.0], [130.0, 90.0, 70.0, 5.0]]),
        threshold_two(),
    );

    let levels = service.replacement_levels().await.unwrap();
    assert_eq!(levels[&Position::WR], 72.5);

    // pick 1 VOR was 27.5 and 57.5
    let table = service.expected_value_table().await.unwrap();
    assert_eq!(table[&Position::WR][&1], 42.5);
    assert_eq!(table[&Position::WR].len(), 4);
}

#[tokio::test]
async fn test_pick_on_expectation_stays_zero_after_calibration() {
    let mut corpus = wr_league(&[[100.0, 80.0, 50.0, 10.0], [130.0, 90.0, 70.0, 5.0]]);
    // a third-season pick at an unused slot that matches its own cell exactly
    corpus.seasons.push(Season { id: 3, year: 2023, league_id: None });
    corpus.teams.push(Team { id: 300, season_id: 3, owner_id: 1, name: "Jordan 2023".to_string(), final_standing: None });
    corpus.players.push(Player { id: 99, name: "Lone Receiver".to_string(), position: "WR".to_string(), nfl_team: None });
    corpus.draft_picks.push(DraftPick { season_id: 3, team_id: 300, player_id: 99, round: 3, pick: 1, overall_pick: 30 });
    corpus.roster_entries.push(RosterEntry { team_id: 300, player_id: 99, season_id: 3, week: None, points: 40.0 });

    let service = service(corpus, threshold_two());
    let picks = service.top_picks(Some(100), None).await.unwrap();

    let lone = picks.iter().find(|p| p.player_id == 99).unwrap();
    assert_eq!(lone.vor, lone.expected_vor);
    assert_eq!(lone.value, 0.0);
    // one observation at pick 30
    assert!(lone.low_confidence);
    assert!(picks.iter().any(|p| p.value != 0.0));

    // picks 1..=4 were made in both earlier seasons
    assert!(picks.iter().filter(|p| p.player_id != 99).all(|p| !p.low_confidence));
}

#[tokio::test]
async fn test_duplicate_rows_do_not_change_rankings() {
    let clean = wr_league(&[[100.0, 80.0, 50.0, 10.0], [130.0, 90.0, 70.0, 5.0]]);
    let mut noisy = clean.clone();
    noisy.draft_picks.extend(clean.draft_picks.iter().take(3).cloned());
    noisy.draft_picks.push(clean.draft_picks[0].clone());

    let clean_service = service(clean, threshold_two());
    let noisy_service = service(noisy, threshold_two());

    assert_eq!(
        clean_service.top_picks(Some(10), None).await.unwrap(),
        noisy_service.top_picks(Some(10), None).await.unwrap()
    );
    assert_eq!(
        clean_service.worst_picks(Some(10), None).await.unwrap(),
        noisy_service.worst_picks(Some(10), None).await.unwrap()
    );
    assert_eq!(noisy_service.draft_summary().await.unwrap().duplicate_picks, 4);
}

#[tokio::test]
async fn test_ranking_order_ignores_point_scale() {
    let base = [[100.0, 80.0, 50.0, 10.0], [130.0, 90.0, 70.0, 5.0]];
    let scaled: Vec<[f64; 4]> = base.iter().map(|season| season.map(|p| p * 4.0)).collect();

    let base_service = service(wr_league(&base), threshold_two());
    let scaled_service = service(wr_league(&scaled), threshold_two());

    let order = |picks: Vec<draft_valuation::ranking::PickValue>| -> Vec<(u32, u32)> {
        picks.iter().map(|p| (p.season_id, p.overall_pick)).collect()
    };

    let base_top = base_service.top_picks(Some(8), None).await.unwrap();
    let scaled_top = scaled_service.top_picks(Some(8), None).await.unwrap();
    assert_eq!(order(base_top.clone()), order(scaled_top.clone()));
    for (a, b) in base_top.iter().zip(&scaled_top) {
        assert_eq!(a.value, b.value);
    }

    assert_eq!(
        order(base_service.worst_picks(Some(8), None).await.unwrap()),
        order(scaled_service.worst_picks(Some(8), None).await.unwrap())
    );
}

#[tokio::test]
async fn test_owner_min_picks_cutoff() {
    let mut corpus = wr_league(&[[100.0, 80.0, 50.0, 10.0]]);
    // second owner holds exactly three of the four picks
    corpus.owners.push(Owner { id: 2, display_name: "Casey".to_string() });
    corpus.teams.push(Team { id: 200, season_id: 1, owner_id: 2, name: "Casey 2021".to_string(), final_standing: None });
    for pick in corpus.draft_picks.iter_mut().skip(1) {
        pick.team_id = 200;
    }

    let service = service(corpus, threshold_two());

    let excluded = service.owner_rankings(None, None, Some(4)).await.unwrap();
    assert!(excluded.is_empty());

    let included = service.owner_rankings(None, None, Some(3)).await.unwrap();
    assert_eq!(included.len(), 1);
    assert_eq!(included[0].owner_name, "Casey");
    assert_eq!(included[0].total_picks, 3);

    let both = service.owner_rankings(None, None, Some(1)).await.unwrap();
    assert_eq!(both.len(), 2);
}

#[test]
fn test_window_fallback_through_analytics() {
    let corpus = wr_league(&[[100.0, 80.0, 50.0, 10.0]]);
    let config = threshold_two();
    let analytics = DraftAnalytics::new(&corpus, &config);
    let table = &analytics.context().expected;

    // picks 1..=4 are populated; pick 6 sees 1..=4 within five picks
    let fallback = table.lookup(Position::WR, 6);
    assert_eq!(fallback.basis, ExpectationBasis::Window { cells: 4 });
    assert_eq!(fallback.value, (35.0 + 15.0 - 15.0 - 55.0) / 4.0);

    let exact = table.lookup(Position::WR, 2);
    assert_eq!(exact.value, 15.0);
    assert_eq!(exact.basis, ExpectationBasis::Exact { samples: 1 });

    assert_eq!(table.lookup(Position::WR, 10).basis, ExpectationBasis::NoData);
}
