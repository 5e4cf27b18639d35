use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use jbrief::{
    cache::{CacheKey, CacheOperation},
    games::{TrendPoint, WinnerRecord},
    AppError, GameSelector,
};

mod utils;

use utils::*;

fn totals_for(points: &[TrendPoint], contestant_id: i64) -> Vec<(i64, i64)> {
    points
        .iter()
        .filter(|p| p.contestant_id == contestant_id)
        .map(|p| (p.clue_order_number, p.running_total))
        .collect()
}

#[tokio::test]
async fn test_reference_game_winner_and_trend() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store).build();

    let winners = setup.dashboard.winners().await.unwrap();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].date, jan(1));
    assert_eq!(winners[0].final_amount, 400);
    assert!(winners[0].graph_text.starts_with("Bob Baker"));

    let points = setup
        .dashboard
        .trend(GameSelector::Date(jan(1)))
        .await
        .unwrap();
    assert_eq!(totals_for(&points, 1), vec![(1, 200), (3, 0)]);
    assert_eq!(totals_for(&points, 2), vec![(2, 400)]);
}

#[tokio::test]
async fn test_question_info_renders_flag_as_text() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store).build();

    let info = setup
        .dashboard
        .question_info(GameSelector::Date(jan(1)), 3)
        .await
        .unwrap();

    assert_eq!(info.len(), 1);
    assert_eq!(info[0].clue_order_number, 3);
    assert_eq!(info[0].daily_double, "TRUE");
    assert_eq!(info[0].contestant, "Alice Able");
    assert_eq!(info[0].dollars_won, -200);

    let json = serde_json::to_value(&info[0]).unwrap();
    assert!(json["Daily Double"].is_string());
}

#[tokio::test]
async fn test_latest_games_with_fewer_than_ten() {
    let store = StoreBuilder::new()
        .game(1, jan(3), &[])
        .await
        .game(2, jan(1), &[])
        .await
        .game(3, jan(2), &[])
        .await
        .build();
    let setup = TestSetupBuilder::new(store).build();

    let games = setup.dashboard.latest_games().await.unwrap();
    let dates: Vec<_> = games.iter().map(|g| g.date).collect();
    assert_eq!(dates, vec![jan(3), jan(2), jan(1)]);
}

#[tokio::test]
async fn test_latest_games_caps_at_ten() {
    let mut builder = StoreBuilder::new();
    for day in 1..=14 {
        builder = builder.game(day as i64, jan(day), &[]).await;
    }
    let setup = TestSetupBuilder::new(builder.build()).build();

    let games = setup.dashboard.latest_games().await.unwrap();
    assert_eq!(games.len(), 10);
    assert_eq!(games.first().unwrap().date, jan(14));
    assert_eq!(games.last().unwrap().date, jan(5));
}

#[tokio::test]
async fn test_same_key_reads_store_once() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store).build();

    let first = setup.dashboard.winners().await.unwrap();
    let second = setup.dashboard.winners().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(CountingRepository::count(&setup.repository.final_scores_calls), 1);
    assert_eq!(CountingRepository::count(&setup.repository.latest_games_calls), 1);
}

#[tokio::test]
async fn test_different_dates_compute_independently() {
    let store = StoreBuilder::new()
        .reference_game()
        .await
        .game(101, jan(2), &[(1, 1, 1000), (2, 2, 200)])
        .await
        .build();
    let setup = TestSetupBuilder::new(store).build();

    setup.dashboard.trend(GameSelector::Date(jan(1))).await.unwrap();
    setup.dashboard.trend(GameSelector::Date(jan(2))).await.unwrap();
    setup.dashboard.trend(GameSelector::Date(jan(1))).await.unwrap();

    assert_eq!(CountingRepository::count(&setup.repository.events_calls), 2);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_computation() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store)
        .slow_store(Duration::from_millis(25))
        .build();

    let calls: Vec<_> = (0..10)
        .map(|_| {
            let dashboard = setup.dashboard.clone();
            tokio::spawn(async move { dashboard.trend(GameSelector::Game(100)).await })
        })
        .collect();

    let results = futures::future::join_all(calls).await;
    let first = results[0].as_ref().unwrap().as_ref().unwrap().clone();
    for result in results {
        assert_eq!(result.unwrap().unwrap(), first);
    }

    assert_eq!(CountingRepository::count(&setup.repository.events_calls), 1);
    assert_eq!(setup.dashboard.cache_stats().computations, 1);
}

#[tokio::test]
async fn test_new_day_is_not_masked_by_yesterdays_entry() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store.clone()).today(jan(1)).build();

    assert_eq!(setup.dashboard.winners().await.unwrap().len(), 1);

    // A new game lands overnight
    store.add_contestant(jbrief::games::Contestant {
        contestant_id: 3,
        first_name: "Cara".into(),
        last_name: "Cole".into(),
        hometown: "Hometown".into(),
        occupation: "occupation".into(),
    })
    .await;
    store.add_game(102, jan(2)).await;
    store.add_event(102, 3, 1, 800).await;

    assert_eq!(setup.dashboard.winners().await.unwrap().len(), 1);

    setup.clock.advance(TimeDelta::days(1));
    let winners = setup.dashboard.winners().await.unwrap();
    assert_eq!(winners.len(), 2);
    assert_eq!(winners[1].date, jan(2));
    assert_eq!(CountingRepository::count(&setup.repository.final_scores_calls), 2);
}

#[tokio::test]
async fn test_tie_break_is_deterministic() {
    let mut picked: Vec<Vec<WinnerRecord>> = Vec::new();
    for _ in 0..5 {
        let store = StoreBuilder::new()
            .contestant(7, "Seven", "Tied")
            .await
            .contestant(3, "Three", "Tied")
            .await
            .contestant(5, "Five", "Tied")
            .await
            .game(1, jan(1), &[(7, 1, 600), (5, 2, 200), (3, 3, 600), (5, 4, 400)])
            .await
            .build();
        let setup = TestSetupBuilder::new(store).build();
        picked.push(setup.dashboard.winners().await.unwrap());
    }

    assert!(picked[0][0].graph_text.starts_with("Three Tied"));
    assert!(picked.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_last_trend_point_matches_winner_total() {
    let store = StoreBuilder::new()
        .contestant(1, "Ann", "One")
        .await
        .contestant(2, "Bo", "Two")
        .await
        .game(
            1,
            jan(1),
            &[(1, 1, 400), (2, 2, 800), (2, 3, -1200), (1, 4, 2000), (2, 5, 1600)],
        )
        .await
        .build();
    let setup = TestSetupBuilder::new(store).build();

    let winners = setup.dashboard.winners().await.unwrap();
    let points = setup.dashboard.trend(GameSelector::Game(1)).await.unwrap();

    let last_per_contestant: Vec<i64> = [1, 2]
        .iter()
        .map(|id| totals_for(&points, *id).last().unwrap().1)
        .collect();
    assert_eq!(last_per_contestant, vec![2400, 1200]);
    assert_eq!(winners[0].final_amount, *last_per_contestant.iter().max().unwrap());
}

#[tokio::test]
async fn test_store_outage_surfaces_and_is_not_cached() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store).build();

    setup.store.set_available(false);
    let result = setup.dashboard.winners().await;
    assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    assert!(setup.cache.is_empty().await);

    setup.store.set_available(true);
    assert_eq!(setup.dashboard.winners().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_selection_is_not_found() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store).build();

    let by_date = setup.dashboard.trend(GameSelector::Date(jan(20))).await;
    let by_id = setup.dashboard.question_info(GameSelector::Game(999), 1).await;

    assert!(matches!(by_date, Err(AppError::NotFound(_))));
    assert!(matches!(by_id, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_entries_expire_after_ttl() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store)
        .ttl(Duration::from_millis(30))
        .build();

    setup.dashboard.trend(GameSelector::Game(100)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    setup.dashboard.trend(GameSelector::Game(100)).await.unwrap();

    assert_eq!(CountingRepository::count(&setup.repository.events_calls), 2);
}

#[tokio::test]
async fn test_malformed_key_fails_without_touching_cache() {
    let store = StoreBuilder::new().reference_game().await.build();
    let setup = TestSetupBuilder::new(store).build();
    let memoizer = jbrief::Memoizer::new(setup.cache.clone(), setup.clock.clone(), None);

    let key = CacheKey::new(CacheOperation::Winners, "id-100");
    let dashboard = Arc::clone(&setup.dashboard);
    let result = memoizer
        .get_or_compute(&key, CacheOperation::Winners, || async move {
            dashboard.winners().await
        })
        .await;

    assert!(matches!(result, Err(AppError::MalformedCacheKey(_))));
    assert!(setup.cache.is_empty().await);
    assert_eq!(CountingRepository::count(&setup.repository.final_scores_calls), 0);
}
