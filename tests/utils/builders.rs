use std::sync::Arc;

use chrono::NaiveDate;
use jbrief::games::{Clue, Contestant, InMemoryGameRepository};

pub fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

// ============================================================================
// Store Seeding Utilities
// ============================================================================

pub struct StoreBuilder {
    repo: Arc<InMemoryGameRepository>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            repo: Arc::new(InMemoryGameRepository::new()),
        }
    }

    pub async fn contestant(self, id: i64, first: &str, last: &str) -> Self {
        self.repo
            .add_contestant(Contestant {
                contestant_id: id,
                first_name: first.to_string(),
                last_name: last.to_string(),
                hometown: "Hometown".to_string(),
                occupation: "occupation".to_string(),
            })
            .await;
        self
    }

    /// A game on `date` with `(contestant, clue, delta)` events
    pub async fn game(self, game_id: i64, date: NaiveDate, events: &[(i64, i64, i64)]) -> Self {
        self.repo.add_game(game_id, date).await;
        for &(contestant_id, clue, delta) in events {
            self.repo.add_event(game_id, contestant_id, clue, delta).await;
        }
        self
    }

    pub async fn clue(self, game_id: i64, clue_order_number: i64, is_daily_double: bool) -> Self {
        self.repo
            .add_clue(Clue {
                question_id: game_id * 1000 + clue_order_number,
                game_id,
                clue_order_number,
                text: format!("Clue {} of game {}", clue_order_number, game_id),
                answer: format!("Answer {}", clue_order_number),
                is_daily_double,
            })
            .await;
        self
    }

    /// The two-contestant game from the reference scenario:
    /// A +200 on clue 1, B +400 on clue 2, A -200 on clue 3
    pub async fn reference_game(self) -> Self {
        self.contestant(1, "Alice", "Able")
            .await
            .contestant(2, "Bob", "Baker")
            .await
            .game(100, jan(1), &[(1, 1, 200), (2, 2, 400), (1, 3, -200)])
            .await
            .clue(100, 3, true)
            .await
    }

    pub fn build(self) -> Arc<InMemoryGameRepository> {
        self.repo
    }
}
