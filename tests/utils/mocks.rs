use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use jbrief::games::{
    Clue, ClueEvent, Contestant, ContestantId, ContestantTotal, GameDate, GameId, GameRepository,
    InMemoryGameRepository,
};
use jbrief::AppError;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Wraps the in-memory store, counting calls per query and optionally slowing them down
pub struct CountingRepository {
    inner: Arc<InMemoryGameRepository>,
    delay: Duration,
    pub latest_games_calls: AtomicUsize,
    pub final_scores_calls: AtomicUsize,
    pub events_calls: AtomicUsize,
    pub clues_calls: AtomicUsize,
    pub contestant_calls: AtomicUsize,
}

impl CountingRepository {
    pub fn new(inner: Arc<InMemoryGameRepository>) -> Self {
        Self {
            inner,
            delay: Duration::ZERO,
            latest_games_calls: AtomicUsize::new(0),
            final_scores_calls: AtomicUsize::new(0),
            events_calls: AtomicUsize::new(0),
            clues_calls: AtomicUsize::new(0),
            contestant_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn tick(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl GameRepository for CountingRepository {
    async fn latest_games(&self, limit: i64) -> Result<Vec<GameDate>, AppError> {
        self.tick(&self.latest_games_calls).await;
        self.inner.latest_games(limit).await
    }

    async fn game_for_date(&self, date: NaiveDate) -> Result<GameDate, AppError> {
        self.inner.game_for_date(date).await
    }

    async fn game_by_id(&self, game_id: GameId) -> Result<GameDate, AppError> {
        self.inner.game_by_id(game_id).await
    }

    async fn events_for_game(&self, game_id: GameId) -> Result<Vec<ClueEvent>, AppError> {
        self.tick(&self.events_calls).await;
        self.inner.events_for_game(game_id).await
    }

    async fn clues_for_game(&self, game_id: GameId) -> Result<Vec<Clue>, AppError> {
        self.tick(&self.clues_calls).await;
        self.inner.clues_for_game(game_id).await
    }

    async fn contestants_by_ids(
        &self,
        ids: &BTreeSet<ContestantId>,
    ) -> Result<Vec<Contestant>, AppError> {
        self.tick(&self.contestant_calls).await;
        self.inner.contestants_by_ids(ids).await
    }

    async fn final_scores(&self, game_ids: &[GameId]) -> Result<Vec<ContestantTotal>, AppError> {
        self.tick(&self.final_scores_calls).await;
        self.inner.final_scores(game_ids).await
    }
}
