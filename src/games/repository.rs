use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{Clue, ClueEvent, Contestant, ContestantId, ContestantTotal, GameDate, GameId};
use super::winners::contestant_totals;
use crate::shared::AppError;

/// Read-only access to the games store
#[async_trait]
pub trait GameRepository: Send + Sync {
    /// Most recent games, newest first
    async fn latest_games(&self, limit: i64) -> Result<Vec<GameDate>, AppError>;
    async fn game_for_date(&self, date: NaiveDate) -> Result<GameDate, AppError>;
    async fn game_by_id(&self, game_id: GameId) -> Result<GameDate, AppError>;
    /// Scoring events of one game ordered by clue order number
    async fn events_for_game(&self, game_id: GameId) -> Result<Vec<ClueEvent>, AppError>;
    async fn clues_for_game(&self, game_id: GameId) -> Result<Vec<Clue>, AppError>;
    async fn contestants_by_ids(
        &self,
        ids: &BTreeSet<ContestantId>,
    ) -> Result<Vec<Contestant>, AppError>;
    /// Sum of score deltas per (game, contestant) for the given games
    async fn final_scores(&self, game_ids: &[GameId]) -> Result<Vec<ContestantTotal>, AppError>;
}

#[derive(Debug, Default)]
struct GameTables {
    dates: Vec<GameDate>,
    events: Vec<ClueEvent>,
    clues: Vec<Clue>,
    contestants: HashMap<ContestantId, Contestant>,
}

/// In-memory implementation of GameRepository for development and testing
///
/// Counts every query it answers so callers can assert how often the store was hit,
/// and can be switched offline to simulate an unreachable store.
#[derive(Debug)]
pub struct InMemoryGameRepository {
    tables: RwLock<GameTables>,
    queries: AtomicUsize,
    available: AtomicBool,
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(GameTables::default()),
            queries: AtomicUsize::new(0),
            available: AtomicBool::new(true),
        }
    }

    pub async fn add_game(&self, game_id: GameId, date: NaiveDate) {
        self.tables.write().await.dates.push(GameDate { game_id, date });
    }

    pub async fn add_event(
        &self,
        game_id: GameId,
        contestant_id: ContestantId,
        clue_order_number: i64,
        change_in_value: i64,
    ) {
        self.tables.write().await.events.push(ClueEvent {
            game_id,
            contestant_id,
            clue_order_number,
            change_in_value,
        });
    }

    pub async fn add_clue(&self, clue: Clue) {
        self.tables.write().await.clues.push(clue);
    }

    pub async fn add_contestant(&self, contestant: Contestant) {
        self.tables
            .write()
            .await
            .contestants
            .insert(contestant.contestant_id, contestant);
    }

    /// Number of queries answered so far
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn begin_query(&self) -> Result<(), AppError> {
        if !self.available.load(Ordering::SeqCst) {
            warn!("In-memory store is offline");
            return Err(AppError::StoreUnavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    #[instrument(skip(self))]
    async fn latest_games(&self, limit: i64) -> Result<Vec<GameDate>, AppError> {
        self.begin_query()?;
        let tables = self.tables.read().await;

        let mut games = tables.dates.clone();
        games.sort_by(|a, b| b.date.cmp(&a.date));
        games.truncate(limit.max(0) as usize);

        debug!(count = games.len(), "Latest games read from memory");
        Ok(games)
    }

    #[instrument(skip(self))]
    async fn game_for_date(&self, date: NaiveDate) -> Result<GameDate, AppError> {
        self.begin_query()?;
        let tables = self.tables.read().await;

        tables
            .dates
            .iter()
            .find(|game| game.date == date)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No game on {}", date)))
    }

    #[instrument(skip(self))]
    async fn game_by_id(&self, game_id: GameId) -> Result<GameDate, AppError> {
        self.begin_query()?;
        let tables = self.tables.read().await;

        tables
            .dates
            .iter()
            .find(|game| game.game_id == game_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No game with id {}", game_id)))
    }

    #[instrument(skip(self))]
    async fn events_for_game(&self, game_id: GameId) -> Result<Vec<ClueEvent>, AppError> {
        self.begin_query()?;
        let tables = self.tables.read().await;

        let mut events: Vec<ClueEvent> = tables
            .events
            .iter()
            .filter(|event| event.game_id == game_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.clue_order_number);
        Ok(events)
    }

    #[instrument(skip(self))]
    async fn clues_for_game(&self, game_id: GameId) -> Result<Vec<Clue>, AppError> {
        self.begin_query()?;
        let tables = self.tables.read().await;

        Ok(tables
            .clues
            .iter()
            .filter(|clue| clue.game_id == game_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn contestants_by_ids(
        &self,
        ids: &BTreeSet<ContestantId>,
    ) -> Result<Vec<Contestant>, AppError> {
        self.begin_query()?;
        let tables = self.tables.read().await;

        Ok(ids
            .iter()
            .filter_map(|id| tables.contestants.get(id).cloned())
            .collect())
    }

    #[instrument(skip(self))]
    async fn final_scores(&self, game_ids: &[GameId]) -> Result<Vec<ContestantTotal>, AppError> {
        self.begin_query()?;
        let tables = self.tables.read().await;

        let events: Vec<ClueEvent> = tables
            .events
            .iter()
            .filter(|event| game_ids.contains(&event.game_id))
            .cloned()
            .collect();
        Ok(contestant_totals(&events))
    }
}

/// PostgreSQL implementation of the games store. All parameters are bound.
pub struct PostgresGameRepository {
    pool: PgPool,
}

impl PostgresGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_error(query: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, query, "Games store query failed");
        AppError::from(e)
    }
}

#[async_trait]
impl GameRepository for PostgresGameRepository {
    #[instrument(skip(self))]
    async fn latest_games(&self, limit: i64) -> Result<Vec<GameDate>, AppError> {
        let games = sqlx::query_as::<_, GameDate>(
            "SELECT game_id::BIGINT AS game_id, date FROM date ORDER BY date DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("latest_games"))?;

        debug!(count = games.len(), "Latest games read from database");
        Ok(games)
    }

    #[instrument(skip(self))]
    async fn game_for_date(&self, date: NaiveDate) -> Result<GameDate, AppError> {
        sqlx::query_as::<_, GameDate>(
            "SELECT game_id::BIGINT AS game_id, date FROM date WHERE date = $1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("game_for_date"))?
        .ok_or_else(|| {
            debug!(%date, "No game for date");
            AppError::NotFound(format!("No game on {}", date))
        })
    }

    #[instrument(skip(self))]
    async fn game_by_id(&self, game_id: GameId) -> Result<GameDate, AppError> {
        sqlx::query_as::<_, GameDate>(
            "SELECT game_id::BIGINT AS game_id, date FROM date WHERE game_id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("game_by_id"))?
        .ok_or_else(|| AppError::NotFound(format!("No game with id {}", game_id)))
    }

    #[instrument(skip(self))]
    async fn events_for_game(&self, game_id: GameId) -> Result<Vec<ClueEvent>, AppError> {
        sqlx::query_as::<_, ClueEvent>(
            "SELECT game_id::BIGINT AS game_id, \
                    contestant_id::BIGINT AS contestant_id, \
                    clue_order_number::BIGINT AS clue_order_number, \
                    change_in_value::BIGINT AS change_in_value \
             FROM game \
             WHERE game_id = $1 \
             ORDER BY clue_order_number ASC",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("events_for_game"))
    }

    #[instrument(skip(self))]
    async fn clues_for_game(&self, game_id: GameId) -> Result<Vec<Clue>, AppError> {
        sqlx::query_as::<_, Clue>(
            "SELECT DISTINCT q.question_id::BIGINT AS question_id, \
                    q.game_id::BIGINT AS game_id, \
                    g.clue_order_number::BIGINT AS clue_order_number, \
                    q.text, \
                    q.answer, \
                    q.is_dd AS is_daily_double \
             FROM question q \
             JOIN game g ON g.question_id = q.question_id AND g.game_id = q.game_id \
             WHERE q.game_id = $1",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("clues_for_game"))
    }

    #[instrument(skip(self))]
    async fn contestants_by_ids(
        &self,
        ids: &BTreeSet<ContestantId>,
    ) -> Result<Vec<Contestant>, AppError> {
        let ids: Vec<i64> = ids.iter().copied().collect();
        sqlx::query_as::<_, Contestant>(
            "SELECT contestant_id::BIGINT AS contestant_id, \
                    first_name, last_name, hometown, occupation \
             FROM contestant \
             WHERE contestant_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("contestants_by_ids"))
    }

    #[instrument(skip(self))]
    async fn final_scores(&self, game_ids: &[GameId]) -> Result<Vec<ContestantTotal>, AppError> {
        sqlx::query_as::<_, ContestantTotal>(
            "SELECT game_id::BIGINT AS game_id, \
                    contestant_id::BIGINT AS contestant_id, \
                    SUM(change_in_value)::BIGINT AS final_amount \
             FROM game \
             WHERE game_id = ANY($1) \
             GROUP BY game_id, contestant_id",
        )
        .bind(game_ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("final_scores"))
    }
}
