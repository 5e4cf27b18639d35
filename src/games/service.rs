use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::{
    clues::{question_info_at, question_rows},
    contestants::resolve_contestants,
    models::{GameDate, GameSelector, QuestionInfo, TrendPoint, WinnerRecord},
    repository::GameRepository,
    trend::running_totals,
    winners::{select_winners, winner_records},
};
use crate::shared::AppError;

/// Derived views over the games store, computed fresh on every call
#[derive(Clone)]
pub struct GameQueryService {
    repository: Arc<dyn GameRepository>,
    latest_limit: i64,
}

impl GameQueryService {
    pub fn new(repository: Arc<dyn GameRepository>, latest_limit: i64) -> Self {
        Self {
            repository,
            latest_limit,
        }
    }

    #[instrument(skip(self))]
    pub async fn latest_games(&self) -> Result<Vec<GameDate>, AppError> {
        self.repository.latest_games(self.latest_limit).await
    }

    /// Winner of each of the latest games, ordered by date
    #[instrument(skip(self))]
    pub async fn winners(&self) -> Result<Vec<WinnerRecord>, AppError> {
        let games = self.latest_games().await?;
        if games.is_empty() {
            return Ok(Vec::new());
        }

        let game_ids: Vec<_> = games.iter().map(|g| g.game_id).collect();
        let totals = self.repository.final_scores(&game_ids).await?;
        let winners = select_winners(&totals);
        let directory = resolve_contestants(self.repository.as_ref(), winners.values()).await?;

        let records = winner_records(&games, &winners, &directory)?;
        info!(games = games.len(), winners = records.len(), "Computed winners");
        Ok(records)
    }

    pub async fn resolve_game(&self, selector: GameSelector) -> Result<GameDate, AppError> {
        match selector {
            GameSelector::Date(date) => self.repository.game_for_date(date).await,
            GameSelector::Game(game_id) => self.repository.game_by_id(game_id).await,
        }
    }

    #[instrument(skip(self))]
    pub async fn trend(&self, selector: GameSelector) -> Result<Vec<TrendPoint>, AppError> {
        let game = self.resolve_game(selector).await?;
        let events = self.repository.events_for_game(game.game_id).await?;
        let directory = resolve_contestants(self.repository.as_ref(), &events).await?;

        let points = running_totals(&events, &directory)?;
        debug!(game_id = game.game_id, points = points.len(), "Computed game trend");
        Ok(points)
    }

    /// Every answered clue of a game with its contestant, ordered by clue order number
    #[instrument(skip(self))]
    pub async fn questions_for_game(
        &self,
        selector: GameSelector,
    ) -> Result<Vec<QuestionInfo>, AppError> {
        let game = self.resolve_game(selector).await?;
        let (events, clues) = futures::try_join!(
            self.repository.events_for_game(game.game_id),
            self.repository.clues_for_game(game.game_id),
        )?;
        let directory = resolve_contestants(self.repository.as_ref(), &events).await?;

        let rows = question_rows(&events, &clues, &directory)?;
        debug!(game_id = game.game_id, rows = rows.len(), "Computed question table");
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn question_info(
        &self,
        selector: GameSelector,
        clue_order_number: i64,
    ) -> Result<Vec<QuestionInfo>, AppError> {
        let rows = self.questions_for_game(selector).await?;
        Ok(question_info_at(rows, clue_order_number))
    }
}
