use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::cache::{CacheKey, CacheOperation, CacheStats, Clock, Memoizer};
use crate::games::{
    trend::trend_series, GameDate, GameQueryService, GameSelector, QuestionInfo, TrendPoint,
    TrendSeries, WinnerRecord,
};
use crate::shared::AppError;

/// Trend chart payload for one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendView {
    pub selection: String,
    pub points: Vec<TrendPoint>,
    pub series: Vec<TrendSeries>,
}

/// The read operations the dashboard calls, each served through the cache
pub struct DashboardService {
    queries: GameQueryService,
    memoizer: Memoizer,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    pub fn new(queries: GameQueryService, memoizer: Memoizer, clock: Arc<dyn Clock>) -> Self {
        Self {
            queries,
            memoizer,
            clock,
        }
    }

    pub fn date_format(&self) -> &str {
        self.memoizer.date_format()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.memoizer.stats()
    }

    fn today_key(&self, operation: CacheOperation) -> CacheKey {
        CacheKey::for_day(operation, self.clock.today(), self.date_format())
    }

    fn selector_key(&self, operation: CacheOperation, selector: GameSelector) -> CacheKey {
        CacheKey::new(operation, selector.cache_param(self.date_format()))
    }

    #[instrument(skip(self))]
    pub async fn latest_games(&self) -> Result<Vec<GameDate>, AppError> {
        let key = self.today_key(CacheOperation::LatestGames);
        self.memoizer
            .get_or_compute(&key, CacheOperation::LatestGames, || {
                self.queries.latest_games()
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn winners(&self) -> Result<Vec<WinnerRecord>, AppError> {
        let key = self.today_key(CacheOperation::Winners);
        self.memoizer
            .get_or_compute(&key, CacheOperation::Winners, || self.queries.winners())
            .await
    }

    #[instrument(skip(self))]
    pub async fn trend(&self, selector: GameSelector) -> Result<Vec<TrendPoint>, AppError> {
        let key = self.selector_key(CacheOperation::GameTrend, selector);
        self.memoizer
            .get_or_compute(&key, CacheOperation::GameTrend, || {
                self.queries.trend(selector)
            })
            .await
    }

    /// Trend for the selected game, or the most recent game when nothing is selected
    #[instrument(skip(self))]
    pub async fn trend_view(&self, selector: Option<GameSelector>) -> Result<TrendView, AppError> {
        let selector = match selector {
            Some(selector) => selector,
            None => self.latest_selector().await?,
        };

        let points = self.trend(selector).await?;
        let series = trend_series(&points);
        Ok(TrendView {
            selection: selector.cache_param(self.date_format()),
            points,
            series,
        })
    }

    #[instrument(skip(self))]
    pub async fn questions_for_game(
        &self,
        selector: GameSelector,
    ) -> Result<Vec<QuestionInfo>, AppError> {
        let key = self.selector_key(CacheOperation::Questions, selector);
        self.memoizer
            .get_or_compute(&key, CacheOperation::Questions, || {
                self.queries.questions_for_game(selector)
            })
            .await
    }

    #[instrument(skip(self))]
    pub async fn question_info(
        &self,
        selector: GameSelector,
        clue_order_number: i64,
    ) -> Result<Vec<QuestionInfo>, AppError> {
        let key = CacheKey::for_clue(&selector.cache_param(self.date_format()), clue_order_number);
        self.memoizer
            .get_or_compute(&key, CacheOperation::QuestionInfo, || async move {
                let rows = self.questions_for_game(selector).await?;
                Ok(crate::games::clues::question_info_at(rows, clue_order_number))
            })
            .await
    }

    /// Drops today's latest-games and winners entries so the next read recomputes them
    #[instrument(skip(self))]
    pub async fn invalidate_today(&self) -> Result<(), AppError> {
        for operation in [CacheOperation::LatestGames, CacheOperation::Winners] {
            self.memoizer.invalidate(&self.today_key(operation)).await?;
        }
        info!(today = %self.clock.today(), "Invalidated day-scoped cache entries");
        Ok(())
    }

    async fn latest_selector(&self) -> Result<GameSelector, AppError> {
        let latest = self.latest_games().await?;
        let newest = latest
            .first()
            .ok_or_else(|| AppError::NotFound("No games recorded yet".to_string()))?;
        debug!(date = %newest.date, "Defaulting to most recent game");
        Ok(GameSelector::Date(newest.date))
    }
}
