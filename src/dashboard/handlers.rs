use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, instrument};

use super::service::TrendView;
use crate::games::{GameDate, GameSelector, QuestionInfo, WinnerRecord};
use crate::shared::{AppError, AppState};

/// Query string naming a game either by date or by id
#[derive(Debug, Default, Deserialize)]
pub struct SelectorQuery {
    pub date: Option<String>,
    pub game_id: Option<i64>,
}

impl SelectorQuery {
    pub fn into_selector(self, date_format: &str) -> Result<Option<GameSelector>, AppError> {
        match (self.date, self.game_id) {
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "Pass either date or game_id, not both".to_string(),
            )),
            (Some(date), None) => NaiveDate::parse_from_str(&date, date_format)
                .map(|date| Some(GameSelector::Date(date)))
                .map_err(|_| {
                    AppError::BadRequest(format!("Date {} does not match {}", date, date_format))
                }),
            (None, Some(game_id)) => Ok(Some(GameSelector::Game(game_id))),
            (None, None) => Ok(None),
        }
    }

    fn require_selector(self, date_format: &str) -> Result<GameSelector, AppError> {
        self.into_selector(date_format)?
            .ok_or_else(|| AppError::BadRequest("Missing date or game_id".to_string()))
    }
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// GET /games/latest
#[instrument(name = "latest_games", skip(state))]
pub async fn latest_games(State(state): State<AppState>) -> Result<Json<Vec<GameDate>>, AppError> {
    let games = state.dashboard.latest_games().await?;
    info!(game_count = games.len(), "Latest games listed");
    Ok(Json(games))
}

/// GET /winners
#[instrument(name = "winners", skip(state))]
pub async fn winners(
    State(state): State<AppState>,
) -> Result<Json<Vec<WinnerRecord>>, AppError> {
    let winners = state.dashboard.winners().await?;
    info!(winner_count = winners.len(), "Winners listed");
    Ok(Json(winners))
}

/// GET /trend?date=YYYY-MM-DD | ?game_id=N
///
/// Without a selection the most recent game is shown.
#[instrument(name = "trend", skip(state))]
pub async fn trend(
    State(state): State<AppState>,
    Query(query): Query<SelectorQuery>,
) -> Result<Json<TrendView>, AppError> {
    let selector = query.into_selector(&state.date_format)?;
    let view = state.dashboard.trend_view(selector).await?;
    Ok(Json(view))
}

/// GET /questions?date=YYYY-MM-DD | ?game_id=N
#[instrument(name = "questions", skip(state))]
pub async fn questions(
    State(state): State<AppState>,
    Query(query): Query<SelectorQuery>,
) -> Result<Json<Vec<QuestionInfo>>, AppError> {
    let selector = query.require_selector(&state.date_format)?;
    let rows = state.dashboard.questions_for_game(selector).await?;
    Ok(Json(rows))
}

/// GET /questions/:clue_index?date=YYYY-MM-DD | ?game_id=N
#[instrument(name = "question_info", skip(state))]
pub async fn question_info(
    State(state): State<AppState>,
    Path(clue_index): Path<i64>,
    Query(query): Query<SelectorQuery>,
) -> Result<Json<Vec<QuestionInfo>>, AppError> {
    let selector = query.require_selector(&state.date_format)?;
    let rows = state.dashboard.question_info(selector, clue_index).await?;
    Ok(Json(rows))
}

/// POST /cache/invalidate
#[instrument(name = "invalidate_cache", skip(state))]
pub async fn invalidate_cache(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.dashboard.invalidate_today().await?;
    Ok(StatusCode::NO_CONTENT)
}
