use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type GameId = i64;
pub type ContestantId = i64;

/// Row of the `date` table: one per game
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct GameDate {
    pub game_id: GameId,
    pub date: NaiveDate,
}

/// Row of the `game` table: one scoring event per contestant per clue
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ClueEvent {
    pub game_id: GameId,
    pub contestant_id: ContestantId,
    pub clue_order_number: i64, // 1-based, strictly increasing within a game
    pub change_in_value: i64,   // signed score delta
}

/// Row of the `question` table, joined to its clue order number within the game
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Clue {
    pub question_id: i64,
    pub game_id: GameId,
    pub clue_order_number: i64,
    pub text: String,
    pub answer: String,
    pub is_daily_double: bool,
}

/// Row of the `contestant` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Contestant {
    pub contestant_id: ContestantId,
    pub first_name: String,
    pub last_name: String,
    pub hometown: String,
    pub occupation: String,
}

impl Contestant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// "first last, hometown, occupation"
    pub fn display_text(&self) -> String {
        format!(
            "{} {}, {}, {}",
            self.first_name, self.last_name, self.hometown, self.occupation
        )
    }
}

/// Per-game per-contestant sum of score deltas
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ContestantTotal {
    pub game_id: GameId,
    pub contestant_id: ContestantId,
    pub final_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub game_id: GameId,
    pub date: NaiveDate,
    pub final_amount: i64,
    pub graph_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub contestant_id: ContestantId,
    pub clue_order_number: i64,
    pub running_total: i64,
    pub graph_text: String,
}

/// One chart line: the running totals of a single contestant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub contestant_id: ContestantId,
    pub name: String,
    pub clue_order_numbers: Vec<i64>,
    pub running_totals: Vec<i64>,
}

/// Table row shown when hovering a trend point. Field names are the table's column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionInfo {
    #[serde(rename = "Index")]
    pub clue_order_number: i64,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Answer")]
    pub answer: String,
    #[serde(rename = "Daily Double")]
    pub daily_double: String, // "TRUE" or "FALSE"
    #[serde(rename = "Contestant")]
    pub contestant: String,
    #[serde(rename = "Dollars Won")]
    pub dollars_won: i64,
}

/// How the presentation layer points at a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSelector {
    Date(NaiveDate),
    Game(GameId),
}

impl GameSelector {
    /// Parameter used in cache keys: the formatted date, or `id-<game_id>`
    pub fn cache_param(&self, date_format: &str) -> String {
        match self {
            GameSelector::Date(date) => date.format(date_format).to_string(),
            GameSelector::Game(game_id) => format!("id-{}", game_id),
        }
    }
}
