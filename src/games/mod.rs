// Public API
pub use models::{
    Clue, ClueEvent, Contestant, ContestantId, ContestantTotal, GameDate, GameId, GameSelector,
    QuestionInfo, TrendPoint, TrendSeries, WinnerRecord,
};
pub use repository::{GameRepository, InMemoryGameRepository, PostgresGameRepository};
pub use service::GameQueryService;

// Aggregation steps
pub mod clues;
pub mod contestants;
pub mod trend;
pub mod winners;

pub mod models;
pub mod repository;
mod service;
