// Library crate for the jbrief dashboard backend
// This file exposes the public API for integration tests

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod games;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use cache::{CacheKey, CacheOperation, Memoizer};
pub use config::AppConfig;
pub use dashboard::{router, DashboardService};
pub use games::{GameQueryService, GameSelector};
pub use shared::{AppError, AppState};
