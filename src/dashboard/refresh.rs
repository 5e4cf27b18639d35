use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument};

use super::service::DashboardService;
use crate::shared::AppError;

/// Re-reads the winners view on a fixed interval.
///
/// Reads go through the cache, so a tick costs nothing until the day rolls over or the
/// entry expires; then the first tick of the new key recomputes it.
#[instrument(skip(dashboard))]
pub async fn start_refresh_task(dashboard: Arc<DashboardService>, refresh_interval: Duration) {
    info!(
        refresh_interval_ms = refresh_interval.as_millis() as u64,
        "Starting winners refresh background task"
    );

    let mut ticker = interval(refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        match refresh_once(&dashboard).await {
            Ok(winner_count) => debug!(winner_count, "Winners refreshed"),
            Err(e) => error!(error = %e, "Winners refresh failed"),
        }
    }
}

/// One refresh tick. Returns how many winners the view holds.
pub async fn refresh_once(dashboard: &DashboardService) -> Result<usize, AppError> {
    let winners = dashboard.winners().await?;
    Ok(winners.len())
}
