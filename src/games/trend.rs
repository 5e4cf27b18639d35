use std::collections::BTreeMap;

use super::contestants::ContestantDirectory;
use super::models::{ClueEvent, ContestantId, TrendPoint, TrendSeries};
use crate::shared::AppError;

/// Running score per contestant, the equivalent of
/// `SUM(change_in_value) OVER (PARTITION BY contestant_id ORDER BY clue_order_number)`.
///
/// Emits exactly one point per event, grouped by contestant id and ordered by clue
/// order number within each contestant.
pub fn running_totals(
    events: &[ClueEvent],
    directory: &ContestantDirectory,
) -> Result<Vec<TrendPoint>, AppError> {
    let mut partitions: BTreeMap<ContestantId, Vec<&ClueEvent>> = BTreeMap::new();
    for event in events {
        partitions.entry(event.contestant_id).or_default().push(event);
    }

    let mut points = Vec::with_capacity(events.len());
    for (contestant_id, mut partition) in partitions {
        let graph_text = directory.resolve(contestant_id)?.full_name();
        partition.sort_by_key(|event| event.clue_order_number);

        let mut running_total = 0i64;
        for event in partition {
            running_total += event.change_in_value;
            points.push(TrendPoint {
                contestant_id,
                clue_order_number: event.clue_order_number,
                running_total,
                graph_text: graph_text.clone(),
            });
        }
    }

    Ok(points)
}

/// Groups trend points into one chart line per contestant
pub fn trend_series(points: &[TrendPoint]) -> Vec<TrendSeries> {
    let mut series: BTreeMap<ContestantId, TrendSeries> = BTreeMap::new();
    for point in points {
        let line = series
            .entry(point.contestant_id)
            .or_insert_with(|| TrendSeries {
                contestant_id: point.contestant_id,
                name: point.graph_text.clone(),
                clue_order_numbers: Vec::new(),
                running_totals: Vec::new(),
            });
        line.clue_order_numbers.push(point.clue_order_number);
        line.running_totals.push(point.running_total);
    }
    series.into_values().collect()
}
