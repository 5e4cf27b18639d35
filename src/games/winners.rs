use std::collections::BTreeMap;

use tracing::debug;

use super::contestants::ContestantDirectory;
use super::models::{ClueEvent, ContestantId, ContestantTotal, GameDate, GameId, WinnerRecord};
use crate::shared::AppError;

/// Sums score deltas per (game, contestant). Output is ordered by game id, then contestant id.
pub fn contestant_totals(events: &[ClueEvent]) -> Vec<ContestantTotal> {
    let mut totals: BTreeMap<(GameId, ContestantId), i64> = BTreeMap::new();
    for event in events {
        *totals
            .entry((event.game_id, event.contestant_id))
            .or_default() += event.change_in_value;
    }

    totals
        .into_iter()
        .map(|((game_id, contestant_id), final_amount)| ContestantTotal {
            game_id,
            contestant_id,
            final_amount,
        })
        .collect()
}

/// Picks the highest total per game. Equal totals go to the lowest contestant id,
/// whatever order the rows arrived in.
pub fn select_winners(totals: &[ContestantTotal]) -> BTreeMap<GameId, ContestantTotal> {
    let mut winners: BTreeMap<GameId, ContestantTotal> = BTreeMap::new();
    for total in totals {
        winners
            .entry(total.game_id)
            .and_modify(|best| {
                let beats = total.final_amount > best.final_amount
                    || (total.final_amount == best.final_amount
                        && total.contestant_id < best.contestant_id);
                if beats {
                    *best = total.clone();
                }
            })
            .or_insert_with(|| total.clone());
    }
    winners
}

/// Joins each game's winner with its date and display text, ordered by date.
///
/// Games without any scoring event have no winner and are left out.
pub fn winner_records(
    games: &[GameDate],
    winners: &BTreeMap<GameId, ContestantTotal>,
    directory: &ContestantDirectory,
) -> Result<Vec<WinnerRecord>, AppError> {
    let mut records = Vec::with_capacity(games.len());
    for game in games {
        let Some(winner) = winners.get(&game.game_id) else {
            debug!(game_id = game.game_id, "Game has no scoring events, skipping");
            continue;
        };
        let contestant = directory.resolve(winner.contestant_id)?;
        records.push(WinnerRecord {
            game_id: game.game_id,
            date: game.date,
            final_amount: winner.final_amount,
            graph_text: contestant.display_text(),
        });
    }

    records.sort_by(|a, b| a.date.cmp(&b.date).then(a.game_id.cmp(&b.game_id)));
    Ok(records)
}
