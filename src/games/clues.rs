use std::collections::HashMap;

use super::contestants::ContestantDirectory;
use super::models::{Clue, ClueEvent, QuestionInfo};
use crate::shared::AppError;

pub const TRUE_TEXT: &str = "TRUE";
pub const FALSE_TEXT: &str = "FALSE";

/// Text shown in the "Daily Double" column
pub fn wager_flag_text(is_daily_double: bool) -> &'static str {
    if is_daily_double {
        TRUE_TEXT
    } else {
        FALSE_TEXT
    }
}

/// Joins every scoring event with its clue on clue order number. Events without a clue
/// row are dropped, the same as an inner join. Rows are ordered by clue order number.
pub fn question_rows(
    events: &[ClueEvent],
    clues: &[Clue],
    directory: &ContestantDirectory,
) -> Result<Vec<QuestionInfo>, AppError> {
    let clues_by_order: HashMap<i64, Vec<&Clue>> =
        clues.iter().fold(HashMap::new(), |mut acc, clue| {
            acc.entry(clue.clue_order_number).or_default().push(clue);
            acc
        });

    let mut ordered: Vec<&ClueEvent> = events.iter().collect();
    ordered.sort_by_key(|event| (event.clue_order_number, event.contestant_id));

    let mut rows = Vec::new();
    for event in ordered {
        let Some(matching) = clues_by_order.get(&event.clue_order_number) else {
            continue;
        };
        let contestant = directory.resolve(event.contestant_id)?.full_name();
        for clue in matching {
            rows.push(QuestionInfo {
                clue_order_number: event.clue_order_number,
                question: clue.text.clone(),
                answer: clue.answer.clone(),
                daily_double: wager_flag_text(clue.is_daily_double).to_string(),
                contestant: contestant.clone(),
                dollars_won: event.change_in_value,
            });
        }
    }

    Ok(rows)
}

/// Rows at one clue position. Usually one, but zero or several are valid.
pub fn question_info_at(rows: Vec<QuestionInfo>, clue_order_number: i64) -> Vec<QuestionInfo> {
    rows.into_iter()
        .filter(|row| row.clue_order_number == clue_order_number)
        .collect()
}
