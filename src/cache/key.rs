use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::shared::AppError;

/// Operation tag, the first half of every cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
pub enum CacheOperation {
    #[strum(serialize = "past-games")]
    LatestGames,
    #[strum(serialize = "winners")]
    Winners,
    #[strum(serialize = "game-trend")]
    GameTrend,
    #[strum(serialize = "questions")]
    Questions,
    #[strum(serialize = "question-info")]
    QuestionInfo,
}

impl CacheOperation {
    /// Keyed by today's date, so the entry must not outlive the day
    pub fn is_day_scoped(&self) -> bool {
        matches!(self, CacheOperation::LatestGames | CacheOperation::Winners)
    }
}

const SEPARATOR: char = '_';
const CLUE_SEPARATOR: char = ':';

/// Composite key `<operation>_<param>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: CacheOperation,
    param: String,
}

impl CacheKey {
    pub fn new(operation: CacheOperation, param: impl Into<String>) -> Self {
        Self {
            operation,
            param: param.into(),
        }
    }

    /// Key for a day-scoped operation
    pub fn for_day(operation: CacheOperation, today: NaiveDate, date_format: &str) -> Self {
        Self::new(operation, today.format(date_format).to_string())
    }

    /// Key for one clue of a game: `question-info_<selector>:<clue>`
    pub fn for_clue(selector_param: &str, clue_order_number: i64) -> Self {
        Self::new(
            CacheOperation::QuestionInfo,
            format!("{}{}{}", selector_param, CLUE_SEPARATOR, clue_order_number),
        )
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let (tag, param) = raw.split_once(SEPARATOR).ok_or_else(|| {
            AppError::MalformedCacheKey(format!("{} has no operation tag", raw))
        })?;
        let operation = CacheOperation::from_str(tag)
            .map_err(|_| AppError::MalformedCacheKey(format!("{} has unknown tag {}", raw, tag)))?;
        Ok(Self::new(operation, param))
    }

    pub fn operation(&self) -> CacheOperation {
        self.operation
    }

    pub fn param(&self) -> &str {
        &self.param
    }

    /// Checks the key was built for `expected` and that its parameter has that operation's shape
    pub fn validate(&self, expected: CacheOperation, date_format: &str) -> Result<(), AppError> {
        if self.operation != expected {
            return Err(AppError::MalformedCacheKey(format!(
                "{} used for {} lookup",
                self, expected
            )));
        }

        let well_formed = match self.operation {
            CacheOperation::LatestGames | CacheOperation::Winners => {
                is_date(&self.param, date_format)
            }
            CacheOperation::GameTrend | CacheOperation::Questions => {
                is_selector(&self.param, date_format)
            }
            CacheOperation::QuestionInfo => match self.param.rsplit_once(CLUE_SEPARATOR) {
                Some((selector, clue)) => {
                    is_selector(selector, date_format) && clue.parse::<i64>().is_ok()
                }
                None => false,
            },
        };

        if well_formed {
            Ok(())
        } else {
            Err(AppError::MalformedCacheKey(format!(
                "{} has a malformed parameter",
                self
            )))
        }
    }
}

fn is_date(param: &str, date_format: &str) -> bool {
    NaiveDate::parse_from_str(param, date_format).is_ok()
}

fn is_selector(param: &str, date_format: &str) -> bool {
    match param.strip_prefix("id-") {
        Some(id) => id.parse::<i64>().is_ok(),
        None => is_date(param, date_format),
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.operation, SEPARATOR, self.param)
    }
}
