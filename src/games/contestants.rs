use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use super::models::{ClueEvent, Contestant, ContestantId, ContestantTotal, TrendPoint};
use super::repository::GameRepository;
use crate::shared::AppError;

/// A contestant id as it arrives from an aggregation path. Window and sum queries can
/// hand back the same id as an integer or a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawContestantId {
    Integer(i64),
    Float(f64),
}

impl RawContestantId {
    pub fn canonical(self) -> Result<ContestantId, AppError> {
        match self {
            RawContestantId::Integer(id) => Ok(id),
            RawContestantId::Float(value) => {
                if value.is_finite()
                    && value.fract() == 0.0
                    // i64::MAX rounds up to 2^63 as a float, which is out of range
                    && value >= i64::MIN as f64
                    && value < i64::MAX as f64
                {
                    Ok(value as i64)
                } else {
                    Err(AppError::IntegrityViolation(format!(
                        "contestant id {} is not an integer",
                        value
                    )))
                }
            }
        }
    }
}

impl From<i64> for RawContestantId {
    fn from(id: i64) -> Self {
        RawContestantId::Integer(id)
    }
}

impl From<f64> for RawContestantId {
    fn from(id: f64) -> Self {
        RawContestantId::Float(id)
    }
}

/// Rows that carry a contestant id
pub trait ContestantRow {
    fn raw_contestant_id(&self) -> RawContestantId;
}

impl ContestantRow for ClueEvent {
    fn raw_contestant_id(&self) -> RawContestantId {
        self.contestant_id.into()
    }
}

impl ContestantRow for ContestantTotal {
    fn raw_contestant_id(&self) -> RawContestantId {
        self.contestant_id.into()
    }
}

impl ContestantRow for TrendPoint {
    fn raw_contestant_id(&self) -> RawContestantId {
        self.contestant_id.into()
    }
}

impl ContestantRow for RawContestantId {
    fn raw_contestant_id(&self) -> RawContestantId {
        *self
    }
}

/// Distinct canonical contestant ids, independent of row order
pub fn unique_contestant_ids<'a, R, I>(rows: I) -> Result<BTreeSet<ContestantId>, AppError>
where
    R: ContestantRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    rows.into_iter()
        .map(|row| row.raw_contestant_id().canonical())
        .collect()
}

/// Contestants fetched for one request, indexed by id
#[derive(Debug, Clone, Default)]
pub struct ContestantDirectory {
    contestants: HashMap<ContestantId, Contestant>,
}

impl ContestantDirectory {
    pub fn new(contestants: Vec<Contestant>) -> Self {
        Self {
            contestants: contestants
                .into_iter()
                .map(|c| (c.contestant_id, c))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.contestants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contestants.is_empty()
    }

    pub fn resolve(&self, contestant_id: ContestantId) -> Result<&Contestant, AppError> {
        self.contestants.get(&contestant_id).ok_or_else(|| {
            warn!(contestant_id, "Contestant id did not resolve");
            AppError::IntegrityViolation(format!(
                "contestant {} has no contestant row",
                contestant_id
            ))
        })
    }
}

/// Extracts the distinct ids from `rows` and fetches them in one batched lookup
pub async fn resolve_contestants<'a, R, I>(
    repository: &dyn GameRepository,
    rows: I,
) -> Result<ContestantDirectory, AppError>
where
    R: ContestantRow + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let ids = unique_contestant_ids(rows)?;
    if ids.is_empty() {
        return Ok(ContestantDirectory::default());
    }

    let contestants = repository.contestants_by_ids(&ids).await?;
    debug!(
        requested = ids.len(),
        found = contestants.len(),
        "Resolved contestants"
    );
    Ok(ContestantDirectory::new(contestants))
}
