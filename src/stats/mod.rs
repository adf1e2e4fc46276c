//! Aggregate timing statistics
//!
//! Two policies exist, one per partition. Both resolve an empty denominator to
//! the "no data" value rather than a non-finite average.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Ingestion, PetitionSet};
use crate::error::AggregateError;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Petitions whose deadline passed more than this long ago are flagged
pub fn one_year() -> TimeDelta {
    TimeDelta::hours(24 * 365)
}

/// Per-partition aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of petitions in the partition
    pub count: usize,

    /// Mean duration in milliseconds; `None` means nothing could be averaged
    average_duration_ms: Option<i64>,
}

impl Stats {
    pub fn new(count: usize, average: TimeDelta) -> Self {
        Self {
            count,
            average_duration_ms: Some(average.num_milliseconds()),
        }
    }

    /// Stats for a partition with nothing to average
    pub fn no_data(count: usize) -> Self {
        Self {
            count,
            average_duration_ms: None,
        }
    }

    pub fn average_duration(&self) -> Option<TimeDelta> {
        self.average_duration_ms.map(TimeDelta::milliseconds)
    }

    /// Average in whole days, rounded towards negative infinity. No data is 0.
    pub fn average_days(&self) -> i64 {
        self.average_duration_ms
            .map(|ms| ms.div_euclid(MILLIS_PER_DAY))
            .unwrap_or(0)
    }
}

/// Mean of `total_ms` over `n` samples, truncated towards zero
fn mean_millis(total_ms: i128, n: usize) -> Result<TimeDelta, AggregateError> {
    if n == 0 {
        return Err(AggregateError::EmptyCollection);
    }
    let mean = total_ms / n as i128;
    let mean = i64::try_from(mean).map_err(|_| AggregateError::DurationOutOfRange)?;
    TimeDelta::try_milliseconds(mean).ok_or(AggregateError::DurationOutOfRange)
}

/// Resolve an empty denominator to the no-data value
fn resolve(count: usize, mean: Result<TimeDelta, AggregateError>) -> Result<Stats, AggregateError> {
    match mean {
        Ok(average) => Ok(Stats::new(count, average)),
        Err(AggregateError::EmptyCollection) => {
            log::info!("Nothing to average over {} petitions, storing no-data stats", count);
            Ok(Stats::no_data(count))
        }
        Err(e) => Err(e),
    }
}

/// Pending policy.
///
/// Sorts by raw deadline (stable), stamps every petition with ingestion fields
/// computed against the single `now`, and averages `now - deadline`.
pub fn aggregate_pending(
    mut petitions: PetitionSet,
    now: DateTime<Utc>,
) -> Result<(PetitionSet, Stats), AggregateError> {
    petitions.sort_by_key(|p| p.deadline);

    let mut total_ms: i128 = 0;
    for petition in &mut petitions {
        let deadline_time = DateTime::from_timestamp(petition.deadline, 0).ok_or_else(|| {
            AggregateError::DeadlineOutOfRange {
                id: petition.id.clone(),
                deadline: petition.deadline,
            }
        })?;
        let waited = now - deadline_time;
        total_ms += i128::from(waited.num_milliseconds());

        petition.ingestion = Some(Ingestion {
            deadline_time,
            updated_time: now,
            year_ago: waited > one_year(),
        });
    }

    let stats = resolve(petitions.len(), mean_millis(total_ms, petitions.len()))?;
    log::debug!("Pending stats: {:?}", stats);
    Ok((petitions, stats))
}

/// Responded policy.
///
/// Averages `association_time - deadline` over petitions whose association
/// time parses as an integer. `count` still includes the ones that don't.
pub fn aggregate_responded(petitions: &PetitionSet) -> Result<Stats, AggregateError> {
    let mut total_secs: i128 = 0;
    let mut valid = 0usize;

    for petition in petitions {
        if let Some(associated) = petition.response.as_ref().and_then(|r| r.association_epoch()) {
            total_secs += i128::from(associated) - i128::from(petition.deadline);
            valid += 1;
        }
    }

    let stats = resolve(petitions.len(), mean_millis(total_secs * 1000, valid))?;
    log::debug!(
        "Responded stats: {:?} ({} of {} with association time)",
        stats,
        valid,
        petitions.len()
    );
    Ok(stats)
}

/// Figures shown on the rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    /// Days, floored
    pub average_response: i64,
    /// Days, floored
    pub average_pending: i64,
    pub number_response: usize,
    pub number_pending: usize,
    pub number_total: usize,
    pub percent_responded: usize,
}

impl RenderStats {
    pub fn new(pending: &Stats, responded: &Stats) -> Self {
        let number_total = pending.count + responded.count;
        let percent_responded = if number_total == 0 {
            0
        } else {
            100 * responded.count / number_total
        };

        Self {
            average_response: responded.average_days(),
            average_pending: pending.average_days(),
            number_response: responded.count,
            number_pending: pending.count,
            number_total,
            percent_responded,
        }
    }
}
