//! Reservation time ranges and the review grace policy.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minutes that must pass after a stay ends before its guest may review the place.
pub const REVIEW_GRACE_MINUTES: i64 = 15;

/// A booked interval. `end` is always strictly after `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StayError {
    #[error("end datetime must be after start datetime")]
    EndNotAfterStart,
}

impl Stay {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, StayError> {
        if end <= start {
            return Err(StayError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Replace either bound and re-check the ordering.
    pub fn with_bounds(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, StayError> {
        Self::new(start.unwrap_or(self.start), end.unwrap_or(self.end))
    }
}

/// Latest stay end that still qualifies for a review at `now`. Stores compare
/// reservation ends against it (`end <= cutoff`).
pub fn review_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(REVIEW_GRACE_MINUTES)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid datetime {0:?}, expected RFC 3339 or YYYY-MM-DDTHH:MM:SS")]
pub struct TimestampError(pub String);

/// Parse a request timestamp. Offset-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError(raw.to_owned()))
}
