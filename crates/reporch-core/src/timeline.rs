//! Hourly commit instants over the configured repository age.

use crate::error::{EvolveError, Result};
use crate::types::Stamp;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;

pub const SECONDS_PER_HOUR: i64 = 3600;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Finite cursor over `[end - age, end)` in one-hour buckets, oldest first.
///
/// Each pull jitters the bucket start by a uniform fraction of an hour, so
/// instants stay inside their own bucket and are strictly increasing.
#[derive(Debug, Clone)]
pub struct Timeline {
    first: i64,
    end: i64,
    next_bucket: i64,
    format: String,
}

impl Timeline {
    /// `end` is truncated to whole seconds. `format` must already be a valid
    /// strftime template. Fails when the window starts before the earliest
    /// date chrono can represent.
    pub fn new(
        end: DateTime<Utc>,
        repo_age_in_days: u32,
        format: impl Into<String>,
    ) -> Result<Self> {
        let end = end.timestamp();
        let first = end - i64::from(repo_age_in_days) * SECONDS_PER_DAY;
        if Utc.timestamp_opt(first, 0).single().is_none() {
            return Err(EvolveError::InvalidConfig(format!(
                "repo_age_in_days={repo_age_in_days} starts before the earliest representable date"
            )));
        }
        Ok(Self {
            first,
            end,
            next_bucket: first,
            format: format.into(),
        })
    }

    pub fn len(&self) -> usize {
        ((self.end - self.first) / SECONDS_PER_HOUR) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        if self.next_bucket >= self.end {
            return 0;
        }
        ((self.end - self.next_bucket + SECONDS_PER_HOUR - 1) / SECONDS_PER_HOUR) as usize
    }

    pub fn next_stamp<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Stamp> {
        if self.next_bucket >= self.end {
            return None;
        }
        let bucket = self.next_bucket;
        self.next_bucket += SECONDS_PER_HOUR;

        let split: f64 = rng.gen();
        let offset_ms = (split * (SECONDS_PER_HOUR * 1000) as f64) as i64;
        let at = Utc.timestamp_opt(bucket, 0).single()? + Duration::milliseconds(offset_ms);
        let text = at.format(&self.format).to_string();
        Some(Stamp { at, text })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
