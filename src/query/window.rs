//! 30-minute time windows and wall-clock rendering

use chrono::{DateTime, Duration, FixedOffset, Offset, Timelike, Utc};

use crate::error::{QueryError, Result};

/// Width of a time window in seconds
pub const WINDOW_SECS: i64 = 1800;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Window a timestamp falls in (floor division on epoch seconds)
pub fn bucket_index(timestamp: i64) -> i64 {
    timestamp.div_euclid(WINDOW_SECS)
}

/// Renders timestamps in a fixed time zone
#[derive(Debug, Clone, Copy)]
pub struct TimeBucketer {
    tz: FixedOffset,
}

impl Default for TimeBucketer {
    fn default() -> Self {
        Self::utc8()
    }
}

impl TimeBucketer {
    pub fn new(utc_offset_minutes: i32) -> Result<Self> {
        let tz = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            QueryError::InvalidInput(format!(
                "UTC offset out of range: {} minutes",
                utc_offset_minutes
            ))
        })?;
        Ok(Self { tz })
    }

    /// UTC+8, the zone the OpenRCA ground truth was recorded in
    pub fn utc8() -> Self {
        Self {
            tz: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }

    fn local(&self, timestamp: i64) -> Result<DateTime<FixedOffset>> {
        DateTime::from_timestamp(timestamp, 0)
            .map(|t| t.with_timezone(&self.tz))
            .ok_or_else(|| {
                QueryError::InvalidInput(format!("timestamp out of range: {}", timestamp))
            })
    }

    /// `YYYY-MM-DD HH:MM:SS` in the configured zone
    pub fn format_datetime(&self, timestamp: i64) -> Result<String> {
        Ok(self.local(timestamp)?.format(DATETIME_FORMAT).to_string())
    }

    /// `"{start} to {end}"` for the half hour containing `timestamp`.
    ///
    /// The start is found by truncating the local minute-of-hour, so zones
    /// whose offset is not a multiple of 30 minutes still get wall-clock
    /// aligned periods.
    pub fn format_period(&self, timestamp: i64) -> Result<String> {
        let local = self.local(timestamp)?;
        let minute = local.minute() - local.minute() % 30;
        let start = local
            .with_minute(minute)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .ok_or_else(|| {
                QueryError::InvalidInput(format!("cannot truncate timestamp {}", timestamp))
            })?;
        let end = start + Duration::seconds(WINDOW_SECS);
        Ok(format!(
            "{} to {}",
            start.format(DATETIME_FORMAT),
            end.format(DATETIME_FORMAT)
        ))
    }
}
