use chrono::{DateTime, Days, Duration, NaiveDateTime, TimeZone};

pub const DEFAULT_MAX_CACHE_AGE_DAYS: u64 = 7;

/// Age rule for the feed snapshot.
///
/// The window is added as calendar days in the timezone of the timestamp, so a
/// day that is 23 or 25 hours long around a DST switch still counts as one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    max_age_days: u64,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CACHE_AGE_DAYS)
    }
}

impl CachePolicy {
    pub fn new(max_age_days: u64) -> Self {
        Self { max_age_days }
    }

    pub fn max_age_days(&self) -> u64 {
        self.max_age_days
    }

    /// True iff `now` falls strictly before `timestamp` plus the max age.
    pub fn is_valid<Tz: TimeZone>(&self, timestamp: &DateTime<Tz>, now: &DateTime<Tz>) -> bool {
        match timestamp
            .naive_local()
            .checked_add_days(Days::new(self.max_age_days))
        {
            Some(local_expiry) => *now < resolve_local(&timestamp.timezone(), local_expiry),
            // out of chrono's range: nothing can be that old yet
            None => true,
        }
    }
}

/// Maps a wall-clock time onto an instant in `tz`. A repeated hour resolves to
/// its first occurrence; a skipped hour resolves to the first instant after the gap.
fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = local;
    loop {
        if let Some(instant) = tz.from_local_datetime(&candidate).earliest() {
            return instant;
        }
        candidate = match candidate.checked_add_signed(Duration::minutes(1)) {
            Some(next) if candidate - local < Duration::days(2) => next,
            // no zone has a gap this wide; read the wall clock as UTC
            _ => return tz.from_utc_datetime(&local),
        };
    }
}
