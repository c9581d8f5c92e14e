//! Timestamp and submission-cutoff utilities

use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::America::Montreal;

/// First contest year where the submission cutoff applies. Earlier
/// seasons count every recorded unlock, whenever it happened.
pub const FIRST_CUTOFF_YEAR: i32 = 2021;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current contest year (UTC)
pub fn current_year() -> i32 {
    now().year()
}

/// Submission cutoff for a contest year.
///
/// Midnight on January 1 of the following year in America/Montreal, the
/// board's reference time zone. Stars unlocked after this instant are
/// not counted. Returns None for years before [`FIRST_CUTOFF_YEAR`].
pub fn cutoff_for_year(year: i32) -> Option<DateTime<Utc>> {
    if year < FIRST_CUTOFF_YEAR {
        return None;
    }

    Montreal
        .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
