//! Completion normalizer
//!
//! Converts a member's raw per-day completion timestamps into the fixed
//! 25-entry star-level sequence, honoring an optional cutoff instant.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{StarLevels, CONTEST_DAYS};
use crate::feed::DayCompletion;

/// True when the given part was completed at or before the cutoff.
///
/// An absent cutoff means every recorded unlock counts.
fn part_unlocked(day: &DayCompletion, part: &str, cutoff: Option<DateTime<Utc>>) -> bool {
    match day.get(part) {
        None => false,
        Some(completion) => match cutoff {
            None => true,
            Some(cutoff) => completion.get_star_ts <= cutoff.timestamp(),
        },
    }
}

/// Normalize raw completions into per-day star levels.
///
/// A day reaches level 2 when part 2 unlocked before the cutoff, level 1
/// when only part 1 did, 0 otherwise. Days absent from the raw data stay 0.
/// Day keys are validated at the feed boundary; anything out of range is
/// skipped here.
pub fn normalize(
    completion: &BTreeMap<String, DayCompletion>,
    cutoff: Option<DateTime<Utc>>,
) -> StarLevels {
    let mut stars = [0u8; CONTEST_DAYS];

    for (day, parts) in completion {
        let Ok(day_num) = day.parse::<usize>() else {
            continue;
        };
        if !(1..=CONTEST_DAYS).contains(&day_num) {
            continue;
        }

        let level = if part_unlocked(parts, "2", cutoff) {
            2
        } else if part_unlocked(parts, "1", cutoff) {
            1
        } else {
            0
        };
        stars[day_num - 1] = level;
    }

    stars
}
