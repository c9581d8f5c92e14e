//! Scoring engine
//!
//! Derives score, star counts, and part-2 latency from the normalized
//! star levels and the raw completion records.

use std::collections::BTreeMap;

use super::StarLevels;
use crate::feed::DayCompletion;

/// Points per star level: 0 locked, 1 silver, 3 gold.
fn weight(level: u8) -> u32 {
    match level {
        2 => 3,
        1 => 1,
        _ => 0,
    }
}

/// Weighted score over the whole sequence
pub fn score(stars: &StarLevels) -> u32 {
    stars.iter().map(|&level| weight(level)).sum()
}

/// Days with both parts solved
pub fn gold_stars(stars: &StarLevels) -> u32 {
    stars.iter().filter(|&&level| level == 2).count() as u32
}

/// Days with at least part 1 solved
pub fn silver_stars(stars: &StarLevels) -> u32 {
    stars.iter().filter(|&&level| level > 0).count() as u32
}

/// Mean seconds between the part-1 and part-2 unlocks, over days where
/// part 2 was completed. 0 when no such day exists.
///
/// A negative delta (clock skew in the source data) counts as 0 for that
/// day rather than dragging the average below zero.
pub fn part_2_average_time(completion: &BTreeMap<String, DayCompletion>) -> f64 {
    let deltas: Vec<i64> = completion
        .values()
        .filter_map(|day| {
            let part_2 = day.get("2")?;
            let part_1 = day.get("1")?;
            Some((part_2.get_star_ts - part_1.get_star_ts).max(0))
        })
        .collect();

    if deltas.is_empty() {
        return 0.0;
    }

    deltas.iter().sum::<i64>() as f64 / deltas.len() as f64
}
