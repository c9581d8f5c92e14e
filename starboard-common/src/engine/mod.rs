//! Standings computation engine
//!
//! Transforms a raw feed document into a ranked standings snapshot:
//! normalize per-day completions into star levels, score them, then sort
//! and rank under a [`RankingPolicy`].

pub mod policy;
pub mod rank;
pub mod score;
pub mod stars;

pub use policy::RankingPolicy;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feed::RawLeaderboard;
use crate::time;

/// Number of contest days in a season
pub const CONTEST_DAYS: usize = 25;

/// Star levels for one member, one entry per contest day.
/// 0 = locked, 1 = part 1 solved, 2 = both parts solved.
pub type StarLevels = [u8; CONTEST_DAYS];

/// One member's scored standings entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStanding {
    pub id: i64,
    pub name: String,
    /// 1-based dense competition rank; ties share a rank
    pub position: u32,
    pub stars: StarLevels,
    pub score: u32,
    /// Days with both parts solved
    pub gold_stars: u32,
    /// Days with at least part 1 solved (gold days count here too)
    pub silver_stars: u32,
    /// Lottery ticket count under the active policy
    pub draw_entries: u32,
    pub last_star_ts: i64,
    /// Mean seconds between part-1 and part-2 unlocks, 0 when no day has
    /// part 2 completed
    pub part_2_average_time: f64,
}

/// Ranked standings snapshot for one year.
///
/// Immutable once produced; a recomputation supersedes it rather than
/// mutating it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standings {
    /// Members in rank order
    pub standings: Vec<MemberStanding>,
    /// Capture timestamp (UTC)
    pub timestamp: DateTime<Utc>,
}

/// Compute a ranked snapshot from a raw feed document.
///
/// The cutoff is derived from the year; the policy selects the draw-entry
/// formula, composite sort order, and rank key.
pub fn compute_standings(raw: &RawLeaderboard, year: i32, policy: RankingPolicy) -> Standings {
    let cutoff = time::cutoff_for_year(year);

    let mut members: Vec<MemberStanding> = raw
        .members
        .values()
        .map(|member| {
            let stars = stars::normalize(&member.completion_day_level, cutoff);
            MemberStanding {
                id: member.id,
                name: member.display_name(),
                position: 0,
                stars,
                score: score::score(&stars),
                gold_stars: score::gold_stars(&stars),
                silver_stars: score::silver_stars(&stars),
                draw_entries: policy.draw_entries(member, &stars),
                last_star_ts: member.last_star_ts,
                part_2_average_time: score::part_2_average_time(&member.completion_day_level),
            }
        })
        .collect();

    rank::sort_and_rank(&mut members, policy);

    Standings {
        standings: members,
        timestamp: time::now(),
    }
}
