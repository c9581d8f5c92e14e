//! Ranking engine
//!
//! Orders scored members under a policy's composite key and assigns dense
//! competition-style ranks. Members sharing the rank key share the 1-based
//! position of the first member of the group; the next distinct key takes
//! its overall 1-based position, so gaps are allowed between tie groups.

use std::cmp::Ordering;

use super::{MemberStanding, RankingPolicy};

/// Composite order for the draw-weighted policy: draw entries, then gold,
/// then silver, then the star sequence compared from day 25 down to day 1,
/// all descending; remaining ties go to the faster part-2 average. Member
/// id last, so the order is total and input permutation cannot change it.
fn draw_weighted_cmp(a: &MemberStanding, b: &MemberStanding) -> Ordering {
    b.draw_entries
        .cmp(&a.draw_entries)
        .then_with(|| b.gold_stars.cmp(&a.gold_stars))
        .then_with(|| b.silver_stars.cmp(&a.silver_stars))
        .then_with(|| b.stars.iter().rev().cmp(a.stars.iter().rev()))
        .then_with(|| a.part_2_average_time.total_cmp(&b.part_2_average_time))
        .then_with(|| a.id.cmp(&b.id))
}

/// Original order: score descending, earlier last star breaks ties.
fn score_only_cmp(a: &MemberStanding, b: &MemberStanding) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.last_star_ts.cmp(&b.last_star_ts))
        .then_with(|| a.id.cmp(&b.id))
}

/// Rank key: members with an equal key share a rank.
fn rank_key(member: &MemberStanding, policy: RankingPolicy) -> (u32, u32) {
    match policy {
        RankingPolicy::ScoreOnly => (member.score, 0),
        RankingPolicy::DrawWeighted => (member.gold_stars, member.silver_stars),
    }
}

/// Sort members under the policy's composite order and assign positions.
pub fn sort_and_rank(members: &mut Vec<MemberStanding>, policy: RankingPolicy) {
    match policy {
        RankingPolicy::ScoreOnly => members.sort_by(score_only_cmp),
        RankingPolicy::DrawWeighted => members.sort_by(draw_weighted_cmp),
    }

    let mut last_key = None;
    let mut last_position = 0;
    for (index, member) in members.iter_mut().enumerate() {
        let key = rank_key(member, policy);
        if last_key != Some(key) {
            last_position = index as u32 + 1;
            last_key = Some(key);
        }
        member.position = last_position;
    }
}
