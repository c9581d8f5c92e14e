//! Ranking policy selection
//!
//! The scoring rules evolved across seasons. Each rule set is captured as
//! a policy value selecting the draw-entry formula, composite sort order,
//! and rank key, so any past season can be replayed exactly instead of
//! keeping duplicated code paths around.

use serde::{Deserialize, Serialize};

use super::StarLevels;
use crate::feed::RawMember;

/// Scoring and ranking rule set for one season
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Earliest seasons: rank by weighted score alone, draw entries taken
    /// from the provider-reported star count.
    ScoreOnly,
    /// Current rule: rank by the gold/silver pair with the full composite
    /// sort, draw entries weight gold days double.
    #[default]
    DrawWeighted,
}

impl RankingPolicy {
    /// Lottery entries for one member under this policy.
    pub fn draw_entries(&self, member: &RawMember, stars: &StarLevels) -> u32 {
        match self {
            RankingPolicy::ScoreOnly => member.stars,
            RankingPolicy::DrawWeighted => stars.iter().map(|&level| level as u32).sum(),
        }
    }
}
