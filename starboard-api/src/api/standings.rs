//! Standings JSON endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use starboard_common::engine::{RankingPolicy, Standings};
use starboard_common::time;

use super::ApiError;
use crate::AppState;

/// Query parameters for the standings endpoints
#[derive(Debug, Default, Deserialize)]
pub struct StandingsQuery {
    /// Optional policy override for replaying a past season's rules
    pub policy: Option<RankingPolicy>,
}

/// GET /standings/:year
///
/// Ranked standings snapshot for the given contest year.
pub async fn standings_for_year(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<StandingsQuery>,
) -> Result<Json<Standings>, ApiError> {
    let standings = match query.policy {
        Some(policy) => state.cache.get_standings_with_policy(year, policy).await?,
        None => state.cache.get_standings(year).await?,
    };
    Ok(Json(standings))
}

/// GET /standings
///
/// Ranked standings for the current contest year.
pub async fn standings_current(
    state: State<AppState>,
    query: Query<StandingsQuery>,
) -> Result<Json<Standings>, ApiError> {
    standings_for_year(state, Path(time::current_year()), query).await
}
