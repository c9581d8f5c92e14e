//! Raw leaderboard feed
//!
//! Typed model of the contest site's private leaderboard JSON document,
//! shape validation at the boundary, and the HTTP client that fetches it.
//! The cache talks to the feed through the [`FeedSource`] trait so tests
//! can substitute a canned source without network access.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::engine::CONTEST_DAYS;
use crate::{Error, Result};

/// Upstream feed base URL
const FEED_BASE_URL: &str = "https://adventofcode.com";

/// Request timeout for the upstream feed
const FEED_TIMEOUT: Duration = Duration::from_secs(15);

/// Completion record for one puzzle part
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PartCompletion {
    /// Unlock timestamp, epoch seconds
    pub get_star_ts: i64,
}

/// Parts completed on one contest day, keyed by part number ("1" or "2")
pub type DayCompletion = BTreeMap<String, PartCompletion>;

/// One member's raw feed entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMember {
    pub id: i64,
    /// Absent or empty for members with hidden profiles
    #[serde(default)]
    pub name: Option<String>,
    /// Provider-reported total star count
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub last_star_ts: i64,
    /// Per-day completion timestamps, keyed by day number ("1".."25")
    #[serde(default)]
    pub completion_day_level: BTreeMap<String, DayCompletion>,
}

impl RawMember {
    /// Display name, with the provider's fallback for hidden profiles.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("anonymous user #{}", self.id),
        }
    }
}

/// The per-year private leaderboard document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLeaderboard {
    #[serde(default)]
    pub event: Option<String>,
    /// Members keyed by member-id string
    pub members: BTreeMap<String, RawMember>,
}

impl RawLeaderboard {
    /// Validate feed shape beyond what deserialization enforces.
    ///
    /// Day keys must be numbers in 1..=25 and part keys "1" or "2".
    /// Violations surface immediately as [`Error::MalformedData`] with the
    /// member id and offending field, instead of failing deep in scoring.
    pub fn validate(&self) -> Result<()> {
        for member in self.members.values() {
            for (day, parts) in &member.completion_day_level {
                let day_num: usize = day.parse().map_err(|_| Error::MalformedData {
                    context: format!(
                        "member {}: completion_day_level day key {day:?} is not a number",
                        member.id
                    ),
                })?;
                if !(1..=CONTEST_DAYS).contains(&day_num) {
                    return Err(Error::MalformedData {
                        context: format!(
                            "member {}: completion_day_level day {day_num} out of range 1..=25",
                            member.id
                        ),
                    });
                }

                for part in parts.keys() {
                    if part != "1" && part != "2" {
                        return Err(Error::MalformedData {
                            context: format!(
                                "member {}: day {day_num} has unexpected part key {part:?}",
                                member.id
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Source of raw leaderboard documents
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the raw document for one contest year.
    async fn fetch(&self, year: i32) -> Result<RawLeaderboard>;
}

/// HTTP client for the contest site's private leaderboard JSON endpoint
pub struct HttpFeedClient {
    http_client: reqwest::Client,
    board_id: u64,
    session_cookie: String,
}

impl HttpFeedClient {
    /// Create a new feed client from the resolved configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(FEED_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            board_id: config.board_id,
            session_cookie: config.session_cookie.clone(),
        })
    }

    fn feed_url(&self, year: i32) -> String {
        format!(
            "{FEED_BASE_URL}/{year}/leaderboard/private/view/{}.json",
            self.board_id
        )
    }
}

#[async_trait]
impl FeedSource for HttpFeedClient {
    async fn fetch(&self, year: i32) -> Result<RawLeaderboard> {
        let url = self.feed_url(year);
        debug!(year, url = %url, "Fetching leaderboard feed");

        let response = self
            .http_client
            .get(&url)
            .header(header::COOKIE, format!("session={}", self.session_cookie))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::FetchTimeout(e.to_string())
                } else {
                    Error::FetchNetwork(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchStatus {
                year,
                status: status.as_u16(),
            });
        }

        // The site answers HTML (a login page) instead of JSON when the
        // session cookie has expired.
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("application/json") {
            return Err(Error::FetchContentType(content_type));
        }

        let leaderboard: RawLeaderboard = response.json().await.map_err(|e| {
            Error::MalformedData {
                context: format!("feed body for year {year}: {e}"),
            }
        })?;
        leaderboard.validate()?;

        debug!(
            year,
            members = leaderboard.members.len(),
            "Feed fetch complete"
        );
        Ok(leaderboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaderboard_from(value: serde_json::Value) -> RawLeaderboard {
        serde_json::from_value(value).expect("test document should deserialize")
    }

    #[test]
    fn test_display_name_prefers_provider_name() {
        let member = RawMember {
            id: 42,
            name: Some("Ada".to_string()),
            stars: 0,
            last_star_ts: 0,
            completion_day_level: BTreeMap::new(),
        };
        assert_eq!(member.display_name(), "Ada");
    }

    #[test]
    fn test_display_name_falls_back_for_hidden_profiles() {
        let anonymous = RawMember {
            id: 42,
            name: None,
            stars: 0,
            last_star_ts: 0,
            completion_day_level: BTreeMap::new(),
        };
        assert_eq!(anonymous.display_name(), "anonymous user #42");

        let empty = RawMember {
            name: Some(String::new()),
            ..anonymous
        };
        assert_eq!(empty.display_name(), "anonymous user #42");
    }

    #[test]
    fn test_deserialize_minimal_document() {
        let doc = leaderboard_from(json!({
            "event": "2023",
            "members": {
                "42": {
                    "id": 42,
                    "name": "Ada",
                    "stars": 3,
                    "last_star_ts": 200,
                    "completion_day_level": {
                        "1": {
                            "1": { "get_star_ts": 100 },
                            "2": { "get_star_ts": 200 }
                        },
                        "2": {
                            "1": { "get_star_ts": 150 }
                        }
                    }
                }
            }
        }));

        assert!(doc.validate().is_ok());
        let member = &doc.members["42"];
        assert_eq!(member.stars, 3);
        assert_eq!(
            member.completion_day_level["1"]["2"].get_star_ts,
            200
        );
    }

    #[test]
    fn test_deserialize_tolerates_missing_optional_fields() {
        // Hidden profiles come through with a null name and members who
        // never solved anything have an empty completion map.
        let doc = leaderboard_from(json!({
            "members": {
                "7": { "id": 7, "name": null }
            }
        }));

        assert!(doc.validate().is_ok());
        let member = &doc.members["7"];
        assert_eq!(member.display_name(), "anonymous user #7");
        assert_eq!(member.stars, 0);
        assert!(member.completion_day_level.is_empty());
    }

    #[test]
    fn test_validate_rejects_out_of_range_day() {
        let doc = leaderboard_from(json!({
            "members": {
                "42": {
                    "id": 42,
                    "completion_day_level": {
                        "26": { "1": { "get_star_ts": 100 } }
                    }
                }
            }
        }));

        let err = doc.validate().unwrap_err();
        match err {
            Error::MalformedData { context } => {
                assert!(context.contains("member 42"), "context: {context}");
                assert!(context.contains("26"), "context: {context}");
            }
            other => panic!("expected MalformedData, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_non_numeric_day_key() {
        let doc = leaderboard_from(json!({
            "members": {
                "42": {
                    "id": 42,
                    "completion_day_level": {
                        "first": { "1": { "get_star_ts": 100 } }
                    }
                }
            }
        }));

        assert!(matches!(
            doc.validate().unwrap_err(),
            Error::MalformedData { .. }
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_part_key() {
        let doc = leaderboard_from(json!({
            "members": {
                "42": {
                    "id": 42,
                    "completion_day_level": {
                        "3": { "3": { "get_star_ts": 100 } }
                    }
                }
            }
        }));

        assert!(matches!(
            doc.validate().unwrap_err(),
            Error::MalformedData { .. }
        ));
    }

    #[test]
    fn test_feed_url_includes_board_and_year() {
        let client = HttpFeedClient {
            http_client: reqwest::Client::new(),
            board_id: 642101,
            session_cookie: "secret".to_string(),
        };
        assert_eq!(
            client.feed_url(2023),
            "https://adventofcode.com/2023/leaderboard/private/view/642101.json"
        );
    }
}
