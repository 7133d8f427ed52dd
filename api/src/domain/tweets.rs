//! X recent-search response shapes and their flattening into display posts
//!
//! The provider returns posts and authors as separate lists joined by
//! `author_id`. Raw fields are all optional here; defaults are applied only in
//! [`normalize`].

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const UNKNOWN_USERNAME: &str = "unknown";

/// Path segment used in permalinks when the author could not be joined
const PERMALINK_FALLBACK_USER: &str = "i";

#[derive(Debug, Default, Deserialize)]
pub struct RecentSearchResponse {
    #[serde(default)]
    pub data: Option<Vec<RawTweet>>,
    #[serde(default)]
    pub includes: Option<Includes>,
    #[serde(default)]
    pub meta: Option<SearchMeta>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Vec<RawAuthor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTweet {
    #[serde(default)]
    pub id: String,
    pub text: Option<String>,
    pub created_at: Option<String>,
    pub author_id: Option<String>,
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublicMetrics {
    pub impression_count: Option<u64>,
    pub like_count: Option<u64>,
    pub retweet_count: Option<u64>,
    pub reply_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub id: String,
    pub name: Option<String>,
    pub username: Option<String>,
    pub verified: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchMeta {
    pub result_count: Option<u64>,
}

/// Provider-agnostic post record consumed by the UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPost {
    pub id: String,
    pub author: String,
    pub username: String,
    pub text: String,
    pub views: u64,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub timestamp: String,
    pub verified: bool,
    pub url: String,
}

/// Ordering applied after normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Provider order (the search is requested sorted by relevancy)
    #[default]
    Relevance,
    /// Most viewed first; ties keep provider order
    Views,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "relevance" | "relevancy" => Ok(SortOrder::Relevance),
            "views" => Ok(SortOrder::Views),
            other => Err(format!(
                "Unknown sort '{other}', expected 'relevance' or 'views'"
            )),
        }
    }
}

/// Join posts with their authors and flatten them into display records.
///
/// An absent or empty post list yields an empty vec.
pub fn normalize(response: &RecentSearchResponse) -> Vec<DisplayPost> {
    let Some(tweets) = response.data.as_deref() else {
        return Vec::new();
    };

    let authors: HashMap<&str, &RawAuthor> = response
        .includes
        .iter()
        .flat_map(|includes| includes.users.iter())
        .map(|user| (user.id.as_str(), user))
        .collect();

    tweets
        .iter()
        .map(|tweet| {
            let author = tweet
                .author_id
                .as_deref()
                .and_then(|id| authors.get(id).copied());
            let handle = author.and_then(|a| a.username.as_deref());
            let metrics = tweet.public_metrics.as_ref();
            let metric = |pick: fn(&PublicMetrics) -> Option<u64>| {
                metrics.and_then(pick).unwrap_or(0)
            };

            DisplayPost {
                id: tweet.id.clone(),
                author: author
                    .and_then(|a| a.name.clone())
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
                username: format!("@{}", handle.unwrap_or(UNKNOWN_USERNAME)),
                text: tweet.text.clone().unwrap_or_default(),
                views: metric(|m| m.impression_count),
                likes: metric(|m| m.like_count),
                retweets: metric(|m| m.retweet_count),
                replies: metric(|m| m.reply_count),
                timestamp: tweet.created_at.clone().unwrap_or_default(),
                verified: author.and_then(|a| a.verified).unwrap_or(false),
                url: format!(
                    "https://twitter.com/{}/status/{}",
                    handle.unwrap_or(PERMALINK_FALLBACK_USER),
                    tweet.id
                ),
            }
        })
        .collect()
}

pub fn sort_posts(posts: &mut [DisplayPost], order: SortOrder) {
    match order {
        SortOrder::Relevance => {}
        // sort_by is stable, so equal view counts keep provider order
        SortOrder::Views => posts.sort_by(|a, b| b.views.cmp(&a.views)),
    }
}

/// The provider's reported count when present, else the normalized length.
pub fn total_results(response: &RecentSearchResponse, posts: &[DisplayPost]) -> u64 {
    response
        .meta
        .as_ref()
        .and_then(|meta| meta.result_count)
        .unwrap_or(posts.len() as u64)
}
