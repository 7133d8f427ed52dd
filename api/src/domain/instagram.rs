//! Instagram scraper dataset items and their flattening into display posts

use serde::{Deserialize, Serialize};

pub const NO_CAPTION: &str = "No caption available";
pub const UNKNOWN_USERNAME: &str = "unknown";
pub const UNKNOWN_FULL_NAME: &str = "Unknown User";

/// One item of the scraper's output dataset
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImageItem {
    pub id: Option<String>,
    pub url: Option<String>,
    pub caption: Option<String>,
    pub video_url: Option<String>,
    pub display_url: Option<String>,
    pub likes_count: Option<i64>,
    pub comments_count: Option<i64>,
    pub video_view_count: Option<i64>,
    pub timestamp: Option<String>,
    pub owner_username: Option<String>,
    pub owner_full_name: Option<String>,
    /// Set on placeholder items the scraper emits when a search finds nothing
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayImagePost {
    pub id: String,
    pub caption: String,
    pub url: String,
    pub media_url: String,
    pub is_video: bool,
    pub likes: i64,
    pub comments: i64,
    pub views: i64,
    pub timestamp: String,
    pub username: String,
    pub full_name: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn normalize(items: &[RawImageItem]) -> Vec<DisplayImagePost> {
    items
        .iter()
        .filter(|item| item.error.is_none())
        .map(|item| {
            let video_url = present(&item.video_url);
            let media_url = video_url.or(present(&item.display_url)).unwrap_or_default();

            DisplayImagePost {
                id: present(&item.id)
                    .or(present(&item.url))
                    .unwrap_or_default()
                    .to_string(),
                caption: present(&item.caption).unwrap_or(NO_CAPTION).to_string(),
                url: item.url.clone().unwrap_or_default(),
                media_url: media_url.to_string(),
                is_video: video_url.is_some(),
                likes: item.likes_count.unwrap_or(0),
                comments: item.comments_count.unwrap_or(0),
                views: item.video_view_count.unwrap_or(0),
                timestamp: item.timestamp.clone().unwrap_or_default(),
                username: present(&item.owner_username)
                    .unwrap_or(UNKNOWN_USERNAME)
                    .to_string(),
                full_name: present(&item.owner_full_name)
                    .unwrap_or(UNKNOWN_FULL_NAME)
                    .to_string(),
            }
        })
        .collect()
}
