//! Apify actor platform client
//!
//! Runs the Instagram scraper actor with a fixed input and reads back its
//! default dataset. Waiting for the run is left to the platform
//! (`waitForFinish`); nothing here polls.

use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::ImagePostSource;
use super::error::{ApiError, ApiResult, LogErr};
use crate::constants::{
    ACTOR_WAIT_FOR_FINISH_SECS, INSTAGRAM_ACTOR_ID, INSTAGRAM_RECENCY_FILTER,
    INSTAGRAM_RESULTS_LIMIT, INSTAGRAM_RESULTS_TYPE, INSTAGRAM_SEARCH_LIMIT,
    INSTAGRAM_SEARCH_TYPE, INSTAGRAM_SEED_ACCOUNTS, QUERY_REQUIRED,
};
use crate::domain::instagram::RawImageItem;

pub struct ApifyClient {
    token: String,
    base_url: String,
    actor_id: String,
    http: Client,
}

/// Input document for the Instagram scraper actor
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorInput<'a> {
    pub direct_urls: &'a [&'a str],
    pub results_type: &'a str,
    pub results_limit: u32,
    pub only_posts_newer_than: &'a str,
    pub search: &'a str,
    pub search_type: &'a str,
    pub search_limit: u32,
}

impl<'a> ActorInput<'a> {
    pub fn for_query(query: &'a str) -> Self {
        Self {
            direct_urls: INSTAGRAM_SEED_ACCOUNTS,
            results_type: INSTAGRAM_RESULTS_TYPE,
            results_limit: INSTAGRAM_RESULTS_LIMIT,
            only_posts_newer_than: INSTAGRAM_RECENCY_FILTER,
            search: query,
            search_type: INSTAGRAM_SEARCH_TYPE,
            search_limit: INSTAGRAM_SEARCH_LIMIT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    data: ActorRun,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRun {
    pub id: String,
    pub status: String,
    pub default_dataset_id: Option<String>,
}

impl ApifyClient {
    pub fn new(token: &str, base_url: &str, http: Client) -> Self {
        Self {
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            actor_id: INSTAGRAM_ACTOR_ID.to_string(),
            http,
        }
    }

    /// Start a run and let the platform hold the request until it finishes.
    pub async fn run_actor(&self, input: &ActorInput<'_>) -> ApiResult<ActorRun> {
        let url = format!("{}/v2/acts/{}/runs", self.base_url, self.actor_id);
        let payload = serde_json::to_value(input).log_internal("Serialize actor input")?;

        debug!(actor = %self.actor_id, input = %payload, "Starting actor run");

        let resp = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .query(&[("waitForFinish", ACTOR_WAIT_FOR_FINISH_SECS)])
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            warn!(%status, "Actor run request rejected");
            return Err(ApiError::upstream(status, text));
        }

        let envelope: RunEnvelope = serde_json::from_str(&text)
            .log_upstream("Failed to parse actor run response", StatusCode::BAD_GATEWAY)?;
        Ok(envelope.data)
    }

    pub async fn list_dataset_items(&self, dataset_id: &str) -> ApiResult<Vec<RawImageItem>> {
        let url = format!("{}/v2/datasets/{}/items", self.base_url, dataset_id);

        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .query(&[("clean", "true"), ("format", "json")])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            warn!(%status, dataset_id, "Dataset read rejected");
            return Err(ApiError::upstream(status, text));
        }

        serde_json::from_str(&text)
            .log_upstream("Failed to parse dataset items", StatusCode::BAD_GATEWAY)
    }

    /// Run the scraper for `query` and return its raw output items.
    pub async fn search_image_posts(&self, query: &str) -> ApiResult<Vec<RawImageItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::Validation(QUERY_REQUIRED.to_string()));
        }

        let run = self.run_actor(&ActorInput::for_query(query)).await?;

        match run.status.as_str() {
            "SUCCEEDED" => {}
            "READY" | "RUNNING" => {
                return Err(ApiError::upstream(
                    StatusCode::GATEWAY_TIMEOUT,
                    format!(
                        "actor run {} still {} after {}s",
                        run.id, run.status, ACTOR_WAIT_FOR_FINISH_SECS
                    ),
                ));
            }
            other => {
                return Err(ApiError::upstream(
                    StatusCode::BAD_GATEWAY,
                    format!("actor run {} ended with status {}", run.id, other),
                ));
            }
        }

        let Some(dataset_id) = run.default_dataset_id.as_deref() else {
            // A finished run with no dataset produced nothing
            return Ok(Vec::new());
        };

        let items = self.list_dataset_items(dataset_id).await?;
        info!(query, run_id = %run.id, items = items.len(), "Actor run complete");
        Ok(items)
    }
}

#[async_trait]
impl ImagePostSource for ApifyClient {
    async fn search_image_posts(&self, query: &str) -> ApiResult<Vec<RawImageItem>> {
        ApifyClient::search_image_posts(self, query).await
    }
}
