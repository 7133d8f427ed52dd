use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode};
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::{ApiError, ApiResult, LogErr};
use super::token_cache::BearerTokenCache;
use super::SocialPostSource;
use crate::constants::{
    EXPANSIONS, MAX_MAX_RESULTS, MIN_MAX_RESULTS, QUERY_REQUIRED, SORT_ORDER, TWEET_FIELDS,
    USER_FIELDS,
};
use crate::domain::tweets::RecentSearchResponse;

/// App-only X API client: client-credentials bearer token plus recent search
pub struct TwitterClient {
    api_key: String,
    api_secret: String,
    base_url: String,
    http: Client,
    token: Arc<BearerTokenCache>,
}

impl TwitterClient {
    pub fn new(api_key: &str, api_secret: &str, base_url: &str, http: Client) -> Self {
        Self {
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            token: Arc::new(BearerTokenCache::new()),
        }
    }

    /// Share or pre-populate the token cache instead of starting empty.
    pub fn with_token_cache(mut self, token: Arc<BearerTokenCache>) -> Self {
        self.token = token;
        self
    }

    /// Build Basic auth header for OAuth token requests
    fn basic_auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.api_key, self.api_secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }

    /// Exchange the app key/secret for a bearer token
    async fn exchange_client_credentials(&self) -> ApiResult<String> {
        let url = format!("{}/oauth2/token", self.base_url);

        let resp = self
            .http
            .post(url)
            .header("Authorization", self.basic_auth_header())
            .header(
                "Content-Type",
                "application/x-www-form-urlencoded;charset=UTF-8",
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ApiError::Authentication {
                body: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ApiError::Authentication {
            body: e.to_string(),
        })?;

        if !status.is_success() {
            warn!(%status, "Bearer token exchange rejected");
            return Err(ApiError::Authentication { body });
        }

        match serde_json::from_str::<TokenResponse>(&body) {
            Ok(TokenResponse {
                access_token: Some(token),
                ..
            }) if !token.is_empty() => {
                info!("Bearer token obtained");
                Ok(token)
            }
            _ => {
                warn!("Bearer token response had no access_token");
                Err(ApiError::Authentication { body })
            }
        }
    }

    /// Return the cached bearer token, exchanging credentials on first use.
    pub async fn get_bearer_token(&self) -> ApiResult<String> {
        if self.token.cached().is_none() {
            debug!("No cached bearer token, exchanging client credentials");
        }
        self.token
            .get_or_fetch(|| self.exchange_client_credentials())
            .await
            .map(str::to_owned)
    }

    /// Search posts from the last seven days.
    ///
    /// `max_results` is clamped into the provider's accepted range rather than
    /// rejected. A blank query fails before any network call.
    pub async fn search_posts(&self, query: &str, max_results: i64) -> ApiResult<RecentSearch> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::Validation(QUERY_REQUIRED.to_string()));
        }
        let max_results = clamp_max_results(max_results);

        let access_token = self.get_bearer_token().await?;
        let url = format!("{}/2/tweets/search/recent", self.base_url);

        debug!(query, max_results, "Searching recent posts");
        let max_results = max_results.to_string();

        let resp = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", access_token))
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", TWEET_FIELDS),
                ("user.fields", USER_FIELDS),
                ("expansions", EXPANSIONS),
                ("sort_order", SORT_ORDER),
            ])
            .send()
            .await?;

        let status = resp.status();
        let rate_limit = RateLimitStatus::from_headers(resp.headers());
        let body = resp.text().await?;

        if let Some(rl) = &rate_limit {
            debug!(limit = ?rl.limit, remaining = ?rl.remaining, reset_at = ?rl.reset_at, "X API rate limit");
        }

        if !status.is_success() {
            if status == StatusCode::TOO_MANY_REQUESTS {
                warn!(reset_at = ?rate_limit.as_ref().and_then(|rl| rl.reset_at), "X API rate limit exceeded");
            }
            return Err(ApiError::Upstream {
                status,
                body,
                rate_limit,
            });
        }

        let response: RecentSearchResponse = serde_json::from_str(&body)
            .log_upstream("Failed to parse recent search response", StatusCode::BAD_GATEWAY)?;

        info!(
            query,
            returned = response.data.as_ref().map_or(0, Vec::len),
            "Recent search complete"
        );

        Ok(RecentSearch {
            response,
            rate_limit,
        })
    }
}

#[async_trait]
impl SocialPostSource for TwitterClient {
    async fn search_posts(&self, query: &str, max_results: i64) -> ApiResult<RecentSearch> {
        TwitterClient::search_posts(self, query, max_results).await
    }
}

pub fn clamp_max_results(requested: i64) -> i64 {
    requested.clamp(MIN_MAX_RESULTS, MAX_MAX_RESULTS)
}

/// A decoded recent-search page and the rate-limit window it was served under
#[derive(Debug)]
pub struct RecentSearch {
    pub response: RecentSearchResponse,
    pub rate_limit: Option<RateLimitStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitStatus {
    /// Read the `x-rate-limit-*` headers; `None` when the provider sent none.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| -> Option<i64> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        };

        let limit = read("x-rate-limit-limit");
        let remaining = read("x-rate-limit-remaining");
        let reset = read("x-rate-limit-reset");

        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return None;
        }

        Some(Self {
            limit: limit.and_then(|v| u32::try_from(v).ok()),
            remaining: remaining.and_then(|v| u32::try_from(v).ok()),
            reset_at: reset.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}
