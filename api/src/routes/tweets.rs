//! Recent post search endpoint (/api/tweets/search)

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::AppState;
use crate::constants::{DEFAULT_MAX_RESULTS, QUERY_REQUIRED};
use crate::domain::tweets::{self, DisplayPost, SortOrder};
use crate::services::error::{ApiError, ApiResult};
use crate::services::twitter::RateLimitStatus;

/// Raw query string; parsed by hand so bad input maps to our own 400 bodies.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetSearchParams {
    pub query: Option<String>,
    pub max_results: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetSearchResponse {
    pub success: bool,
    pub query: String,
    pub total_results: u64,
    pub tweets: Vec<DisplayPost>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitStatus>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/tweets/search", get(search_tweets))
}

fn parse_max_results(raw: Option<&str>) -> ApiResult<i64> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(DEFAULT_MAX_RESULTS),
        Some(v) => v
            .parse()
            .map_err(|_| ApiError::Validation("maxResults must be an integer".to_string())),
    }
}

/// GET /api/tweets/search - Search recent posts and return display records
async fn search_tweets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TweetSearchParams>,
) -> ApiResult<Json<TweetSearchResponse>> {
    let query = params.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::Validation(QUERY_REQUIRED.to_string()));
    }
    let max_results = parse_max_results(params.max_results.as_deref())?;
    let sort: SortOrder = params
        .sort
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(ApiError::Validation)?;

    let search = state.twitter.search_posts(query, max_results).await?;

    let mut posts = tweets::normalize(&search.response);
    tweets::sort_posts(&mut posts, sort);
    let total_results = tweets::total_results(&search.response, &posts);

    info!(query, total_results, returned = posts.len(), "Tweet search served");

    Ok(Json(TweetSearchResponse {
        success: true,
        query: query.to_string(),
        total_results,
        tweets: posts,
        rate_limit: search.rate_limit,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tweets::RecentSearchResponse;
    use crate::routes::test_support::*;
    use crate::services::twitter::RecentSearch;
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    fn fixture() -> Value {
        json!({
            "data": [
                {
                    "id": "1",
                    "text": "AI is eating the world",
                    "created_at": "2025-01-01T10:00:00.000Z",
                    "author_id": "u1",
                    "public_metrics": { "impression_count": 50, "like_count": 5, "retweet_count": 1, "reply_count": 0 }
                },
                {
                    "id": "2",
                    "text": "More AI news",
                    "created_at": "2025-01-01T11:00:00.000Z",
                    "author_id": "u2",
                    "public_metrics": { "impression_count": 900, "like_count": 40, "retweet_count": 7, "reply_count": 3 }
                },
                {
                    "id": "3",
                    "text": "Who wrote this",
                    "created_at": "2025-01-01T12:00:00.000Z",
                    "author_id": "ghost"
                }
            ],
            "includes": { "users": [
                { "id": "u1", "name": "Ada", "username": "ada", "verified": true },
                { "id": "u2", "name": "Grace", "username": "grace", "verified": false }
            ]},
            "meta": { "result_count": 42 }
        })
    }

    fn ok_search(body: Value) -> ApiResult<RecentSearch> {
        Ok(RecentSearch {
            response: serde_json::from_value::<RecentSearchResponse>(body).unwrap(),
            rate_limit: None,
        })
    }

    #[tokio::test]
    async fn test_search_normalizes_and_counts() {
        let seen = Arc::new(Mutex::new(None));
        let seen_in_fake = seen.clone();
        let social = FakeSocial::new(move |query, max_results| {
            *seen_in_fake.lock().unwrap() = Some((query.to_string(), max_results));
            ok_search(fixture())
        });

        let (status, body) = get_json(
            app(social.clone(), unused_images()),
            "/api/tweets/search?query=AI&maxResults=5",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["query"], "AI");
        // the provider's count, not the page length
        assert_eq!(body["totalResults"], 42);
        assert!(body.get("rateLimit").is_none());

        let tweets = body["tweets"].as_array().unwrap();
        assert_eq!(tweets.len(), 3);
        assert_eq!(
            tweets.iter().filter(|t| t["author"] == "Unknown").count(),
            1
        );
        // Provider order is kept by default
        let ids: Vec<&str> = tweets.iter().map(|t| t["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(tweets[0]["username"], "@ada");
        assert_eq!(tweets[0]["verified"], true);

        assert_eq!(social.calls(), 1);
        assert_eq!(*seen.lock().unwrap(), Some(("AI".to_string(), 5)));
    }

    #[tokio::test]
    async fn test_total_falls_back_to_post_count() {
        let mut body = fixture();
        body.as_object_mut().unwrap().remove("meta");
        let social = FakeSocial::new(move |_, _| ok_search(body.clone()));

        let (status, body) =
            get_json(app(social, unused_images()), "/api/tweets/search?query=AI").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalResults"], 3);
    }

    #[tokio::test]
    async fn test_sort_by_views() {
        let social = FakeSocial::new(|_, _| ok_search(fixture()));
        let (status, body) = get_json(
            app(social, unused_images()),
            "/api/tweets/search?query=AI&sort=views",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let views: Vec<u64> = body["tweets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["views"].as_u64().unwrap())
            .collect();
        assert_eq!(views, [900, 50, 0]);
    }

    #[tokio::test]
    async fn test_default_max_results() {
        let seen = Arc::new(Mutex::new(0));
        let seen_in_fake = seen.clone();
        let social = FakeSocial::new(move |_, max_results| {
            *seen_in_fake.lock().unwrap() = max_results;
            ok_search(json!({}))
        });

        let (status, body) =
            get_json(app(social, unused_images()), "/api/tweets/search?query=rust").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalResults"], 0);
        assert_eq!(body["tweets"], json!([]));
        assert_eq!(*seen.lock().unwrap(), DEFAULT_MAX_RESULTS);
    }

    #[tokio::test]
    async fn test_missing_or_blank_query_never_reaches_provider() {
        let social = unused_social();
        for uri in ["/api/tweets/search", "/api/tweets/search?query=", "/api/tweets/search?query=%20%20"] {
            let (status, body) = get_json(app(social.clone(), unused_images()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({ "error": "Query parameter is required" }));
        }
        assert_eq!(social.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_max_results_and_sort_are_rejected() {
        let social = unused_social();

        let (status, body) = get_json(
            app(social.clone(), unused_images()),
            "/api/tweets/search?query=AI&maxResults=lots",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "maxResults must be an integer");

        let (status, _) = get_json(
            app(social.clone(), unused_images()),
            "/api/tweets/search?query=AI&sort=oldest",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(social.calls(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_is_propagated() {
        let social = FakeSocial::new(|_, _| {
            Err(ApiError::Upstream {
                status: StatusCode::TOO_MANY_REQUESTS,
                body: r#"{"title":"Too Many Requests","detail":"Too Many Requests","status":429}"#
                    .to_string(),
                rate_limit: Some(RateLimitStatus {
                    limit: Some(450),
                    remaining: Some(0),
                    reset_at: Utc.timestamp_opt(1_735_732_800, 0).single(),
                }),
            })
        });

        let (status, body) =
            get_json(app(social.clone(), unused_images()), "/api/tweets/search?query=AI").await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Failed to fetch tweets");
        assert_eq!(body["details"]["title"], "Too Many Requests");
        assert_eq!(body["rateLimit"]["remaining"], 0);
        assert_eq!(social.calls(), 1);
    }

    #[tokio::test]
    async fn test_authentication_failure_is_bad_gateway() {
        let social = FakeSocial::new(|_, _| {
            Err(ApiError::Authentication {
                body: r#"{"errors":[{"code":99,"message":"Unable to verify your credentials"}]}"#
                    .to_string(),
            })
        });

        let (status, body) =
            get_json(app(social, unused_images()), "/api/tweets/search?query=AI").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to authenticate with X API");
        assert_eq!(body["details"]["errors"][0]["code"], 99);
    }
}
