//! Application constants

/// Public base URL of the X API (token and recent-search endpoints)
pub const X_API_BASE_URL: &str = "https://api.twitter.com";

/// Public base URL of the Apify platform API
pub const APIFY_BASE_URL: &str = "https://api.apify.com";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Default timeout for X API calls (10 seconds)
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Default timeout for Apify calls. Covers the platform-side run wait below.
pub const DEFAULT_ORCHESTRATOR_TIMEOUT_SECS: u64 = 120;

/// Default page size for recent search when the caller omits `maxResults`
pub const DEFAULT_MAX_RESULTS: i64 = 10;

/// Inclusive bounds for the `max_results` value sent upstream
pub const MIN_MAX_RESULTS: i64 = 10;
pub const MAX_MAX_RESULTS: i64 = 100;

/// Fields requested on posts and expanded authors
pub const TWEET_FIELDS: &str = "created_at,public_metrics,author_id";
pub const USER_FIELDS: &str = "name,username,verified";
pub const EXPANSIONS: &str = "author_id";
pub const SORT_ORDER: &str = "relevancy";

/// Error message for a missing or blank `query` parameter
pub const QUERY_REQUIRED: &str = "Query parameter is required";

/// Apify actor that scrapes Instagram posts
pub const INSTAGRAM_ACTOR_ID: &str = "apify~instagram-scraper";

/// Accounts the scraper always seeds its crawl with
pub const INSTAGRAM_SEED_ACCOUNTS: &[&str] = &[
    "https://www.instagram.com/natgeo/",
    "https://www.instagram.com/nasa/",
    "https://www.instagram.com/bbcnews/",
];

pub const INSTAGRAM_RESULTS_TYPE: &str = "posts";
pub const INSTAGRAM_RECENCY_FILTER: &str = "3 days";
pub const INSTAGRAM_RESULTS_LIMIT: u32 = 5;
pub const INSTAGRAM_SEARCH_TYPE: &str = "hashtag";
pub const INSTAGRAM_SEARCH_LIMIT: u32 = 1;

/// How long the platform holds a run request open (its maximum is 60s)
pub const ACTOR_WAIT_FOR_FINISH_SECS: u64 = 60;
