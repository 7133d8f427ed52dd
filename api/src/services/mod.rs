pub mod apify;
pub mod error;
pub mod token_cache;
pub mod twitter;

use async_trait::async_trait;

use crate::domain::instagram::RawImageItem;
use error::ApiResult;
use twitter::RecentSearch;

/// Social-post search capability the routes depend on
#[async_trait]
pub trait SocialPostSource: Send + Sync {
    async fn search_posts(&self, query: &str, max_results: i64) -> ApiResult<RecentSearch>;
}

/// Image-post search capability: one blocking call returning a finished dataset
#[async_trait]
pub trait ImagePostSource: Send + Sync {
    async fn search_image_posts(&self, query: &str) -> ApiResult<Vec<RawImageItem>>;
}
