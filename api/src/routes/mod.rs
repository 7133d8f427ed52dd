pub mod health;
pub mod instagram;
pub mod tweets;

use axum::{Json, Router, http::StatusCode, response::IntoResponse};
use serde_json::json;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(tweets::routes())
        .merge(instagram::routes())
}

/// The full service: routes, 404 fallback, CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    build_routes()
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    use crate::AppState;
    use crate::domain::instagram::RawImageItem;
    use crate::services::error::{ApiError, ApiResult};
    use crate::services::twitter::RecentSearch;
    use crate::services::{ImagePostSource, SocialPostSource};

    type SocialReply = Box<dyn Fn(&str, i64) -> ApiResult<RecentSearch> + Send + Sync>;
    type ImageReply = Box<dyn Fn(&str) -> ApiResult<Vec<RawImageItem>> + Send + Sync>;

    pub struct FakeSocial {
        pub calls: AtomicUsize,
        reply: SocialReply,
    }

    impl FakeSocial {
        pub fn new(
            reply: impl Fn(&str, i64) -> ApiResult<RecentSearch> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Box::new(reply),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SocialPostSource for FakeSocial {
        async fn search_posts(&self, query: &str, max_results: i64) -> ApiResult<RecentSearch> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)(query, max_results)
        }
    }

    pub struct FakeImages {
        pub calls: AtomicUsize,
        reply: ImageReply,
    }

    impl FakeImages {
        pub fn new(
            reply: impl Fn(&str) -> ApiResult<Vec<RawImageItem>> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Box::new(reply),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ImagePostSource for FakeImages {
        async fn search_image_posts(&self, query: &str) -> ApiResult<Vec<RawImageItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)(query)
        }
    }

    pub fn unused_social() -> Arc<FakeSocial> {
        FakeSocial::new(|_, _| Err(ApiError::Internal("social source not expected".into())))
    }

    pub fn unused_images() -> Arc<FakeImages> {
        FakeImages::new(|_| Err(ApiError::Internal("image source not expected".into())))
    }

    pub fn app(social: Arc<FakeSocial>, images: Arc<FakeImages>) -> Router {
        super::app(Arc::new(AppState {
            twitter: social,
            instagram: images,
        }))
    }

    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_requests_are_logged_at_default_filter() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("search_proxy=info,tower_http=info")
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (status, _) = get_json(app(unused_social(), unused_images()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("finished processing request"), "{output}");
        assert!(output.contains("/api/health"), "{output}");
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let (status, body) = get_json(app(unused_social(), unused_images()), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Not found" }));
    }
}
