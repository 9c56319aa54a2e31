use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::Extension,
    http::{Method, Request, StatusCode},
    middleware,
    response::Response,
};
use metrics_util::debugging::DebuggingRecorder;
use ipweather::application::context::RequestContext;
use ipweather::cache::{
    CacheConfig, CacheState, MemoryStore, cache_aside_layer, document_response,
};
use ipweather::domain::forecast::ForecastDocument;
use tower::ServiceExt;

async fn compose(Extension(context): Extension<RequestContext>) -> Response {
    document_response(ForecastDocument {
        ip: context.subject_ip.clone(),
        city: "Oslo".to_string(),
        temperature: -3,
        message: "Today, Oslo will be -3 degrees.".to_string(),
    })
}

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let cache_state = CacheState {
        config: CacheConfig::default(),
        store: Arc::new(MemoryStore::new(
            NonZeroUsize::new(8).expect("non-zero"),
            Duration::from_secs(120),
        )),
    };

    let app = Router::new()
        .fallback(compose)
        .layer(middleware::from_fn_with_state(cache_state, cache_aside_layer));

    for ip in ["1.1.1.1", "1.1.1.1", "8.8.8.8"] {
        let mut request = Request::builder()
            .method(Method::GET)
            .uri("/")
            .body(Body::empty())
            .expect("request should build");
        request.extensions_mut().insert(RequestContext {
            request_id: "test".to_string(),
            client_ip: None,
            subject_ip: ip.to_string(),
        });
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "ipweather_cache_hit_total",
        "ipweather_cache_miss_total",
        "ipweather_cache_store_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
