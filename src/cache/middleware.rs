//! Cache-aside pipeline stage.
//!
//! Looks the subject IP up in the store before the forecast handler runs. A hit
//! answers directly and the handler (and its upstream calls) never runs. A miss
//! runs the handler, then stores the fresh document and refreshes its TTL.
//! Failed handler responses carry no document and are never stored.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::{debug, instrument, warn};

use crate::{
    application::{context::RequestContext, error::AppError},
    domain::forecast::ForecastDocument,
};

use super::{CacheConfig, CacheError, CacheStore};

const METRIC_CACHE_HIT: &str = "ipweather_cache_hit_total";
const METRIC_CACHE_MISS: &str = "ipweather_cache_miss_total";
const METRIC_CACHE_STORE: &str = "ipweather_cache_store_total";
const METRIC_CACHE_ERROR: &str = "ipweather_cache_error_total";

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Shared cache state for the middleware.
#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<dyn CacheStore>,
}

#[instrument(skip_all, fields(key = tracing::field::Empty))]
pub async fn cache_aside_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(context) = request.extensions().get::<RequestContext>() else {
        return AppError::unexpected("request context missing before cache stage").into_response();
    };
    let key = cache.config.key_for(&context.subject_ip);
    tracing::Span::current().record("key", key.as_str());

    match lookup(&cache, &key).await {
        Ok(Some(document)) => {
            counter!(METRIC_CACHE_HIT).increment(1);
            debug!(cache = "forecast", outcome = "hit", "serving cached forecast");
            return document_response(document);
        }
        Ok(None) => {
            counter!(METRIC_CACHE_MISS).increment(1);
            debug!(cache = "forecast", outcome = "miss", "cache miss, composing forecast");
        }
        Err(err) => return AppError::from(err).into_response(),
    }

    let response = next.run(request).await;

    if response.status() != StatusCode::OK {
        return response;
    }
    let Some(document) = response.extensions().get::<ForecastDocument>().cloned() else {
        return response;
    };

    if let Err(err) = store(&cache, &key, &document).await {
        return AppError::from(err).into_response();
    }

    document_response(document)
}

/// JSON response for a forecast document.
///
/// The document also rides along as a response extension so the cache stage
/// can store it without parsing the body back.
pub fn document_response(document: ForecastDocument) -> Response {
    let body = match serde_json::to_vec(&document) {
        Ok(body) => body,
        Err(err) => {
            return AppError::unexpected(format!("failed to serialize forecast: {err}"))
                .into_response();
        }
    };

    let mut response = (StatusCode::OK, body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    response.extensions_mut().insert(document);
    response
}

async fn lookup(cache: &CacheState, key: &str) -> Result<Option<ForecastDocument>, CacheError> {
    match cache.store.get(key).await {
        Err(CacheError::Unavailable(reason)) if cache.config.fail_open => {
            counter!(METRIC_CACHE_ERROR, "op" => "get").increment(1);
            warn!(cache = "forecast", reason = %reason, "cache unavailable, bypassing lookup");
            Ok(None)
        }
        Err(err) => {
            counter!(METRIC_CACHE_ERROR, "op" => "get").increment(1);
            Err(err)
        }
        Ok(found) => Ok(found),
    }
}

async fn store(cache: &CacheState, key: &str, document: &ForecastDocument) -> Result<(), CacheError> {
    let written = async {
        cache.store.set(key, document).await?;
        cache.store.expire(key, Some(cache.config.ttl)).await
    }
    .await;

    match written {
        Ok(()) => {
            counter!(METRIC_CACHE_STORE).increment(1);
            debug!(cache = "forecast", ttl_seconds = cache.config.ttl.as_secs(), "stored forecast");
            Ok(())
        }
        Err(CacheError::Unavailable(reason)) if cache.config.fail_open => {
            counter!(METRIC_CACHE_ERROR, "op" => "store").increment(1);
            warn!(cache = "forecast", reason = %reason, "cache unavailable, forecast not stored");
            Ok(())
        }
        Err(err) => {
            counter!(METRIC_CACHE_ERROR, "op" => "store").increment(1);
            Err(err)
        }
    }
}
