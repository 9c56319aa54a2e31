//! Inbound HTTP surface.
//!
//! Every request except the health probe runs the same stage chain,
//! outermost first:
//!
//! 1. request context: client address, subject IP, request id
//! 2. response timing (`X-Response-Time`)
//! 3. request logging
//! 4. cache-aside lookup/store
//! 5. forecast composition
//!
//! The forecast handler is the router fallback, so any method and path reach it.

mod forecast;
mod health;
mod middleware;

use std::sync::Arc;

use axum::{Router, handler::Handler, middleware as axum_middleware, routing::get};

use crate::{
    application::forecast::ForecastService,
    cache::{CacheState, cache_aside_layer},
};

pub use middleware::{ClientAddressPolicy, RESPONSE_TIME_HEADER};

#[derive(Clone)]
pub struct HttpState {
    pub forecast: Arc<ForecastService>,
    pub cache: CacheState,
    pub client_address: ClientAddressPolicy,
}

pub fn build_router(state: HttpState) -> Router {
    let cached_forecast = forecast::forecast.layer(axum_middleware::from_fn_with_state(
        state.cache.clone(),
        cache_aside_layer,
    ));

    Router::new()
        .route("/_health/cache", get(health::cache_health))
        .fallback(cached_forecast)
        .with_state(state.clone())
        .layer(axum_middleware::from_fn(middleware::log_requests))
        .layer(axum_middleware::from_fn(middleware::record_response_time))
        .layer(axum_middleware::from_fn_with_state(
            state.client_address,
            middleware::set_request_context,
        ))
}
