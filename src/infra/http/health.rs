use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::error::AppError;

use super::HttpState;

pub(super) async fn cache_health(State(state): State<HttpState>) -> Response {
    match state.cache.store.ping().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
