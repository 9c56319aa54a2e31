use axum::{Extension, extract::State, response::Response};

use crate::{
    application::{context::RequestContext, error::AppError},
    cache::document_response,
};

use super::HttpState;

/// Compose a fresh forecast for the request's subject IP.
///
/// Only reached on a cache miss.
pub(super) async fn forecast(
    State(state): State<HttpState>,
    Extension(context): Extension<RequestContext>,
) -> Result<Response, AppError> {
    let document = state.forecast.compose(&context.subject_ip).await?;
    Ok(document_response(document))
}
