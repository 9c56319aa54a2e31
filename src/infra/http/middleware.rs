use std::{
    net::{IpAddr, SocketAddr},
    time::Instant,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::{context::RequestContext, error::ErrorReport},
    domain::network::subject_ip,
};

pub const RESPONSE_TIME_HEADER: HeaderName = HeaderName::from_static("x-response-time");

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const IP_QUERY_PARAM: &str = "ip";

/// How the client address is derived from a request.
#[derive(Debug, Clone, Copy)]
pub struct ClientAddressPolicy {
    /// Use the first `X-Forwarded-For` entry when present.
    pub trust_proxy: bool,
}

impl ClientAddressPolicy {
    fn resolve(&self, request: &Request<Body>) -> Option<IpAddr> {
        let forwarded = self
            .trust_proxy
            .then(|| forwarded_for(request.headers()))
            .flatten();

        forwarded.or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
    }
}

pub async fn set_request_context(
    State(policy): State<ClientAddressPolicy>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let client_ip = policy.resolve(&request);
    let override_ip = request.uri().query().and_then(query_ip);

    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
        client_ip,
        subject_ip: subject_ip(override_ip.as_deref(), client_ip),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Attach the elapsed handling time as `X-Response-Time: <N>ms`.
pub async fn record_response_time(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_millis();

    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed_ms}ms")) {
        response.headers_mut().insert(RESPONSE_TIME_HEADER, value);
    }
    response
}

/// Emit one line per request, whatever the outcome.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let (client_ip, request_id) = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| (ctx.client_ip_label(), ctx.request_id.clone()))
        .unwrap_or_else(|| ("-".to_string(), String::new()));

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, messages) = match report {
            Some(report) => (report.source, report.messages),
            None => ("unknown", Vec::new()),
        };
        let detail = messages
            .first()
            .cloned()
            .unwrap_or_else(|| "no diagnostic available".to_string());

        if status.is_server_error() {
            error!(
                target = "ipweather::http::request",
                client_ip = %client_ip,
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                status = status.as_u16(),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                chain = ?messages,
                request_id = %request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "ipweather::http::request",
                client_ip = %client_ip,
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                status = status.as_u16(),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                request_id = %request_id,
                "client request error",
            );
        }
    } else {
        info!(
            target = "ipweather::http::request",
            client_ip = %client_ip,
            method = %method,
            path = %uri.path(),
            query = uri.query().unwrap_or(""),
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            request_id = %request_id,
            "request handled",
        );
    }

    response
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get(FORWARDED_FOR_HEADER)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .and_then(|first| first.trim().parse().ok())
}

fn query_ip(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == IP_QUERY_PARAM)
        .map(|(_, value)| value.into_owned())
}
