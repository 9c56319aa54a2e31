use std::{net::SocketAddr, process, sync::Arc, time::Duration};

use ipweather::{
    application::{
        error::AppError,
        forecast::ForecastService,
        upstream::{GeoResolver, WeatherResolver},
    },
    cache::{self, CacheConfig, CacheState},
    config,
    infra::{
        error::InfraError,
        http::{self, ClientAddressPolicy, HttpState},
        telemetry,
        upstream::{IpApiGeolocation, OpenWeatherMap},
    },
};
use tokio::{net::TcpListener, sync::oneshot};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let http_state = build_http_state(&settings).await?;
    serve_http(&settings.server, http_state).await
}

async fn build_http_state(settings: &config::Settings) -> Result<HttpState, AppError> {
    let store = cache::open_store(&settings.cache).await?;
    info!(
        target = "ipweather::cache",
        backend = ?settings.cache.backend,
        ttl_seconds = settings.cache.ttl.as_secs(),
        fail_open = settings.cache.fail_open,
        "cache store ready"
    );

    let geo: Arc<dyn GeoResolver> = Arc::new(IpApiGeolocation::new(&settings.geolocation)?);
    let weather: Arc<dyn WeatherResolver> = Arc::new(OpenWeatherMap::new(&settings.weather)?);
    if settings.weather.api_key.is_none() {
        warn!(
            target = "ipweather::upstream",
            "no weather api key configured; requests go out unauthenticated"
        );
    }

    Ok(HttpState {
        forecast: Arc::new(ForecastService::new(geo, weather)),
        cache: CacheState {
            config: CacheConfig::from(&settings.cache),
            store,
        },
        client_address: ClientAddressPolicy {
            trust_proxy: settings.server.trust_proxy,
        },
    })
}

async fn serve_http(
    server: &config::ServerSettings,
    http_state: HttpState,
) -> Result<(), AppError> {
    let router = http::build_router(http_state);

    let listener = TcpListener::bind(server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let local_addr = listener
        .local_addr()
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = "ipweather::http", addr = %local_addr, "listening");

    let (stopped_tx, stopped_rx) = oneshot::channel();
    let grace = server.graceful_shutdown;
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = stopped_tx.send(());
    })
    .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
        }
        _ = drain_deadline(stopped_rx, grace) => {
            warn!(
                target = "ipweather::http",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping in-flight requests"
            );
        }
    }

    info!(target = "ipweather::http", "server stopped");
    Ok(())
}

/// Resolves once the grace period has elapsed after a shutdown signal.
async fn drain_deadline(stopped: oneshot::Receiver<()>, grace: Duration) {
    if stopped.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target = "ipweather::http", "shutdown signal received");
}
