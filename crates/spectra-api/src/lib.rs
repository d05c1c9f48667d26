//! ---
//! spx_section: "05-networking-external-interfaces"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Networking API surface for external integrations."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
pub mod error;
mod routes;

use std::fmt;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, COOKIE, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{middleware, Router};
use spectra_access::AccessEvaluator;
use spectra_common::config::{ApiConfig, AppConfig};
use spectra_leads::{LeadIntake, LeadSink};
use spectra_metrics::ServiceMetrics;
use spectra_roi::RoiCalculator;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use error::{ApiError, HttpError};

/// Shared API state exposed to handlers. Immutable once built.
pub struct ApiState {
    start: Instant,
    api: ApiConfig,
    roi: RoiCalculator,
    leads: LeadIntake,
    access: AccessEvaluator,
    metrics: ServiceMetrics,
}

impl ApiState {
    pub fn new(config: &AppConfig, metrics: ServiceMetrics) -> Result<Self> {
        let roi = RoiCalculator::from_config(&config.roi)
            .context("invalid roi calculator configuration")?;
        Ok(Self {
            start: Instant::now(),
            api: config.api.clone(),
            roi,
            leads: LeadIntake::default(),
            access: AccessEvaluator::default(),
            metrics,
        })
    }

    /// Replace the default log-only lead sink.
    pub fn with_lead_sink(mut self, sink: Arc<dyn LeadSink>) -> Self {
        self.leads = LeadIntake::new(sink);
        self
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl fmt::Debug for ApiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiState")
            .field("api", &self.api)
            .field("subscription_cost", &self.roi.subscription_cost())
            .finish_non_exhaustive()
    }
}

/// Build the full router, middleware included.
pub fn router(state: Arc<ApiState>) -> Router {
    let api = state.api.clone();
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/roi", post(routes::post_roi))
        .route("/api/v1/contact", post(routes::post_contact))
        .route("/api/v1/access", post(routes::post_access))
        .fallback(routes::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::enforce_timeout,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::track_rejections,
        ))
        .layer(DefaultBodyLimit::max(api.body_limit))
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(TraceLayer::new_for_http())
        // Outermost so the trace layer already sees the headers as sensitive.
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION, COOKIE]))
        .with_state(state)
}

/// Handle to the running API server.
#[derive(Debug)]
pub struct ApiServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ApiServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

/// Bind `addr` and serve the API until [`ApiServer::shutdown`] is called.
pub fn spawn_api_server(state: Arc<ApiState>, addr: SocketAddr) -> Result<ApiServer> {
    let app = router(state);

    let listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind API listener {addr}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to configure API listener as non-blocking")?;
    let bound = listener
        .local_addr()
        .context("failed to read API listener address")?;
    let tcp_listener =
        TcpListener::from_std(listener).context("failed to create tokio listener")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(address = %bound, "api server listening");
        if let Err(err) = axum::serve(tcp_listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!(address = %bound, error = %err, "api server exited with error");
            return Err(err.into());
        }
        info!(address = %bound, "api server stopped");
        Ok(())
    });

    Ok(ApiServer {
        addr: bound,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}
