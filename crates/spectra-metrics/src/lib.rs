//! ---
//! spx_section: "03-persistence-logging"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Metrics collection and export utilities."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shared registry type used across services.
pub type SharedRegistry = Arc<Registry>;

/// Produce a new shared registry.
pub fn new_registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

/// Spawn an HTTP server that exposes the registry at `/metrics`.
pub fn spawn_http_server(registry: SharedRegistry, addr: SocketAddr) -> Result<MetricsServer> {
    let app = Router::new().route(
        "/metrics",
        get(move || metrics_handler(registry.clone())),
    );

    let std_listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind metrics listener {}", addr))?;
    std_listener
        .set_nonblocking(true)
        .context("failed to configure metrics listener as non-blocking")?;
    let bound = std_listener
        .local_addr()
        .context("failed to read metrics listener address")?;
    let listener = TcpListener::from_std(std_listener)
        .context("failed to convert std listener into tokio listener")?;

    info!(address = %bound, "metrics server starting");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .context("metrics server encountered an error")?;
        Ok(())
    });

    Ok(MetricsServer {
        addr: bound,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

/// Render every family in `registry` in the Prometheus text format.
pub fn encode_text(registry: &Registry) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .context("failed to encode metrics")?;
    String::from_utf8(buffer).context("metrics output is not valid UTF-8")
}

async fn metrics_handler(registry: SharedRegistry) -> Response {
    match encode_text(&registry) {
        Ok(body) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(prometheus::TEXT_FORMAT),
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("metrics encoding error"),
            )
                .into_response()
        }
    }
}

/// Handle to the running HTTP exporter.
#[derive(Debug)]
pub struct MetricsServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl MetricsServer {
    /// Address the exporter actually bound, useful when port 0 was requested.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Signal shutdown and await task completion.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(anyhow::Error::new(join_err)),
        }
    }
}

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    Validation,
    Conflict,
    NotFound,
    PayloadTooLarge,
    Timeout,
    Internal,
}

impl RejectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionKind::Validation => "validation",
            RejectionKind::Conflict => "conflict",
            RejectionKind::NotFound => "not_found",
            RejectionKind::PayloadTooLarge => "payload_too_large",
            RejectionKind::Timeout => "timeout",
            RejectionKind::Internal => "internal",
        }
    }
}

/// Counters recorded by the API process.
#[derive(Clone, Debug)]
pub struct ServiceMetrics {
    registry: SharedRegistry,
    starts_total: IntCounter,
    roi_computations: IntCounter,
    leads_captured: IntCounter,
    access_evaluations: IntCounter,
    rejected_requests: IntCounterVec,
    build_info: GaugeVec,
}

impl ServiceMetrics {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        let starts_total = IntCounter::with_opts(Opts::new(
            "spectra_starts_total",
            "Total number of times the Spectra API has initialised",
        ))?;
        registry.register(Box::new(starts_total.clone()))?;

        let roi_computations = IntCounter::with_opts(Opts::new(
            "spectra_roi_computations_total",
            "ROI simulations computed successfully",
        ))?;
        registry.register(Box::new(roi_computations.clone()))?;

        let leads_captured = IntCounter::with_opts(Opts::new(
            "spectra_leads_captured_total",
            "Enterprise leads accepted by the intake",
        ))?;
        registry.register(Box::new(leads_captured.clone()))?;

        let access_evaluations = IntCounter::with_opts(Opts::new(
            "spectra_access_evaluations_total",
            "Dashboard access snapshots evaluated",
        ))?;
        registry.register(Box::new(access_evaluations.clone()))?;

        let rejected_requests = IntCounterVec::new(
            Opts::new(
                "spectra_requests_rejected_total",
                "Requests answered with an error, by kind",
            ),
            &["kind"],
        )?;
        registry.register(Box::new(rejected_requests.clone()))?;

        let build_info = GaugeVec::new(
            Opts::new("spectra_build_info", "Build metadata for the running binary"),
            &["version", "environment"],
        )?;
        registry.register(Box::new(build_info.clone()))?;

        Ok(Self {
            registry,
            starts_total,
            roi_computations,
            leads_captured,
            access_evaluations,
            rejected_requests,
            build_info,
        })
    }

    /// Metrics bound to a private registry; handy for tests and tools.
    pub fn standalone() -> Result<Self> {
        Self::new(new_registry())
    }

    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    pub fn inc_start(&self) {
        self.starts_total.inc();
    }

    pub fn record_roi(&self) {
        self.roi_computations.inc();
    }

    pub fn record_lead(&self) {
        self.leads_captured.inc();
    }

    pub fn record_access_evaluation(&self) {
        self.access_evaluations.inc();
    }

    pub fn record_rejection(&self, kind: RejectionKind) {
        self.rejected_requests
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn set_build_info(&self, version: &str, environment: &str) {
        self.build_info
            .with_label_values(&[version, environment])
            .set(1.0);
    }

    pub fn roi_computations(&self) -> u64 {
        self.roi_computations.get()
    }

    pub fn leads_captured(&self) -> u64 {
        self.leads_captured.get()
    }

    pub fn access_evaluations(&self) -> u64 {
        self.access_evaluations.get()
    }

    pub fn rejections(&self, kind: RejectionKind) -> u64 {
        self.rejected_requests
            .with_label_values(&[kind.as_str()])
            .get()
    }
}

pub use prometheus;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_exported_under_service_prefix() {
        let metrics = ServiceMetrics::standalone().unwrap();
        metrics.record_roi();
        metrics.record_rejection(RejectionKind::Validation);
        metrics.record_rejection(RejectionKind::Validation);

        let text = encode_text(&metrics.registry()).unwrap();
        assert!(text.contains("spectra_roi_computations_total 1"));
        assert!(text.contains("spectra_requests_rejected_total{kind=\"validation\"} 2"));
        assert_eq!(metrics.rejections(RejectionKind::Validation), 2);
        assert_eq!(metrics.rejections(RejectionKind::Conflict), 0);
    }

    #[test]
    fn registering_twice_on_one_registry_fails() {
        let registry = new_registry();
        ServiceMetrics::new(registry.clone()).unwrap();
        assert!(ServiceMetrics::new(registry).is_err());
    }
}
