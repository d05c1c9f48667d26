//! ---
//! spx_section: "01-core-functionality"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Shared primitives and utilities for the Spectra services."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use anyhow::Result;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Environment, LoggingConfig};

const LOG_ENV: &str = "SPECTRA_LOG";

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
static STDOUT_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Available log formats for the services.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

/// Resolve the filter directive: `SPECTRA_LOG`, then `RUST_LOG`, then the
/// configured level, then the environment default.
fn resolve_filter(config: &LoggingConfig, environment: Environment) -> EnvFilter {
    let fallback = config
        .level
        .clone()
        .unwrap_or_else(|| environment.default_log_level().to_owned());
    let fallback_filter = || {
        EnvFilter::try_new(&fallback).unwrap_or_else(|err| {
            eprintln!("invalid log level '{}' ({}); using info", fallback, err);
            EnvFilter::new("info")
        })
    };

    match std::env::var(LOG_ENV) {
        Ok(directive) => EnvFilter::try_new(directive).unwrap_or_else(|err| {
            eprintln!("invalid {} directive ({}); using configured level", LOG_ENV, err);
            fallback_filter()
        }),
        Err(_) => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter()),
    }
}

/// Initialize the tracing subscriber based on configuration and environment variables.
///
/// Production emits structured JSON on stdout, development a pretty
/// human-readable stream. When file logging is enabled a daily rolling JSON
/// file is written under `config.directory` as well.
pub fn init_tracing(
    service_name: &str,
    config: &LoggingConfig,
    environment: Environment,
) -> Result<()> {
    let format = config
        .format
        .unwrap_or_else(|| environment.default_log_format());
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let _ = STDOUT_GUARD.set(stdout_guard);

    let fmt_layer = match format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .json()
            .with_writer(stdout_writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(stdout_writer)
            .boxed(),
    };

    let file_layer = if config.file_enabled {
        std::fs::create_dir_all(&config.directory)?;
        let prefix = config
            .file_prefix
            .clone()
            .unwrap_or_else(|| service_name.to_owned());
        let file_appender = daily(&config.directory, format!("{}.log", prefix));
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        let _ = FILE_GUARD.set(file_guard);
        Some(
            fmt::layer()
                .with_target(true)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .json()
                .with_writer(file_writer)
                .boxed(),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(resolve_filter(config, environment))
        .with(fmt_layer)
        .with(file_layer)
        .try_init()
        .ok();

    info!(
        service = %service_name,
        environment = ?environment,
        format = ?format,
        file_logging = config.file_enabled,
        "tracing initialised"
    );
    Ok(())
}
