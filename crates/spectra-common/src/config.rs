//! ---
//! spx_section: "01-core-functionality"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "Shared primitives and utilities for the Spectra services."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

/// Port used when neither the file nor `PORT` provide one.
pub const DEFAULT_PORT: u16 = 8080;

/// Twelve months of the 299 EUR plan.
pub const DEFAULT_SUBSCRIPTION_COST: f64 = 299.0 * 12.0;

fn default_environment() -> Environment {
    Environment::Development
}

fn default_api_listen() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT))
}

fn default_body_limit() -> usize {
    100 * 1024
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_subscription_cost() -> f64 {
    DEFAULT_SUBSCRIPTION_COST
}

fn default_currency() -> String {
    "EUR".to_owned()
}

/// Locale tags the currency formatter knows how to render.
pub const SUPPORTED_LOCALES: [&str; 4] = ["fr-FR", "de-DE", "en-US", "en-GB"];

fn is_supported_locale(tag: &str) -> bool {
    let tag = tag.trim().replace('_', "-");
    matches!(tag.to_ascii_lowercase().as_str(), "fr" | "de" | "en")
        || SUPPORTED_LOCALES
            .iter()
            .any(|known| known.eq_ignore_ascii_case(&tag))
}

fn default_locale() -> String {
    "fr-FR".to_owned()
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_file_logging() -> bool {
    true
}

fn default_metrics_listen() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9898))
}

/// Primary configuration object for the Spectra services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: Environment,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub roi: RoiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    /// `None` when no file was found and built-in defaults apply.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &'static str = "SPECTRA_CONFIG";
    pub const ENV_PORT: &'static str = "PORT";
    pub const ENV_ENVIRONMENT: &'static str = "SPECTRA_ENV";
    pub const ENV_SUBSCRIPTION_COST: &'static str = "ROI_SUBSCRIPTION_COST";
    pub const ENV_LOG_LEVEL: &'static str = "LOG_LEVEL";

    /// Load configuration from disk, respecting the `SPECTRA_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration together with the effective source path.
    ///
    /// An explicit `SPECTRA_CONFIG` path must exist. Candidates are optional:
    /// when none of them exists the built-in defaults are returned.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }

        debug!(
            inspected = %candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            "no configuration file found; using defaults"
        );
        Ok(LoadedAppConfig {
            config: Self::default(),
            source: None,
        })
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup.
    ///
    /// Unparseable or non-positive numeric values are ignored and the
    /// configured value is kept.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(Self::ENV_PORT)
            .and_then(|raw| raw.trim().parse::<u16>().ok())
            .filter(|port| *port > 0)
        {
            self.api.listen.set_port(port);
        }
        if let Some(environment) =
            lookup(Self::ENV_ENVIRONMENT).and_then(|raw| raw.parse::<Environment>().ok())
        {
            self.environment = environment;
        }
        if let Some(cost) = lookup(Self::ENV_SUBSCRIPTION_COST).and_then(parse_positive) {
            self.roi.subscription_cost = cost;
        }
        if let Some(level) = lookup(Self::ENV_LOG_LEVEL).filter(|raw| !raw.trim().is_empty()) {
            self.logging.level = Some(level.trim().to_owned());
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.roi.validate()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            api: ApiConfig::default(),
            roi: RoiConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_positive(raw: String) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}

/// Deployment environment; drives log verbosity and format defaults.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn default_log_level(&self) -> &'static str {
        if self.is_production() {
            "info"
        } else {
            "debug"
        }
    }

    pub fn default_log_format(&self) -> LogFormat {
        if self.is_production() {
            LogFormat::StructuredJson
        } else {
            LogFormat::Pretty
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(format!("unknown environment: {}", other)),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_listen")]
    pub listen: SocketAddr,
    /// Largest accepted request body, in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_api_listen(),
            body_limit: default_body_limit(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.body_limit == 0 {
            return Err(anyhow!("api body_limit must be greater than zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(anyhow!("api request_timeout must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiConfig {
    /// Annual subscription price the savings are compared against.
    #[serde(default = "default_subscription_cost")]
    pub subscription_cost: f64,
    /// ISO 4217 code used when rendering amounts.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// BCP 47 tag selecting separators and symbol placement.
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            subscription_cost: default_subscription_cost(),
            currency: default_currency(),
            locale: default_locale(),
        }
    }
}

impl RoiConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.subscription_cost.is_finite() || self.subscription_cost <= 0.0 {
            return Err(anyhow!(
                "roi subscription_cost must be a positive number, got {}",
                self.subscription_cost
            ));
        }
        let currency = self.currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(anyhow!(
                "roi currency '{}' is not an ISO 4217 code",
                self.currency
            ));
        }
        if !is_supported_locale(&self.locale) {
            return Err(anyhow!(
                "roi locale '{}' is not supported (expected one of {})",
                self.locale,
                SUPPORTED_LOCALES.join(", ")
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    /// Overrides the environment default (JSON in production, pretty otherwise).
    #[serde(default)]
    pub format: Option<LogFormat>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default = "default_file_logging")]
    pub file_enabled: bool,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: None,
            level: None,
            file_enabled: default_file_logging(),
            file_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Serve a standalone Prometheus exporter.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_listen")]
    pub listen: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen: default_metrics_listen(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_original_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.api.listen.port(), 8080);
        assert_eq!(config.api.body_limit, 100 * 1024);
        assert_eq!(config.roi.subscription_cost, 3588.0);
        assert_eq!(config.environment, Environment::Development);
        config.validate().unwrap();
    }

    #[test]
    fn env_overrides_replace_valid_values() {
        let mut config = AppConfig::default();
        config.apply_overrides_from(lookup(&[
            ("PORT", "9090"),
            ("SPECTRA_ENV", "production"),
            ("ROI_SUBSCRIPTION_COST", "4800"),
            ("LOG_LEVEL", "warn"),
        ]));
        assert_eq!(config.api.listen.port(), 9090);
        assert!(config.is_production());
        assert_eq!(config.roi.subscription_cost, 4800.0);
        assert_eq!(config.logging.level.as_deref(), Some("warn"));
    }

    #[test]
    fn invalid_numeric_overrides_fall_back() {
        let mut config = AppConfig::default();
        config.apply_overrides_from(lookup(&[
            ("PORT", "not-a-port"),
            ("ROI_SUBSCRIPTION_COST", "-10"),
        ]));
        assert_eq!(config.api.listen.port(), DEFAULT_PORT);
        assert_eq!(config.roi.subscription_cost, DEFAULT_SUBSCRIPTION_COST);

        config.apply_overrides_from(lookup(&[("ROI_SUBSCRIPTION_COST", "abc")]));
        assert_eq!(config.roi.subscription_cost, DEFAULT_SUBSCRIPTION_COST);
    }

    #[test]
    fn environment_selects_log_defaults() {
        assert_eq!(Environment::Production.default_log_level(), "info");
        assert_eq!(Environment::Development.default_log_level(), "debug");
        assert_eq!(
            Environment::Production.default_log_format(),
            LogFormat::StructuredJson
        );
        assert_eq!(
            Environment::Development.default_log_format(),
            LogFormat::Pretty
        );
    }

    #[test]
    fn parses_partial_toml() {
        let config: AppConfig = r#"
            environment = "production"

            [api]
            listen = "127.0.0.1:7000"
            request_timeout = 5

            [roi]
            subscription_cost = 1200.0
        "#
        .parse()
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.api.listen.port(), 7000);
        assert_eq!(config.api.request_timeout, Duration::from_secs(5));
        assert_eq!(config.api.body_limit, 100 * 1024);
        assert_eq!(config.roi.currency, "EUR");
    }

    #[test]
    fn rejects_non_positive_subscription_cost() {
        let err = "[roi]\nsubscription_cost = 0.0\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("subscription_cost"));
    }

    #[test]
    fn rejects_unknown_locale() {
        let err = "[roi]\nlocale = \"xx-YY\"\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("xx-YY"));
    }

    #[test]
    fn accepts_locale_spellings() {
        for locale in ["fr-FR", "de_DE", "en", "EN-gb"] {
            let config = RoiConfig {
                locale: locale.to_owned(),
                ..RoiConfig::default()
            };
            assert!(config.validate().is_ok(), "{locale} should be accepted");
        }
    }
}
