//! ---
//! spx_section: "08-pricing-calculators"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "ROI calculation and formatting routines."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
pub mod errors;
pub mod format;
pub mod model;

use spectra_common::config::{RoiConfig, DEFAULT_SUBSCRIPTION_COST};
use spectra_common::ValidationError;
use tracing::debug;

pub use errors::{Result, RoiError};
pub use format::{format_multiple, CurrencyFormatter, Locale};
pub use model::{FormattedRoi, RoiInput, RoiRequest, RoiResult, OPTIMIZATION_CEILING};

const MONTHS_PER_YEAR: f64 = 12.0;

/// Savings calculator bound to a subscription price and a display format.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiCalculator {
    subscription_cost: f64,
    formatter: CurrencyFormatter,
}

impl Default for RoiCalculator {
    fn default() -> Self {
        Self {
            subscription_cost: DEFAULT_SUBSCRIPTION_COST,
            formatter: CurrencyFormatter::default(),
        }
    }
}

impl RoiCalculator {
    pub fn new(subscription_cost: f64, formatter: CurrencyFormatter) -> Result<Self> {
        if !subscription_cost.is_finite() || subscription_cost <= 0.0 {
            return Err(RoiError::InvalidSubscriptionCost(subscription_cost));
        }
        Ok(Self {
            subscription_cost,
            formatter,
        })
    }

    pub fn from_config(config: &RoiConfig) -> Result<Self> {
        let formatter = CurrencyFormatter::new(&config.locale, &config.currency)?;
        Self::new(config.subscription_cost, formatter)
    }

    pub fn subscription_cost(&self) -> f64 {
        self.subscription_cost
    }

    pub fn formatter(&self) -> &CurrencyFormatter {
        &self.formatter
    }

    /// Monthly and annual savings from recovering part of the spread, and
    /// how many times the annual saving covers the subscription.
    pub fn compute(&self, input: &RoiInput) -> std::result::Result<RoiResult, ValidationError> {
        input.validate()?;

        let spread_reduction = input.spread * input.optimization;
        let monthly_saving = input.volume * spread_reduction;
        let annual_saving = monthly_saving * MONTHS_PER_YEAR;
        let roi_multiple = annual_saving / self.subscription_cost;

        debug!(
            volume = input.volume,
            spread = input.spread,
            optimization = input.optimization,
            monthly_saving,
            roi_multiple,
            "roi computed"
        );

        Ok(RoiResult {
            monthly_saving,
            annual_saving,
            roi_multiple,
            formatted: FormattedRoi {
                monthly_saving: self.formatter.format(monthly_saving),
                annual_saving: self.formatter.format(annual_saving),
                roi_multiple: format_multiple(roi_multiple),
            },
        })
    }
}

/// Compute with the default subscription cost and `fr-FR` euro formatting.
pub fn compute_roi(input: &RoiInput) -> std::result::Result<RoiResult, ValidationError> {
    RoiCalculator::default().compute(input)
}
