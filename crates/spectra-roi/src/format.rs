//! ---
//! spx_section: "08-pricing-calculators"
//! spx_subsection: "module"
//! spx_type: "source"
//! spx_scope: "code"
//! spx_description: "ROI calculation and formatting routines."
//! spx_version: "v0.1.0"
//! spx_owner: "tbd"
//! ---
use std::str::FromStr;

use crate::errors::{Result, RoiError};

/// Locales with known separator and symbol conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    FrFr,
    DeDe,
    EnUs,
    EnGb,
}

struct LocaleRules {
    group_separator: &'static str,
    symbol_first: bool,
    symbol_gap: &'static str,
}

impl Locale {
    fn rules(self) -> LocaleRules {
        match self {
            // Narrow no-break space between groups, no-break space before the symbol.
            Locale::FrFr => LocaleRules {
                group_separator: "\u{202F}",
                symbol_first: false,
                symbol_gap: "\u{00A0}",
            },
            Locale::DeDe => LocaleRules {
                group_separator: ".",
                symbol_first: false,
                symbol_gap: "\u{00A0}",
            },
            Locale::EnUs | Locale::EnGb => LocaleRules {
                group_separator: ",",
                symbol_first: true,
                symbol_gap: "",
            },
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Locale::FrFr => "fr-FR",
            Locale::DeDe => "de-DE",
            Locale::EnUs => "en-US",
            Locale::EnGb => "en-GB",
        }
    }
}

impl FromStr for Locale {
    type Err = RoiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "fr" | "fr-fr" => Ok(Locale::FrFr),
            "de" | "de-de" => Ok(Locale::DeDe),
            "en" | "en-us" => Ok(Locale::EnUs),
            "en-gb" => Ok(Locale::EnGb),
            _ => Err(RoiError::UnsupportedLocale(s.to_owned())),
        }
    }
}

/// Whole-unit currency formatter (no fraction digits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    locale: Locale,
    currency: String,
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self {
            locale: Locale::FrFr,
            currency: "EUR".to_owned(),
        }
    }
}

impl CurrencyFormatter {
    pub fn new(locale: &str, currency: &str) -> Result<Self> {
        let currency = currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RoiError::InvalidCurrency(currency.to_owned()));
        }
        Ok(Self {
            locale: locale.parse()?,
            currency: currency.to_ascii_uppercase(),
        })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    fn symbol(&self) -> &str {
        match self.currency.as_str() {
            "EUR" => "€",
            "USD" => "$",
            "GBP" => "£",
            "JPY" => "¥",
            other => other,
        }
    }

    /// Render `amount` rounded half away from zero to whole units.
    pub fn format(&self, amount: f64) -> String {
        let rules = self.locale.rules();
        let rounded = amount.round();
        let digits = if rounded.is_finite() {
            group_digits(&format!("{:.0}", rounded.abs()), rules.group_separator)
        } else {
            "∞".to_owned()
        };
        let sign = if rounded < 0.0 { "-" } else { "" };
        let symbol = self.symbol();
        if rules.symbol_first {
            format!("{sign}{symbol}{}{digits}", rules.symbol_gap)
        } else {
            format!("{sign}{digits}{}{symbol}", rules.symbol_gap)
        }
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3 * separator.len());
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Return multiple with one decimal, e.g. `250.8x`. Ties round away from
/// zero (`0.25` gives `0.3x`).
pub fn format_multiple(multiple: f64) -> String {
    format!("{:.1}x", (multiple * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn french_euro_layout() {
        let formatter = CurrencyFormatter::default();
        assert_eq!(formatter.format(75_000.0), "75\u{202F}000\u{00A0}€");
        assert_eq!(formatter.format(900_000.4), "900\u{202F}000\u{00A0}€");
        assert_eq!(formatter.format(999.5), "1\u{202F}000\u{00A0}€");
        assert_eq!(formatter.format(42.0), "42\u{00A0}€");
    }

    #[test]
    fn english_layout_places_symbol_first() {
        let formatter = CurrencyFormatter::new("en-US", "usd").unwrap();
        assert_eq!(formatter.format(1_234_567.0), "$1,234,567");
        assert_eq!(formatter.format(-1_500.0), "-$1,500");
    }

    #[test]
    fn german_layout_uses_dots() {
        let formatter = CurrencyFormatter::new("de_DE", "EUR").unwrap();
        assert_eq!(formatter.format(12_345.0), "12.345\u{00A0}€");
    }

    #[test]
    fn unknown_currency_falls_back_to_code() {
        let formatter = CurrencyFormatter::new("fr-FR", "CHF").unwrap();
        assert_eq!(formatter.format(10.0), "10\u{00A0}CHF");
    }

    #[test]
    fn rejects_bad_settings() {
        assert_eq!(
            CurrencyFormatter::new("xx-YY", "EUR").unwrap_err(),
            RoiError::UnsupportedLocale("xx-YY".into())
        );
        assert!(matches!(
            CurrencyFormatter::new("fr-FR", "EURO"),
            Err(RoiError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn multiple_has_one_decimal() {
        assert_eq!(format_multiple(900_000.0 / 3_588.0), "250.8x");
        assert_eq!(format_multiple(2.0), "2.0x");
    }

    #[test]
    fn every_configurable_locale_parses() {
        for tag in spectra_common::config::SUPPORTED_LOCALES {
            let locale: Locale = tag.parse().unwrap();
            assert_eq!(locale.tag(), tag);
        }
    }

    #[test]
    fn multiple_ties_round_up() {
        assert_eq!(format_multiple(0.25), "0.3x");
        assert_eq!(format_multiple(1.25), "1.3x");
        assert_eq!(format_multiple(0.75), "0.8x");
    }
}
