//! Shop configuration loaded from environment variables.

use std::collections::{BTreeMap, HashSet};

use domain::{CheckoutPolicy, TaxRate, TaxService};

use crate::ConfigError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Shop configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `SHOP_LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `SHOP_DEFAULT_TAX_BPS`: tax rate for countries without their own rate,
///   in basis points (default: `0`)
/// - `SHOP_TAX_RATES`: per-country rates, e.g. `UK=2000,IE=2300`
///   (default: `UK=2000`)
/// - `SHOP_SHIPPING_COUNTRIES`: country codes the shop ships to, e.g.
///   `UK,IE`; unset or empty ships anywhere
#[derive(Debug, Clone, PartialEq)]
pub struct ShopConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    pub default_tax: TaxRate,
    pub tax_rates: BTreeMap<String, TaxRate>,
    pub shipping_countries: Option<HashSet<String>>,
}

impl ShopConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_format = match lookup("SHOP_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") => defaults.log_format,
            Some(f) if f.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        let default_tax = match lookup("SHOP_DEFAULT_TAX_BPS") {
            Some(value) => parse_bps("SHOP_DEFAULT_TAX_BPS", &value)?,
            None => defaults.default_tax,
        };

        let tax_rates = match lookup("SHOP_TAX_RATES") {
            Some(value) => parse_rates(&value)?,
            None => defaults.tax_rates,
        };

        let shipping_countries = lookup("SHOP_SHIPPING_COUNTRIES").and_then(|value| {
            let codes: HashSet<String> = value
                .split(',')
                .map(|code| code.trim().to_uppercase())
                .filter(|code| !code.is_empty())
                .collect();
            (!codes.is_empty()).then_some(codes)
        });

        Ok(Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format,
            default_tax,
            tax_rates,
            shipping_countries,
        })
    }

    /// Builds the tax service for these rates.
    pub fn tax_service(&self) -> TaxService {
        self.tax_rates
            .iter()
            .fold(TaxService::new(self.default_tax), |service, (code, rate)| {
                service.with_rate(code, *rate)
            })
    }

    /// Builds the checkout policy.
    pub fn checkout_policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            shipping_countries: self.shipping_countries.clone(),
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            default_tax: TaxRate::zero(),
            tax_rates: BTreeMap::from([("UK".to_string(), TaxRate::from_percent(20))]),
            shipping_countries: None,
        }
    }
}

fn parse_bps(var: &'static str, value: &str) -> Result<TaxRate, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .map(TaxRate::from_basis_points)
        .map_err(|_| ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        })
}

fn parse_rates(value: &str) -> Result<BTreeMap<String, TaxRate>, ConfigError> {
    let mut rates = BTreeMap::new();
    for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let invalid = || ConfigError::InvalidEntry {
            var: "SHOP_TAX_RATES",
            entry: entry.to_string(),
        };
        let (code, bps) = entry.split_once('=').ok_or_else(invalid)?;
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(invalid());
        }
        let rate = bps
            .trim()
            .parse::<u32>()
            .map(TaxRate::from_basis_points)
            .map_err(|_| invalid())?;
        rates.insert(code, rate);
    }
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ShopConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ShopConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[]).unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.tax_service().rate_for("UK").basis_points(), 2000);
        assert!(config.checkout_policy().ships_to("ANYWHERE"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("RUST_LOG", "debug"),
            ("SHOP_LOG_FORMAT", "JSON"),
            ("SHOP_DEFAULT_TAX_BPS", "500"),
            ("SHOP_TAX_RATES", "uk=2000, ie=2300"),
            ("SHOP_SHIPPING_COUNTRIES", "uk, ie"),
        ])
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        let tax = config.tax_service();
        assert_eq!(tax.rate_for("IE").basis_points(), 2300);
        assert_eq!(tax.rate_for("FR").basis_points(), 500);
        let policy = config.checkout_policy();
        assert!(policy.ships_to("IE"));
        assert!(!policy.ships_to("FR"));
    }

    #[test]
    fn test_empty_shipping_list_ships_anywhere() {
        let config = load(&[("SHOP_SHIPPING_COUNTRIES", " , ")]).unwrap();
        assert_eq!(config.shipping_countries, None);
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert_eq!(
            load(&[("SHOP_DEFAULT_TAX_BPS", "twenty")]),
            Err(ConfigError::InvalidNumber {
                var: "SHOP_DEFAULT_TAX_BPS",
                value: "twenty".to_string()
            })
        );
        assert!(matches!(
            load(&[("SHOP_TAX_RATES", "UK:2000")]),
            Err(ConfigError::InvalidEntry { .. })
        ));
        assert!(matches!(
            load(&[("SHOP_TAX_RATES", "=2000")]),
            Err(ConfigError::InvalidEntry { .. })
        ));
        assert_eq!(
            load(&[("SHOP_LOG_FORMAT", "xml")]),
            Err(ConfigError::InvalidLogFormat("xml".to_string()))
        );
    }
}
