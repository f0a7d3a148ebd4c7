//! Typed settings resolved from a [`ConfigPort`], validated before any fetch.

use crate::domain::analysis::DEFAULT_HISTORY_DAYS;
use crate::domain::error::StockcastError;
use crate::ports::config_port::ConfigPort;

pub const MIN_HORIZON: usize = 1;
pub const MAX_HORIZON: usize = 14;
pub const DEFAULT_HORIZON: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CSV_DIR: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Csv,
    Fmp,
}

impl ProviderKind {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "csv" => Some(ProviderKind::Csv),
            "fmp" => Some(ProviderKind::Fmp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Providers in fallback order.
    pub providers: Vec<ProviderKind>,
    pub csv_dir: String,
    pub history_days: usize,
    pub fmp_api_key: Option<String>,
    pub fmp_base_url: Option<String>,
    pub timeout_secs: u64,
    pub days: usize,
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            providers: vec![ProviderKind::Csv],
            csv_dir: DEFAULT_CSV_DIR.to_string(),
            history_days: DEFAULT_HISTORY_DAYS,
            fmp_api_key: None,
            fmp_base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            days: DEFAULT_HORIZON,
            seed: None,
            parallel: false,
        }
    }
}

impl Settings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockcastError> {
        let providers = parse_providers(config)?;
        let history_days = config.get_int("data", "history_days", DEFAULT_HISTORY_DAYS as i64);
        if history_days < 2 {
            return Err(invalid("data", "history_days", "history_days must be at least 2"));
        }

        let timeout_secs = config.get_int("fmp", "timeout_secs", DEFAULT_TIMEOUT_SECS as i64);
        if timeout_secs <= 0 {
            return Err(invalid("fmp", "timeout_secs", "timeout_secs must be positive"));
        }

        let days = config.get_int("simulation", "days", DEFAULT_HORIZON as i64);
        let days = validate_horizon(usize::try_from(days).unwrap_or(0)).map_err(|_| {
            invalid(
                "simulation",
                "days",
                &format!("days must be between {} and {}", MIN_HORIZON, MAX_HORIZON),
            )
        })?;

        let seed = match config.get_string("simulation", "seed") {
            None => None,
            Some(s) if s.trim().is_empty() => None,
            Some(s) => Some(
                s.trim()
                    .parse::<u64>()
                    .map_err(|_| invalid("simulation", "seed", "seed must be a non-negative integer"))?,
            ),
        };

        Ok(Self {
            providers,
            csv_dir: config
                .get_string("data", "csv_dir")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string()),
            history_days: history_days as usize,
            fmp_api_key: config
                .get_string("fmp", "api_key")
                .filter(|s| !s.trim().is_empty()),
            fmp_base_url: config
                .get_string("fmp", "base_url")
                .filter(|s| !s.trim().is_empty()),
            timeout_secs: timeout_secs as u64,
            days,
            seed,
            parallel: config.get_bool("portfolio", "parallel", false),
        })
    }
}

/// Horizons are caller-enforced to 1..=14.
pub fn validate_horizon(days: usize) -> Result<usize, StockcastError> {
    if (MIN_HORIZON..=MAX_HORIZON).contains(&days) {
        Ok(days)
    } else {
        Err(StockcastError::InvalidHorizon {
            days,
            min: MIN_HORIZON,
            max: MAX_HORIZON,
        })
    }
}

fn parse_providers(config: &dyn ConfigPort) -> Result<Vec<ProviderKind>, StockcastError> {
    let raw = config
        .get_string("data", "provider")
        .unwrap_or_else(|| "csv".to_string());
    let mut providers = Vec::new();
    for name in raw.split(',').filter(|s| !s.trim().is_empty()) {
        let kind = ProviderKind::parse(name).ok_or_else(|| {
            invalid("data", "provider", &format!("unknown provider '{}'", name.trim()))
        })?;
        if !providers.contains(&kind) {
            providers.push(kind);
        }
    }
    if providers.is_empty() {
        return Err(invalid("data", "provider", "at least one provider is required"));
    }
    Ok(providers)
}

fn invalid(section: &str, key: &str, reason: &str) -> StockcastError {
    StockcastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(pairs: &[(&str, &str, &str)]) -> Self {
            Self(
                pairs
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }
        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
            self.get_string(section, key)
                .map(|v| v == "true")
                .unwrap_or(default)
        }
    }

    #[test]
    fn defaults_when_empty() {
        let settings = Settings::from_config(&MapConfig::new(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn reads_all_sections() {
        let config = MapConfig::new(&[
            ("data", "provider", "fmp, csv"),
            ("data", "csv_dir", "/tmp/prices"),
            ("data", "history_days", "60"),
            ("fmp", "api_key", "k"),
            ("fmp", "timeout_secs", "3"),
            ("simulation", "days", "7"),
            ("simulation", "seed", "99"),
            ("portfolio", "parallel", "true"),
        ]);
        let settings = Settings::from_config(&config).unwrap();
        assert_eq!(settings.providers, vec![ProviderKind::Fmp, ProviderKind::Csv]);
        assert_eq!(settings.csv_dir, "/tmp/prices");
        assert_eq!(settings.history_days, 60);
        assert_eq!(settings.fmp_api_key.as_deref(), Some("k"));
        assert_eq!(settings.timeout_secs, 3);
        assert_eq!(settings.days, 7);
        assert_eq!(settings.seed, Some(99));
        assert!(settings.parallel);
    }

    #[test]
    fn rejects_unknown_provider() {
        let config = MapConfig::new(&[("data", "provider", "yahoo")]);
        assert!(matches!(
            Settings::from_config(&config),
            Err(StockcastError::ConfigInvalid { key, .. }) if key == "provider"
        ));
    }

    #[test]
    fn rejects_short_history() {
        let config = MapConfig::new(&[("data", "history_days", "1")]);
        assert!(Settings::from_config(&config).is_err());
    }

    #[test]
    fn rejects_horizon_out_of_range() {
        for bad in ["0", "15", "-3"] {
            let config = MapConfig::new(&[("simulation", "days", bad)]);
            assert!(Settings::from_config(&config).is_err(), "days = {bad}");
        }
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = MapConfig::new(&[("fmp", "timeout_secs", "0")]);
        assert!(Settings::from_config(&config).is_err());
    }

    #[test]
    fn rejects_bad_seed() {
        let config = MapConfig::new(&[("simulation", "seed", "abc")]);
        assert!(Settings::from_config(&config).is_err());
    }

    #[test]
    fn horizon_bounds() {
        assert_eq!(validate_horizon(1).unwrap(), 1);
        assert_eq!(validate_horizon(14).unwrap(), 14);
        assert!(matches!(
            validate_horizon(15),
            Err(StockcastError::InvalidHorizon { days: 15, min: 1, max: 14 })
        ));
    }
}
