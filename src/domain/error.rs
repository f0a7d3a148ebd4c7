//! Domain error types.

use crate::domain::holdings::HoldingsError;

/// Top-level error type for stockcast.
///
/// Only the I/O edges (providers, config, holdings files, CLI arguments) produce
/// errors. Simulation and trend analysis report missing data through their
/// neutral results instead.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid history for {symbol}: {reason}")]
    InvalidHistory { symbol: String, reason: String },

    #[error(transparent)]
    HoldingsParse(#[from] HoldingsError),

    #[error("prediction horizon {days} outside {min}..={max}")]
    InvalidHorizon { days: usize, min: usize, max: usize },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for StockcastError {
    fn from(err: csv::Error) -> Self {
        StockcastError::DataSource {
            reason: format!("CSV parse error: {}", err),
        }
    }
}

impl From<serde_json::Error> for StockcastError {
    fn from(err: serde_json::Error) -> Self {
        StockcastError::DataSource {
            reason: format!("JSON parse error: {}", err),
        }
    }
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        let code: u8 = match err {
            StockcastError::Io(_) => 1,
            StockcastError::ConfigParse { .. } | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::DataSource { .. } | StockcastError::InvalidHistory { .. } => 3,
            StockcastError::HoldingsParse(_) | StockcastError::InvalidHorizon { .. } => 4,
            StockcastError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = StockcastError::ConfigInvalid {
            section: "simulation".into(),
            key: "days".into(),
            reason: "must be between 1 and 14".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [simulation] days: must be between 1 and 14"
        );
    }

    #[test]
    fn horizon_error_message() {
        let err = StockcastError::InvalidHorizon {
            days: 20,
            min: 1,
            max: 14,
        };
        assert_eq!(err.to_string(), "prediction horizon 20 outside 1..=14");
    }

    #[test]
    fn csv_error_maps_to_data_source() {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader("a,b\nc\n".as_bytes());
        let err = rdr
            .records()
            .find_map(|r| r.err())
            .expect("ragged row should fail");
        let converted: StockcastError = err.into();
        assert!(matches!(converted, StockcastError::DataSource { .. }));
    }
}
