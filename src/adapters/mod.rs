//! Concrete adapter implementations for ports.

pub mod console_report;
pub mod csv_adapter;
pub mod fallback_adapter;
pub mod file_config_adapter;
#[cfg(feature = "fmp")]
pub mod fmp_adapter;
#[cfg(feature = "portfolio-url")]
pub mod portfolio_page_adapter;
