//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_report::{self, AnalysisReport};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::fallback_adapter::{FallbackAdapter, SharedProvider};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::SymbolAnalyzer;
use crate::domain::error::StockcastError;
use crate::domain::holdings::{parse_holdings_csv, parse_holdings_html, validate_portfolio_url, Holding};
use crate::domain::portfolio::{analyze_portfolio, PortfolioOptions};
use crate::domain::random::RngSource;
use crate::domain::settings::{validate_horizon, ProviderKind, Settings};

#[derive(Parser, Debug)]
#[command(name = "stockcast", about = "Short-horizon stock price simulation and trend analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Simulate and analyze one symbol
    Analyze {
        #[arg(short, long)]
        symbol: String,
        /// Prediction horizon in trading days (1-14)
        #[arg(short, long)]
        days: Option<usize>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Analyze every holding in a broker export or public portfolio page
    Portfolio {
        /// Broker CSV export, or a saved portfolio page (.html)
        #[arg(long, required_unless_present = "url", conflicts_with = "url")]
        holdings: Option<PathBuf>,
        /// Public portfolio page URL
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long)]
        days: Option<usize>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Show recent news for a symbol
    News {
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            symbol,
            days,
            config,
            seed,
            json,
        } => run_analyze(&symbol, days, config.as_deref(), seed, json),
        Command::Portfolio {
            holdings,
            url,
            days,
            config,
            seed,
            json,
        } => {
            let source = match (holdings, url) {
                (Some(path), _) => HoldingsSource::File(path),
                (None, Some(url)) => HoldingsSource::Url(url),
                (None, None) => {
                    return fail(StockcastError::ConfigInvalid {
                        section: "portfolio".into(),
                        key: "holdings".into(),
                        reason: "either --holdings or --url is required".into(),
                    })
                }
            };
            run_portfolio(&source, days, config.as_deref(), seed, json)
        }
        Command::News {
            symbol,
            limit,
            config,
        } => run_news(&symbol, limit, config.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: StockcastError) -> ExitCode {
    eprintln!("error: {err}");
    (&err).into()
}

/// Load settings from an optional INI file plus `STOCKCAST_*` environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, StockcastError> {
    let adapter = match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p).map_err(|e| StockcastError::ConfigParse {
                file: p.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => FileConfigAdapter::empty(),
    };
    Settings::from_config(&adapter.with_env())
}

/// Build the provider chain in configured order.
pub fn build_provider(settings: &Settings) -> Result<FallbackAdapter, StockcastError> {
    let mut providers: Vec<SharedProvider> = Vec::with_capacity(settings.providers.len());
    for kind in &settings.providers {
        match kind {
            ProviderKind::Csv => {
                providers.push(Box::new(CsvAdapter::new(PathBuf::from(&settings.csv_dir))));
            }
            ProviderKind::Fmp => providers.push(build_fmp(settings)?),
        }
    }
    Ok(FallbackAdapter::new(providers))
}

#[cfg(feature = "fmp")]
fn build_fmp(settings: &Settings) -> Result<SharedProvider, StockcastError> {
    use crate::adapters::fmp_adapter::FmpAdapter;
    let adapter = FmpAdapter::new(
        settings.fmp_api_key.clone(),
        settings.fmp_base_url.clone(),
        settings.timeout_secs,
    )?;
    Ok(Box::new(adapter))
}

#[cfg(not(feature = "fmp"))]
fn build_fmp(_settings: &Settings) -> Result<SharedProvider, StockcastError> {
    Err(StockcastError::ConfigInvalid {
        section: "data".into(),
        key: "provider".into(),
        reason: "fmp feature is required for the fmp provider".into(),
    })
}

fn setup(config: Option<&Path>, days: Option<usize>) -> Result<(Settings, FallbackAdapter, usize), StockcastError> {
    let settings = load_settings(config)?;
    let days = validate_horizon(days.unwrap_or(settings.days))?;
    let provider = build_provider(&settings)?;
    Ok((settings, provider, days))
}

fn run_analyze(symbol: &str, days: Option<usize>, config: Option<&Path>, seed: Option<u64>, json: bool) -> ExitCode {
    let (settings, provider, days) = match setup(config, days) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    eprintln!("Analyzing {} over {} days...", symbol.to_uppercase(), days);
    let rng = RngSource::from_optional_seed(seed.or(settings.seed));
    let mut analyzer =
        SymbolAnalyzer::new(symbol, &provider, rng).with_history_days(settings.history_days);
    let result = analyzer.result(days);
    let series = analyzer.combined_series(days);

    if json {
        match console_report::to_json(&AnalysisReport::new(&result, &series)) {
            Ok(text) => println!("{text}"),
            Err(e) => return fail(e),
        }
    } else {
        print!("{}", console_report::render_analysis(&result, &series));
    }

    if !result.has_data() {
        return fail(StockcastError::NoData {
            symbol: result.symbol,
        });
    }
    ExitCode::SUCCESS
}

/// Where the portfolio command reads holdings from.
#[derive(Debug, Clone, PartialEq)]
pub enum HoldingsSource {
    File(PathBuf),
    Url(String),
}

/// Read holdings from a CSV export, a saved `.html`/`.htm` page, or a page URL.
pub fn load_holdings(source: &HoldingsSource, settings: &Settings) -> Result<Vec<Holding>, StockcastError> {
    match source {
        HoldingsSource::File(path) => {
            eprintln!("Loading holdings from {}", path.display());
            let content = fs::read_to_string(path)?;
            let is_html = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
            let holdings = if is_html {
                parse_holdings_html(&content)?
            } else {
                parse_holdings_csv(&content)?
            };
            Ok(holdings)
        }
        HoldingsSource::Url(url) => {
            validate_portfolio_url(url)?;
            eprintln!("Loading holdings from {}", url);
            fetch_page_holdings(url, settings)
        }
    }
}

#[cfg(feature = "portfolio-url")]
fn fetch_page_holdings(url: &str, settings: &Settings) -> Result<Vec<Holding>, StockcastError> {
    use crate::adapters::portfolio_page_adapter::PortfolioPageAdapter;
    PortfolioPageAdapter::new(settings.timeout_secs)?.fetch_holdings(url)
}

#[cfg(not(feature = "portfolio-url"))]
fn fetch_page_holdings(_url: &str, _settings: &Settings) -> Result<Vec<Holding>, StockcastError> {
    Err(StockcastError::ConfigInvalid {
        section: "portfolio".into(),
        key: "url".into(),
        reason: "portfolio-url feature is required to fetch portfolio pages".into(),
    })
}

fn run_portfolio(source: &HoldingsSource, days: Option<usize>, config: Option<&Path>, seed: Option<u64>, json: bool) -> ExitCode {
    let (settings, provider, days) = match setup(config, days) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    let holdings = match load_holdings(source, &settings) {
        Ok(h) => h,
        Err(e) => return fail(e),
    };
    eprintln!("Analyzing {} holdings over {} days...", holdings.len(), days);

    let options = PortfolioOptions {
        days,
        history_days: settings.history_days,
        seed: seed.or(settings.seed),
        parallel: settings.parallel,
    };
    let summary = match analyze_portfolio(&holdings, &provider, &options) {
        Some(s) => s,
        None => {
            return fail(StockcastError::NoData {
                symbol: "portfolio".into(),
            })
        }
    };

    if json {
        match console_report::to_json(&summary) {
            Ok(text) => println!("{text}"),
            Err(e) => return fail(e),
        }
    } else {
        print!("{}", console_report::render_portfolio(&summary));
    }

    if summary.holdings.is_empty() {
        return fail(StockcastError::NoData {
            symbol: "portfolio".into(),
        });
    }
    ExitCode::SUCCESS
}

fn run_news(symbol: &str, limit: usize, config: Option<&Path>) -> ExitCode {
    let settings = match load_settings(config) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let provider = match build_provider(&settings) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let analyzer = SymbolAnalyzer::new(symbol, &provider, RngSource::from_optional_seed(settings.seed));
    let items = analyzer.news(limit);
    print!("{}", console_report::render_news(analyzer.symbol(), &items));
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let settings = match load_settings(Some(config_path)) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    let provider = match build_provider(&settings) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let names: Vec<&str> = provider.providers().collect();
    println!("Configuration valid");
    println!("  providers:    {}", names.join(", "));
    println!("  history days: {}", settings.history_days);
    println!("  horizon:      {}", settings.days);
    match settings.seed {
        Some(seed) => println!("  seed:         {}", seed),
        None => println!("  seed:         (entropy)"),
    }
    if settings.providers.contains(&ProviderKind::Fmp) && settings.fmp_api_key.is_none() {
        eprintln!("warning: fmp provider configured without an API key (set FMP_API_KEY)");
    }
    ExitCode::SUCCESS
}
