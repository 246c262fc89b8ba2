use analytics::{AnalyticsEngine, AnalyticsError, BatchReport};
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::{Config, load_config};
use core_types::PriceTable;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use price_provider::{CsvDirectoryProvider, PriceHistoryProvider};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod render;

/// The main entry point for the FinSight analysis tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so that `--json` output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Return, risk and correlation analysis for a batch of stock symbols.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the daily price history of several symbols.
    Analyze(AnalyzeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Comma-separated symbols to analyze (e.g., "AAPL,MSFT,GOOGL").
    #[arg(long, value_delimiter = ',', required = true)]
    symbols: Vec<String>,

    /// The first day of the analysis window (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// The last day of the analysis window (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,

    /// Benchmark symbol for beta and alpha. Overrides the configured one.
    #[arg(long)]
    benchmark: Option<String>,

    /// Skip beta and alpha even if a benchmark is configured.
    #[arg(long, conflicts_with = "benchmark")]
    no_benchmark: bool,

    /// Directory holding one `<SYMBOL>.csv` file per symbol.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to the TOML configuration file. A missing file is not an error.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Amount invested in each asset for the cumulative value projection.
    #[arg(long)]
    principal: Option<Decimal>,

    /// Run the Monte Carlo price projection.
    #[arg(long)]
    simulate: bool,

    /// Number of simulated paths per asset.
    #[arg(long)]
    paths: Option<usize>,

    /// Simulation horizon in trading days.
    #[arg(long)]
    horizon: Option<usize>,

    /// Seed for reproducible simulations.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

impl AnalyzeArgs {
    /// Layers the command-line flags over the loaded configuration.
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(benchmark) = &self.benchmark {
            config.analysis.benchmark = Some(benchmark.clone());
        }
        if self.no_benchmark {
            config.analysis.benchmark = None;
        }
        if let Some(principal) = self.principal {
            config.analysis.principal = principal;
        }
        if let Some(dir) = &self.data_dir {
            config.data.data_dir = dir.clone();
        }
        if self.simulate {
            config.monte_carlo.enabled = true;
        }
        if let Some(paths) = self.paths {
            config.monte_carlo.paths = paths;
        }
        if let Some(horizon) = self.horizon {
            config.monte_carlo.horizon_days = horizon;
        }
        if let Some(seed) = self.seed {
            config.monte_carlo.seed = Some(seed);
        }
    }
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

/// A symbol the provider could not deliver.
#[derive(Debug)]
struct FetchFailure {
    symbol: String,
    reason: String,
}

/// Everything the provider delivered for one run.
struct Fetched {
    tables: Vec<PriceTable>,
    failures: Vec<FetchFailure>,
    benchmark: Option<PriceTable>,
    benchmark_failure: Option<FetchFailure>,
}

/// Handles the orchestration of fetch, analysis and presentation.
async fn handle_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    if args.from > args.to {
        anyhow::bail!("--from ({}) must not be after --to ({})", args.from, args.to);
    }

    let mut config = load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid settings after command-line overrides")?;

    let symbols = dedup_symbols(&args.symbols);
    tracing::info!(
        symbols = ?symbols,
        from = %args.from,
        to = %args.to,
        data_dir = %config.data.data_dir.display(),
        "Starting analysis."
    );

    let provider = CsvDirectoryProvider::new(&config.data.data_dir);
    let benchmark_symbol = config.analysis.benchmark.clone();
    let fetched = fetch_all(
        &provider,
        &symbols,
        benchmark_symbol.as_deref(),
        args.from,
        args.to,
    )
    .await;

    let engine = AnalyticsEngine::new(config.analysis.clone(), config.monte_carlo.clone());
    let mut report = match engine.analyze(&fetched.tables, fetched.benchmark.as_ref()) {
        Ok(report) => report,
        Err(AnalyticsError::NotEnoughAssets {
            required,
            available,
            failed,
        }) => {
            let mut all_failed: Vec<String> =
                fetched.failures.iter().map(|f| f.symbol.clone()).collect();
            all_failed.extend(failed);
            anyhow::bail!(
                "Only {available} of the requested symbols could be analyzed, at least {required} are required. Failed: {}",
                all_failed.join(", ")
            );
        }
        Err(e) => return Err(e.into()),
    };
    record_fetch_failures(&mut report, fetched);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render::print_report(&report, benchmark_symbol.as_deref());
    }
    Ok(())
}

/// Fetches every symbol and the benchmark concurrently.
async fn fetch_all(
    provider: &dyn PriceHistoryProvider,
    symbols: &[String],
    benchmark: Option<&str>,
    from: NaiveDate,
    to: NaiveDate,
) -> Fetched {
    let total = symbols.len() + usize::from(benchmark.is_some());
    let progress_bar = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        progress_bar.set_style(style.progress_chars("#>-"));
    }

    let fetch = |symbol: String| {
        let pb = progress_bar.clone();
        async move {
            let result = provider.fetch_history(&symbol, from, to).await;
            pb.inc(1);
            pb.set_message(format!("Fetched {symbol}"));
            (symbol, result)
        }
    };

    let asset_tasks = join_all(symbols.iter().cloned().map(fetch));
    let benchmark_task = async {
        match benchmark {
            Some(symbol) => Some(fetch(symbol.to_string()).await),
            None => None,
        }
    };
    let (results, benchmark_result) = futures::join!(asset_tasks, benchmark_task);
    progress_bar.finish_and_clear();

    let mut tables = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (symbol, result) in results {
        match result {
            Ok(table) => tables.push(table),
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Failed to fetch price history.");
                failures.push(FetchFailure {
                    symbol,
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut benchmark = None;
    let mut benchmark_failure = None;
    match benchmark_result {
        Some((_, Ok(table))) => benchmark = Some(table),
        Some((symbol, Err(e))) => {
            tracing::warn!(benchmark = %symbol, error = %e, "Failed to fetch benchmark history.");
            benchmark_failure = Some(FetchFailure {
                symbol,
                reason: e.to_string(),
            });
        }
        None => {}
    }

    Fetched {
        tables,
        failures,
        benchmark,
        benchmark_failure,
    }
}

/// Adds what the provider could not deliver to the engine's report.
fn record_fetch_failures(report: &mut BatchReport, fetched: Fetched) {
    for failure in fetched.failures {
        report.record_failure(failure.symbol, failure.reason);
    }
    if let Some(failure) = fetched.benchmark_failure {
        report.record_benchmark_failure(failure.symbol, failure.reason);
    }
}

/// Upper-cases and removes repeated symbols, keeping the first occurrence.
fn dedup_symbols(raw: &[String]) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::with_capacity(raw.len());
    for symbol in raw.iter().map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use core_types::PriceField;
    use price_provider::InMemoryProvider;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn closes(symbol: &str, prices: &[i64]) -> PriceTable {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        PriceTable::new(symbol)
            .with_timestamps((0..prices.len() as i64).map(|i| start + Duration::days(i)).collect())
            .with_column(PriceField::Close, prices.iter().map(|p| Decimal::from(*p)).collect())
    }

    fn provider() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_table(closes("AAA", &[100, 102, 101, 105, 107]))
            .with_table(closes("BBB", &[50, 49, 51, 50, 52]))
    }

    #[tokio::test]
    async fn provider_failures_reach_the_report() {
        let provider = provider();
        let symbols = vec!["AAA".to_string(), "MISSING".to_string(), "BBB".to_string()];

        let fetched = fetch_all(&provider, &symbols, None, day(1), day(31)).await;
        assert_eq!(fetched.tables.len(), 2);
        assert_eq!(fetched.failures.len(), 1);
        assert_eq!(fetched.failures[0].symbol, "MISSING");
        assert!(fetched.benchmark.is_none());
        assert!(fetched.benchmark_failure.is_none());

        let engine = AnalyticsEngine::default();
        let mut report = engine.analyze(&fetched.tables, None).unwrap();
        record_fetch_failures(&mut report, fetched);

        assert_eq!(report.assets, vec!["AAA", "BBB"]);
        assert_eq!(report.failed_symbols(), vec!["MISSING"]);
        assert!(report.failures[0].reason.contains("No price data"));
    }

    #[tokio::test]
    async fn unavailable_benchmark_is_reported() {
        let provider = provider();
        let symbols = vec!["AAA".to_string(), "BBB".to_string()];

        let fetched = fetch_all(&provider, &symbols, Some("^GSPC"), day(1), day(31)).await;
        assert!(fetched.benchmark.is_none());

        let engine = AnalyticsEngine::default();
        let mut report = engine.analyze(&fetched.tables, fetched.benchmark.as_ref()).unwrap();
        record_fetch_failures(&mut report, fetched);

        assert!(report.failures.is_empty());
        assert_eq!(report.benchmark_failure.as_ref().map(|f| f.symbol.as_str()), Some("^GSPC"));
        assert!(report.metrics.values().all(|m| m.beta.is_none()));
    }

    #[tokio::test]
    async fn available_benchmark_is_fetched_alongside_assets() {
        let provider = provider().with_table(closes("^GSPC", &[10, 11, 10, 12, 13]));
        let symbols = vec!["AAA".to_string(), "BBB".to_string()];

        let fetched = fetch_all(&provider, &symbols, Some("^GSPC"), day(1), day(31)).await;
        assert_eq!(fetched.benchmark.as_ref().map(|t| t.symbol.as_str()), Some("^GSPC"));

        let report = AnalyticsEngine::default()
            .analyze(&fetched.tables, fetched.benchmark.as_ref())
            .unwrap();
        assert_eq!(report.benchmark_failure, None);
        assert!(report.metrics.values().all(|m| m.beta.is_some()));
    }

    #[test]
    fn symbols_are_normalized_and_deduplicated() {
        let raw = vec!["aapl".to_string(), " MSFT ".to_string(), "AAPL".to_string(), "".to_string()];
        assert_eq!(dedup_symbols(&raw), vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn flags_override_configuration() {
        let args = Cli::parse_from([
            "finsight", "analyze", "--symbols", "A,B", "--from", "2024-01-01", "--to",
            "2024-06-30", "--principal", "2500", "--simulate", "--paths", "50", "--seed", "7",
            "--no-benchmark",
        ]);
        let Commands::Analyze(args) = args.command;
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(args.symbols, vec!["A", "B"]);
        assert_eq!(config.analysis.principal, Decimal::from(2500));
        assert_eq!(config.analysis.benchmark, None);
        assert!(config.monte_carlo.enabled);
        assert_eq!(config.monte_carlo.paths, 50);
        assert_eq!(config.monte_carlo.seed, Some(7));
        assert_eq!(config.monte_carlo.horizon_days, 252);
    }
}
