//! CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::adapters::csv_report::{self, CsvReportAdapter};
use crate::adapters::csv_store::CsvBarStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::svg_plot;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::batch::{self, ErrorRow, Section};
use crate::domain::config::{
    build_backtest_config, build_download_config, BacktestConfig, DownloadConfig,
};
use crate::domain::error::SmacrossError;
use crate::domain::refresh::{self, UpdatePlan};
use crate::domain::watchlist;
use crate::ports::data_port::BarStore;
use crate::ports::quote_port::QuoteSource;
use crate::ports::report_port::ResultsSink;

#[derive(Parser, Debug)]
#[command(name = "smacross", about = "SMA watchlist batch backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest every watchlist ticker over its stored history
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Run a single ticker instead of the whole watchlist
        #[arg(long)]
        ticker: Option<String>,
        /// Validate config and watchlist without running
        #[arg(long)]
        dry_run: bool,
    },
    /// Download full price history for the watchlist
    Download {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
        /// Override the configured period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max)
        #[arg(long)]
        period: Option<String>,
        /// Explicit range start (YYYY-MM-DD), overrides the period
        #[arg(long)]
        start: Option<String>,
        /// Explicit range end (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end: Option<String>,
        /// Re-download tickers that already have stored history
        #[arg(long)]
        refresh: bool,
        /// Delete all stored history before downloading
        #[arg(long)]
        purge: bool,
    },
    /// Top up stored history with the bars published since the last download
    Update {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// Manage the watchlist
    Watchlist {
        #[arg(short, long)]
        config: PathBuf,
        #[command(subcommand)]
        action: WatchlistAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    /// Add a ticker
    Add { ticker: String },
    /// Remove a ticker
    Remove { ticker: String },
    /// Print the watchlist
    List,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            ticker,
            dry_run,
        } => run_backtest(&config, ticker.as_deref(), dry_run),
        Command::Download {
            config,
            ticker,
            period,
            start,
            end,
            refresh,
            purge,
        } => run_download(
            &config,
            ticker.as_deref(),
            period.as_deref(),
            start.as_deref(),
            end.as_deref(),
            refresh,
            purge,
        ),
        Command::Update { config, ticker } => run_update(&config, ticker.as_deref()),
        Command::Watchlist { config, action } => run_watchlist(&config, action),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SmacrossError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn resolve_tickers(
    config: &BacktestConfig,
    ticker_override: Option<&str>,
) -> Result<Vec<String>, SmacrossError> {
    match ticker_override {
        Some(ticker) => Ok(vec![ticker.trim().to_uppercase()]),
        None => watchlist::load(&config.watchlist_path),
    }
}

fn run_backtest(config_path: &PathBuf, ticker_override: Option<&str>, dry_run: bool) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // A missing watchlist aborts the whole run, per-ticker trouble does not.
    let tickers = match resolve_tickers(&config, ticker_override) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if tickers.is_empty() {
        eprintln!("error: watchlist is empty");
        return ExitCode::from(2);
    }

    if dry_run {
        eprintln!(
            "Dry run: {} ticker(s), SMA period {}, budget {:.2}, risk {:.1}% ({:?} basis)",
            tickers.len(),
            config.params.sma_period,
            config.initial_budget,
            config.params.risk_percent,
            config.params.risk_basis
        );
        return ExitCode::SUCCESS;
    }

    eprintln!("Backtesting {} ticker(s)...", tickers.len());
    let store = CsvBarStore::new(config.data_directory.clone());
    let mut outcome = batch::run_batch(&tickers, &store, &config);

    csv_report::print_results(&outcome.results);

    if config.save_plots {
        for run in &outcome.runs {
            if let Err(e) = svg_plot::save_plot(&config.plots_directory, run) {
                outcome.errors.push(ErrorRow {
                    ticker: run.row.ticker.clone(),
                    section: Section::Results,
                    error: e.to_string(),
                });
            }
        }
    }

    if config.save_results {
        let sink = CsvReportAdapter::new(
            config.results_directory.clone(),
            config.results_filename.clone(),
        );
        if let Err(e) = sink.write_results(&outcome.results) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        if let Err(e) = sink.write_errors(&outcome.errors) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Results written to {}", sink.results_path().display());
    }

    csv_report::print_errors(&outcome.errors);
    ExitCode::SUCCESS
}

fn load_download_config(config_path: &PathBuf) -> Result<DownloadConfig, ExitCode> {
    let adapter = load_config(config_path)?;
    build_download_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        (&e).into()
    })
}

fn download_tickers(
    config: &DownloadConfig,
    ticker_override: Option<&str>,
) -> Result<Vec<String>, ExitCode> {
    let path = &config.watchlist_path;
    let tickers = match ticker_override {
        Some(ticker) => vec![ticker.trim().to_uppercase()],
        None => watchlist::load(path).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        })?,
    };
    if tickers.is_empty() {
        eprintln!("error: watchlist is empty");
        return Err(ExitCode::from(2));
    }
    Ok(tickers)
}

fn parse_cli_date(value: &str, flag: &str) -> Result<chrono::NaiveDate, ExitCode> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        eprintln!("error: --{flag} must be YYYY-MM-DD, got '{value}'");
        ExitCode::from(2)
    })
}

fn run_download(
    config_path: &PathBuf,
    ticker_override: Option<&str>,
    period_override: Option<&str>,
    start_override: Option<&str>,
    end_override: Option<&str>,
    refresh_existing: bool,
    purge: bool,
) -> ExitCode {
    let config = match load_download_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let tickers = match download_tickers(&config, ticker_override) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let today = chrono::Local::now().date_naive();
    let end = match end_override {
        Some(value) => match parse_cli_date(value, "end") {
            Ok(d) => d,
            Err(code) => return code,
        },
        None => today,
    };
    // An explicit start wins over any period keyword.
    let start = match start_override {
        Some(value) => match parse_cli_date(value, "start") {
            Ok(d) => d,
            Err(code) => return code,
        },
        None => {
            let period = period_override.unwrap_or(&config.period);
            match refresh::period_start(period, end) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            }
        }
    };
    if start >= end {
        eprintln!("error: start {start} is not before end {end}");
        return ExitCode::from(2);
    }

    let store = CsvBarStore::new(config.data_directory.clone());
    let source = match YahooAdapter::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Downloading {} ticker(s), {start} to {end}...",
        tickers.len()
    );
    let mut failures = 0usize;
    let mut fetched_any = false;
    for ticker in &tickers {
        if purge {
            if let Err(e) = store.remove_bars(ticker) {
                eprintln!("{ticker}: {e}");
                failures += 1;
                continue;
            }
        } else if !refresh_existing && store.csv_path(ticker).exists() {
            eprintln!("{ticker}: already downloaded, skipping (use --refresh to re-download)");
            continue;
        }

        if fetched_any {
            std::thread::sleep(Duration::from_millis(config.delay_ms));
        }
        fetched_any = true;

        match source.fetch_daily(ticker, start, end) {
            Ok(bars) => {
                eprintln!("{ticker}: {} bars", bars.len());
                if let Err(e) = store.write_bars(ticker, &bars) {
                    eprintln!("{ticker}: {e}");
                    failures += 1;
                }
            }
            Err(e) => {
                eprintln!("{ticker}: {e}");
                failures += 1;
            }
        }
    }

    finish_fetch(tickers.len(), failures)
}

fn run_update(config_path: &PathBuf, ticker_override: Option<&str>) -> ExitCode {
    let config = match load_download_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let tickers = match download_tickers(&config, ticker_override) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let today = chrono::Local::now().date_naive();
    let store = CsvBarStore::new(config.data_directory.clone());
    let source = match YahooAdapter::new() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut failures = 0usize;
    let mut fetched_any = false;
    for ticker in &tickers {
        let last = match store.last_bar_date(ticker) {
            Ok(l) => l,
            Err(e) => {
                eprintln!("{ticker}: {e}");
                failures += 1;
                continue;
            }
        };

        let plan = match last {
            Some(date) => refresh::plan_update(date, today),
            None => {
                eprintln!("{ticker}: no stored history, run download first");
                failures += 1;
                continue;
            }
        };

        match plan {
            UpdatePlan::Current => {
                eprintln!("{ticker}: no update needed");
            }
            UpdatePlan::Fetch(window) => {
                if fetched_any {
                    std::thread::sleep(Duration::from_millis(config.delay_ms));
                }
                fetched_any = true;

                let start = match refresh::period_start(window.as_range(), today) {
                    Ok(s) => s,
                    Err(e) => {
                        eprintln!("{ticker}: {e}");
                        failures += 1;
                        continue;
                    }
                };
                match source.fetch_daily(ticker, start, today) {
                    Ok(bars) => match store.append_bars(ticker, &bars) {
                        Ok(count) => eprintln!("{ticker}: appended {count} bar(s)"),
                        Err(e) => {
                            eprintln!("{ticker}: {e}");
                            failures += 1;
                        }
                    },
                    Err(e) => {
                        eprintln!("{ticker}: {e}");
                        failures += 1;
                    }
                }
            }
            UpdatePlan::RefreshRecommended => {
                let days = last.map(|d| (today - d).num_days()).unwrap_or_default();
                let err = SmacrossError::StaleData {
                    ticker: ticker.clone(),
                    days,
                };
                eprintln!("{ticker}: {err}; run download --purge");
                failures += 1;
            }
        }
    }

    finish_fetch(tickers.len(), failures)
}

fn finish_fetch(total: usize, failures: usize) -> ExitCode {
    if failures > 0 {
        eprintln!("{failures} of {total} ticker(s) failed");
        ExitCode::from(4)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_watchlist(config_path: &PathBuf, action: WatchlistAction) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let path = &config.watchlist_path;

    let result = match action {
        WatchlistAction::Add { ticker } => watchlist::add(path, &ticker).map(|added| {
            if added {
                eprintln!("added {}", ticker.to_uppercase());
            } else {
                eprintln!("{} already present", ticker.to_uppercase());
            }
        }),
        WatchlistAction::Remove { ticker } => watchlist::remove(path, &ticker).map(|removed| {
            if removed {
                eprintln!("removed {}", ticker.to_uppercase());
            } else {
                eprintln!("{} not found", ticker.to_uppercase());
            }
        }),
        WatchlistAction::List => watchlist::load(path).map(|tickers| {
            for ticker in tickers {
                println!("{ticker}");
            }
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
