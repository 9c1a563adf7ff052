//! Typed, validated run configuration.
//!
//! Reads through the [`ConfigPort`] so the domain never touches INI parsing
//! directly. Every field is validated up front; a bad value stops the run
//! before any ticker is touched.

use std::path::PathBuf;

use crate::domain::error::SmacrossError;
use crate::domain::strategy::{RiskBasis, StrategyParams};
use crate::ports::config_port::ConfigPort;

/// Everything the batch backtester needs for one run.
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub initial_budget: f64,
    pub params: StrategyParams,
    pub commission_per_trade: f64,
    pub data_directory: PathBuf,
    pub watchlist_path: PathBuf,
    pub results_directory: PathBuf,
    pub results_filename: String,
    pub save_results: bool,
    pub save_plots: bool,
    pub plots_directory: PathBuf,
}

/// Settings for the downloader and updater.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub period: String,
    pub delay_ms: u64,
    pub data_directory: PathBuf,
    pub watchlist_path: PathBuf,
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SmacrossError> {
    let initial_budget = config.get_double("backtest", "initial_budget", 10_000.0);
    if initial_budget <= 0.0 {
        return Err(invalid("backtest", "initial_budget", "must be positive"));
    }

    let budget_use = config.get_double("backtest", "budget_use", 0.5);
    if budget_use <= 0.0 || budget_use > 1.0 {
        return Err(invalid("backtest", "budget_use", "must be in (0, 1]"));
    }

    let risk_percent = config.get_double("backtest", "risk_percent", 2.0);
    if risk_percent <= 0.0 {
        return Err(invalid("backtest", "risk_percent", "must be positive"));
    }

    let sma_period = config.get_int("backtest", "sma_period", 9);
    if sma_period < 1 {
        return Err(invalid("backtest", "sma_period", "must be at least 1"));
    }

    let commission_per_trade = config.get_double("backtest", "commission_per_trade", 0.0);
    if commission_per_trade < 0.0 {
        return Err(invalid("backtest", "commission_per_trade", "must be non-negative"));
    }

    let risk_basis = match config
        .get_string("backtest", "risk_basis")
        .as_deref()
        .map(str::trim)
    {
        None | Some("price") => RiskBasis::Price,
        Some("equity") => RiskBasis::Equity,
        Some(other) => {
            return Err(invalid(
                "backtest",
                "risk_basis",
                &format!("unknown value '{other}' (expected price or equity)"),
            ));
        }
    };

    let (data_directory, watchlist_path) = data_paths(config);
    let results_directory = PathBuf::from(
        config
            .get_string("output", "results_directory")
            .unwrap_or_else(|| "results".to_string()),
    );
    let plots_directory = PathBuf::from(
        config
            .get_string("output", "plots_directory")
            .unwrap_or_else(|| "plots".to_string()),
    );

    Ok(BacktestConfig {
        initial_budget,
        params: StrategyParams {
            sma_period: sma_period as usize,
            budget_use,
            risk_percent,
            risk_basis,
            verbose: config.get_bool("backtest", "verbose", false),
        },
        commission_per_trade,
        data_directory,
        watchlist_path,
        results_directory,
        results_filename: config
            .get_string("output", "results_filename")
            .unwrap_or_else(|| "results.csv".to_string()),
        save_results: config.get_bool("output", "save_results", true),
        save_plots: config.get_bool("output", "save_plots", false),
        plots_directory,
    })
}

pub fn build_download_config(config: &dyn ConfigPort) -> Result<DownloadConfig, SmacrossError> {
    let period = config
        .get_string("download", "period")
        .unwrap_or_else(|| "1y".to_string());
    // Reject unknown keywords before any network call is made.
    let today = chrono::Local::now().date_naive();
    crate::domain::refresh::period_start(&period, today)?;

    let delay_ms = config.get_int("download", "delay_ms", 1000);
    if delay_ms < 0 {
        return Err(invalid("download", "delay_ms", "must be non-negative"));
    }

    let (data_directory, watchlist_path) = data_paths(config);

    Ok(DownloadConfig {
        period,
        delay_ms: delay_ms as u64,
        data_directory,
        watchlist_path,
    })
}

fn data_paths(config: &dyn ConfigPort) -> (PathBuf, PathBuf) {
    let data_directory = PathBuf::from(
        config
            .get_string("data", "directory")
            .unwrap_or_else(|| "data".to_string()),
    );
    let watchlist_path = match config.get_string("data", "watchlist") {
        Some(path) => PathBuf::from(path),
        None => data_directory.join("watchlist.csv"),
    };
    (data_directory, watchlist_path)
}

fn invalid(section: &str, key: &str, reason: &str) -> SmacrossError {
    SmacrossError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{key} {reason}"),
    }
}
