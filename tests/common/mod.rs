#![allow(dead_code)]

use chrono::NaiveDate;
use smacross::domain::bar::DailyBar;
use smacross::domain::config::BacktestConfig;
use smacross::domain::error::SmacrossError;
use smacross::domain::strategy::StrategyParams;
use smacross::ports::data_port::BarStore;
use smacross::ports::quote_port::QuoteSource;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(ticker: &str, date_str: &str, close: f64) -> DailyBar {
    DailyBar {
        ticker: ticker.to_string(),
        date: NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap(),
        open: close * 0.99,
        high: close * 1.02,
        low: close * 0.98,
        close,
        adj_close: close,
        volume: 100_000,
    }
}

/// Daily bars from a list of closes, one bar per calendar day.
pub fn generate_bars(ticker: &str, closes: &[f64]) -> Vec<DailyBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| DailyBar {
            ticker: ticker.to_string(),
            date: date(2024, 1, 1) + chrono::Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            adj_close: close,
            volume: 100_000,
        })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        initial_budget: 10_000.0,
        params: StrategyParams {
            sma_period: 3,
            ..StrategyParams::default()
        },
        commission_per_trade: 0.0,
        data_directory: PathBuf::from("data"),
        watchlist_path: PathBuf::from("data/watchlist.csv"),
        results_directory: PathBuf::from("results"),
        results_filename: "results.csv".to_string(),
        save_results: false,
        save_plots: false,
        plots_directory: PathBuf::from("plots"),
    }
}

pub struct MockBarStore {
    pub data: HashMap<String, Vec<DailyBar>>,
    pub errors: HashMap<String, String>,
}

impl MockBarStore {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<DailyBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl BarStore for MockBarStore {
    fn load_bars(&self, ticker: &str) -> Result<Vec<DailyBar>, SmacrossError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(SmacrossError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(ticker) {
            Some(bars) => Ok(bars.clone()),
            None => Err(SmacrossError::NoData {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn last_bar_date(&self, ticker: &str) -> Result<Option<NaiveDate>, SmacrossError> {
        Ok(self
            .data
            .get(ticker)
            .and_then(|bars| bars.last())
            .map(|b| b.date))
    }

    fn write_bars(&self, _ticker: &str, _bars: &[DailyBar]) -> Result<(), SmacrossError> {
        Ok(())
    }

    fn append_bars(&self, _ticker: &str, bars: &[DailyBar]) -> Result<usize, SmacrossError> {
        Ok(bars.len())
    }

    fn remove_bars(&self, _ticker: &str) -> Result<(), SmacrossError> {
        Ok(())
    }
}

pub struct MockQuoteSource {
    pub data: HashMap<String, Vec<DailyBar>>,
    pub calls: RefCell<Vec<String>>,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<DailyBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }
}

impl QuoteSource for MockQuoteSource {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyBar>, SmacrossError> {
        self.calls.borrow_mut().push(ticker.to_string());
        match self.data.get(ticker) {
            Some(bars) => Ok(bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .cloned()
                .collect()),
            None => Err(SmacrossError::Fetch {
                ticker: ticker.to_string(),
                reason: "symbol not found".to_string(),
            }),
        }
    }
}
