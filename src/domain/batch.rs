//! Batch backtest harness.
//!
//! Runs the strategy over every watchlist ticker independently. A failure in
//! one ticker is captured as an error row and never aborts the batch.

use chrono::NaiveDate;

use super::analyzer::{self, TradeStats};
use super::bar::DailyBar;
use super::broker::{Broker, EquityPoint};
use super::config::BacktestConfig;
use super::error::SmacrossError;
use super::position::ClosedTrade;
use super::sma::sma_series;
use super::strategy::{SmaStrategy, TradeEvent};
use crate::ports::data_port::BarStore;

/// Which stage of a ticker's run produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Data,
    Backtest,
    Results,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Data => write!(f, "Data"),
            Section::Backtest => write!(f, "Backtest"),
            Section::Results => write!(f, "Results"),
        }
    }
}

/// One line of the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub ticker: String,
    pub initial_equity: f64,
    pub net_pnl: f64,
    pub sharpe: f64,
    pub trades_made: usize,
    pub avg_pnl: Option<f64>,
    pub max_profit: Option<f64>,
    pub max_loss: Option<f64>,
    pub annual_ret_pct: f64,
    pub final_equity: f64,
}

/// One line of the error table.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRow {
    pub ticker: String,
    pub section: Section,
    pub error: String,
}

/// A strategy fill, kept for chart annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeMarker {
    pub date: NaiveDate,
    pub event: TradeEvent,
}

/// Everything produced by one ticker's run, enough to draw its chart.
#[derive(Debug, Clone)]
pub struct TickerRun {
    pub row: ResultRow,
    pub bars: Vec<DailyBar>,
    pub sma: Vec<Option<f64>>,
    pub markers: Vec<TradeMarker>,
    pub trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub results: Vec<ResultRow>,
    pub errors: Vec<ErrorRow>,
    pub runs: Vec<TickerRun>,
}

/// Backtest a single ticker over its full stored history.
pub fn run_single(
    ticker: &str,
    bars: Vec<DailyBar>,
    config: &BacktestConfig,
) -> Result<TickerRun, SmacrossError> {
    if bars.is_empty() {
        return Err(SmacrossError::NoData {
            ticker: ticker.to_string(),
        });
    }

    let mut broker = Broker::new(config.initial_budget, config.commission_per_trade);
    let mut strategy = SmaStrategy::new(ticker, config.params.clone());
    let mut markers = Vec::new();

    for bar in &bars {
        if let Some(event) = strategy.on_bar(bar, &mut broker) {
            markers.push(TradeMarker {
                date: bar.date,
                event,
            });
        }
        broker.record_equity(bar.date, bar.price());
    }

    let stats = TradeStats::compute(broker.closed_trades());
    let annual_ret_pct = analyzer::cumulative_return(broker.equity_curve()) * 100.0;
    let sharpe = analyzer::sharpe_ratio(broker.equity_curve());
    let final_equity = broker
        .equity_curve()
        .last()
        .map(|p| p.equity)
        .unwrap_or(config.initial_budget);

    let row = ResultRow {
        ticker: ticker.to_string(),
        initial_equity: config.initial_budget,
        net_pnl: stats.net_pnl,
        sharpe,
        trades_made: stats.count,
        avg_pnl: stats.avg_pnl,
        max_profit: stats.max_profit,
        max_loss: stats.max_loss,
        annual_ret_pct,
        final_equity,
    };

    let sma = sma_series(&bars, config.params.sma_period);
    Ok(TickerRun {
        row,
        sma,
        markers,
        trades: broker.closed_trades().to_vec(),
        equity_curve: broker.equity_curve().to_vec(),
        bars,
    })
}

/// Backtest every ticker, isolating failures into error rows. Results are
/// sorted by annual return, best first.
pub fn run_batch(
    tickers: &[String],
    store: &dyn BarStore,
    config: &BacktestConfig,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for ticker in tickers {
        let bars = match store.load_bars(ticker) {
            Ok(bars) => bars,
            Err(e) => {
                eprintln!("{ticker}: data error: {e}");
                outcome.errors.push(ErrorRow {
                    ticker: ticker.clone(),
                    section: Section::Data,
                    error: e.to_string(),
                });
                continue;
            }
        };

        match run_single(ticker, bars, config) {
            Ok(run) => {
                outcome.results.push(run.row.clone());
                outcome.runs.push(run);
            }
            Err(e) => {
                eprintln!("{ticker}: backtest error: {e}");
                outcome.errors.push(ErrorRow {
                    ticker: ticker.clone(),
                    section: Section::Backtest,
                    error: e.to_string(),
                });
            }
        }
    }

    outcome
        .results
        .sort_by(|a, b| {
            b.annual_ret_pct
                .partial_cmp(&a.annual_ret_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    outcome
}
