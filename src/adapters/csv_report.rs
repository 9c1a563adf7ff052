//! CSV results reporting adapter.
//!
//! Writes the sorted result table and the error table as CSV files, and can
//! echo both as aligned console tables. Statistic cells for tickers that
//! never traded are left empty rather than written as zeros.

use std::fs;
use std::path::PathBuf;

use crate::domain::batch::{ErrorRow, ResultRow};
use crate::domain::error::SmacrossError;
use crate::ports::report_port::ResultsSink;

const RESULT_HEADER: [&str; 10] = [
    "Ticker",
    "Initial Equity",
    "Net P/L",
    "Annualized Sharpe",
    "Trades Made",
    "Avg P/L",
    "Max Profit",
    "Max Loss",
    "Annual Ret",
    "Final Equity",
];

pub struct CsvReportAdapter {
    directory: PathBuf,
    results_filename: String,
}

impl CsvReportAdapter {
    pub fn new(directory: PathBuf, results_filename: String) -> Self {
        Self {
            directory,
            results_filename,
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.directory.join(&self.results_filename)
    }

    pub fn errors_path(&self) -> PathBuf {
        self.directory.join("errors.csv")
    }

    fn opt_cell(value: Option<f64>) -> String {
        value.map(|v| format!("{v:.2}")).unwrap_or_default()
    }

    fn result_record(row: &ResultRow) -> [String; 10] {
        [
            row.ticker.clone(),
            format!("{:.2}", row.initial_equity),
            format!("{:.2}", row.net_pnl),
            format!("{:.4}", row.sharpe),
            row.trades_made.to_string(),
            Self::opt_cell(row.avg_pnl),
            Self::opt_cell(row.max_profit),
            Self::opt_cell(row.max_loss),
            format!("{:.2}", row.annual_ret_pct),
            format!("{:.2}", row.final_equity),
        ]
    }
}

impl ResultsSink for CsvReportAdapter {
    fn write_results(&self, rows: &[ResultRow]) -> Result<(), SmacrossError> {
        fs::create_dir_all(&self.directory)?;

        let file = fs::File::create(self.results_path())?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(RESULT_HEADER)
            .map_err(|e| SmacrossError::Data {
                reason: format!("writing results header: {e}"),
            })?;
        for row in rows {
            writer
                .write_record(Self::result_record(row))
                .map_err(|e| SmacrossError::Data {
                    reason: format!("writing results row for {}: {e}", row.ticker),
                })?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_errors(&self, rows: &[ErrorRow]) -> Result<(), SmacrossError> {
        fs::create_dir_all(&self.directory)?;

        let file = fs::File::create(self.errors_path())?;
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(["Ticker", "Section", "Error"])
            .map_err(|e| SmacrossError::Data {
                reason: format!("writing errors header: {e}"),
            })?;
        for row in rows {
            writer
                .write_record([
                    row.ticker.clone(),
                    row.section.to_string(),
                    row.error.clone(),
                ])
                .map_err(|e| SmacrossError::Data {
                    reason: format!("writing error row for {}: {e}", row.ticker),
                })?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Echo the result table to stdout, best annual return first.
pub fn print_results(rows: &[ResultRow]) {
    println!(
        "{:<10} {:>14} {:>12} {:>10} {:>7} {:>10} {:>11} {:>11} {:>11} {:>14}",
        "Ticker",
        "Initial Equity",
        "Net P/L",
        "Sharpe",
        "Trades",
        "Avg P/L",
        "Max Profit",
        "Max Loss",
        "Annual Ret",
        "Final Equity"
    );
    for row in rows {
        println!(
            "{:<10} {:>14.2} {:>12.2} {:>10.4} {:>7} {:>10} {:>11} {:>11} {:>10.2}% {:>14.2}",
            row.ticker,
            row.initial_equity,
            row.net_pnl,
            row.sharpe,
            row.trades_made,
            CsvReportAdapter::opt_cell(row.avg_pnl),
            CsvReportAdapter::opt_cell(row.max_profit),
            CsvReportAdapter::opt_cell(row.max_loss),
            row.annual_ret_pct,
            row.final_equity
        );
    }
}

pub fn print_errors(rows: &[ErrorRow]) {
    if rows.is_empty() {
        return;
    }
    eprintln!("\n{} ticker(s) failed:", rows.len());
    for row in rows {
        eprintln!("  {:<10} [{}] {}", row.ticker, row.section, row.error);
    }
}
