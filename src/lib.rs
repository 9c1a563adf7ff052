//! smacross — SMA watchlist batch backtester.
//!
//! Runs a long-only moving-average threshold strategy, ticker by ticker, over
//! CSV-stored daily price history and aggregates the results into a table.
//! A companion downloader keeps the per-ticker CSVs current from Yahoo Finance.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
