//! Concrete adapter implementations for ports.

pub mod csv_store;
pub mod file_config_adapter;
pub mod yahoo_adapter;
pub mod csv_report;
pub mod svg_plot;
