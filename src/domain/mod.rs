//! Core domain types and logic.

pub mod bar;
pub mod sma;
pub mod position;
pub mod broker;
pub mod strategy;
pub mod analyzer;
pub mod batch;
pub mod watchlist;
pub mod refresh;
pub mod config;
pub mod error;
