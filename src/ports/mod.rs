//! Port traits separating domain logic from storage, network and reporting.

pub mod config_port;
pub mod data_port;
pub mod quote_port;
pub mod report_port;
