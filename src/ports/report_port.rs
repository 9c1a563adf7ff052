//! Results reporting port trait.

use crate::domain::batch::{ErrorRow, ResultRow};
use crate::domain::error::SmacrossError;

/// Sink for the batch result and error tables.
pub trait ResultsSink {
    fn write_results(&self, rows: &[ResultRow]) -> Result<(), SmacrossError>;

    fn write_errors(&self, rows: &[ErrorRow]) -> Result<(), SmacrossError>;
}
