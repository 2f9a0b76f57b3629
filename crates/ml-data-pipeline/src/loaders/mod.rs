//! Data loading strategies.
//!
//! A [`DataLoader`] reads an external source into a [`DataFrame`]. The
//! registry picks the implementation from `data_loader.file_type`.

mod csv;
mod json;
mod parquet;

pub use csv::CsvLoader;
pub use json::{JsonLayout, JsonLoader};
pub use parquet::ParquetLoader;

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::path::Path;

/// Trait for loading tabular data.
///
/// Implementations must fail with [`PipelineError::Load`] when the source is
/// missing, unreadable, or does not contain the expected columns.
pub trait DataLoader: Send + Sync {
    /// Configuration key of this loader (e.g. `"csv"`).
    fn name(&self) -> &'static str;

    /// Read the source at `source` into a DataFrame.
    fn load(&self, source: &Path) -> Result<DataFrame>;
}

/// Fail with a load error when `source` is not an existing file.
pub(crate) fn ensure_file_exists(source: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(PipelineError::load(source, "file does not exist"));
    }
    Ok(())
}

/// Check the loaded frame carries every required column.
pub(crate) fn ensure_columns(df: &DataFrame, required: &[String], source: &Path) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|name| df.column(name.as_str()).is_err())
        .map(|name| name.as_str())
        .collect();

    if !missing.is_empty() {
        return Err(PipelineError::load(
            source,
            format!("schema mismatch, missing column(s): {}", missing.join(", ")),
        ));
    }
    Ok(())
}
