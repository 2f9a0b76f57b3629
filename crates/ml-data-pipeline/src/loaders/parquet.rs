//! Parquet loader.

use super::{DataLoader, ensure_columns, ensure_file_exists};
use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ParquetParams {
    columns: Vec<String>,
}

/// Reads Apache Parquet files.
///
/// Parameters: `columns` (required column names).
#[derive(Debug, Clone, Default)]
pub struct ParquetLoader {
    required_columns: Vec<String>,
}

impl ParquetLoader {
    /// Build a loader from `data_loader` parameters.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let params: ParquetParams = parse_params(params, "parquet")?;
        Ok(Self {
            required_columns: params.columns,
        })
    }
}

impl DataLoader for ParquetLoader {
    fn name(&self) -> &'static str {
        "parquet"
    }

    fn load(&self, source: &Path) -> Result<DataFrame> {
        ensure_file_exists(source)?;

        let file = File::open(source).map_err(|e| PipelineError::load(source, e))?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| PipelineError::load(source, e))?;

        ensure_columns(&df, &self.required_columns, source)?;
        debug!("Read Parquet '{}': {:?}", source.display(), df.shape());
        Ok(df)
    }
}
