//! JSON loader.

use super::{DataLoader, ensure_columns, ensure_file_exists};
use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Layout of records in a JSON source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonLayout {
    /// A single array of objects
    #[default]
    Array,
    /// One object per line (NDJSON)
    Lines,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct JsonParams {
    format: Option<JsonLayout>,
    columns: Vec<String>,
}

/// Reads JSON record arrays or newline-delimited JSON.
///
/// Parameters: `format` (`array` or `lines`), `columns`. Registered as
/// `json` (array by default) and `ndjson` (lines by default).
#[derive(Debug, Clone, Default)]
pub struct JsonLoader {
    layout: JsonLayout,
    required_columns: Vec<String>,
}

impl JsonLoader {
    /// Build a loader from `data_loader` parameters.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        Self::from_params_with_layout(params, JsonLayout::Array)
    }

    /// Build a loader whose layout is `default_layout` unless `format` is given.
    pub fn from_params_with_layout(
        params: &StrategyParams,
        default_layout: JsonLayout,
    ) -> Result<Self> {
        let params: JsonParams = parse_params(params, "json")?;
        Ok(Self {
            layout: params.format.unwrap_or(default_layout),
            required_columns: params.columns,
        })
    }
}

impl DataLoader for JsonLoader {
    fn name(&self) -> &'static str {
        match self.layout {
            JsonLayout::Array => "json",
            JsonLayout::Lines => "ndjson",
        }
    }

    fn load(&self, source: &Path) -> Result<DataFrame> {
        ensure_file_exists(source)?;

        let file = File::open(source).map_err(|e| PipelineError::load(source, e))?;
        let format = match self.layout {
            JsonLayout::Array => JsonFormat::Json,
            JsonLayout::Lines => JsonFormat::JsonLines,
        };

        let df = JsonReader::new(file)
            .with_json_format(format)
            .finish()
            .map_err(|e| PipelineError::load(source, e))?;

        ensure_columns(&df, &self.required_columns, source)?;
        debug!("Read JSON '{}': {:?}", source.display(), df.shape());
        Ok(df)
    }
}
