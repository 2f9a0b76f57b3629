//! CSV loader.

use super::{DataLoader, ensure_columns, ensure_file_exists};
use crate::config::{StrategyParams, parse_params};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CsvParams {
    delimiter: String,
    has_header: bool,
    infer_schema_length: usize,
    columns: Vec<String>,
}

impl Default for CsvParams {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            has_header: true,
            infer_schema_length: 100,
            columns: Vec::new(),
        }
    }
}

/// Reads delimited text files.
///
/// Parameters: `delimiter` (single ASCII character, default `,`),
/// `has_header` (default `true`), `infer_schema_length` (rows sampled for
/// type inference, default 100), and `columns` (required column names).
#[derive(Debug, Clone)]
pub struct CsvLoader {
    separator: u8,
    has_header: bool,
    infer_schema_length: usize,
    required_columns: Vec<String>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            separator: b',',
            has_header: true,
            infer_schema_length: 100,
            required_columns: Vec::new(),
        }
    }
}

impl CsvLoader {
    /// Build a loader from `data_loader` parameters.
    pub fn from_params(params: &StrategyParams) -> Result<Self> {
        let params: CsvParams = parse_params(params, "csv")?;

        let separator = match params.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => *byte,
            _ => {
                return Err(PipelineError::InvalidConfig(format!(
                    "csv delimiter must be a single ASCII character, got {:?}",
                    params.delimiter
                )));
            }
        };

        Ok(Self {
            separator,
            has_header: params.has_header,
            infer_schema_length: params.infer_schema_length,
            required_columns: params.columns,
        })
    }
}

impl DataLoader for CsvLoader {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn load(&self, source: &Path) -> Result<DataFrame> {
        ensure_file_exists(source)?;

        let df = CsvReadOptions::default()
            .with_has_header(self.has_header)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(
                CsvParseOptions::default()
                    .with_separator(self.separator)
                    .with_quote_char(Some(b'"')),
            )
            .try_into_reader_with_file_path(Some(source.to_path_buf()))
            .map_err(|e| PipelineError::load(source, e))?
            .finish()
            .map_err(|e| PipelineError::load(source, e))?;

        ensure_columns(&df, &self.required_columns, source)?;
        debug!("Read CSV '{}': {:?}", source.display(), df.shape());
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let file = write_temp("a,b\n1,2\n3,4\n5,6\n");
        let df = CsvLoader::default().load(file.path()).unwrap();

        assert_eq!(df.shape(), (3, 2));
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_load_csv_custom_delimiter() {
        let file = write_temp("a;b\n1;2\n");
        let mut params = StrategyParams::new();
        params.insert("delimiter".to_string(), json!(";"));

        let df = CsvLoader::from_params(&params).unwrap().load(file.path()).unwrap();
        assert_eq!(df.shape(), (1, 2));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = CsvLoader::default().load(Path::new("/no/such/input.csv"));
        assert!(matches!(result, Err(PipelineError::Load { .. })));
    }

    #[test]
    fn test_required_columns_mismatch_is_load_error() {
        let file = write_temp("a,b\n1,2\n");
        let mut params = StrategyParams::new();
        params.insert("columns".to_string(), json!(["a", "c"]));

        let err = CsvLoader::from_params(&params)
            .unwrap()
            .load(file.path())
            .unwrap_err();

        assert_eq!(err.error_code(), "LOAD_ERROR");
        assert!(err.to_string().contains("missing column(s): c"));
    }

    #[test]
    fn test_invalid_delimiter_param() {
        let mut params = StrategyParams::new();
        params.insert("delimiter".to_string(), json!(";;"));
        assert!(matches!(
            CsvLoader::from_params(&params),
            Err(PipelineError::InvalidConfig(_))
        ));
    }
}
