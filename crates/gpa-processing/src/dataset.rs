//! CSV dataset loading.

use crate::error::{PreprocessingError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

/// Rows sampled for schema inference; integer-looking columns stay integers.
const INFER_SCHEMA_ROWS: usize = 1000;

/// Load a CSV file with a header row into a DataFrame.
///
/// Falls back to a copy of the content with blank lines removed when the
/// standard reader rejects the file. Quoted fields are never rewritten.
///
/// # Errors
///
/// - [`PreprocessingError::DatasetNotFound`] if `path` does not exist
/// - [`PreprocessingError::EmptyDataset`] if the file has a header but no rows
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PreprocessingError::DatasetNotFound(
            path.display().to_string(),
        ));
    }

    info!("Loading dataset from: {}", path.display());

    let df = match read_csv_file(path) {
        Ok(df) => df,
        Err(e) => {
            warn!(
                "Standard CSV reader rejected {} ({}); retrying without blank lines",
                path.display(),
                e
            );
            let content = std::fs::read_to_string(path)?;
            read_csv_str(&strip_blank_lines(&content))?
        }
    };

    if df.height() == 0 {
        return Err(PreprocessingError::EmptyDataset(path.display().to_string()));
    }

    info!(
        "Dataset loaded: {} rows x {} columns",
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Parse CSV text with a header row into a DataFrame.
pub fn read_csv_str(content: &str) -> Result<DataFrame> {
    let cursor = Cursor::new(content.to_string());

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .into_reader_with_file_handle(cursor)
        .finish()?;
    Ok(df)
}

fn read_csv_file(path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn strip_blank_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
