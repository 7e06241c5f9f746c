//! Data loading utilities

use crate::error::{InfluenceError, Result};
use ndarray::Array2;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// CSV loader for design and output tables
pub struct DataLoader {
    /// Rows used to infer the schema
    infer_schema_length: usize,
    /// Field separator
    separator: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
            separator: b',',
        }
    }

    /// Set field separator
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Load a CSV file with a header row
    pub fn load_csv<P: AsRef<Path>>(&self, path: P) -> Result<DataFrame> {
        let file = File::open(path.as_ref()).map_err(|e| {
            InfluenceError::DataError(format!("{}: {}", path.as_ref().display(), e))
        })?;

        let parse_opts = CsvParseOptions::default().with_separator(self.separator);
        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file);

        Ok(reader.finish()?)
    }
}

/// Copy the named columns of a frame into a dense row-major matrix.
///
/// Every column must be numeric (or castable to f64) and free of nulls.
pub fn frame_to_matrix(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let mut matrix = Array2::zeros((n_rows, columns.len()));

    for (j, name) in columns.iter().enumerate() {
        let column = df
            .column(name)
            .map_err(|_| InfluenceError::DataError(format!("column '{}' not found", name)))?;
        let series = column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| InfluenceError::DataError(format!("column '{}': {}", name, e)))?;
        let values = series.f64()?;

        if values.null_count() > 0 {
            return Err(InfluenceError::DataError(format!(
                "column '{}' has {} missing or non-numeric values",
                name,
                values.null_count()
            )));
        }

        for (i, v) in values.into_iter().enumerate() {
            matrix[[i, j]] = v.unwrap_or(f64::NAN);
        }
    }

    Ok(matrix)
}

/// Column names of a frame, in order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}
