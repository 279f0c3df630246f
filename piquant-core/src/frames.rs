//! Reading and writing the CSV tables piquant passes between stages.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::utils::write_atomically;

///
/// Read a CSV file with a header line into a [DataFrame].
///
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open {:?}", path))?
        .finish()
        .with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(df)
}

fn write_frame<W: Write>(df: &mut DataFrame, writer: W) -> PolarsResult<()> {
    CsvWriter::new(writer).include_header(true).finish(df)
}

pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_frame(df, file)?;
    Ok(())
}

///
/// Write a CSV file via a temporary sibling, for files shared between
/// concurrently running scripts.
///
pub fn write_csv_atomically(df: &mut DataFrame, path: &Path) -> Result<()> {
    write_atomically(path, |writer| {
        write_frame(df, writer)?;
        Ok(())
    })
}

///
/// Values of a column as strings, whatever type polars inferred for it.
/// Missing values become empty strings.
///
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .with_context(|| format!("Missing column '{}'", name))?
        .cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

///
/// Values of a column as floats. Missing and unparseable values become NaN.
///
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .with_context(|| format!("Missing column '{}'", name))?;

    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(|v| {
                v.and_then(|s| s.trim().parse::<f64>().ok())
                    .unwrap_or(f64::NAN)
            })
            .collect());
    }

    let column = column.cast(&DataType::Float64)?;
    Ok(column
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

///
/// Values of an integer column. Missing values are an error.
///
pub fn int_values(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    let column = df
        .column(name)
        .with_context(|| format!("Missing column '{}'", name))?
        .cast(&DataType::Int64)?;
    column
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.with_context(|| format!("Missing value in '{}' at row {}", name, i + 1)))
        .collect()
}
