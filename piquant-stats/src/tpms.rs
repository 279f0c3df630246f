//! Rows of a run's `tpms.csv`, and their sums per gene.

use std::path::Path;

use polars::prelude::*;

use piquant_core::consts::{
    CALC_TPM_COL, GENE_COL, LENGTH_COL, NUM_TRANSCRIPTS_COL, REAL_TPM_COL, TRANSCRIPT_COL,
    UNIQUE_LENGTH_COL,
};
use piquant_core::frames::{float_values, read_csv, string_values};

use crate::errors::StatsError;

///
/// Real and estimated abundance of one transcript (or, after
/// [gene_frame], one gene) with the properties classifiers look at.
///
#[derive(Debug, Clone, PartialEq)]
pub struct TpmRow {
    pub transcript: String,
    pub gene: String,
    pub length: f64,
    pub unique_length: f64,
    pub num_transcripts: f64,
    pub real_tpm: f64,
    pub calc_tpm: f64,
}

impl TpmRow {
    /// `100 * (calc - real) / real`, or `None` for transcripts that were
    /// not expressed.
    pub fn percent_error(&self) -> Option<f64> {
        if self.real_tpm > 0.0 {
            Some(100.0 * (self.calc_tpm - self.real_tpm) / self.real_tpm)
        } else {
            None
        }
    }
}

fn require_columns(df: &DataFrame, file: &Path) -> Result<(), StatsError> {
    for column in [
        TRANSCRIPT_COL,
        GENE_COL,
        LENGTH_COL,
        UNIQUE_LENGTH_COL,
        NUM_TRANSCRIPTS_COL,
        REAL_TPM_COL,
        CALC_TPM_COL,
    ] {
        if df.column(column).is_err() {
            return Err(StatsError::MissingColumn {
                file: file.display().to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

///
/// Convert a tpms DataFrame into rows. Missing TPMs are treated as zero.
///
pub fn tpm_rows(df: &DataFrame) -> Result<Vec<TpmRow>, StatsError> {
    let transcripts = string_values(df, TRANSCRIPT_COL)?;
    let genes = string_values(df, GENE_COL)?;
    let lengths = float_values(df, LENGTH_COL)?;
    let unique_lengths = float_values(df, UNIQUE_LENGTH_COL)?;
    let num_transcripts = float_values(df, NUM_TRANSCRIPTS_COL)?;
    let real_tpms = float_values(df, REAL_TPM_COL)?;
    let calc_tpms = float_values(df, CALC_TPM_COL)?;

    let zero_if_nan = |v: f64| if v.is_nan() { 0.0 } else { v };

    Ok((0..df.height())
        .map(|i| TpmRow {
            transcript: transcripts[i].clone(),
            gene: genes[i].clone(),
            length: lengths[i],
            unique_length: unique_lengths[i],
            num_transcripts: num_transcripts[i],
            real_tpm: zero_if_nan(real_tpms[i]),
            calc_tpm: zero_if_nan(calc_tpms[i]),
        })
        .collect())
}

///
/// Sum real and estimated TPMs of the transcripts of each gene. Gene rows
/// carry the gene id in both identifier columns and the summed lengths.
///
pub fn gene_frame(df: &DataFrame) -> PolarsResult<DataFrame> {
    let float = |name: &str| col(name).cast(DataType::Float64);
    let tpm = |name: &str| float(name).fill_nan(lit(0.0)).fill_null(lit(0.0)).sum();

    df.clone()
        .lazy()
        .group_by([col(GENE_COL)])
        .agg([
            float(LENGTH_COL).sum(),
            float(UNIQUE_LENGTH_COL).sum(),
            len().alias(NUM_TRANSCRIPTS_COL),
            tpm(REAL_TPM_COL),
            tpm(CALC_TPM_COL),
        ])
        .with_column(col(GENE_COL).alias(TRANSCRIPT_COL))
        .sort([GENE_COL], SortMultipleOptions::default())
        .collect()
}

/// Transcript and gene level TPMs of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTpms {
    pub transcripts: Vec<TpmRow>,
    pub genes: Vec<TpmRow>,
}

impl RunTpms {
    pub fn from_frame(df: &DataFrame) -> Result<Self, StatsError> {
        Ok(RunTpms {
            transcripts: tpm_rows(df)?,
            genes: tpm_rows(&gene_frame(df)?)?,
        })
    }
}

pub fn read_tpms(path: &Path) -> Result<RunTpms, StatsError> {
    let df = read_csv(path)?;
    require_columns(&df, path)?;
    RunTpms::from_frame(&df)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::TpmRow;

    pub fn row(transcript: &str, real_tpm: f64, calc_tpm: f64) -> TpmRow {
        TpmRow {
            transcript: transcript.to_string(),
            gene: format!("G-{}", transcript),
            length: 1000.0,
            unique_length: 500.0,
            num_transcripts: 1.0,
            real_tpm,
            calc_tpm,
        }
    }
}
