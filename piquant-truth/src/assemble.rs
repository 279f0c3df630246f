//! Joining ground truth and a quantifier's estimates into `tpms.csv`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use polars::prelude::*;

use piquant_core::ExpressionProfile;
use piquant_core::consts::{
    CALC_TPM_COL, GENE_COL, LENGTH_COL, NUM_TRANSCRIPTS_COL, REAL_TPM_COL, TRANSCRIPT_COL,
    UNIQUE_LENGTH_COL,
};
use piquant_core::frames::write_csv_atomically;
use piquant_options::QuantMethod;
use piquant_quant::{TranscriptAbundances, quantifier_for};

use crate::gene_counts::{TranscriptGene, read_transcript_counts};
use crate::unique_sequence::{TranscriptSequence, read_unique_sequence};

/// One row of `tpms.csv`.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptTpm {
    pub transcript_id: String,
    pub gene_id: String,
    pub length: u64,
    pub unique_length: u64,
    pub num_transcripts: u64,
    pub real_tpm: f64,
    pub calc_tpm: f64,
}

///
/// Combine the expression profile with a quantifier's abundances. Every
/// profile transcript gets a row; transcripts the quantifier did not
/// report have a calculated TPM of zero.
///
pub fn assemble_tpms(
    profile: &ExpressionProfile,
    abundances: &TranscriptAbundances,
    counts: &HashMap<String, TranscriptGene>,
    sequences: &HashMap<String, TranscriptSequence>,
) -> Vec<TranscriptTpm> {
    let mut missing = 0;

    let tpms: Vec<TranscriptTpm> = profile
        .iter()
        .map(|row| {
            let id = row.transcript_id.as_str();
            let count = counts.get(id);
            let sequence = sequences.get(id);
            if count.is_none() || sequence.is_none() {
                missing += 1;
            }

            TranscriptTpm {
                transcript_id: id.to_string(),
                gene_id: count.map_or_else(|| id.to_string(), |c| c.gene_id.clone()),
                length: row.length,
                unique_length: sequence.map_or(row.length, |s| s.unique_length.min(row.length)),
                num_transcripts: count.map_or(1, |c| c.num_transcripts),
                real_tpm: row.tpm(),
                calc_tpm: abundances.get_transcript_abundance(id),
            }
        })
        .collect();

    if missing > 0 {
        warn!(
            "{} profile transcripts are missing from the transcript tables; \
             treating each as its own gene with all sequence unique",
            missing
        );
    }

    tpms
}

pub fn tpms_frame(tpms: &[TranscriptTpm]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new(
            TRANSCRIPT_COL.into(),
            tpms.iter()
                .map(|t| t.transcript_id.as_str())
                .collect::<Vec<&str>>(),
        ),
        Column::new(
            GENE_COL.into(),
            tpms.iter().map(|t| t.gene_id.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            LENGTH_COL.into(),
            tpms.iter().map(|t| t.length).collect::<Vec<u64>>(),
        ),
        Column::new(
            UNIQUE_LENGTH_COL.into(),
            tpms.iter().map(|t| t.unique_length).collect::<Vec<u64>>(),
        ),
        Column::new(
            NUM_TRANSCRIPTS_COL.into(),
            tpms.iter().map(|t| t.num_transcripts).collect::<Vec<u64>>(),
        ),
        Column::new(
            REAL_TPM_COL.into(),
            tpms.iter().map(|t| t.real_tpm).collect::<Vec<f64>>(),
        ),
        Column::new(
            CALC_TPM_COL.into(),
            tpms.iter().map(|t| t.calc_tpm).collect::<Vec<f64>>(),
        ),
    ])?;
    Ok(df)
}

pub fn write_tpms(tpms: &[TranscriptTpm], path: &Path) -> Result<()> {
    let mut df = tpms_frame(tpms)?;
    write_csv_atomically(&mut df, path)
}

/// Input files of [assemble_quantification_data].
#[derive(Debug, Clone)]
pub struct AssemblyInputs<'a> {
    pub quant_method: QuantMethod,
    pub expression_profile: &'a Path,
    pub results: &'a Path,
    pub transcript_counts: &'a Path,
    pub unique_sequence: &'a Path,
}

///
/// Read everything a finished quantification run produced and write its
/// `tpms.csv`.
///
pub fn assemble_quantification_data(inputs: &AssemblyInputs, output: &Path) -> Result<()> {
    let profile = ExpressionProfile::try_from(inputs.expression_profile)
        .with_context(|| format!("Failed to read {:?}", inputs.expression_profile))?;

    let quantifier = quantifier_for(inputs.quant_method);
    let abundances = quantifier
        .calculate_transcript_abundances(inputs.results)
        .with_context(|| format!("Failed to read {} results", quantifier.name()))?;

    let counts = read_transcript_counts(inputs.transcript_counts)?;
    let sequences = read_unique_sequence(inputs.unique_sequence)?;

    let tpms = assemble_tpms(&profile, &abundances, &counts, &sequences);
    write_tpms(&tpms, output)?;

    info!(
        "Wrote {} transcript TPMs ({} estimated by {}) to {:?}",
        tpms.len(),
        abundances.len(),
        quantifier.name(),
        output
    );
    Ok(())
}
