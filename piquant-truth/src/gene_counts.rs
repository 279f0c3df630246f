//! Number of transcripts belonging to the gene of each transcript.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use anyhow::Result;
use log::info;
use polars::prelude::*;

use piquant_core::ExonRecord;
use piquant_core::consts::{GENE_COL, NUM_TRANSCRIPTS_COL, TRANSCRIPT_COL};
use piquant_core::frames::{int_values, read_csv, string_values, write_csv_atomically};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptGene {
    pub transcript_id: String,
    pub gene_id: String,
    pub num_transcripts: u64,
}

///
/// Group the transcripts of a GTF by gene. Each transcript is reported once,
/// ordered by transcript id, with the size of its gene.
///
pub fn count_transcripts_for_genes(records: &[ExonRecord]) -> Vec<TranscriptGene> {
    let mut genes: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut transcript_genes: BTreeMap<&str, &str> = BTreeMap::new();

    for record in records {
        genes
            .entry(record.gene_id.as_str())
            .or_default()
            .insert(record.transcript_id.as_str());
        transcript_genes
            .entry(record.transcript_id.as_str())
            .or_insert(record.gene_id.as_str());
    }

    info!(
        "Counted {} transcripts in {} genes",
        transcript_genes.len(),
        genes.len()
    );

    transcript_genes
        .into_iter()
        .map(|(transcript_id, gene_id)| TranscriptGene {
            transcript_id: transcript_id.to_string(),
            gene_id: gene_id.to_string(),
            num_transcripts: genes.get(gene_id).map_or(1, |t| t.len() as u64),
        })
        .collect()
}

pub fn write_transcript_counts(counts: &[TranscriptGene], path: &Path) -> Result<()> {
    let mut df = DataFrame::new(vec![
        Column::new(
            TRANSCRIPT_COL.into(),
            counts
                .iter()
                .map(|c| c.transcript_id.as_str())
                .collect::<Vec<&str>>(),
        ),
        Column::new(
            GENE_COL.into(),
            counts.iter().map(|c| c.gene_id.as_str()).collect::<Vec<&str>>(),
        ),
        Column::new(
            NUM_TRANSCRIPTS_COL.into(),
            counts.iter().map(|c| c.num_transcripts).collect::<Vec<u64>>(),
        ),
    ])?;
    write_csv_atomically(&mut df, path)
}

pub fn read_transcript_counts(path: &Path) -> Result<HashMap<String, TranscriptGene>> {
    let df = read_csv(path)?;
    let transcripts = string_values(&df, TRANSCRIPT_COL)?;
    let genes = string_values(&df, GENE_COL)?;
    let num_transcripts = int_values(&df, NUM_TRANSCRIPTS_COL)?;

    Ok(transcripts
        .into_iter()
        .zip(genes)
        .zip(num_transcripts)
        .map(|((transcript_id, gene_id), num)| {
            (
                transcript_id.clone(),
                TranscriptGene {
                    transcript_id,
                    gene_id,
                    num_transcripts: num.max(1) as u64,
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use piquant_core::read_gtf_exons;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::path::PathBuf;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("tests/data")
            .join(file_name)
    }

    #[rstest]
    fn test_count_transcripts_for_genes() {
        let records = read_gtf_exons(&get_test_path("small.gtf")).unwrap();
        let counts = count_transcripts_for_genes(&records);

        let summary: Vec<(&str, &str, u64)> = counts
            .iter()
            .map(|c| (c.transcript_id.as_str(), c.gene_id.as_str(), c.num_transcripts))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("T1", "G1", 2),
                ("T2", "G1", 2),
                ("T3", "G2", 2),
                ("T4", "G2", 2),
                ("T5", "G3", 1),
            ]
        );
    }

    #[rstest]
    fn test_write_and_read_transcript_counts() {
        let records = read_gtf_exons(&get_test_path("small.gtf")).unwrap();
        let counts = count_transcripts_for_genes(&records);

        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("transcript_counts.csv");
        write_transcript_counts(&counts, &path).unwrap();

        let header = std::fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("transcript,gene,num-transcripts\n"));

        let read = read_transcript_counts(&path).unwrap();
        assert_eq!(read.len(), 5);
        assert_eq!(read["T5"], counts[4]);
    }
}
