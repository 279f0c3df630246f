//! Length of sequence unique to each transcript.
//!
//! Only exons belonging to a single transcript can contribute unique
//! sequence. Of those, a base counts if no other such exon on the same
//! chromosome covers it.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use log::{debug, info};
use polars::prelude::*;

use piquant_core::{Exon, ExonRecord};
use piquant_core::consts::{LENGTH_COL, TRANSCRIPT_COL, UNIQUE_LENGTH_COL};
use piquant_core::frames::{int_values, read_csv, string_values, write_csv_atomically};

/// Total and unique sequence length of one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSequence {
    pub transcript_id: String,
    pub length: u64,
    pub unique_length: u64,
}

///
/// Exons referenced by exactly one transcript, with that transcript.
///
fn unique_exons(records: &[ExonRecord]) -> Vec<(&Exon, &str)> {
    let mut owners: HashMap<&Exon, HashSet<&str>> = HashMap::new();
    for record in records {
        owners
            .entry(&record.exon)
            .or_default()
            .insert(record.transcript_id.as_str());
    }

    let mut exons: Vec<(&Exon, &str)> = owners
        .into_iter()
        .filter(|(_, transcripts)| transcripts.len() == 1)
        .filter_map(|(exon, transcripts)| transcripts.into_iter().next().map(|t| (exon, t)))
        .collect();
    exons.sort();
    exons
}

///
/// Half-open intervals `[start, end)` of a chromosome covered by exactly
/// one of the given exons, in order.
///
fn singly_covered_segments(exons: &[&Exon]) -> Vec<(u64, u64)> {
    let mut events: Vec<(u64, i64)> = Vec::with_capacity(exons.len() * 2);
    for exon in exons {
        events.push((exon.start, 1));
        events.push((exon.end + 1, -1));
    }
    events.sort_unstable();

    let mut segments: Vec<(u64, u64)> = Vec::new();
    let mut coverage: i64 = 0;
    let mut index = 0;
    while index < events.len() {
        let position = events[index].0;
        let before = coverage;
        while index < events.len() && events[index].0 == position {
            coverage += events[index].1;
            index += 1;
        }
        if before == 1 && coverage != 1 {
            if let Some(last) = segments.last_mut() {
                last.1 = position;
            }
        } else if before != 1 && coverage == 1 {
            segments.push((position, position));
        }
    }
    segments
}

fn overlap_length(segments: &[(u64, u64)], exon: &Exon) -> u64 {
    let (start, end) = (exon.start, exon.end + 1);
    let first = segments.partition_point(|(_, seg_end)| *seg_end <= start);
    segments[first..]
        .iter()
        .take_while(|(seg_start, _)| *seg_start < end)
        .map(|&(seg_start, seg_end)| seg_end.min(end) - seg_start.max(start))
        .sum()
}

///
/// Calculate total and unique sequence length for every transcript with
/// at least one exon. Results are ordered by transcript id.
///
pub fn calculate_unique_sequence(records: &[ExonRecord]) -> Vec<TranscriptSequence> {
    let mut lengths: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    let mut seen: HashSet<(&Exon, &str)> = HashSet::new();
    for record in records {
        // an exon listed twice for a transcript counts once
        if seen.insert((&record.exon, record.transcript_id.as_str())) {
            lengths.entry(record.transcript_id.as_str()).or_default().0 += record.exon.length();
        }
    }

    let exons = unique_exons(records);
    let mut by_chromosome: BTreeMap<&str, Vec<(&Exon, &str)>> = BTreeMap::new();
    for &(exon, transcript) in &exons {
        by_chromosome
            .entry(exon.seqname.as_str())
            .or_default()
            .push((exon, transcript));
    }

    for (chromosome, chromosome_exons) in &by_chromosome {
        let just_exons: Vec<&Exon> = chromosome_exons.iter().map(|(e, _)| *e).collect();
        let segments = singly_covered_segments(&just_exons);
        debug!(
            "{}: {} unique exons, {} singly covered segments",
            chromosome,
            just_exons.len(),
            segments.len()
        );

        for (exon, transcript) in chromosome_exons {
            if let Some(entry) = lengths.get_mut(transcript) {
                entry.1 += overlap_length(&segments, exon);
            }
        }
    }

    info!(
        "Calculated unique sequence for {} transcripts from {} unique exons",
        lengths.len(),
        exons.len()
    );

    lengths
        .into_iter()
        .map(|(transcript_id, (length, unique_length))| TranscriptSequence {
            transcript_id: transcript_id.to_string(),
            length,
            unique_length,
        })
        .collect()
}

pub fn write_unique_sequence(sequences: &[TranscriptSequence], path: &Path) -> Result<()> {
    let mut df = DataFrame::new(vec![
        Column::new(
            TRANSCRIPT_COL.into(),
            sequences
                .iter()
                .map(|s| s.transcript_id.as_str())
                .collect::<Vec<&str>>(),
        ),
        Column::new(
            LENGTH_COL.into(),
            sequences.iter().map(|s| s.length).collect::<Vec<u64>>(),
        ),
        Column::new(
            UNIQUE_LENGTH_COL.into(),
            sequences.iter().map(|s| s.unique_length).collect::<Vec<u64>>(),
        ),
    ])?;
    write_csv_atomically(&mut df, path)
}

pub fn read_unique_sequence(path: &Path) -> Result<HashMap<String, TranscriptSequence>> {
    let df = read_csv(path)?;
    let transcripts = string_values(&df, TRANSCRIPT_COL)?;
    let lengths = int_values(&df, LENGTH_COL)?;
    let unique_lengths = int_values(&df, UNIQUE_LENGTH_COL)?;

    Ok(transcripts
        .into_iter()
        .zip(lengths)
        .zip(unique_lengths)
        .map(|((transcript_id, length), unique_length)| {
            (
                transcript_id.clone(),
                TranscriptSequence {
                    transcript_id,
                    length: length.max(0) as u64,
                    unique_length: unique_length.max(0) as u64,
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    use piquant_core::{Strand, read_gtf_exons};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::path::PathBuf;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("tests/data")
            .join(file_name)
    }

    fn record(chr: &str, start: u64, end: u64, transcript: &str) -> ExonRecord {
        ExonRecord {
            exon: Exon::new(chr, start, end, Strand::Forward),
            transcript_id: transcript.to_string(),
            gene_id: "G".to_string(),
        }
    }

    fn unique_lengths(records: &[ExonRecord]) -> HashMap<String, u64> {
        calculate_unique_sequence(records)
            .into_iter()
            .map(|s| (s.transcript_id, s.unique_length))
            .collect()
    }

    #[rstest]
    fn test_two_overlapping_transcripts() {
        let records = vec![
            record("chr1", 10, 20, "T1"),
            record("chr1", 50, 60, "T1"),
            record("chr1", 15, 25, "T2"),
            record("chr1", 80, 90, "T2"),
        ];
        let lengths = unique_lengths(&records);

        assert_eq!(lengths["T1"], 16);
        assert_eq!(lengths["T2"], 16);
    }

    #[rstest]
    fn test_shared_exon_contributes_nothing() {
        let records = vec![
            record("chr1", 100, 200, "T1"),
            record("chr1", 100, 200, "T2"),
            record("chr1", 300, 309, "T2"),
        ];
        let lengths = unique_lengths(&records);

        assert_eq!(lengths["T1"], 0);
        assert_eq!(lengths["T2"], 10);
    }

    #[rstest]
    fn test_fully_covered_exon() {
        let records = vec![record("chr1", 10, 100, "T1"), record("chr1", 20, 30, "T2")];
        let lengths = unique_lengths(&records);

        assert_eq!(lengths["T1"], 91 - 11);
        assert_eq!(lengths["T2"], 0);
    }

    #[rstest]
    fn test_other_chromosomes_do_not_overlap() {
        let records = vec![record("chr1", 10, 20, "T1"), record("chr2", 10, 20, "T2")];
        let lengths = unique_lengths(&records);

        assert_eq!(lengths["T1"], 11);
        assert_eq!(lengths["T2"], 11);
    }

    #[rstest]
    fn test_adjacent_exons_do_not_overlap() {
        let records = vec![record("chr1", 10, 20, "T1"), record("chr1", 21, 30, "T2")];
        let lengths = unique_lengths(&records);

        assert_eq!(lengths["T1"], 11);
        assert_eq!(lengths["T2"], 10);
    }

    #[rstest]
    fn test_unique_length_never_exceeds_length() {
        let records = read_gtf_exons(&get_test_path("small.gtf")).unwrap();
        let sequences = calculate_unique_sequence(&records);

        assert_eq!(sequences.len(), 5);
        assert!(sequences.iter().all(|s| s.unique_length <= s.length));

        let expected = [("T1", 22, 16), ("T2", 22, 16), ("T3", 202, 101), ("T4", 151, 50), ("T5", 100, 100)];
        for (sequence, (id, length, unique)) in sequences.iter().zip(expected) {
            assert_eq!(sequence.transcript_id, id);
            assert_eq!(sequence.length, length);
            assert_eq!(sequence.unique_length, unique);
        }
    }

    #[rstest]
    fn test_write_and_read_unique_sequence() {
        let records = read_gtf_exons(&get_test_path("small.gtf")).unwrap();
        let sequences = calculate_unique_sequence(&records);

        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("unique_sequence.csv");
        write_unique_sequence(&sequences, &path).unwrap();

        let read = read_unique_sequence(&path).unwrap();
        assert_eq!(read.len(), 5);
        assert_eq!(read["T4"], sequences[3]);
    }
}
