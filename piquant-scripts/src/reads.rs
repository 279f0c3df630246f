//! Simulated reads files: naming and record-level reading.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use piquant_core::ExpressionProfile;
use piquant_core::consts::READS_FILE_STEM;
use piquant_options::ParameterSet;

use crate::errors::ScriptError;

/// Extension of simulated reads: reads with errors carry qualities.
pub fn reads_extension(errors: bool) -> &'static str {
    if errors { "fastq" } else { "fasta" }
}

/// Lines making up one simulated read.
pub fn lines_per_read(errors: bool) -> usize {
    if errors { 4 } else { 2 }
}

/// Lines per shuffled record: both mates of a pair travel together.
pub fn lines_per_record(errors: bool, paired_end: bool) -> usize {
    lines_per_read(errors) * if paired_end { 2 } else { 1 }
}

/// File the simulator writes, holding both mates interleaved for paired-end.
pub fn simulated_reads_file(errors: bool) -> String {
    format!("{}.{}", READS_FILE_STEM, reads_extension(errors))
}

///
/// Final reads file names for a run, relative to its reads directory:
/// `reads.<ext>` for single-end, `reads.1.<ext>` and `reads.2.<ext>` for
/// paired-end.
///
pub fn reads_file_names(params: &ParameterSet) -> Result<Vec<String>, ScriptError> {
    let ext = reads_extension(params.errors()?);
    let names = if params.paired_end()? {
        vec![
            format!("{}.1.{}", READS_FILE_STEM, ext),
            format!("{}.2.{}", READS_FILE_STEM, ext),
        ]
    } else {
        vec![format!("{}.{}", READS_FILE_STEM, ext)]
    };
    Ok(names)
}

pub fn reads_files(reads_dir: &Path, params: &ParameterSet) -> Result<Vec<PathBuf>, ScriptError> {
    Ok(reads_file_names(params)?
        .into_iter()
        .map(|name| reads_dir.join(name))
        .collect())
}

///
/// Number of reads to simulate so that expressed transcripts are covered to
/// the requested depth.
///
pub fn calculate_reads_for_depth(
    profile_path: &Path,
    read_length: u32,
    read_depth: u32,
) -> Result<u64, ScriptError> {
    let profile = ExpressionProfile::try_from(profile_path)?;
    Ok(profile.reads_for_depth(read_length, read_depth))
}

/// A group of consecutive lines forming one read, or one read pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRecord {
    pub lines: Vec<String>,
}

impl ReadRecord {
    /// Sequence of the first read in the record.
    pub fn sequence(&self) -> &str {
        self.lines.get(1).map(String::as_str).unwrap_or("")
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for line in &self.lines {
            writeln!(writer, "{}", line)?;
        }
        Ok(())
    }
}

///
/// Split reads into records of `lines_per_record` lines. A trailing
/// partial record is an error.
///
pub fn read_records<R: BufRead>(
    reader: R,
    lines_per_record: usize,
) -> Result<Vec<ReadRecord>, ScriptError> {
    let mut records = Vec::new();
    let mut current = Vec::with_capacity(lines_per_record);
    let mut line_num = 0;

    for line in reader.lines() {
        let line = line?;
        line_num += 1;
        if line.is_empty() && current.is_empty() {
            continue;
        }
        current.push(line);
        if current.len() == lines_per_record {
            records.push(ReadRecord {
                lines: std::mem::replace(&mut current, Vec::with_capacity(lines_per_record)),
            });
        }
    }

    if !current.is_empty() {
        return Err(ScriptError::TruncatedRecord(line_num));
    }
    Ok(records)
}
