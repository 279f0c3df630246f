use std::collections::HashMap;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::consts::TPM_SCALE;
use crate::errors::CoreError;
use crate::utils::get_dynamic_reader;

///
/// One line of a Flux Simulator expression profile (`.pro`) file.
///
/// The first six tab separated fields are fixed. Later simulation phases
/// append library and sequencing counts; those are carried in `rest` so
/// that a profile can be rewritten without losing them.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRow {
    pub locus: String,
    pub transcript_id: String,
    pub coding: String,
    pub length: u64,
    pub fraction: f64,
    pub molecules: u64,
    pub rest: Option<String>,
}

impl ProfileRow {
    /// Ground-truth abundance of the transcript.
    pub fn tpm(&self) -> f64 {
        self.fraction * TPM_SCALE
    }

    pub fn is_expressed(&self) -> bool {
        self.molecules > 0
    }

    fn parse(line: &str, line_num: usize) -> Result<Self, CoreError> {
        let err = |reason: String| CoreError::ProfileParseError {
            line: line_num,
            reason,
        };

        let mut fields = line.splitn(7, '\t');
        let mut next_field = |name: &str| {
            fields
                .next()
                .filter(|f| !f.is_empty())
                .ok_or_else(|| err(format!("missing {} field", name)))
        };

        let locus = next_field("locus")?.to_string();
        let transcript_id = next_field("transcript id")?.to_string();
        let coding = next_field("coding")?.to_string();
        let length = next_field("length")?;
        let fraction = next_field("fraction")?;
        let molecules = next_field("molecules")?;
        let rest = fields.next().map(|r| r.to_string());

        Ok(ProfileRow {
            locus,
            transcript_id,
            coding,
            length: length
                .parse::<u64>()
                .map_err(|e| err(format!("length '{}': {}", length, e)))?,
            fraction: fraction
                .parse::<f64>()
                .map_err(|e| err(format!("fraction '{}': {}", fraction, e)))?,
            molecules: parse_count(molecules)
                .ok_or_else(|| err(format!("molecule count '{}'", molecules)))?,
            rest,
        })
    }
}

// flux writes molecule counts as integers, but tolerate "12.0"
fn parse_count(s: &str) -> Option<u64> {
    s.parse::<u64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64))
}

impl Display for ProfileRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.locus, self.transcript_id, self.coding, self.length, self.fraction, self.molecules
        )?;
        if let Some(rest) = &self.rest {
            write!(f, "\t{}", rest)?;
        }
        Ok(())
    }
}

///
/// ExpressionProfile struct, the ground truth produced by the first phase
/// of read simulation.
///
#[derive(Clone, Debug, Default)]
pub struct ExpressionProfile {
    pub rows: Vec<ProfileRow>,
    pub path: Option<PathBuf>,
}

impl TryFrom<&Path> for ExpressionProfile {
    type Error = CoreError;

    ///
    /// Read an [ExpressionProfile] from a `.pro` file (optionally gzipped).
    ///
    fn try_from(value: &Path) -> Result<Self, CoreError> {
        let reader = get_dynamic_reader(value)
            .map_err(|e| CoreError::FileReadError(format!("{:?}: {}", value, e)))?;

        let mut rows = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            rows.push(ProfileRow::parse(line, index + 1)?);
        }

        if rows.is_empty() {
            return Err(CoreError::EmptyProfile(value.display().to_string()));
        }

        Ok(ExpressionProfile {
            rows,
            path: Some(value.to_path_buf()),
        })
    }
}

impl TryFrom<&str> for ExpressionProfile {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, CoreError> {
        ExpressionProfile::try_from(Path::new(value))
    }
}

impl From<Vec<ProfileRow>> for ExpressionProfile {
    fn from(rows: Vec<ProfileRow>) -> Self {
        ExpressionProfile { rows, path: None }
    }
}

impl ExpressionProfile {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProfileRow> {
        self.rows.iter()
    }

    /// Map from transcript id to ground-truth TPM.
    pub fn tpms(&self) -> HashMap<&str, f64> {
        self.rows
            .iter()
            .map(|r| (r.transcript_id.as_str(), r.tpm()))
            .collect()
    }

    /// Total length of all transcripts that received at least one molecule.
    pub fn expressed_length(&self) -> u64 {
        self.rows
            .iter()
            .filter(|r| r.is_expressed())
            .map(|r| r.length)
            .sum()
    }

    ///
    /// Number of reads needed so that expressed transcripts are covered to
    /// the requested depth.
    ///
    pub fn reads_for_depth(&self, read_length: u32, read_depth: u32) -> u64 {
        if read_length == 0 {
            return 0;
        }
        self.expressed_length() * read_depth as u64 / read_length as u64
    }

    ///
    /// Write the profile back out in the simulator's format.
    ///
    pub fn write(&self, path: &Path) -> Result<(), CoreError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for row in &self.rows {
            writeln!(writer, "{}", row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Display for ExpressionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExpressionProfile with {} transcripts.", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("tests/data")
            .join(file_name)
    }

    #[rstest]
    fn test_read_profile() {
        let profile = ExpressionProfile::try_from(get_test_path("small.pro").as_path()).unwrap();

        assert_eq!(profile.len(), 4);
        assert_eq!(profile.rows[0].transcript_id, "T1");
        assert_eq!(profile.rows[0].length, 1000);
        assert_eq!(profile.rows[0].molecules, 750);
    }

    #[rstest]
    fn test_profile_tpms_sum_to_a_million() {
        let profile = ExpressionProfile::try_from(get_test_path("small.pro").as_path()).unwrap();
        let total: f64 = profile.tpms().values().sum();

        assert!((total - TPM_SCALE).abs() < 1e-6);
    }

    #[rstest]
    fn test_profile_roundtrip_keeps_numeric_fields() {
        let profile = ExpressionProfile::try_from(get_test_path("small.pro").as_path()).unwrap();

        let tempdir = tempfile::tempdir().unwrap();
        let out = tempdir.path().join("rewritten.pro");
        profile.write(&out).unwrap();

        let reread = ExpressionProfile::try_from(out.as_path()).unwrap();
        assert_eq!(reread.rows, profile.rows);
    }

    #[rstest]
    fn test_reads_for_depth_counts_expressed_transcripts_only() {
        let profile = ExpressionProfile::try_from(get_test_path("small.pro").as_path()).unwrap();

        // T1 (1000) and T2 (500) are expressed, T3 has no molecules
        assert_eq!(profile.expressed_length(), 1500);
        assert_eq!(profile.reads_for_depth(50, 10), 300);
    }

    #[rstest]
    fn test_malformed_profile_line() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("bad.pro");
        std::fs::write(&path, "chr1:1-10W\tT1\tCDS\tnot-a-number\t0.5\t10\n").unwrap();

        let result = ExpressionProfile::try_from(path.as_path());
        assert!(matches!(
            result,
            Err(CoreError::ProfileParseError { line: 1, .. })
        ));
    }
}
