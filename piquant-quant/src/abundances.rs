//! Transcript abundances as reported by a quantification tool.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use piquant_core::consts::TPM_SCALE;

use crate::errors::QuantError;

///
/// Estimated TPM per transcript for one run.
///
/// Transcripts the tool did not report have an abundance of zero.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptAbundances {
    tpms: HashMap<String, f64>,
}

impl TranscriptAbundances {
    pub fn get_transcript_abundance(&self, transcript_id: &str) -> f64 {
        self.tpms.get(transcript_id).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.tpms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tpms.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.tpms.values().sum()
    }

    ///
    /// Rescale relative abundances (e.g. FPKM) so that they sum to one
    /// million. All-zero abundances are left as they are.
    ///
    pub fn normalised(mut self) -> Self {
        let total = self.total();
        if total > 0.0 {
            for value in self.tpms.values_mut() {
                *value = *value / total * TPM_SCALE;
            }
        }
        self
    }
}

impl From<HashMap<String, f64>> for TranscriptAbundances {
    fn from(tpms: HashMap<String, f64>) -> Self {
        TranscriptAbundances { tpms }
    }
}

impl FromIterator<(String, f64)> for TranscriptAbundances {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        TranscriptAbundances {
            tpms: iter.into_iter().collect(),
        }
    }
}

/// How to find a column in a tool's tab separated output.
#[derive(Debug, Clone, Copy)]
pub enum Column {
    /// Named in the header line.
    Name(&'static str),
    /// Zero-based position; the file has no header.
    Index(usize),
}

///
/// Read (transcript, value) pairs from a tab separated results file.
///
/// Lines starting with `#` are skipped. When either column is given by
/// name, the first remaining line is the header.
///
pub fn read_tab_separated(
    path: &Path,
    id_column: Column,
    value_column: Column,
) -> Result<TranscriptAbundances, QuantError> {
    let file_name = path.display().to_string();
    let reader = BufReader::new(File::open(path)?);
    let needs_header =
        matches!(id_column, Column::Name(_)) || matches!(value_column, Column::Name(_));

    let mut header: Option<Vec<String>> = None;
    let mut tpms = HashMap::new();

    let resolve = |column: Column, header: &Option<Vec<String>>| -> Result<usize, QuantError> {
        match column {
            Column::Index(i) => Ok(i),
            Column::Name(name) => header
                .as_ref()
                .and_then(|h| h.iter().position(|c| c == name))
                .ok_or_else(|| QuantError::MissingColumn {
                    file: file_name.clone(),
                    column: name.to_string(),
                }),
        }
    };

    let mut indices: Option<(usize, usize)> = None;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();

        if needs_header && header.is_none() {
            header = Some(fields.iter().map(|f| f.trim().to_string()).collect());
            continue;
        }

        let (id_index, value_index) = match indices {
            Some(found) => found,
            None => {
                let found = (resolve(id_column, &header)?, resolve(value_column, &header)?);
                indices = Some(found);
                found
            }
        };

        let parse_error = |reason: String| QuantError::ResultsParseError {
            file: file_name.clone(),
            line: index + 1,
            reason,
        };
        let id = fields
            .get(id_index)
            .ok_or_else(|| parse_error(format!("missing column {}", id_index + 1)))?;
        let value = fields
            .get(value_index)
            .ok_or_else(|| parse_error(format!("missing column {}", value_index + 1)))?;
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|e| parse_error(format!("value '{}': {}", value, e)))?;

        tpms.insert(id.trim().to_string(), value);
    }

    debug!("Read {} abundances from {}", tpms.len(), file_name);
    Ok(TranscriptAbundances { tpms })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn write_temp(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("results.txt");
        std::fs::write(&path, contents).unwrap();
        (tempdir, path)
    }

    #[rstest]
    fn test_missing_transcript_is_zero() {
        let abundances: TranscriptAbundances = [("T1".to_string(), 5.0)].into_iter().collect();

        assert_eq!(abundances.get_transcript_abundance("T1"), 5.0);
        assert_eq!(abundances.get_transcript_abundance("T2"), 0.0);
    }

    #[rstest]
    fn test_normalised_sums_to_a_million() {
        let abundances: TranscriptAbundances =
            [("T1".to_string(), 30.0), ("T2".to_string(), 10.0)]
                .into_iter()
                .collect();
        let normalised = abundances.normalised();

        assert!((normalised.total() - TPM_SCALE).abs() < 1e-6);
        assert_eq!(normalised.get_transcript_abundance("T1"), 750_000.0);
    }

    #[rstest]
    fn test_normalised_all_zero() {
        let abundances: TranscriptAbundances = [("T1".to_string(), 0.0)].into_iter().collect();
        assert_eq!(abundances.clone().normalised(), abundances);
    }

    #[rstest]
    fn test_read_by_header_names() {
        let (_dir, path) = write_temp("target_id\tlength\ttpm\nT1\t100\t2.5\nT2\t200\t7.5\n");
        let abundances =
            read_tab_separated(&path, Column::Name("target_id"), Column::Name("tpm")).unwrap();

        assert_eq!(abundances.len(), 2);
        assert_eq!(abundances.get_transcript_abundance("T2"), 7.5);
    }

    #[rstest]
    fn test_read_by_index_skips_comments() {
        let (_dir, path) = write_temp("# Sailfish v0.6\n# kmer size 20\nT1\t100\t2.5\t0\n");
        let abundances = read_tab_separated(&path, Column::Index(0), Column::Index(2)).unwrap();

        assert_eq!(abundances.get_transcript_abundance("T1"), 2.5);
    }

    #[rstest]
    fn test_missing_column() {
        let (_dir, path) = write_temp("id\tvalue\nT1\t1\n");
        let result = read_tab_separated(&path, Column::Name("id"), Column::Name("TPM"));

        assert!(matches!(result, Err(QuantError::MissingColumn { .. })));
    }

    #[rstest]
    fn test_malformed_value_names_line() {
        let (_dir, path) = write_temp("id\tTPM\nT1\t1.0\nT2\tlots\n");
        let result = read_tab_separated(&path, Column::Name("id"), Column::Name("TPM"));

        assert!(matches!(
            result,
            Err(QuantError::ResultsParseError { line: 3, .. })
        ));
    }
}
