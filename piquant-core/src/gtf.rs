//! Reading exon records from GTF transcript models.

use std::io::BufRead;
use std::path::Path;

use crate::errors::CoreError;
use crate::models::{Exon, Strand};
use crate::utils::{extract_gtf_attribute, get_dynamic_reader};

/// An exon line of a GTF file together with the transcript and gene it
/// belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ExonRecord {
    pub exon: Exon,
    pub transcript_id: String,
    pub gene_id: String,
}

///
/// Read all `exon` features of a GTF file (optionally gzipped).
///
/// Comment lines and features other than exons are skipped. Coordinates
/// are kept 1-based and inclusive, as written.
///
pub fn read_gtf_exons(path: &Path) -> Result<Vec<ExonRecord>, CoreError> {
    let reader = get_dynamic_reader(path)
        .map_err(|e| CoreError::FileReadError(format!("{:?}: {}", path, e)))?;

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        if let Some(record) = parse_gtf_exon(&line, index + 1)? {
            records.push(record);
        }
    }

    Ok(records)
}

fn parse_gtf_exon(line: &str, line_num: usize) -> Result<Option<ExonRecord>, CoreError> {
    let err = |reason: String| CoreError::GtfParseError {
        line: line_num,
        reason,
    };

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 9 {
        return Err(err(format!("expected 9 fields, found {}", fields.len())));
    }

    if fields[2] != "exon" {
        return Ok(None);
    }

    let start = fields[3]
        .parse::<u64>()
        .map_err(|e| err(format!("start '{}': {}", fields[3], e)))?;
    let end = fields[4]
        .parse::<u64>()
        .map_err(|e| err(format!("end '{}': {}", fields[4], e)))?;
    if end < start {
        return Err(err(format!("end {} before start {}", end, start)));
    }
    let strand: Strand = fields[6].parse().map_err(|e: String| err(e))?;

    let transcript_id = extract_gtf_attribute(fields[8], "transcript_id")
        .ok_or_else(|| err("missing transcript_id attribute".to_string()))?;
    let gene_id = extract_gtf_attribute(fields[8], "gene_id")
        .ok_or_else(|| err("missing gene_id attribute".to_string()))?;

    Ok(Some(ExonRecord {
        exon: Exon::new(fields[0], start, end, strand),
        transcript_id: transcript_id.to_string(),
        gene_id: gene_id.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_read_gtf_exons_skips_other_features() {
        let records = read_gtf_exons(&get_test_path("small.gtf")).unwrap();

        assert_eq!(records.len(), 9);
        assert_eq!(records[0].transcript_id, "T1");
        assert_eq!(records[0].gene_id, "G1");
        assert_eq!(records[0].exon, Exon::new("chr1", 10, 20, Strand::Forward));
    }

    #[rstest]
    fn test_gtf_missing_transcript_id() {
        let line = "chr1\tt\texon\t1\t10\t.\t+\t.\tgene_id \"G1\";";
        let result = parse_gtf_exon(line, 3);

        assert!(matches!(result, Err(CoreError::GtfParseError { line: 3, .. })));
    }

    #[rstest]
    fn test_gtf_bad_strand() {
        let line = "chr1\tt\texon\t1\t10\t.\t.\t.\tgene_id \"G1\"; transcript_id \"T1\";";
        assert!(parse_gtf_exon(line, 1).is_err());
    }
}
