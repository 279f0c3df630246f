//! Stacking the statistics files of every run into overall tables.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info, warn};
use polars::prelude::*;

use piquant_core::frames::{float_values, read_csv, string_values, write_csv};
use piquant_options::{ParameterSet, QuantRunOption};
use piquant_stats::{Classifier, OVERALL_PREFIX, StatsFile, tag_columns};

/// What distinguishes rows of one run within a statistics file.
#[derive(Debug, Clone, PartialEq)]
pub enum RowKey {
    /// Transcript and gene statistics have a single row per run.
    Run,
    /// Bucket index and label of a grouped classifier.
    Bucket(usize, String),
    /// Threshold of a cumulative distribution.
    Threshold(f64),
}

/// One row of an overall table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRecord {
    pub params: ParameterSet,
    pub key: RowKey,
    pub values: BTreeMap<String, f64>,
}

impl StatsRecord {
    pub fn value(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied().filter(|v| !v.is_nan())
    }

    /// Whether the run has the given value of every option in `fixed`.
    pub fn matches(&self, fixed: &ParameterSet) -> bool {
        fixed
            .iter()
            .all(|(option, value)| self.params.get(*option) == Some(value))
    }
}

/// The rows of one kind of statistics file across all runs.
#[derive(Debug, Clone)]
pub struct OverallStats {
    pub file: StatsFile,
    pub frame: DataFrame,
    pub records: Vec<StatsRecord>,
}

impl OverallStats {
    fn new(file: StatsFile) -> Self {
        OverallStats {
            file,
            frame: DataFrame::empty(),
            records: Vec::new(),
        }
    }

    pub fn write(&mut self, stats_dir: &Path) -> Result<PathBuf> {
        let path = stats_dir.join(self.file.file_name(OVERALL_PREFIX));
        write_csv(&mut self.frame, &path)?;
        Ok(path)
    }
}

fn key_column(file: StatsFile) -> Option<Classifier> {
    match file {
        StatsFile::Grouped(classifier) => Some(classifier),
        StatsFile::Distribution { classifier, .. } => Some(classifier),
        StatsFile::Transcript | StatsFile::Gene => None,
    }
}

///
/// Read one run's statistics file, replacing whatever option columns it
/// has with the run's own parameter set.
///
fn read_run_stats(
    file: StatsFile,
    path: &Path,
    params: &ParameterSet,
) -> Result<(DataFrame, Vec<StatsRecord>)> {
    let df = read_csv(path)?;
    let height = df.height();
    let key = key_column(file);

    let value_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .filter(|n| QuantRunOption::from_name(n).is_none())
        .filter(|n| key.is_none_or(|c| c.name() != n.as_str()))
        .collect();

    let mut columns = tag_columns(params, height);
    let keys: Vec<RowKey> = match (file, key) {
        (StatsFile::Grouped(_), Some(classifier)) => {
            let labels = string_values(&df, classifier.name())?;
            columns.push(Column::new(classifier.name().into(), labels.clone()));
            labels
                .into_iter()
                .enumerate()
                .map(|(i, label)| RowKey::Bucket(i, label))
                .collect()
        }
        (_, Some(classifier)) => {
            let thresholds = float_values(&df, classifier.name())?;
            columns.push(Column::new(classifier.name().into(), thresholds.clone()));
            thresholds.into_iter().map(RowKey::Threshold).collect()
        }
        _ => vec![RowKey::Run; height],
    };

    let mut records: Vec<StatsRecord> = keys
        .into_iter()
        .map(|key| StatsRecord {
            params: params.clone(),
            key,
            values: BTreeMap::new(),
        })
        .collect();

    for name in value_names {
        let values = float_values(&df, &name)?;
        for (record, value) in records.iter_mut().zip(&values) {
            record.values.insert(name.clone(), *value);
        }
        columns.push(Column::new(name.as_str().into(), values));
    }

    Ok((DataFrame::new(columns)?, records))
}

///
/// Collect the statistics of every run into overall tables, one per kind
/// of statistics file. A run whose statistics are missing is logged and
/// left out.
///
pub fn aggregate_run_stats(runs: &[(ParameterSet, PathBuf)]) -> Result<Vec<OverallStats>> {
    let mut overall: Vec<OverallStats> = StatsFile::all().into_iter().map(OverallStats::new).collect();
    let mut num_runs = 0;

    for (params, run_dir) in runs {
        let run_name = params.run_name();
        let transcript_stats = run_dir.join(StatsFile::Transcript.file_name(&run_name));
        if !transcript_stats.exists() {
            warn!("No statistics for run {}, skipping it", run_name);
            continue;
        }

        for stats in overall.iter_mut() {
            let path = run_dir.join(stats.file.file_name(&run_name));
            if !path.exists() {
                warn!("Missing {:?} for run {}", path, run_name);
                continue;
            }
            let (frame, records) = read_run_stats(stats.file, &path, params)?;
            if stats.frame.width() == 0 {
                stats.frame = frame;
            } else {
                stats.frame.vstack_mut(&frame)?;
            }
            stats.records.extend(records);
        }

        debug!("Aggregated statistics of {}", run_name);
        num_runs += 1;
    }

    info!("Aggregated statistics of {} of {} runs", num_runs, runs.len());
    Ok(overall)
}

#[cfg(test)]
mod tests {
    use super::*;

    use piquant_options::{OptionValue, QuantMethod};
    use piquant_stats::{AnalysisConfig, analyse_quantification_run};
    use pretty_assertions::assert_eq;
    use rstest::*;

    const TPMS: &str = "transcript,gene,length,unique-length,num-transcripts,real-tpm,calc-tpm\n\
                        T1,G1,1000,500,2,750000.0,700000.0\n\
                        T2,G1,500,0,2,250000.0,300000.0\n";

    fn params(method: QuantMethod) -> ParameterSet {
        ParameterSet::from_run_name(
            &format!("{}_30x_75b_pe_no_errors_no_bias_unstranded_noise-0", method),
            &QuantRunOption::ALL,
        )
        .unwrap()
    }

    fn analysed_run(root: &Path, method: QuantMethod) -> (ParameterSet, PathBuf) {
        let params = params(method);
        let run_dir = root.join(params.run_name());
        std::fs::create_dir_all(&run_dir).unwrap();
        let tpms = run_dir.join("tpms.csv");
        std::fs::write(&tpms, TPMS).unwrap();
        analyse_quantification_run(&params.run_name(), &tpms, &run_dir, &AnalysisConfig::default())
            .unwrap();
        (params, run_dir)
    }

    #[rstest]
    fn test_aggregate_skips_missing_runs() {
        let tempdir = tempfile::tempdir().unwrap();
        let runs = vec![
            analysed_run(tempdir.path(), QuantMethod::Rsem),
            (params(QuantMethod::Express), tempdir.path().join("missing")),
            analysed_run(tempdir.path(), QuantMethod::Sailfish),
        ];

        let overall = aggregate_run_stats(&runs).unwrap();
        let transcript = &overall[0];
        assert_eq!(transcript.file, StatsFile::Transcript);
        assert_eq!(transcript.frame.height(), 2);
        assert_eq!(transcript.records.len(), 2);
        assert_eq!(
            transcript.records[1].params.get(QuantRunOption::QuantMethod),
            Some(&OptionValue::Quant(QuantMethod::Sailfish))
        );
        assert_eq!(transcript.records[0].value("num-tpms"), Some(2.0));
    }

    #[rstest]
    fn test_grouped_records_keep_bucket_order() {
        let tempdir = tempfile::tempdir().unwrap();
        let runs = vec![analysed_run(tempdir.path(), QuantMethod::Rsem)];

        let overall = aggregate_run_stats(&runs).unwrap();
        let by_number = overall
            .iter()
            .find(|o| o.file == StatsFile::Grouped(Classifier::GeneTranscriptNumber))
            .unwrap();

        assert_eq!(by_number.records.len(), 10);
        assert_eq!(by_number.records[1].key, RowKey::Bucket(1, "<= 2".to_string()));
        assert_eq!(by_number.records[1].value("num-tpms"), Some(2.0));
    }

    #[rstest]
    fn test_write_overall_stats() {
        let tempdir = tempfile::tempdir().unwrap();
        let runs = vec![analysed_run(tempdir.path(), QuantMethod::Rsem)];

        let mut overall = aggregate_run_stats(&runs).unwrap();
        let path = overall[0].write(tempdir.path()).unwrap();

        assert!(path.ends_with("overall_transcript_stats.csv"));
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.starts_with("quant_method,read_depth"));
        assert!(contents.contains("\nRSEM,30,75,true,false,false,false,0,"));
    }
}
