//! Per-run analysis: statistics tables for one quantification run.
//!
//! Every row of every table starts with one column per quant-run option,
//! holding the run's value for it, so that tables of different runs can be
//! stacked and compared later.

use std::path::{Path, PathBuf};

use log::{debug, info};
use polars::prelude::*;

use piquant_core::frames::write_csv;
use piquant_options::{ParameterSet, QuantRunOption};

use crate::classifiers::{
    Classifier, DEFAULT_NUM_DISTRIBUTION_POINTS, cumulative_distribution,
};
use crate::errors::StatsError;
use crate::files::{DISTRIBUTION_PERCENT_COL, StatsFile};
use crate::statistics::{Statistic, StatsContext};
use crate::tpms::{RunTpms, TpmRow, read_tpms};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub context: StatsContext,
    pub num_distribution_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            context: StatsContext::default(),
            num_distribution_points: DEFAULT_NUM_DISTRIBUTION_POINTS,
        }
    }
}

///
/// Columns tagging `height` rows with the values of a parameter set.
///
pub fn tag_columns(params: &ParameterSet, height: usize) -> Vec<Column> {
    params
        .iter()
        .map(|(option, value)| {
            Column::new(option.name().into(), vec![value.to_string(); height])
        })
        .collect()
}

fn statistic_columns(groups: &[Vec<&TpmRow>], context: &StatsContext) -> Vec<Column> {
    Statistic::ALL
        .iter()
        .map(|statistic| {
            let values: Vec<f64> = groups
                .iter()
                .map(|rows| statistic.calculate(rows, context))
                .collect();
            Column::new(statistic.name().into(), values)
        })
        .collect()
}

///
/// One row of every statistic over all the given rows.
///
pub fn overall_stats_frame(
    params: &ParameterSet,
    rows: &[TpmRow],
    context: &StatsContext,
) -> PolarsResult<DataFrame> {
    let all: Vec<&TpmRow> = rows.iter().collect();
    let mut columns = tag_columns(params, 1);
    columns.extend(statistic_columns(&[all], context));
    DataFrame::new(columns)
}

///
/// One row per bucket of a grouped classifier, labelled in a column named
/// after the classifier. Empty buckets are kept, with NaN statistics.
///
pub fn grouped_stats_frame(
    params: &ParameterSet,
    rows: &[TpmRow],
    classifier: Classifier,
    context: &StatsContext,
) -> PolarsResult<DataFrame> {
    let all: Vec<&TpmRow> = rows.iter().collect();
    let buckets = classifier.bucket_rows(&all);
    let labels = classifier.levels().map(|l| l.labels()).unwrap_or_default();

    let mut columns = tag_columns(params, buckets.len());
    columns.push(Column::new(classifier.name().into(), labels));
    columns.extend(statistic_columns(&buckets, context));
    DataFrame::new(columns)
}

///
/// Cumulative distribution of a distribution classifier's values over the
/// true positives of a run.
///
pub fn distribution_stats_frame(
    params: &ParameterSet,
    rows: &[TpmRow],
    classifier: Classifier,
    ascending: bool,
    config: &AnalysisConfig,
) -> PolarsResult<DataFrame> {
    let all: Vec<&TpmRow> = rows.iter().collect();
    let values: Vec<f64> = config
        .context
        .true_positives(&all)
        .iter()
        .filter_map(|r| classifier.value(r))
        .collect();
    let range = classifier.distribution_range().unwrap_or((0.0, 100.0));
    let points = cumulative_distribution(&values, range, config.num_distribution_points, ascending);

    let mut columns = tag_columns(params, points.len());
    columns.push(Column::new(
        classifier.name().into(),
        points.iter().map(|p| p.threshold).collect::<Vec<f64>>(),
    ));
    columns.push(Column::new(
        DISTRIBUTION_PERCENT_COL.into(),
        points.iter().map(|p| p.percent).collect::<Vec<f64>>(),
    ));
    DataFrame::new(columns)
}

///
/// Build the table for one kind of statistics file.
///
pub fn stats_frame(
    file: StatsFile,
    params: &ParameterSet,
    tpms: &RunTpms,
    config: &AnalysisConfig,
) -> PolarsResult<DataFrame> {
    let rows = &tpms.transcripts;
    match file {
        StatsFile::Transcript => overall_stats_frame(params, rows, &config.context),
        StatsFile::Gene => overall_stats_frame(params, &tpms.genes, &config.context),
        StatsFile::Grouped(classifier) => {
            grouped_stats_frame(params, rows, classifier, &config.context)
        }
        StatsFile::Distribution {
            classifier,
            ascending,
        } => distribution_stats_frame(params, rows, classifier, ascending, config),
    }
}

///
/// Analyse a finished run's `tpms.csv`, writing every statistics file,
/// prefixed with the run name, into `output_dir`. Returns the paths
/// written.
///
pub fn analyse_quantification_run(
    run_name: &str,
    tpms_file: &Path,
    output_dir: &Path,
    config: &AnalysisConfig,
) -> Result<Vec<PathBuf>, StatsError> {
    let params = ParameterSet::from_run_name(run_name, &QuantRunOption::ALL)?;
    let tpms = read_tpms(tpms_file)?;
    debug!(
        "Read {} transcript TPMs of {} genes from {:?}",
        tpms.transcripts.len(),
        tpms.genes.len(),
        tpms_file
    );

    let mut written = Vec::new();
    for file in StatsFile::all() {
        let mut df = stats_frame(file, &params, &tpms, config)?;
        let path = output_dir.join(file.file_name(run_name));
        write_csv(&mut df, &path)?;
        written.push(path);
    }

    info!(
        "Wrote {} statistics files for {} to {:?}",
        written.len(),
        run_name,
        output_dir
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tpms::test_support::row;
    use piquant_options::{OptionValue, QuantMethod};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn params() -> ParameterSet {
        ParameterSet::new()
            .with(QuantRunOption::QuantMethod, OptionValue::Quant(QuantMethod::Rsem))
            .with(QuantRunOption::ReadDepth, OptionValue::Number(30))
            .with(QuantRunOption::PairedEnd, OptionValue::Flag(true))
    }

    #[rstest]
    fn test_tag_columns(params: ParameterSet) {
        let columns = tag_columns(&params, 2);
        let names: Vec<&str> = columns.iter().map(|c| c.name().as_str()).collect();

        assert_eq!(names, vec!["quant_method", "read_depth", "paired_end"]);
        assert_eq!(columns[0].str().unwrap().get(1), Some("RSEM"));
        assert_eq!(columns[2].str().unwrap().get(0), Some("true"));
    }

    #[rstest]
    fn test_overall_frame(params: ParameterSet) {
        let rows = vec![row("T1", 750_000.0, 750_000.0), row("T2", 250_000.0, 0.0)];
        let df = overall_stats_frame(&params, &rows, &StatsContext::default()).unwrap();

        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 3 + Statistic::ALL.len());
        let sensitivity = df.column("sensitivity").unwrap().f64().unwrap().get(0);
        assert_eq!(sensitivity, Some(0.5));
    }

    #[rstest]
    fn test_grouped_frame_keeps_empty_buckets(params: ParameterSet) {
        let rows = vec![row("T1", 10.0, 10.0)];
        let df = grouped_stats_frame(
            &params,
            &rows,
            Classifier::GeneTranscriptNumber,
            &StatsContext::default(),
        )
        .unwrap();

        assert_eq!(df.height(), 10);
        let counts = df.column("num-tpms").unwrap().f64().unwrap();
        assert_eq!(counts.get(0), Some(1.0));
        assert_eq!(counts.get(5), Some(0.0));

        let rho = df.column("spearman-rho").unwrap().f64().unwrap();
        assert!(rho.get(5).unwrap().is_nan());

        let labels = df.column("gene_transcript_number").unwrap().str().unwrap();
        assert_eq!(labels.get(9), Some("> 9"));
    }

    #[rstest]
    fn test_distribution_frame_uses_true_positives(params: ParameterSet) {
        let rows = vec![
            row("T1", 100.0, 101.0),
            row("T2", 100.0, 150.0),
            row("T3", 100.0, 0.0),
        ];
        let df = distribution_stats_frame(
            &params,
            &rows,
            Classifier::AbsolutePercentError,
            true,
            &AnalysisConfig::default(),
        )
        .unwrap();

        assert_eq!(df.height(), 20);
        let percents = df.column(DISTRIBUTION_PERCENT_COL).unwrap().f64().unwrap();
        // threshold 5: only the 1% error is below it
        assert_eq!(percents.get(0), Some(50.0));
        assert_eq!(percents.get(19), Some(100.0));
    }

    #[rstest]
    fn test_analyse_quantification_run() {
        let tempdir = tempfile::tempdir().unwrap();
        let tpms = tempdir.path().join("tpms.csv");
        std::fs::write(
            &tpms,
            "transcript,gene,length,unique-length,num-transcripts,real-tpm,calc-tpm\n\
             T1,G1,1000,500,2,750000.0,750000.0\n\
             T2,G1,500,0,2,250000.0,0.0\n",
        )
        .unwrap();

        let run_name = "RSEM_30x_75b_pe_no_errors_no_bias_unstranded_noise-0";
        let written =
            analyse_quantification_run(run_name, &tpms, tempdir.path(), &AnalysisConfig::default())
                .unwrap();

        assert_eq!(written.len(), StatsFile::all().len());
        assert!(written.iter().all(|p| p.exists()));

        let contents =
            std::fs::read_to_string(tempdir.path().join(format!("{}_transcript_stats.csv", run_name)))
                .unwrap();
        assert!(contents.starts_with(
            "quant_method,read_depth,read_length,paired_end,errors,bias,stranded,noise_perc,num-tpms"
        ));
    }

    #[rstest]
    fn test_analyse_rejects_bad_run_name() {
        let tempdir = tempfile::tempdir().unwrap();
        let result = analyse_quantification_run(
            "not_a_run",
            &tempdir.path().join("tpms.csv"),
            tempdir.path(),
            &AnalysisConfig::default(),
        );
        assert!(matches!(result, Err(StatsError::Options(_))));
    }
}
