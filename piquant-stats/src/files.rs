//! Names of the statistics files written per run and overall.

use crate::classifiers::Classifier;

/// Prefix of the aggregated statistics files in the stats directory.
pub const OVERALL_PREFIX: &str = "overall";

/// Y column of distribution statistics files.
pub const DISTRIBUTION_PERCENT_COL: &str = "percent-tpms";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsFile {
    Transcript,
    Gene,
    Grouped(Classifier),
    Distribution { classifier: Classifier, ascending: bool },
}

impl StatsFile {
    /// Every statistics file a run analysis produces, in writing order.
    pub fn all() -> Vec<StatsFile> {
        let mut files = vec![StatsFile::Transcript];
        files.extend(Classifier::grouped().map(StatsFile::Grouped));
        for classifier in Classifier::distributions() {
            for ascending in [true, false] {
                files.push(StatsFile::Distribution {
                    classifier,
                    ascending,
                });
            }
        }
        files.push(StatsFile::Gene);
        files
    }

    pub fn file_name(&self, prefix: &str) -> String {
        match self {
            StatsFile::Transcript => format!("{}_transcript_stats.csv", prefix),
            StatsFile::Gene => format!("{}_gene_stats.csv", prefix),
            StatsFile::Grouped(classifier) => {
                format!("{}_transcript_stats_by_{}.csv", prefix, classifier.name())
            }
            StatsFile::Distribution {
                classifier,
                ascending,
            } => format!(
                "{}_transcript_distribution_stats_{}_by_{}.csv",
                prefix,
                if *ascending { "asc" } else { "desc" },
                classifier.name()
            ),
        }
    }
}
