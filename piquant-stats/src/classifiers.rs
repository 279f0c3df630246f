//! Classifiers partition the transcripts of a run by some property.
//!
//! Grouped classifiers put each transcript into a bucket, and statistics are
//! reported per bucket. Distribution classifiers report, at a range of
//! thresholds, the percentage of true positives on either side.

use std::fmt::{self, Display};

use crate::tpms::TpmRow;

pub const DEFAULT_NUM_DISTRIBUTION_POINTS: usize = 20;

///
/// Ordered upper bounds of buckets. An open set of levels has an extra
/// bucket for values above the last level; in a closed set those values
/// fall into the last bucket.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Levels {
    bounds: Vec<f64>,
    closed: bool,
}

impl Levels {
    pub fn new(bounds: Vec<f64>, closed: bool) -> Self {
        Levels { bounds, closed }
    }

    pub fn num_buckets(&self) -> usize {
        if self.closed {
            self.bounds.len()
        } else {
            self.bounds.len() + 1
        }
    }

    /// Index of the first level at or above the value.
    pub fn bucket(&self, value: f64) -> usize {
        let index = self.bounds.partition_point(|&bound| bound < value);
        if self.closed {
            index.min(self.bounds.len().saturating_sub(1))
        } else {
            index
        }
    }

    pub fn label(&self, bucket: usize) -> String {
        match self.bounds.get(bucket) {
            Some(bound) => format!("<= {}", bound),
            None => format!("> {}", self.bounds.last().copied().unwrap_or_default()),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        (0..self.num_buckets()).map(|b| self.label(b)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Grouped,
    Distribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classifier {
    GeneTranscriptNumber,
    AbsolutePercentError,
    Log10RealTpm,
    TranscriptLength,
    UniqueSequencePercentage,
    UniqueSequenceLength,
}

impl Classifier {
    pub const ALL: [Classifier; 6] = [
        Classifier::GeneTranscriptNumber,
        Classifier::AbsolutePercentError,
        Classifier::Log10RealTpm,
        Classifier::TranscriptLength,
        Classifier::UniqueSequencePercentage,
        Classifier::UniqueSequenceLength,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Classifier::GeneTranscriptNumber => "gene_transcript_number",
            Classifier::AbsolutePercentError => "absolute_percent_error",
            Classifier::Log10RealTpm => "log10_real_tpm",
            Classifier::TranscriptLength => "transcript_length",
            Classifier::UniqueSequencePercentage => "unique_sequence_percentage",
            Classifier::UniqueSequenceLength => "unique_sequence_length",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Classifier::GeneTranscriptNumber => "No. transcripts per gene",
            Classifier::AbsolutePercentError => "Absolute percent error",
            Classifier::Log10RealTpm => "Log10 (real TPM)",
            Classifier::TranscriptLength => "Transcript length",
            Classifier::UniqueSequencePercentage => "Unique sequence percentage",
            Classifier::UniqueSequenceLength => "Unique sequence length",
        }
    }

    pub fn from_name(name: &str) -> Option<Classifier> {
        Classifier::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn kind(&self) -> ClassifierKind {
        match self {
            Classifier::AbsolutePercentError => ClassifierKind::Distribution,
            _ => ClassifierKind::Grouped,
        }
    }

    pub fn grouped() -> impl Iterator<Item = Classifier> {
        Classifier::ALL
            .into_iter()
            .filter(|c| c.kind() == ClassifierKind::Grouped)
    }

    pub fn distributions() -> impl Iterator<Item = Classifier> {
        Classifier::ALL
            .into_iter()
            .filter(|c| c.kind() == ClassifierKind::Distribution)
    }

    ///
    /// The property of a row this classifier looks at, or `None` when it is
    /// undefined for the row (e.g. percent error of an unexpressed
    /// transcript).
    ///
    pub fn value(&self, row: &TpmRow) -> Option<f64> {
        let value = match self {
            Classifier::GeneTranscriptNumber => row.num_transcripts,
            Classifier::AbsolutePercentError => row.percent_error()?.abs(),
            Classifier::Log10RealTpm => row.real_tpm.log10(),
            Classifier::TranscriptLength => row.length,
            Classifier::UniqueSequencePercentage => {
                if row.length <= 0.0 {
                    return None;
                }
                100.0 * row.unique_length / row.length
            }
            Classifier::UniqueSequenceLength => row.unique_length,
        };
        if value.is_nan() { None } else { Some(value) }
    }

    pub fn levels(&self) -> Option<Levels> {
        let levels = match self {
            Classifier::GeneTranscriptNumber => {
                Levels::new((1..=9).map(|n| n as f64).collect(), false)
            }
            Classifier::Log10RealTpm => {
                Levels::new((0..=7).map(|n| n as f64 * 0.5).collect(), false)
            }
            Classifier::TranscriptLength => {
                Levels::new((2..=10).map(|n| n as f64 * 500.0).collect(), false)
            }
            Classifier::UniqueSequencePercentage => {
                Levels::new((1..=10).map(|n| n as f64 * 10.0).collect(), true)
            }
            Classifier::UniqueSequenceLength => Levels::new(
                vec![0.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 2000.0, 5000.0],
                false,
            ),
            Classifier::AbsolutePercentError => return None,
        };
        Some(levels)
    }

    pub fn distribution_range(&self) -> Option<(f64, f64)> {
        match self {
            Classifier::AbsolutePercentError => Some((0.0, 100.0)),
            _ => None,
        }
    }

    ///
    /// Partition rows into this classifier's buckets, in level order. Rows
    /// for which the classifier is undefined are left out.
    ///
    pub fn bucket_rows<'a>(&self, rows: &[&'a TpmRow]) -> Vec<Vec<&'a TpmRow>> {
        let Some(levels) = self.levels() else {
            return Vec::new();
        };
        let mut buckets = vec![Vec::new(); levels.num_buckets()];
        for &row in rows {
            if let Some(value) = self.value(row) {
                buckets[levels.bucket(value)].push(row);
            }
        }
        buckets
    }
}

impl Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One point of a cumulative distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionPoint {
    pub threshold: f64,
    pub percent: f64,
}

///
/// Sample `num_points` thresholds evenly over `(lo, hi]` and, at each, the
/// percentage of values below it (ascending) or above it (descending).
///
pub fn cumulative_distribution(
    values: &[f64],
    range: (f64, f64),
    num_points: usize,
    ascending: bool,
) -> Vec<DistributionPoint> {
    let (lo, hi) = range;
    (0..num_points)
        .map(|i| {
            let threshold = lo + (i + 1) as f64 * (hi - lo) / num_points as f64;
            let count = values
                .iter()
                .filter(|&&v| if ascending { v < threshold } else { v > threshold })
                .count();
            let percent = if values.is_empty() {
                f64::NAN
            } else {
                100.0 * count as f64 / values.len() as f64
            };
            DistributionPoint { threshold, percent }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tpms::test_support::row;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(0.5, 0)]
    #[case(1.0, 0)]
    #[case(1.5, 1)]
    #[case(9.0, 8)]
    #[case(12.0, 9)]
    fn test_open_levels(#[case] value: f64, #[case] expected: usize) {
        let levels = Classifier::GeneTranscriptNumber.levels().unwrap();
        assert_eq!(levels.bucket(value), expected);
    }

    #[rstest]
    fn test_closed_levels_have_no_overflow_bucket() {
        let levels = Classifier::UniqueSequencePercentage.levels().unwrap();
        assert_eq!(levels.num_buckets(), 10);
        assert_eq!(levels.bucket(100.0), 9);
        assert_eq!(levels.bucket(150.0), 9);
        assert_eq!(levels.bucket(0.0), 0);
    }

    #[rstest]
    fn test_labels_follow_levels() {
        let levels = Classifier::Log10RealTpm.levels().unwrap();
        let labels = levels.labels();

        assert_eq!(labels.len(), 9);
        assert_eq!(labels[0], "<= 0");
        assert_eq!(labels[1], "<= 0.5");
        assert_eq!(labels[7], "<= 3.5");
        assert_eq!(labels[8], "> 3.5");
    }

    #[rstest]
    fn test_bucketed_values_map_to_consecutive_labels() {
        let levels = Classifier::UniqueSequenceLength.levels().unwrap();
        let values = [0.0, 50.0, 200.0, 400.0, 600.0, 900.0, 1500.0, 3000.0, 9000.0];

        let labels: Vec<String> = values
            .iter()
            .map(|&v| levels.label(levels.bucket(v)))
            .collect();
        assert_eq!(labels, levels.labels());
    }

    #[rstest]
    fn test_bucket_rows_skips_undefined_values() {
        let mut empty = row("T3", 1.0, 1.0);
        empty.length = 0.0;
        let rows = vec![row("T1", 1.0, 1.0), row("T2", 1.0, 1.0), empty];
        let refs: Vec<&TpmRow> = rows.iter().collect();

        let buckets = Classifier::UniqueSequencePercentage.bucket_rows(&refs);
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[4].len(), 2);
        assert_eq!(buckets.iter().map(|b| b.len()).sum::<usize>(), 2);
    }

    #[rstest]
    fn test_cumulative_distribution_ascending() {
        let points = cumulative_distribution(&[1.0, 2.0, 3.0, 4.0, 5.0], (0.0, 5.0), 20, true);

        assert_eq!(points.len(), 20);
        assert_eq!(points[9].threshold, 2.5);
        assert_eq!(points[9].percent, 40.0);
        assert_eq!(points[19].threshold, 5.0);
        assert_eq!(points[19].percent, 80.0);
    }

    #[rstest]
    fn test_cumulative_distribution_descending() {
        let points = cumulative_distribution(&[1.0, 2.0, 3.0, 4.0, 5.0], (0.0, 5.0), 20, false);
        assert_eq!(points[9].percent, 60.0);
        assert_eq!(points[19].percent, 0.0);
    }

    #[rstest]
    fn test_classifier_kinds() {
        assert_eq!(Classifier::grouped().count(), 5);
        assert_eq!(
            Classifier::distributions().collect::<Vec<_>>(),
            vec![Classifier::AbsolutePercentError]
        );
    }
}
