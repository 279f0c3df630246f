//! The statistics piquant reports for each run.
//!
//! Every statistic is computed from a set of [TpmRow]s, either all rows of
//! a run or one classifier bucket of them. Those computed over true
//! positives filter the rows themselves.

use std::cmp::Ordering;
use std::fmt::{self, Display};

use crate::positivity::{Positivity, PositivityCounts};
use crate::tpms::TpmRow;

pub const DEFAULT_ERROR_FRACTION_THRESHOLD: f64 = 10.0;

/// Thresholds the statistics are computed against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsContext {
    pub not_present_cutoff: f64,
    /// Percent error above which an estimate counts as wrong.
    pub error_fraction_threshold: f64,
}

impl Default for StatsContext {
    fn default() -> Self {
        StatsContext {
            not_present_cutoff: piquant_core::consts::DEFAULT_NOT_PRESENT_CUTOFF,
            error_fraction_threshold: DEFAULT_ERROR_FRACTION_THRESHOLD,
        }
    }
}

impl StatsContext {
    pub fn true_positives<'a>(&self, rows: &[&'a TpmRow]) -> Vec<&'a TpmRow> {
        rows.iter()
            .filter(|r| Positivity::of(r, self.not_present_cutoff) == Positivity::TruePositive)
            .copied()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    NumTpms,
    NumTruePositiveTpms,
    SpearmanRho,
    ErrorFraction,
    MedianPercentError,
    Sensitivity,
    Specificity,
}

impl Statistic {
    pub const ALL: [Statistic; 7] = [
        Statistic::NumTpms,
        Statistic::NumTruePositiveTpms,
        Statistic::SpearmanRho,
        Statistic::ErrorFraction,
        Statistic::MedianPercentError,
        Statistic::Sensitivity,
        Statistic::Specificity,
    ];

    /// Column name in stats files.
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::NumTpms => "num-tpms",
            Statistic::NumTruePositiveTpms => "num-true-positive-tpms",
            Statistic::SpearmanRho => "spearman-rho",
            Statistic::ErrorFraction => "error-fraction",
            Statistic::MedianPercentError => "median-percent-error",
            Statistic::Sensitivity => "sensitivity",
            Statistic::Specificity => "specificity",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Statistic::NumTpms => "No. TPMs",
            Statistic::NumTruePositiveTpms => "No. true positive TPMs",
            Statistic::SpearmanRho => "Spearman's rho",
            Statistic::ErrorFraction => "Error fraction",
            Statistic::MedianPercentError => "Median percent error",
            Statistic::Sensitivity => "Sensitivity",
            Statistic::Specificity => "Specificity",
        }
    }

    pub fn from_name(name: &str) -> Option<Statistic> {
        Statistic::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Fixed y-axis range when plotting, if the statistic has a natural one.
    pub fn range(&self) -> Option<(f64, f64)> {
        match self {
            Statistic::SpearmanRho => Some((-1.0, 1.0)),
            Statistic::ErrorFraction | Statistic::Sensitivity | Statistic::Specificity => {
                Some((0.0, 1.0))
            }
            _ => None,
        }
    }

    /// Counts are never missing, so they are not worth a distribution plot.
    pub fn is_count(&self) -> bool {
        matches!(self, Statistic::NumTpms | Statistic::NumTruePositiveTpms)
    }

    pub fn calculate(&self, rows: &[&TpmRow], context: &StatsContext) -> f64 {
        match self {
            Statistic::NumTpms => rows.len() as f64,
            Statistic::NumTruePositiveTpms => context.true_positives(rows).len() as f64,
            Statistic::SpearmanRho => {
                let (real, calc): (Vec<f64>, Vec<f64>) = context
                    .true_positives(rows)
                    .iter()
                    .map(|r| (r.real_tpm.log10(), r.calc_tpm.log10()))
                    .unzip();
                spearman_rho(&real, &calc)
            }
            Statistic::ErrorFraction => {
                let errors = percent_errors(&context.true_positives(rows));
                error_fraction(&errors, context.error_fraction_threshold)
            }
            Statistic::MedianPercentError => {
                median(&percent_errors(&context.true_positives(rows)))
            }
            Statistic::Sensitivity => {
                PositivityCounts::count(rows.iter().copied(), context.not_present_cutoff)
                    .sensitivity()
            }
            Statistic::Specificity => {
                PositivityCounts::count(rows.iter().copied(), context.not_present_cutoff)
                    .specificity()
            }
        }
    }
}

impl Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn percent_errors(rows: &[&TpmRow]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.percent_error()).collect()
}

///
/// Proportion of values whose magnitude exceeds `threshold`; NaN when
/// there are no values.
///
pub fn error_fraction(percent_errors: &[f64], threshold: f64) -> f64 {
    if percent_errors.is_empty() {
        return f64::NAN;
    }
    let above = percent_errors
        .iter()
        .filter(|e| e.abs() > threshold)
        .count();
    above as f64 / percent_errors.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let count = sorted.len();
    if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    }
}

/// Ranks starting at 1, ties sharing the average of their positions.
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = rank;
        }
        start = end;
    }
    ranks
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        covariance += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    covariance / (var_x * var_y).sqrt()
}

///
/// Spearman rank correlation. NaN for fewer than two pairs or when either
/// side is constant.
///
pub fn spearman_rho(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 || x.len() != y.len() {
        return f64::NAN;
    }
    pearson(&ranks(x), &ranks(y))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tpms::test_support::row;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn calculate_all(rows: &[TpmRow], context: &StatsContext) -> Vec<f64> {
        let rows: Vec<&TpmRow> = rows.iter().collect();
        Statistic::ALL
            .iter()
            .map(|s| s.calculate(&rows, context))
            .collect()
    }

    #[rstest]
    fn test_identity_quantifier() {
        let rows = vec![row("T1", 750_000.0, 750_000.0), row("T2", 250_000.0, 250_000.0)];
        let values = calculate_all(&rows, &StatsContext::default());

        assert_eq!(values, vec![2.0, 2.0, 1.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[rstest]
    fn test_half_missed_quantifier() {
        let rows = vec![row("T1", 750_000.0, 750_000.0), row("T2", 250_000.0, 0.0)];
        let rows: Vec<&TpmRow> = rows.iter().collect();
        let context = StatsContext::default();

        assert_eq!(Statistic::NumTruePositiveTpms.calculate(&rows, &context), 1.0);
        assert_eq!(Statistic::Sensitivity.calculate(&rows, &context), 0.5);
        assert_eq!(Statistic::Specificity.calculate(&rows, &context), 1.0);
        assert!(Statistic::SpearmanRho.calculate(&rows, &context).is_nan());
    }

    #[rstest]
    fn test_error_fraction_above_threshold() {
        let rows = vec![
            row("T1", 100.0, 105.0),
            row("T2", 100.0, 120.0),
            row("T3", 100.0, 200.0),
        ];
        let rows: Vec<&TpmRow> = rows.iter().collect();
        let fraction = Statistic::ErrorFraction.calculate(&rows, &StatsContext::default());

        assert!((fraction - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(
            Statistic::MedianPercentError.calculate(&rows, &StatsContext::default()),
            20.0
        );
    }

    #[rstest]
    fn test_no_true_positives() {
        let rows = vec![row("T1", 0.0, 0.0)];
        let values = calculate_all(&rows, &StatsContext::default());

        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 0.0);
        assert!(values[2].is_nan());
        assert!(values[3].is_nan());
        assert!(values[4].is_nan());
    }

    #[rstest]
    #[case(&[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0], 1.0)]
    #[case(&[1.0, 2.0, 3.0], &[30.0, 20.0, 10.0], -1.0)]
    #[case(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 4.0], 0.8)]
    fn test_spearman_rho(#[case] x: &[f64], #[case] y: &[f64], #[case] expected: f64) {
        assert!((spearman_rho(x, y) - expected).abs() < 1e-12);
    }

    #[rstest]
    fn test_spearman_rho_constant_input() {
        assert!(spearman_rho(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[rstest]
    fn test_ranks_with_ties() {
        assert_eq!(ranks(&[10.0, 20.0, 20.0, 5.0]), vec![2.0, 3.5, 3.5, 1.0]);
    }

    #[rstest]
    #[case(&[], f64::NAN)]
    #[case(&[3.0, 1.0, 2.0], 2.0)]
    #[case(&[4.0, 1.0, 2.0, 3.0], 2.5)]
    fn test_median(#[case] values: &[f64], #[case] expected: f64) {
        let result = median(values);
        assert!(result == expected || (result.is_nan() && expected.is_nan()));
    }

    #[rstest]
    fn test_statistic_names_round_trip() {
        for statistic in Statistic::ALL {
            assert_eq!(Statistic::from_name(statistic.name()), Some(statistic));
        }
    }
}
