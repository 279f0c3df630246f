//! Marking estimates as true or false positives and negatives.

use crate::tpms::TpmRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Positivity {
    TruePositive,
    FalsePositive,
    TrueNegative,
    FalseNegative,
}

impl Positivity {
    ///
    /// A transcript is present when its TPM is above the cutoff. Positive
    /// and negative refer to the estimate, true and false to whether it
    /// agrees with the real abundance.
    ///
    pub fn classify(real_tpm: f64, calc_tpm: f64, not_present_cutoff: f64) -> Self {
        match (real_tpm > not_present_cutoff, calc_tpm > not_present_cutoff) {
            (true, true) => Positivity::TruePositive,
            (false, true) => Positivity::FalsePositive,
            (false, false) => Positivity::TrueNegative,
            (true, false) => Positivity::FalseNegative,
        }
    }

    pub fn of(row: &TpmRow, not_present_cutoff: f64) -> Self {
        Positivity::classify(row.real_tpm, row.calc_tpm, not_present_cutoff)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositivityCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl PositivityCounts {
    pub fn count<'a, I>(rows: I, not_present_cutoff: f64) -> Self
    where
        I: IntoIterator<Item = &'a TpmRow>,
    {
        let mut counts = PositivityCounts::default();
        for row in rows {
            match Positivity::of(row, not_present_cutoff) {
                Positivity::TruePositive => counts.true_positives += 1,
                Positivity::FalsePositive => counts.false_positives += 1,
                Positivity::TrueNegative => counts.true_negatives += 1,
                Positivity::FalseNegative => counts.false_negatives += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// TP / (TP + FN), or 1 when nothing was really present.
    pub fn sensitivity(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            1.0
        } else {
            self.true_positives as f64 / denominator as f64
        }
    }

    /// TN / (TN + FP), or 1 when everything was really present.
    pub fn specificity(&self) -> f64 {
        let denominator = self.true_negatives + self.false_positives;
        if denominator == 0 {
            1.0
        } else {
            self.true_negatives as f64 / denominator as f64
        }
    }
}
