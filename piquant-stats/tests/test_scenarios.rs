//! Whole-run statistics for small quantifiers with known behaviour.

use piquant_stats::{Statistic, StatsContext, TpmRow};
use pretty_assertions::assert_eq;
use rstest::*;

fn transcript(id: &str, length: f64, real_tpm: f64, calc_tpm: f64) -> TpmRow {
    TpmRow {
        transcript: id.to_string(),
        gene: "G1".to_string(),
        length,
        unique_length: length,
        num_transcripts: 2.0,
        real_tpm,
        calc_tpm,
    }
}

fn statistics(rows: &[TpmRow]) -> Vec<(&'static str, f64)> {
    let refs: Vec<&TpmRow> = rows.iter().collect();
    let context = StatsContext::default();
    Statistic::ALL
        .iter()
        .map(|s| (s.name(), s.calculate(&refs, &context)))
        .collect()
}

#[rstest]
fn test_identity_quantifier() {
    let rows = vec![
        transcript("T1", 1000.0, 750_000.0, 750_000.0),
        transcript("T2", 500.0, 250_000.0, 250_000.0),
    ];

    assert_eq!(
        statistics(&rows),
        vec![
            ("num-tpms", 2.0),
            ("num-true-positive-tpms", 2.0),
            ("spearman-rho", 1.0),
            ("error-fraction", 0.0),
            ("median-percent-error", 0.0),
            ("sensitivity", 1.0),
            ("specificity", 1.0),
        ]
    );
}

#[rstest]
fn test_half_missed_quantifier() {
    let rows = vec![
        transcript("T1", 1000.0, 750_000.0, 750_000.0),
        transcript("T2", 500.0, 250_000.0, 0.0),
    ];
    let values = statistics(&rows);

    assert_eq!(values[1], ("num-true-positive-tpms", 1.0));
    assert_eq!(values[5], ("sensitivity", 0.5));
    assert_eq!(values[6], ("specificity", 1.0));
}
