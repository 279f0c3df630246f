//! Positional bias: score reads against a position weight matrix and keep
//! the best scoring ones.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use rand::Rng;

use crate::errors::ScriptError;
use crate::reads::read_records;

/// Score of a position outside the matrix, or of an unknown base.
pub const NEUTRAL_SCORE: f64 = 0.25;

// a mild preference for G/C near the start of fragments
const DEFAULT_PWM: [[f64; 4]; 8] = [
    [0.15, 0.30, 0.40, 0.15],
    [0.20, 0.25, 0.35, 0.20],
    [0.30, 0.20, 0.30, 0.20],
    [0.20, 0.30, 0.30, 0.20],
    [0.25, 0.25, 0.30, 0.20],
    [0.20, 0.30, 0.25, 0.25],
    [0.25, 0.25, 0.25, 0.25],
    [0.25, 0.25, 0.25, 0.25],
];

///
/// Position weight matrix: for each position of a read, the weight of each
/// of the bases A, C, G and T.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Pwm {
    rows: Vec<[f64; 4]>,
}

impl Default for Pwm {
    fn default() -> Self {
        Pwm {
            rows: DEFAULT_PWM.to_vec(),
        }
    }
}

impl Pwm {
    pub fn new(rows: Vec<[f64; 4]>) -> Self {
        Pwm { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    ///
    /// Parse a matrix with one position per line and four whitespace
    /// separated weights (A, C, G, T). Blank and `#` lines are skipped.
    ///
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ScriptError> {
        let mut rows = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let invalid = |reason: String| ScriptError::InvalidPwm {
                line: index + 1,
                reason,
            };
            let weights = line
                .split_whitespace()
                .map(|w| {
                    w.parse::<f64>()
                        .ok()
                        .filter(|v| *v >= 0.0 && v.is_finite())
                        .ok_or_else(|| invalid(format!("bad weight '{}'", w)))
                })
                .collect::<Result<Vec<f64>, ScriptError>>()?;
            let row: [f64; 4] = weights
                .try_into()
                .map_err(|w: Vec<f64>| invalid(format!("expected 4 weights, found {}", w.len())))?;
            rows.push(row);
        }
        Ok(Pwm { rows })
    }

    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let file = File::open(path)?;
        Pwm::from_reader(BufReader::new(file))
    }

    fn base_index(base: u8) -> Option<usize> {
        match base.to_ascii_uppercase() {
            b'A' => Some(0),
            b'C' => Some(1),
            b'G' => Some(2),
            b'T' => Some(3),
            _ => None,
        }
    }

    ///
    /// Product of the weights of the read's bases. Positions covered by
    /// only one of the read and the matrix, and unknown bases, contribute
    /// the neutral score.
    ///
    pub fn score(&self, sequence: &str) -> f64 {
        let bases = sequence.as_bytes();
        (0..bases.len().max(self.rows.len()))
            .map(|i| match (self.rows.get(i), bases.get(i)) {
                (Some(row), Some(base)) => Pwm::base_index(*base).map_or(NEUTRAL_SCORE, |b| row[b]),
                _ => NEUTRAL_SCORE,
            })
            .product()
    }
}

///
/// Keep the `num_reads` records with the highest PWM score weighted by a
/// uniform random draw, writing them in their original order.
///
/// Returns the number of records written.
///
pub fn select_biased_reads<R: BufRead, W: Write, G: Rng>(
    reader: R,
    writer: &mut W,
    num_reads: usize,
    lines_per_record: usize,
    pwm: &Pwm,
    rng: &mut G,
) -> Result<usize, ScriptError> {
    let records = read_records(reader, lines_per_record)?;

    let scores: Vec<f64> = records
        .iter()
        .map(|r| pwm.score(r.sequence()) * rng.random::<f64>())
        .collect();

    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
    order.truncate(num_reads);
    order.sort_unstable();

    for index in &order {
        records[*index].write(writer)?;
    }
    info!(
        "Selected {} of {} reads by positional bias",
        order.len(),
        records.len()
    );
    Ok(order.len())
}

///
/// File-to-file form of [select_biased_reads], as run from the simulation
/// script.
///
pub fn simulate_read_bias<G: Rng>(
    input: &Path,
    output: &Path,
    num_reads: usize,
    lines_per_record: usize,
    pwm: &Pwm,
    rng: &mut G,
) -> Result<usize, ScriptError> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let written = select_biased_reads(reader, &mut writer, num_reads, lines_per_record, pwm, rng)?;
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::*;

    #[fixture]
    fn pwm() -> Pwm {
        Pwm::new(vec![[0.1, 0.2, 0.3, 0.4], [0.4, 0.3, 0.2, 0.1]])
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[rstest]
    fn test_score_multiplies_position_weights(pwm: Pwm) {
        assert!(approx(pwm.score("TA"), 0.4 * 0.4));
        assert!(approx(pwm.score("cg"), 0.2 * 0.2));
    }

    #[rstest]
    fn test_read_shorter_than_pwm_scores_neutral(pwm: Pwm) {
        assert!(approx(pwm.score("T"), 0.4 * NEUTRAL_SCORE));
        assert!(approx(pwm.score(""), NEUTRAL_SCORE * NEUTRAL_SCORE));
    }

    #[rstest]
    fn test_read_longer_than_pwm_scores_extra_bases_neutral(pwm: Pwm) {
        assert!(approx(pwm.score("TAG"), 0.4 * 0.4 * NEUTRAL_SCORE));
        assert!(approx(
            pwm.score("TAGGGCC"),
            0.4 * 0.4 * NEUTRAL_SCORE.powi(5)
        ));
    }

    #[rstest]
    fn test_unknown_base_scores_neutral(pwm: Pwm) {
        assert!(approx(pwm.score("nA"), NEUTRAL_SCORE * 0.4));
    }

    #[rstest]
    fn test_parse_pwm() {
        let text = "# A C G T\n0.1 0.2 0.3 0.4\n\n0.25 0.25 0.25 0.25\n";
        let pwm = Pwm::from_reader(text.as_bytes()).unwrap();
        assert_eq!(pwm.len(), 2);
    }

    #[rstest]
    #[case("0.1 0.2 0.3\n")]
    #[case("0.1 0.2 x 0.4\n")]
    #[case("0.1 0.2 -0.3 0.4\n")]
    fn test_invalid_pwm(#[case] text: &str) {
        assert!(matches!(
            Pwm::from_reader(text.as_bytes()),
            Err(ScriptError::InvalidPwm { line: 1, .. })
        ));
    }

    #[rstest]
    fn test_selection_keeps_input_order_and_count(pwm: Pwm) {
        let input: String = (0..20)
            .map(|i| format!(">r{}\n{}\n", i, if i % 2 == 0 { "TA" } else { "AT" }))
            .collect();
        let mut rng = StdRng::seed_from_u64(17);
        let mut output = Vec::new();

        let written =
            select_biased_reads(input.as_bytes(), &mut output, 5, 2, &pwm, &mut rng).unwrap();
        assert_eq!(written, 5);

        let output = String::from_utf8(output).unwrap();
        let ids: Vec<usize> = output
            .lines()
            .filter_map(|l| l.strip_prefix(">r"))
            .map(|id| id.parse().unwrap())
            .collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[rstest]
    fn test_selection_of_more_reads_than_available(pwm: Pwm) {
        let mut rng = StdRng::seed_from_u64(3);
        let mut output = Vec::new();

        let written =
            select_biased_reads(">a\nAC\n>b\nGT\n".as_bytes(), &mut output, 10, 2, &pwm, &mut rng)
                .unwrap();
        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(output).unwrap(), ">a\nAC\n>b\nGT\n");
    }
}
