//! The option registries.
//!
//! Both registries are closed: every option piquant understands is a
//! variant here, and the declaration order of [QuantRunOption] is the order
//! in which values appear in run names.

use std::fmt::{self, Display};
use std::path::PathBuf;

use crate::errors::OptionError;
use crate::values::{OptionValue, PlotFormat, QuantMethod, parse_bool};

/// Command-line flag for an option name: `read_length` -> `read-length`.
pub fn flag_for(name: &str) -> String {
    name.replace('_', "-")
}

///
/// Multi-valued options whose Cartesian product defines the benchmark runs.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuantRunOption {
    QuantMethod,
    ReadDepth,
    ReadLength,
    PairedEnd,
    Errors,
    Bias,
    Stranded,
    NoisePerc,
}

impl QuantRunOption {
    pub const ALL: [QuantRunOption; 8] = [
        QuantRunOption::QuantMethod,
        QuantRunOption::ReadDepth,
        QuantRunOption::ReadLength,
        QuantRunOption::PairedEnd,
        QuantRunOption::Errors,
        QuantRunOption::Bias,
        QuantRunOption::Stranded,
        QuantRunOption::NoisePerc,
    ];

    /// Options that determine the simulated reads (everything but the tool).
    pub const READS: [QuantRunOption; 7] = [
        QuantRunOption::ReadDepth,
        QuantRunOption::ReadLength,
        QuantRunOption::PairedEnd,
        QuantRunOption::Errors,
        QuantRunOption::Bias,
        QuantRunOption::Stranded,
        QuantRunOption::NoisePerc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QuantRunOption::QuantMethod => "quant_method",
            QuantRunOption::ReadDepth => "read_depth",
            QuantRunOption::ReadLength => "read_length",
            QuantRunOption::PairedEnd => "paired_end",
            QuantRunOption::Errors => "errors",
            QuantRunOption::Bias => "bias",
            QuantRunOption::Stranded => "stranded",
            QuantRunOption::NoisePerc => "noise_perc",
        }
    }

    pub fn flag(&self) -> String {
        flag_for(self.name())
    }

    pub fn title(&self) -> &'static str {
        match self {
            QuantRunOption::QuantMethod => "Quantifier",
            QuantRunOption::ReadDepth => "Read depth",
            QuantRunOption::ReadLength => "Read length",
            QuantRunOption::PairedEnd => "End type",
            QuantRunOption::Errors => "Error type",
            QuantRunOption::Bias => "Bias",
            QuantRunOption::Stranded => "Strandedness",
            QuantRunOption::NoisePerc => "Noise percentage",
        }
    }

    pub fn from_name(name: &str) -> Option<QuantRunOption> {
        QuantRunOption::ALL.iter().find(|o| o.name() == name).copied()
    }

    /// Only numeric options can be the x-axis of a line plot.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            QuantRunOption::ReadDepth | QuantRunOption::ReadLength | QuantRunOption::NoisePerc
        )
    }

    /// Values used when the option is not supplied at all.
    pub fn default_values(&self) -> Option<Vec<OptionValue>> {
        match self {
            QuantRunOption::Stranded => Some(vec![OptionValue::Flag(false)]),
            QuantRunOption::NoisePerc => Some(vec![OptionValue::Number(0)]),
            _ => None,
        }
    }

    ///
    /// Turn one textual value into a typed [OptionValue].
    ///
    pub fn validate(&self, value: &str) -> Result<OptionValue, OptionError> {
        let value = value.trim();
        let invalid = |reason: &str| OptionError::invalid(self.name(), value, reason);

        match self {
            QuantRunOption::QuantMethod => value
                .parse::<QuantMethod>()
                .map(OptionValue::Quant)
                .map_err(|e| invalid(&e)),
            QuantRunOption::ReadDepth | QuantRunOption::ReadLength => match value.parse::<u32>() {
                Ok(n) if n > 0 => Ok(OptionValue::Number(n)),
                _ => Err(invalid("expected a positive integer")),
            },
            QuantRunOption::NoisePerc => match value.parse::<u32>() {
                Ok(n) if n < 100 => Ok(OptionValue::Number(n)),
                _ => Err(invalid("expected an integer percentage between 0 and 99")),
            },
            QuantRunOption::PairedEnd
            | QuantRunOption::Errors
            | QuantRunOption::Bias
            | QuantRunOption::Stranded => parse_bool(value)
                .map(OptionValue::Flag)
                .ok_or_else(|| invalid("expected a boolean (true/false, yes/no)")),
        }
    }

    ///
    /// Validate a comma separated list of values. Repeated values are
    /// collapsed, keeping the first occurrence.
    ///
    pub fn validate_list(&self, values: &str) -> Result<Vec<OptionValue>, OptionError> {
        let mut validated: Vec<OptionValue> = Vec::new();
        for value in values.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            let value = self.validate(value)?;
            if !validated.contains(&value) {
                validated.push(value);
            }
        }
        if validated.is_empty() {
            return Err(OptionError::invalid(self.name(), values, "no values given"));
        }
        Ok(validated)
    }

    /// Human readable form of a value, for captions and legends.
    pub fn value_name(&self, value: &OptionValue) -> String {
        match (self, value) {
            (QuantRunOption::ReadDepth, OptionValue::Number(n)) => format!("{}x", n),
            (QuantRunOption::ReadLength, OptionValue::Number(n)) => format!("{}b", n),
            (QuantRunOption::NoisePerc, OptionValue::Number(n)) => format!("{}% noise", n),
            (QuantRunOption::PairedEnd, OptionValue::Flag(b)) => {
                (if *b { "paired-end" } else { "single-end" }).to_string()
            }
            (QuantRunOption::Errors, OptionValue::Flag(b)) => {
                (if *b { "with errors" } else { "no errors" }).to_string()
            }
            (QuantRunOption::Bias, OptionValue::Flag(b)) => {
                (if *b { "with bias" } else { "no bias" }).to_string()
            }
            (QuantRunOption::Stranded, OptionValue::Flag(b)) => {
                (if *b { "stranded" } else { "unstranded" }).to_string()
            }
            (_, value) => value.to_string(),
        }
    }

    fn flag_file_names(&self) -> Option<(&'static str, &'static str)> {
        match self {
            QuantRunOption::PairedEnd => Some(("pe", "se")),
            QuantRunOption::Errors => Some(("errors", "no_errors")),
            QuantRunOption::Bias => Some(("bias", "no_bias")),
            QuantRunOption::Stranded => Some(("stranded", "unstranded")),
            _ => None,
        }
    }

    fn number_affixes(&self) -> Option<(&'static str, &'static str)> {
        match self {
            QuantRunOption::ReadDepth => Some(("", "x")),
            QuantRunOption::ReadLength => Some(("", "b")),
            QuantRunOption::NoisePerc => Some(("noise-", "")),
            _ => None,
        }
    }

    /// Filesystem-safe form of a value, used as one segment of a run name.
    pub fn file_name(&self, value: &OptionValue) -> String {
        match value {
            OptionValue::Quant(m) => m.name().to_string(),
            OptionValue::Number(n) => {
                let (prefix, suffix) = self.number_affixes().unwrap_or(("", ""));
                format!("{}{}{}", prefix, n, suffix)
            }
            OptionValue::Flag(b) => match self.flag_file_names() {
                Some((yes, no)) => (if *b { yes } else { no }).to_string(),
                None => b.to_string(),
            },
        }
    }

    ///
    /// Parse this option's file-name segment from the start of `name`.
    ///
    /// Returns the value and the remainder of the name following the
    /// segment and its `_` separator.
    ///
    pub fn parse_file_name<'a>(&self, name: &'a str) -> Option<(OptionValue, &'a str)> {
        let candidates: Vec<(String, OptionValue)> = match self {
            QuantRunOption::QuantMethod => QuantMethod::ALL
                .iter()
                .map(|m| (m.name().to_string(), OptionValue::Quant(*m)))
                .collect(),
            QuantRunOption::PairedEnd
            | QuantRunOption::Errors
            | QuantRunOption::Bias
            | QuantRunOption::Stranded => [true, false]
                .iter()
                .map(|b| (self.file_name(&OptionValue::Flag(*b)), OptionValue::Flag(*b)))
                .collect(),
            QuantRunOption::ReadDepth | QuantRunOption::ReadLength | QuantRunOption::NoisePerc => {
                let (prefix, suffix) = self.number_affixes()?;
                let digits = name.strip_prefix(prefix)?;
                let end = digits
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(digits.len());
                let number = digits[..end].parse::<u32>().ok()?;
                let value = self.validate(&number.to_string()).ok()?;
                vec![(format!("{}{}{}", prefix, &digits[..end], suffix), value)]
            }
        };

        candidates.into_iter().find_map(|(segment, value)| {
            let rest = name.strip_prefix(segment.as_str())?;
            if rest.is_empty() {
                Some((value, rest))
            } else {
                rest.strip_prefix('_').map(|r| (value, r))
            }
        })
    }
}

impl Display for QuantRunOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

///
/// The kinds of value a single-valued run option accepts.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A directory that may not exist yet.
    Directory,
    ExistingFile,
    ExistingDirectory,
    PositiveInteger,
    NonNegativeInteger,
    PositiveNumber,
    NonNegativeNumber,
    /// A switch; present means true.
    Switch,
    Format,
}

/// A validated single run option value.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOptionValue {
    Path(PathBuf),
    Integer(u64),
    Number(f64),
    Switch(bool),
    Format(PlotFormat),
}

///
/// Single-valued options: directories, reference inputs and thresholds.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RunOption {
    ReadsDir,
    QuantDir,
    StatsDir,
    TranscriptGtf,
    GenomeFasta,
    NumMolecules,
    NoiseTranscriptGtf,
    NumNoiseMolecules,
    BiasPwm,
    QuantifierDir,
    NoCleanup,
    NoUsage,
    PlotFormat,
    GroupedThreshold,
    ErrorFractionThreshold,
    NotPresentCutoff,
}

impl RunOption {
    pub const ALL: [RunOption; 16] = [
        RunOption::ReadsDir,
        RunOption::QuantDir,
        RunOption::StatsDir,
        RunOption::TranscriptGtf,
        RunOption::GenomeFasta,
        RunOption::NumMolecules,
        RunOption::NoiseTranscriptGtf,
        RunOption::NumNoiseMolecules,
        RunOption::BiasPwm,
        RunOption::QuantifierDir,
        RunOption::NoCleanup,
        RunOption::NoUsage,
        RunOption::PlotFormat,
        RunOption::GroupedThreshold,
        RunOption::ErrorFractionThreshold,
        RunOption::NotPresentCutoff,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RunOption::ReadsDir => "reads_dir",
            RunOption::QuantDir => "quant_dir",
            RunOption::StatsDir => "stats_dir",
            RunOption::TranscriptGtf => "transcript_gtf",
            RunOption::GenomeFasta => "genome_fasta",
            RunOption::NumMolecules => "num_molecules",
            RunOption::NoiseTranscriptGtf => "noise_transcript_gtf",
            RunOption::NumNoiseMolecules => "num_noise_molecules",
            RunOption::BiasPwm => "bias_pwm",
            RunOption::QuantifierDir => "quantifier_dir",
            RunOption::NoCleanup => "nocleanup",
            RunOption::NoUsage => "no_usage",
            RunOption::PlotFormat => "plot_format",
            RunOption::GroupedThreshold => "grouped_threshold",
            RunOption::ErrorFractionThreshold => "error_fraction_threshold",
            RunOption::NotPresentCutoff => "not_present_cutoff",
        }
    }

    pub fn flag(&self) -> String {
        flag_for(self.name())
    }

    pub fn from_name(name: &str) -> Option<RunOption> {
        RunOption::ALL.iter().find(|o| o.name() == name).copied()
    }

    pub fn help(&self) -> &'static str {
        match self {
            RunOption::ReadsDir => "Directory in which per-run simulated reads directories live",
            RunOption::QuantDir => "Directory in which per-run quantification directories live",
            RunOption::StatsDir => "Directory to write overall statistics and plots to",
            RunOption::TranscriptGtf => "GTF file of transcript models",
            RunOption::GenomeFasta => "Directory of per-sequence genome FASTA files",
            RunOption::NumMolecules => "Number of molecules to simulate expression for",
            RunOption::NoiseTranscriptGtf => "GTF file of transcripts used to simulate noise reads",
            RunOption::NumNoiseMolecules => "Number of molecules for the noise simulation",
            RunOption::BiasPwm => "Position weight matrix used to simulate positional bias",
            RunOption::QuantifierDir => "Shared scratch directory for quantifier indexes",
            RunOption::NoCleanup => "Keep intermediate files written by quantifiers",
            RunOption::NoUsage => "Do not record resource usage of external commands",
            RunOption::PlotFormat => "Format of output plots (pdf, svg or png)",
            RunOption::GroupedThreshold => {
                "Minimum number of true positive transcripts for a group to be plotted"
            }
            RunOption::ErrorFractionThreshold => {
                "Percent error above which a true positive counts as an error"
            }
            RunOption::NotPresentCutoff => "TPM at or below which a transcript is not present",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            RunOption::ReadsDir
            | RunOption::QuantDir
            | RunOption::StatsDir
            | RunOption::QuantifierDir => ValueKind::Directory,
            RunOption::TranscriptGtf | RunOption::NoiseTranscriptGtf | RunOption::BiasPwm => {
                ValueKind::ExistingFile
            }
            RunOption::GenomeFasta => ValueKind::ExistingDirectory,
            RunOption::NumMolecules | RunOption::NumNoiseMolecules => ValueKind::PositiveInteger,
            RunOption::GroupedThreshold => ValueKind::NonNegativeInteger,
            RunOption::ErrorFractionThreshold => ValueKind::PositiveNumber,
            RunOption::NotPresentCutoff => ValueKind::NonNegativeNumber,
            RunOption::NoCleanup | RunOption::NoUsage => ValueKind::Switch,
            RunOption::PlotFormat => ValueKind::Format,
        }
    }

    pub fn default_value(&self) -> Option<RunOptionValue> {
        match self {
            RunOption::NumMolecules => Some(RunOptionValue::Integer(30_000_000)),
            RunOption::NumNoiseMolecules => Some(RunOptionValue::Integer(2_000_000)),
            RunOption::NoCleanup | RunOption::NoUsage => Some(RunOptionValue::Switch(false)),
            RunOption::PlotFormat => Some(RunOptionValue::Format(PlotFormat::Svg)),
            RunOption::GroupedThreshold => Some(RunOptionValue::Integer(300)),
            RunOption::ErrorFractionThreshold => Some(RunOptionValue::Number(10.0)),
            RunOption::NotPresentCutoff => Some(RunOptionValue::Number(0.1)),
            _ => None,
        }
    }

    pub fn validate(&self, value: &str) -> Result<RunOptionValue, OptionError> {
        let value = value.trim();
        let invalid = |reason: &str| OptionError::invalid(self.name(), value, reason);

        // generated scripts run from their own run directory
        let absolute = || {
            std::path::absolute(value).map_err(|e| invalid(&format!("bad path: {}", e)))
        };

        match self.kind() {
            ValueKind::Directory => {
                if value.is_empty() {
                    return Err(invalid("expected a directory path"));
                }
                Ok(RunOptionValue::Path(absolute()?))
            }
            ValueKind::ExistingFile => {
                let path = absolute()?;
                if !path.is_file() {
                    return Err(invalid("file does not exist"));
                }
                Ok(RunOptionValue::Path(path))
            }
            ValueKind::ExistingDirectory => {
                let path = absolute()?;
                if !path.is_dir() {
                    return Err(invalid("directory does not exist"));
                }
                Ok(RunOptionValue::Path(path))
            }
            ValueKind::PositiveInteger => match value.parse::<u64>() {
                Ok(n) if n > 0 => Ok(RunOptionValue::Integer(n)),
                _ => Err(invalid("expected a positive integer")),
            },
            ValueKind::NonNegativeInteger => value
                .parse::<u64>()
                .map(RunOptionValue::Integer)
                .map_err(|_| invalid("expected a non-negative integer")),
            ValueKind::PositiveNumber => match value.parse::<f64>() {
                Ok(n) if n > 0.0 && n.is_finite() => Ok(RunOptionValue::Number(n)),
                _ => Err(invalid("expected a positive number")),
            },
            ValueKind::NonNegativeNumber => match value.parse::<f64>() {
                Ok(n) if n >= 0.0 && n.is_finite() => Ok(RunOptionValue::Number(n)),
                _ => Err(invalid("expected a non-negative number")),
            },
            ValueKind::Switch => {
                if value.is_empty() {
                    return Ok(RunOptionValue::Switch(true));
                }
                parse_bool(value)
                    .map(RunOptionValue::Switch)
                    .ok_or_else(|| invalid("expected a boolean"))
            }
            ValueKind::Format => value
                .parse::<PlotFormat>()
                .map(RunOptionValue::Format)
                .map_err(|e| invalid(&e)),
        }
    }
}

impl Display for RunOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_flags_are_derived_from_names() {
        assert_eq!(QuantRunOption::ReadLength.flag(), "read-length");
        assert_eq!(QuantRunOption::NoisePerc.flag(), "noise-perc");
        assert_eq!(RunOption::NotPresentCutoff.flag(), "not-present-cutoff");
        assert_eq!(RunOption::NoCleanup.flag(), "nocleanup");
    }

    #[rstest]
    #[case(QuantRunOption::ReadDepth, "0")]
    #[case(QuantRunOption::ReadDepth, "-3")]
    #[case(QuantRunOption::ReadLength, "fifty")]
    #[case(QuantRunOption::NoisePerc, "100")]
    #[case(QuantRunOption::PairedEnd, "sometimes")]
    #[case(QuantRunOption::QuantMethod, "kallisto")]
    fn test_invalid_quant_run_values(#[case] option: QuantRunOption, #[case] value: &str) {
        let result = option.validate(value);
        assert!(matches!(result, Err(OptionError::InvalidOption { .. })));
    }

    #[rstest]
    fn test_validate_list_collapses_duplicates() {
        let values = QuantRunOption::ReadLength.validate_list("50, 75,50").unwrap();
        assert_eq!(values, vec![OptionValue::Number(50), OptionValue::Number(75)]);
    }

    #[rstest]
    fn test_validate_empty_list() {
        assert!(QuantRunOption::ReadLength.validate_list(" , ").is_err());
    }

    #[rstest]
    #[case(QuantRunOption::QuantMethod, OptionValue::Quant(QuantMethod::Rsem), "RSEM")]
    #[case(QuantRunOption::ReadDepth, OptionValue::Number(30), "30x")]
    #[case(QuantRunOption::ReadLength, OptionValue::Number(75), "75b")]
    #[case(QuantRunOption::PairedEnd, OptionValue::Flag(true), "pe")]
    #[case(QuantRunOption::PairedEnd, OptionValue::Flag(false), "se")]
    #[case(QuantRunOption::Errors, OptionValue::Flag(false), "no_errors")]
    #[case(QuantRunOption::Bias, OptionValue::Flag(true), "bias")]
    #[case(QuantRunOption::Stranded, OptionValue::Flag(false), "unstranded")]
    #[case(QuantRunOption::NoisePerc, OptionValue::Number(5), "noise-5")]
    fn test_file_names(
        #[case] option: QuantRunOption,
        #[case] value: OptionValue,
        #[case] expected: &str,
    ) {
        assert_eq!(option.file_name(&value), expected);
        assert_eq!(option.parse_file_name(expected), Some((value, "")));
    }

    #[rstest]
    fn test_parse_file_name_returns_remainder() {
        let parsed = QuantRunOption::Errors.parse_file_name("no_errors_no_bias");
        assert_eq!(parsed, Some((OptionValue::Flag(false), "no_bias")));

        // "30x" is not a read length segment
        assert_eq!(QuantRunOption::ReadLength.parse_file_name("30x_75b"), None);
    }

    #[rstest]
    fn test_value_names() {
        assert_eq!(
            QuantRunOption::PairedEnd.value_name(&OptionValue::Flag(true)),
            "paired-end"
        );
        assert_eq!(
            QuantRunOption::ReadDepth.value_name(&OptionValue::Number(10)),
            "10x"
        );
    }

    #[rstest]
    fn test_run_option_validation() {
        assert_eq!(
            RunOption::NotPresentCutoff.validate("0.5").unwrap(),
            RunOptionValue::Number(0.5)
        );
        assert!(RunOption::NotPresentCutoff.validate("-1").is_err());
        assert!(RunOption::NumMolecules.validate("0").is_err());
        assert_eq!(
            RunOption::NoCleanup.validate("").unwrap(),
            RunOptionValue::Switch(true)
        );
        assert_eq!(
            RunOption::PlotFormat.validate("PDF").unwrap(),
            RunOptionValue::Format(PlotFormat::Pdf)
        );
        assert!(RunOption::TranscriptGtf.validate("/no/such/file.gtf").is_err());
    }

    #[rstest]
    fn test_existing_directory_validation() {
        let tempdir = tempfile::tempdir().unwrap();
        let dir = tempdir.path().to_str().unwrap();

        assert_eq!(
            RunOption::GenomeFasta.validate(dir).unwrap(),
            RunOptionValue::Path(PathBuf::from(dir))
        );
    }

    #[rstest]
    #[case(RunOption::ReadsDir, "reads")]
    #[case(RunOption::QuantifierDir, "scratch")]
    #[case(RunOption::TranscriptGtf, "Cargo.toml")]
    #[case(RunOption::GenomeFasta, "src")]
    fn test_relative_paths_become_absolute(#[case] option: RunOption, #[case] value: &str) {
        let expected = std::env::current_dir().unwrap().join(value);
        match option.validate(value).unwrap() {
            RunOptionValue::Path(path) => {
                assert!(path.is_absolute());
                assert_eq!(path, std::path::absolute(&expected).unwrap());
            }
            other => panic!("expected a path, got {:?}", other),
        }
    }
}
