use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::OptionError;
use crate::options::{RunOption, RunOptionValue};
use crate::values::PlotFormat;

const QUANTIFIER_SCRATCH_DIR: &str = "quantifier_scratch";

///
/// Validated single-valued options for one invocation.
///
/// Options that were not supplied fall back to their defaults when read;
/// options with no default produce [OptionError::MissingOption].
///
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    values: BTreeMap<RunOption, RunOptionValue>,
}

impl RunOptions {
    pub fn new() -> Self {
        RunOptions::default()
    }

    ///
    /// Validate raw option strings keyed by option name. Names that are not
    /// run options are ignored.
    ///
    pub fn from_raw<'a, I>(raw: I) -> Result<Self, OptionError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = RunOptions::new();
        for (name, value) in raw {
            if let Some(option) = RunOption::from_name(name) {
                options.set(option, option.validate(value)?);
            }
        }
        debug!("Validated {} run options", options.values.len());
        Ok(options)
    }

    pub fn set(&mut self, option: RunOption, value: RunOptionValue) {
        self.values.insert(option, value);
    }

    pub fn is_set(&self, option: RunOption) -> bool {
        self.values.contains_key(&option)
    }

    fn value(&self, option: RunOption) -> Result<RunOptionValue, OptionError> {
        self.values
            .get(&option)
            .cloned()
            .or_else(|| option.default_value())
            .ok_or_else(|| OptionError::MissingOption(option.flag()))
    }

    fn mismatch(option: RunOption, value: &RunOptionValue) -> OptionError {
        OptionError::invalid(option.name(), &format!("{:?}", value), "unexpected value type")
    }

    pub fn path(&self, option: RunOption) -> Result<PathBuf, OptionError> {
        match self.value(option)? {
            RunOptionValue::Path(p) => Ok(p),
            other => Err(Self::mismatch(option, &other)),
        }
    }

    pub fn optional_path(&self, option: RunOption) -> Option<&Path> {
        match self.values.get(&option) {
            Some(RunOptionValue::Path(p)) => Some(p.as_path()),
            _ => None,
        }
    }

    pub fn integer(&self, option: RunOption) -> Result<u64, OptionError> {
        match self.value(option)? {
            RunOptionValue::Integer(n) => Ok(n),
            other => Err(Self::mismatch(option, &other)),
        }
    }

    pub fn number(&self, option: RunOption) -> Result<f64, OptionError> {
        match self.value(option)? {
            RunOptionValue::Number(n) => Ok(n),
            RunOptionValue::Integer(n) => Ok(n as f64),
            other => Err(Self::mismatch(option, &other)),
        }
    }

    pub fn switch(&self, option: RunOption) -> bool {
        matches!(self.value(option), Ok(RunOptionValue::Switch(true)))
    }

    pub fn plot_format(&self) -> Result<PlotFormat, OptionError> {
        match self.value(RunOption::PlotFormat)? {
            RunOptionValue::Format(f) => Ok(f),
            other => Err(Self::mismatch(RunOption::PlotFormat, &other)),
        }
    }

    pub fn reads_dir(&self) -> Result<PathBuf, OptionError> {
        self.path(RunOption::ReadsDir)
    }

    pub fn quant_dir(&self) -> Result<PathBuf, OptionError> {
        self.path(RunOption::QuantDir)
    }

    pub fn stats_dir(&self) -> Result<PathBuf, OptionError> {
        self.path(RunOption::StatsDir)
    }

    pub fn transcript_gtf(&self) -> Result<PathBuf, OptionError> {
        self.path(RunOption::TranscriptGtf)
    }

    pub fn genome_fasta(&self) -> Result<PathBuf, OptionError> {
        self.path(RunOption::GenomeFasta)
    }

    /// Scratch directory shared by all runs of a quantifier; defaults to a
    /// directory inside the quantification directory.
    pub fn quantifier_dir(&self) -> Result<PathBuf, OptionError> {
        match self.optional_path(RunOption::QuantifierDir) {
            Some(p) => Ok(p.to_path_buf()),
            None => Ok(self.quant_dir()?.join(QUANTIFIER_SCRATCH_DIR)),
        }
    }

    pub fn not_present_cutoff(&self) -> Result<f64, OptionError> {
        self.number(RunOption::NotPresentCutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_defaults_apply_when_not_supplied() {
        let options = RunOptions::new();

        assert_eq!(options.integer(RunOption::NumMolecules).unwrap(), 30_000_000);
        assert_eq!(options.number(RunOption::NotPresentCutoff).unwrap(), 0.1);
        assert_eq!(options.integer(RunOption::GroupedThreshold).unwrap(), 300);
        assert_eq!(options.plot_format().unwrap(), PlotFormat::Svg);
        assert!(!options.switch(RunOption::NoCleanup));
    }

    #[rstest]
    fn test_missing_required_option() {
        let result = RunOptions::new().reads_dir();
        assert!(matches!(result, Err(OptionError::MissingOption(flag)) if flag == "reads-dir"));
    }

    #[rstest]
    fn test_from_raw_validates_and_ignores_other_names() {
        let options = RunOptions::from_raw([
            ("quant_dir", "/data/quant"),
            ("not_present_cutoff", "1.5"),
            ("read_length", "50,75"),
            ("nocleanup", ""),
        ])
        .unwrap();

        assert_eq!(options.not_present_cutoff().unwrap(), 1.5);
        assert!(options.switch(RunOption::NoCleanup));
        assert_eq!(
            options.quantifier_dir().unwrap(),
            PathBuf::from("/data/quant/quantifier_scratch")
        );
    }

    #[rstest]
    fn test_from_raw_rejects_invalid_values() {
        let result = RunOptions::from_raw([("grouped_threshold", "-4")]);
        assert!(matches!(result, Err(OptionError::InvalidOption { .. })));
    }

    #[rstest]
    fn test_explicit_quantifier_dir() {
        let options =
            RunOptions::from_raw([("quantifier_dir", "/scratch"), ("quant_dir", "/q")]).unwrap();
        assert_eq!(options.quantifier_dir().unwrap(), PathBuf::from("/scratch"));
    }
}
