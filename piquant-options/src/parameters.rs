//! Parameter sets and the enumeration of the parameter space.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use crate::errors::OptionError;
use crate::options::QuantRunOption;
use crate::values::{OptionValue, QuantMethod};

///
/// One point of the quant-run parameter space: a value for each option
/// that applies to the current command.
///
/// Options are kept ordered by registry order, so iteration and the run
/// name follow the order in which [QuantRunOption] is declared.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ParameterSet {
    values: BTreeMap<QuantRunOption, OptionValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        ParameterSet::default()
    }

    pub fn with(mut self, option: QuantRunOption, value: OptionValue) -> Self {
        self.values.insert(option, value);
        self
    }

    pub fn insert(&mut self, option: QuantRunOption, value: OptionValue) {
        self.values.insert(option, value);
    }

    pub fn get(&self, option: QuantRunOption) -> Option<&OptionValue> {
        self.values.get(&option)
    }

    pub fn contains(&self, option: QuantRunOption) -> bool {
        self.values.contains_key(&option)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuantRunOption, &OptionValue)> {
        self.values.iter()
    }

    pub fn options(&self) -> impl Iterator<Item = QuantRunOption> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    ///
    /// The canonical run name: each value's file-name form, joined by `_`.
    ///
    pub fn run_name(&self) -> String {
        self.values
            .iter()
            .map(|(option, value)| option.file_name(value))
            .collect::<Vec<String>>()
            .join("_")
    }

    ///
    /// Decode a run name produced by [ParameterSet::run_name] for the given
    /// options (which must be listed in registry order).
    ///
    pub fn from_run_name(name: &str, options: &[QuantRunOption]) -> Result<Self, OptionError> {
        let mut params = ParameterSet::new();
        let mut rest = name;
        for option in options {
            let (value, remainder) = option
                .parse_file_name(rest)
                .ok_or_else(|| OptionError::InvalidRunName(name.to_string()))?;
            params.insert(*option, value);
            rest = remainder;
        }
        if !rest.is_empty() {
            return Err(OptionError::InvalidRunName(name.to_string()));
        }
        Ok(params)
    }

    /// The same point without the quantification method, which identifies
    /// the reads directory a quantification run reads from.
    pub fn reads_parameters(&self) -> ParameterSet {
        ParameterSet {
            values: self
                .values
                .iter()
                .filter(|(option, _)| **option != QuantRunOption::QuantMethod)
                .map(|(o, v)| (*o, *v))
                .collect(),
        }
    }

    fn required(&self, option: QuantRunOption) -> Result<&OptionValue, OptionError> {
        self.get(option)
            .ok_or_else(|| OptionError::MissingOption(option.flag()))
    }

    fn number(&self, option: QuantRunOption) -> Result<u32, OptionError> {
        let value = self.required(option)?;
        value
            .as_number()
            .ok_or_else(|| OptionError::invalid(option.name(), &value.to_string(), "not a number"))
    }

    fn flag(&self, option: QuantRunOption) -> Result<bool, OptionError> {
        let value = self.required(option)?;
        value
            .as_flag()
            .ok_or_else(|| OptionError::invalid(option.name(), &value.to_string(), "not a boolean"))
    }

    pub fn quant_method(&self) -> Result<QuantMethod, OptionError> {
        let option = QuantRunOption::QuantMethod;
        let value = self.required(option)?;
        value.as_quant_method().ok_or_else(|| {
            OptionError::invalid(option.name(), &value.to_string(), "not a quantifier")
        })
    }

    pub fn read_depth(&self) -> Result<u32, OptionError> {
        self.number(QuantRunOption::ReadDepth)
    }

    pub fn read_length(&self) -> Result<u32, OptionError> {
        self.number(QuantRunOption::ReadLength)
    }

    pub fn noise_perc(&self) -> Result<u32, OptionError> {
        self.number(QuantRunOption::NoisePerc)
    }

    pub fn paired_end(&self) -> Result<bool, OptionError> {
        self.flag(QuantRunOption::PairedEnd)
    }

    pub fn errors(&self) -> Result<bool, OptionError> {
        self.flag(QuantRunOption::Errors)
    }

    pub fn bias(&self) -> Result<bool, OptionError> {
        self.flag(QuantRunOption::Bias)
    }

    pub fn stranded(&self) -> Result<bool, OptionError> {
        self.flag(QuantRunOption::Stranded)
    }
}

impl Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.run_name())
    }
}

///
/// The supplied values of every multi-valued option: the parameter space.
///
#[derive(Debug, Clone, Default)]
pub struct QuantRunValues {
    values: BTreeMap<QuantRunOption, Vec<OptionValue>>,
}

impl QuantRunValues {
    pub fn new() -> Self {
        QuantRunValues::default()
    }

    pub fn set(&mut self, option: QuantRunOption, values: Vec<OptionValue>) {
        self.values.insert(option, values);
    }

    pub fn get(&self, option: QuantRunOption) -> Option<&Vec<OptionValue>> {
        self.values.get(&option)
    }

    pub fn options(&self) -> impl Iterator<Item = QuantRunOption> + '_ {
        self.values.keys().copied()
    }

    ///
    /// Keep only the given options, filling in defaults for options that
    /// have one and failing for any other option without values.
    ///
    pub fn for_options(&self, options: &[QuantRunOption]) -> Result<QuantRunValues, OptionError> {
        if options.iter().all(|o| !self.values.contains_key(o)) {
            return Err(OptionError::EmptyParameterSpace);
        }

        let mut restricted = QuantRunValues::new();
        for option in options {
            let values = match self.values.get(option) {
                Some(values) if !values.is_empty() => values.clone(),
                _ => option
                    .default_values()
                    .ok_or_else(|| OptionError::MissingOption(option.flag()))?,
            };
            restricted.set(*option, values);
        }
        Ok(restricted)
    }

    /// A degenerate option has at most one distinct value.
    pub fn is_degenerate(&self, option: QuantRunOption) -> bool {
        self.values.get(&option).is_none_or(|v| v.len() <= 1)
    }

    pub fn non_degenerate_options(&self) -> Vec<QuantRunOption> {
        self.options().filter(|o| !self.is_degenerate(*o)).collect()
    }

    /// Number of points in the parameter space.
    pub fn num_parameter_sets(&self) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        self.values.values().map(|v| v.len()).product()
    }

    ///
    /// All points of the Cartesian product of the option values. The last
    /// option in registry order varies fastest.
    ///
    pub fn parameter_sets(&self) -> Vec<ParameterSet> {
        let total = self.num_parameter_sets();
        let options: Vec<(&QuantRunOption, &Vec<OptionValue>)> = self.values.iter().collect();

        let mut sets = Vec::with_capacity(total);
        let mut indices = vec![0usize; options.len()];
        for _ in 0..total {
            let mut params = ParameterSet::new();
            for (i, (option, values)) in options.iter().enumerate() {
                params.insert(**option, values[indices[i]]);
            }
            sets.push(params);

            // odometer increment
            for i in (0..options.len()).rev() {
                indices[i] += 1;
                if indices[i] < options[i].1.len() {
                    break;
                }
                indices[i] = 0;
            }
        }
        sets
    }

    ///
    /// Run each callable, in order, for every point of the parameter space,
    /// stopping at the first error.
    ///
    pub fn execute_for_all<E>(
        &self,
        callables: &mut [&mut dyn FnMut(&ParameterSet) -> Result<(), E>],
    ) -> Result<(), E> {
        for params in self.parameter_sets() {
            for callable in callables.iter_mut() {
                callable(&params)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn single_run_values() -> QuantRunValues {
        let mut values = QuantRunValues::new();
        values.set(
            QuantRunOption::QuantMethod,
            vec![OptionValue::Quant(QuantMethod::Rsem)],
        );
        values.set(QuantRunOption::ReadLength, vec![OptionValue::Number(75)]);
        values.set(QuantRunOption::ReadDepth, vec![OptionValue::Number(30)]);
        values.set(QuantRunOption::PairedEnd, vec![OptionValue::Flag(true)]);
        values.set(QuantRunOption::Errors, vec![OptionValue::Flag(false)]);
        values.set(QuantRunOption::Bias, vec![OptionValue::Flag(false)]);
        values.set(QuantRunOption::Stranded, vec![OptionValue::Flag(false)]);
        values.set(QuantRunOption::NoisePerc, vec![OptionValue::Number(0)]);
        values
    }

    #[rstest]
    fn test_run_name_follows_registry_order(single_run_values: QuantRunValues) {
        let sets = single_run_values.parameter_sets();

        assert_eq!(sets.len(), 1);
        assert_eq!(
            sets[0].run_name(),
            "RSEM_30x_75b_pe_no_errors_no_bias_unstranded_noise-0"
        );
    }

    #[rstest]
    fn test_single_valued_options_are_degenerate(single_run_values: QuantRunValues) {
        assert!(single_run_values.is_degenerate(QuantRunOption::ReadLength));
        assert!(single_run_values.non_degenerate_options().is_empty());
    }

    #[rstest]
    fn test_cartesian_product(mut single_run_values: QuantRunValues) {
        single_run_values.set(
            QuantRunOption::QuantMethod,
            vec![
                OptionValue::Quant(QuantMethod::Cufflinks),
                OptionValue::Quant(QuantMethod::Rsem),
            ],
        );
        single_run_values.set(
            QuantRunOption::ReadLength,
            vec![
                OptionValue::Number(50),
                OptionValue::Number(75),
                OptionValue::Number(100),
            ],
        );

        let sets = single_run_values.parameter_sets();
        assert_eq!(sets.len(), 6);
        assert_eq!(single_run_values.num_parameter_sets(), 6);
        assert_eq!(
            single_run_values.non_degenerate_options(),
            vec![QuantRunOption::QuantMethod, QuantRunOption::ReadLength]
        );

        // last option varies fastest
        assert_eq!(sets[0].read_length().unwrap(), 50);
        assert_eq!(sets[1].read_length().unwrap(), 75);
        assert_eq!(sets[3].quant_method().unwrap(), QuantMethod::Rsem);

        let names: std::collections::HashSet<String> =
            sets.iter().map(|s| s.run_name()).collect();
        assert_eq!(names.len(), 6);
    }

    #[rstest]
    fn test_run_name_roundtrip(mut single_run_values: QuantRunValues) {
        single_run_values.set(
            QuantRunOption::Errors,
            vec![OptionValue::Flag(true), OptionValue::Flag(false)],
        );
        single_run_values.set(
            QuantRunOption::NoisePerc,
            vec![OptionValue::Number(0), OptionValue::Number(10)],
        );

        for params in single_run_values.parameter_sets() {
            let name = params.run_name();
            let decoded = ParameterSet::from_run_name(&name, &QuantRunOption::ALL).unwrap();
            assert_eq!(decoded, params);
            assert_eq!(decoded.run_name(), name);
        }
    }

    #[rstest]
    fn test_from_run_name_rejects_trailing_segments() {
        let result = ParameterSet::from_run_name("30x_50b_extra", &[
            QuantRunOption::ReadDepth,
            QuantRunOption::ReadLength,
        ]);
        assert!(matches!(result, Err(OptionError::InvalidRunName(_))));
    }

    #[rstest]
    fn test_reads_parameters_drop_quant_method(single_run_values: QuantRunValues) {
        let params = &single_run_values.parameter_sets()[0];
        assert_eq!(
            params.reads_parameters().run_name(),
            "30x_75b_pe_no_errors_no_bias_unstranded_noise-0"
        );
    }

    #[rstest]
    fn test_for_options_fills_defaults() {
        let mut values = QuantRunValues::new();
        values.set(QuantRunOption::ReadLength, vec![OptionValue::Number(50)]);
        values.set(QuantRunOption::ReadDepth, vec![OptionValue::Number(10)]);
        values.set(QuantRunOption::PairedEnd, vec![OptionValue::Flag(false)]);
        values.set(QuantRunOption::Errors, vec![OptionValue::Flag(false)]);
        values.set(QuantRunOption::Bias, vec![OptionValue::Flag(false)]);

        let restricted = values.for_options(&QuantRunOption::READS).unwrap();
        assert_eq!(
            restricted.get(QuantRunOption::Stranded),
            Some(&vec![OptionValue::Flag(false)])
        );
        assert_eq!(restricted.parameter_sets().len(), 1);
    }

    #[rstest]
    fn test_for_options_missing_required() {
        let mut values = QuantRunValues::new();
        values.set(QuantRunOption::ReadLength, vec![OptionValue::Number(50)]);

        let result = values.for_options(&QuantRunOption::ALL);
        assert!(matches!(result, Err(OptionError::MissingOption(_))));
    }

    #[rstest]
    fn test_empty_parameter_space_is_an_error() {
        let result = QuantRunValues::new().for_options(&QuantRunOption::ALL);
        assert!(matches!(result, Err(OptionError::EmptyParameterSpace)));
    }

    #[rstest]
    fn test_execute_for_all_runs_callables_in_order(single_run_values: QuantRunValues) {
        let mut calls: Vec<String> = Vec::new();
        {
            let mut first = |p: &ParameterSet| -> Result<(), OptionError> {
                calls.push(format!("first:{}", p.read_length()?));
                Ok(())
            };
            let mut callables: Vec<&mut dyn FnMut(&ParameterSet) -> Result<(), OptionError>> =
                vec![&mut first];
            single_run_values.execute_for_all(&mut callables).unwrap();
        }
        assert_eq!(calls, vec!["first:75".to_string()]);
    }
}
