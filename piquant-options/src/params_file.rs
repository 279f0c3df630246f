//! Parameter files: one `--flag value[,value...]` per line.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;

use crate::errors::OptionError;
use crate::options::{QuantRunOption, RunOption};

/// Raw option values keyed by option name (underscored form).
pub type RawOptions = BTreeMap<String, String>;

fn option_name_for_flag(flag: &str) -> Option<String> {
    let name = flag.replace('-', "_");
    let known = QuantRunOption::from_name(&name).is_some() || RunOption::from_name(&name).is_some();
    known.then_some(name)
}

///
/// Parse the contents of a parameter file.
///
/// Blank lines and lines starting with `#` are ignored. A flag without a
/// value is a switch and is recorded with an empty value. A flag given
/// twice keeps its last value.
///
pub fn parse_params(contents: &str) -> Result<RawOptions, OptionError> {
    let mut options = RawOptions::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (flag, value) = match line.split_once(char::is_whitespace) {
            Some((flag, value)) => (flag, value.trim()),
            None => (line, ""),
        };
        let (flag, value) = match flag.split_once('=') {
            Some((flag, inline)) => (flag, inline),
            None => (flag, value),
        };

        let name = flag
            .strip_prefix("--")
            .and_then(option_name_for_flag)
            .ok_or_else(|| OptionError::UnknownOption {
                line: index + 1,
                flag: flag.to_string(),
            })?;

        options.insert(name, value.to_string());
    }

    Ok(options)
}

pub fn read_params_file(path: &Path) -> Result<RawOptions, OptionError> {
    let contents = fs::read_to_string(path)?;
    let options = parse_params(&contents)?;
    debug!("Read {} options from {}", options.len(), path.display());
    Ok(options)
}

///
/// Merge options from a parameter file with those from the command line;
/// command-line values replace file values option by option.
///
pub fn merge_options(from_file: RawOptions, from_command_line: RawOptions) -> RawOptions {
    let mut merged = from_file;
    merged.extend(from_command_line);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const PARAMS: &str = "\
# benchmark of read length against depth
--quant-method Cufflinks,RSEM

--read-length 50,75,100
--read-depth=10
--paired-end true
--nocleanup
";

    #[rstest]
    fn test_parse_params() {
        let options = parse_params(PARAMS).unwrap();

        assert_eq!(options.len(), 5);
        assert_eq!(options["quant_method"], "Cufflinks,RSEM");
        assert_eq!(options["read_length"], "50,75,100");
        assert_eq!(options["read_depth"], "10");
        assert_eq!(options["nocleanup"], "");
    }

    #[rstest]
    #[case("--read-lenght 50", 1)]
    #[case("# ok\nread-length 50", 2)]
    fn test_unknown_flags(#[case] contents: &str, #[case] expected_line: usize) {
        let result = parse_params(contents);
        assert!(matches!(
            result,
            Err(OptionError::UnknownOption { line, .. }) if line == expected_line
        ));
    }

    #[rstest]
    fn test_command_line_overrides_file() {
        let from_file = parse_params(PARAMS).unwrap();
        let from_command_line =
            RawOptions::from([("read_length".to_string(), "35".to_string())]);

        let merged = merge_options(from_file, from_command_line);
        assert_eq!(merged["read_length"], "35");
        assert_eq!(merged["quant_method"], "Cufflinks,RSEM");
    }

    #[rstest]
    fn test_read_params_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("params.txt");
        std::fs::write(&path, PARAMS).unwrap();

        assert_eq!(read_params_file(&path).unwrap(), parse_params(PARAMS).unwrap());
    }
}
