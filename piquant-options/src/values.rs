use std::fmt::{self, Display};
use std::str::FromStr;

///
/// The quantification tools piquant knows how to drive.
///
/// What each tool does lives in `piquant-quant`; here they are only names
/// that can be validated, ordered and written into run names.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuantMethod {
    Cufflinks,
    Rsem,
    Express,
    Sailfish,
}

impl QuantMethod {
    pub const ALL: [QuantMethod; 4] = [
        QuantMethod::Cufflinks,
        QuantMethod::Rsem,
        QuantMethod::Express,
        QuantMethod::Sailfish,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            QuantMethod::Cufflinks => "Cufflinks",
            QuantMethod::Rsem => "RSEM",
            QuantMethod::Express => "Express",
            QuantMethod::Sailfish => "Sailfish",
        }
    }
}

impl FromStr for QuantMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuantMethod::ALL
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                let known: Vec<&str> = QuantMethod::ALL.iter().map(|m| m.name()).collect();
                format!("unknown quantification method, expected one of {}", known.join(", "))
            })
    }
}

impl Display for QuantMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

///
/// A single value of a quant-run option.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionValue {
    Quant(QuantMethod),
    Number(u32),
    Flag(bool),
}

impl OptionValue {
    pub fn as_quant_method(&self) -> Option<QuantMethod> {
        match self {
            OptionValue::Quant(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<u32> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptionValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric position of the value on a plot axis.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n as f64),
            OptionValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            OptionValue::Quant(_) => None,
        }
    }
}

/// Canonical string form, as stored in stats CSV tag columns.
impl Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Quant(m) => write!(f, "{}", m),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

///
/// Output format of the comparison plots.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    Pdf,
    Svg,
    Png,
}

impl PlotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Pdf => "pdf",
            PlotFormat::Svg => "svg",
            PlotFormat::Png => "png",
        }
    }
}

impl FromStr for PlotFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(PlotFormat::Pdf),
            "svg" => Ok(PlotFormat::Svg),
            "png" => Ok(PlotFormat::Png),
            _ => Err("expected one of pdf, svg, png".to_string()),
        }
    }
}

impl Display for PlotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

///
/// Parse a boolean the way users write them on the command line.
///
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("true", Some(true))]
    #[case("T", Some(true))]
    #[case("Yes", Some(true))]
    #[case("y", Some(true))]
    #[case("FALSE", Some(false))]
    #[case("f", Some(false))]
    #[case("no", Some(false))]
    #[case("N", Some(false))]
    #[case("maybe", None)]
    #[case("", None)]
    fn test_parse_bool(#[case] input: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(input), expected);
    }

    #[rstest]
    #[case("rsem", QuantMethod::Rsem)]
    #[case("CUFFLINKS", QuantMethod::Cufflinks)]
    #[case("Express", QuantMethod::Express)]
    #[case("sailfish", QuantMethod::Sailfish)]
    fn test_quant_method_is_case_insensitive(#[case] input: &str, #[case] expected: QuantMethod) {
        assert_eq!(input.parse::<QuantMethod>().unwrap(), expected);
    }

    #[rstest]
    fn test_unknown_quant_method() {
        assert!("kallisto".parse::<QuantMethod>().is_err());
    }

    #[rstest]
    fn test_plot_formats() {
        assert_eq!("SVG".parse::<PlotFormat>().unwrap(), PlotFormat::Svg);
        assert_eq!("png".parse::<PlotFormat>().unwrap(), PlotFormat::Png);
        assert_eq!("pdf".parse::<PlotFormat>().unwrap(), PlotFormat::Pdf);
        assert!("eps".parse::<PlotFormat>().is_err());
    }
}
