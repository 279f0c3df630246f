use std::path::Path;

use piquant_scripts::ShellWriter;

use super::{Phase, QuantInputs, Quantifier, timed, unless_directory_exists};
use crate::abundances::{Column, TranscriptAbundances, read_tab_separated};
use crate::errors::QuantError;

const REFERENCE_DIR: &str = "sailfish";
const REFERENCE_NAME: &str = "sailfish/transcripts";
const TRANSCRIPTS_FASTA: &str = "sailfish/transcripts.transcripts.fa";
const INDEX_DIR: &str = "sailfish/index";
const KMER_SIZE: u32 = 20;

/// Sailfish, alignment-free k-mer based quantification.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sailfish;

///
/// Sailfish library format string, e.g. `T=PE:O=><:S=U`.
///
pub fn library_format(paired_end: bool, stranded: bool) -> String {
    match (paired_end, stranded) {
        (true, true) => "T=PE:O=><:S=SA",
        (true, false) => "T=PE:O=><:S=U",
        (false, true) => "T=SE:S=S",
        (false, false) => "T=SE:S=U",
    }
    .to_string()
}

impl Quantifier for Sailfish {
    fn name(&self) -> &'static str {
        "Sailfish"
    }

    fn write_preparatory_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    ) {
        unless_directory_exists(writer, &inputs.scratch(REFERENCE_DIR), |w| {
            w.add_comment("Extract transcript sequences and build the Sailfish index");
            w.add_command(&[
                timed(
                    record_usage,
                    Phase::Prequantification,
                    "rsem-prepare-reference --no-polyA --no-bowtie",
                ),
                format!("--gtf {}", QuantInputs::quoted(&inputs.transcript_gtf)),
                QuantInputs::quoted(&inputs.genome_fasta),
                inputs.scratch(REFERENCE_NAME),
            ]);
            w.add_command(&[
                timed(record_usage, Phase::Prequantification, "sailfish index"),
                format!("-t {}", inputs.scratch(TRANSCRIPTS_FASTA)),
                format!("-o {}", inputs.scratch(INDEX_DIR)),
                format!("-k {}", KMER_SIZE),
            ]);
        })
    }

    fn write_quantification_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    ) {
        let reads = inputs.reads();
        let reads = if inputs.paired_end {
            format!("-1 {} -2 {}", reads[0], reads[1])
        } else {
            format!("-r {}", reads.join(" "))
        };

        writer.add_comment("Estimate transcript abundances with Sailfish");
        writer.add_command(&[
            timed(record_usage, Phase::Quantification, "sailfish quant"),
            format!("-i {}", inputs.scratch(INDEX_DIR)),
            format!(
                "-l \"{}\"",
                library_format(inputs.paired_end, inputs.stranded)
            ),
            reads,
            "-o .".to_string(),
        ]);
    }

    fn write_cleanup(&self, writer: &mut ShellWriter) {
        writer.add_line("rm -rf reads.sfc logs");
    }

    fn results_file(&self) -> &'static str {
        "quant_bias_corrected.sf"
    }

    fn calculate_transcript_abundances(
        &self,
        results_file: &Path,
    ) -> Result<TranscriptAbundances, QuantError> {
        read_tab_separated(results_file, Column::Index(0), Column::Index(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::quantifiers::test_support::{inputs, quantification};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(true, true, "T=PE:O=><:S=SA")]
    #[case(true, false, "T=PE:O=><:S=U")]
    #[case(false, true, "T=SE:S=S")]
    #[case(false, false, "T=SE:S=U")]
    fn test_library_format(#[case] paired_end: bool, #[case] stranded: bool, #[case] expected: &str) {
        assert_eq!(library_format(paired_end, stranded), expected);
    }

    #[rstest]
    fn test_single_end_quantification() {
        let script = quantification(&Sailfish, &inputs(false, false, false));
        assert!(script.contains("-r /reads/run/reads.fasta"));
        assert!(script.contains("-l \"T=SE:S=U\""));
    }

    #[rstest]
    fn test_read_results_with_comment_header() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("quant_bias_corrected.sf");
        std::fs::write(
            &path,
            "# sailfish v0.6.3\n# Transcript\tLength\tTPM\tRPKM\tKPKM\tEstimatedNumReads\n\
             T1\t1000\t700000.0\t10.0\t10.0\t100\n\
             T2\t500\t300000.0\t5.0\t5.0\t50\n",
        )
        .unwrap();

        let abundances = Sailfish.calculate_transcript_abundances(&path).unwrap();
        assert_eq!(abundances.get_transcript_abundance("T1"), 700_000.0);
        assert_eq!(abundances.get_transcript_abundance("T3"), 0.0);
    }
}
