use std::path::Path;

use piquant_scripts::ShellWriter;

use super::{Phase, QuantInputs, Quantifier, timed, unless_directory_exists};
use crate::abundances::{Column, TranscriptAbundances, read_tab_separated};
use crate::errors::QuantError;

const REFERENCE_DIR: &str = "rsem";
const REFERENCE_NAME: &str = "rsem/rsem";
const SAMPLE_NAME: &str = "rsem_sample";

/// RSEM, aligning reads to the transcriptome with Bowtie.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rsem;

impl Quantifier for Rsem {
    fn name(&self) -> &'static str {
        "RSEM"
    }

    fn write_preparatory_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    ) {
        unless_directory_exists(writer, &inputs.scratch(REFERENCE_DIR), |w| {
            w.add_comment("Prepare the RSEM transcript reference");
            w.add_command(&[
                timed(
                    record_usage,
                    Phase::Prequantification,
                    "rsem-prepare-reference --bowtie",
                ),
                format!("--gtf {}", QuantInputs::quoted(&inputs.transcript_gtf)),
                QuantInputs::quoted(&inputs.genome_fasta),
                inputs.scratch(REFERENCE_NAME),
            ]);
        })
    }

    fn write_quantification_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    ) {
        writer.add_comment("Estimate transcript abundances with RSEM");
        let mut command = vec![timed(
            record_usage,
            Phase::Quantification,
            "rsem-calculate-expression --time",
        )];
        if !inputs.errors {
            command.push("--no-qualities".to_string());
        }
        if inputs.paired_end {
            command.push("--paired-end".to_string());
        }
        if inputs.stranded {
            command.push("--forward-prob 1".to_string());
        }
        command.extend(inputs.reads());
        command.push(inputs.scratch(REFERENCE_NAME));
        command.push(SAMPLE_NAME.to_string());
        writer.add_command(&command);
    }

    fn write_cleanup(&self, writer: &mut ShellWriter) {
        writer.add_line(&format!(
            "rm -rf {s}.transcript.bam {s}.genome.bam {s}.stat {s}.temp",
            s = SAMPLE_NAME
        ));
    }

    fn results_file(&self) -> &'static str {
        "rsem_sample.isoforms.results"
    }

    fn calculate_transcript_abundances(
        &self,
        results_file: &Path,
    ) -> Result<TranscriptAbundances, QuantError> {
        read_tab_separated(
            results_file,
            Column::Name("transcript_id"),
            Column::Name("TPM"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::quantifiers::test_support::{inputs, quantification};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(false, false, false, &["--no-qualities"], &["--paired-end", "--forward-prob"])]
    #[case(true, true, true, &["--paired-end", "--forward-prob 1"], &["--no-qualities"])]
    fn test_quantification_flags(
        #[case] paired_end: bool,
        #[case] errors: bool,
        #[case] stranded: bool,
        #[case] present: &[&str],
        #[case] absent: &[&str],
    ) {
        let script = quantification(&Rsem, &inputs(paired_end, errors, stranded));

        for flag in present {
            assert!(script.contains(flag), "expected {}", flag);
        }
        for flag in absent {
            assert!(!script.contains(flag), "unexpected {}", flag);
        }
        assert!(script.trim_end().ends_with("rsem_sample"));
    }

    #[rstest]
    fn test_tpms_are_read_unchanged() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("rsem_sample.isoforms.results");
        std::fs::write(
            &path,
            "transcript_id\tgene_id\tlength\teffective_length\texpected_count\tTPM\tFPKM\n\
             T1\tG1\t1000\t900\t10\t600000.00\t1.0\n\
             T2\tG1\t500\t400\t5\t400000.00\t1.0\n",
        )
        .unwrap();

        let abundances = Rsem.calculate_transcript_abundances(&path).unwrap();
        assert_eq!(abundances.get_transcript_abundance("T1"), 600_000.0);
        assert_eq!(abundances.len(), 2);
    }
}
