use std::path::Path;

use piquant_scripts::ShellWriter;

use super::{Phase, QuantInputs, Quantifier, concatenate_genome, timed, unless_directory_exists};
use crate::abundances::{Column, TranscriptAbundances, read_tab_separated};
use crate::errors::QuantError;

const INDEX_DIR: &str = "bowtie-index";
const INDEX_NAME: &str = "bowtie-index/genome";
const GENOME_FASTA: &str = "bowtie-index/genome.fa";
const TOPHAT_OUTPUT_DIR: &str = "tho";
const CUFFLINKS_OUTPUT_DIR: &str = "transcriptome";

///
/// TopHat alignment against a Bowtie index of the genome, followed by
/// Cufflinks abundance estimation. Abundances are reported as FPKM.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct Cufflinks;

fn library_type(stranded: bool) -> &'static str {
    if stranded {
        "fr-secondstrand"
    } else {
        "fr-unstranded"
    }
}

impl Quantifier for Cufflinks {
    fn name(&self) -> &'static str {
        "Cufflinks"
    }

    fn write_preparatory_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    ) {
        unless_directory_exists(writer, &inputs.scratch(INDEX_DIR), |w| {
            w.add_comment("Build a Bowtie index of the genome");
            concatenate_genome(w, inputs, &inputs.scratch(GENOME_FASTA));
            w.add_line(&timed(
                record_usage,
                Phase::Prequantification,
                &format!(
                    "bowtie-build {} {}",
                    inputs.scratch(GENOME_FASTA),
                    inputs.scratch(INDEX_NAME)
                ),
            ));
        })
    }

    fn write_quantification_commands(
        &self,
        writer: &mut ShellWriter,
        record_usage: bool,
        inputs: &QuantInputs,
    ) {
        let library_type = library_type(inputs.stranded);

        writer.add_comment("Map reads to the genome with TopHat");
        let mut tophat = vec![
            "tophat --bowtie1".to_string(),
            format!("--library-type {}", library_type),
            format!("-o {}", TOPHAT_OUTPUT_DIR),
            format!("-G {}", QuantInputs::quoted(&inputs.transcript_gtf)),
            inputs.scratch(INDEX_NAME),
        ];
        tophat.extend(inputs.reads());
        tophat[0] = timed(record_usage, Phase::Quantification, &tophat[0]);
        writer.add_command(&tophat);
        writer.add_blank();

        writer.add_comment("Estimate transcript abundances with Cufflinks");
        let cufflinks = vec![
            timed(record_usage, Phase::Quantification, "cufflinks -u"),
            format!("--library-type {}", library_type),
            format!("-o {}", CUFFLINKS_OUTPUT_DIR),
            format!("-b {}", inputs.scratch(GENOME_FASTA)),
            format!("-G {}", QuantInputs::quoted(&inputs.transcript_gtf)),
            format!("{}/accepted_hits.bam", TOPHAT_OUTPUT_DIR),
        ];
        writer.add_command(&cufflinks);
    }

    fn write_cleanup(&self, writer: &mut ShellWriter) {
        writer.add_line(&format!("rm -rf {}", TOPHAT_OUTPUT_DIR));
    }

    fn results_file(&self) -> &'static str {
        "transcriptome/isoforms.fpkm_tracking"
    }

    fn calculate_transcript_abundances(
        &self,
        results_file: &Path,
    ) -> Result<TranscriptAbundances, QuantError> {
        let fpkms = read_tab_separated(
            results_file,
            Column::Name("tracking_id"),
            Column::Name("FPKM"),
        )?;
        Ok(fpkms.normalised())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::quantifiers::test_support::{inputs, quantification};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_quantification_commands() {
        let script = quantification(&Cufflinks, &inputs(true, false, true));

        assert!(script.contains("tophat --bowtie1 \\\n"));
        assert!(script.contains("--library-type fr-secondstrand"));
        assert!(script.contains("/reads/run/reads.1.fasta \\\n    /reads/run/reads.2.fasta\n"));
        assert!(script.contains("tho/accepted_hits.bam"));
    }

    #[rstest]
    fn test_fpkms_are_normalised() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("isoforms.fpkm_tracking");
        std::fs::write(
            &path,
            "tracking_id\tclass_code\tFPKM\tFPKM_status\nT1\t-\t3.0\tOK\nT2\t-\t1.0\tOK\n",
        )
        .unwrap();

        let abundances = Cufflinks.calculate_transcript_abundances(&path).unwrap();
        assert_eq!(abundances.get_transcript_abundance("T1"), 750_000.0);
        assert_eq!(abundances.get_transcript_abundance("T2"), 250_000.0);
        assert!(!Cufflinks.requires_paired_end_reads());
    }
}
