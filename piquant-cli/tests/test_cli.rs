//! Running the piquant binary as the generated scripts and users do.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use rstest::*;

fn piquant(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_piquant"))
        .args(args)
        .output()
        .unwrap()
}

fn get_test_path(file_name: &str) -> PathBuf {
    std::env::current_dir()
        .unwrap()
        .join("../piquant-core/tests/data")
        .join(file_name)
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[rstest]
fn test_version() {
    let output = piquant(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("piquant "));
}

#[rstest]
fn test_calculate_reads_for_depth() {
    let profile = get_test_path("small.pro");
    let output = piquant(&[
        "calculate_reads_for_depth",
        "--profile",
        path_str(&profile),
        "--read-length",
        "75",
        "--read-depth",
        "30",
    ]);

    assert!(output.status.success());
    // expressed transcripts cover 1500 bases
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "600");
}

#[rstest]
fn test_count_transcripts_for_genes() {
    let tempdir = tempfile::tempdir().unwrap();
    let counts = tempdir.path().join("transcript_counts.csv");
    let output = piquant(&[
        "count_transcripts_for_genes",
        "--transcript-gtf",
        path_str(&get_test_path("small.gtf")),
        "--output",
        path_str(&counts),
    ]);

    assert!(output.status.success());
    let contents = std::fs::read_to_string(counts).unwrap();
    assert!(contents.starts_with("transcript,gene,num-transcripts"));
    assert!(contents.contains("T5,G3,1"));
}

#[rstest]
fn test_invalid_option_value_fails() {
    let tempdir = tempfile::tempdir().unwrap();
    let output = piquant(&[
        "check_quant",
        "--quant-dir",
        path_str(tempdir.path()),
        "--quant-method",
        "Kallisto",
        "--read-depth",
        "30",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Kallisto"));
}

#[rstest]
fn test_params_file_and_check_reads() {
    let tempdir = tempfile::tempdir().unwrap();
    let genome = tempdir.path().join("genome");
    std::fs::create_dir_all(&genome).unwrap();
    let reads_dir = tempdir.path().join("reads");

    let params_file = tempdir.path().join("params.txt");
    std::fs::write(
        &params_file,
        format!(
            "--reads-dir {}\n--transcript-gtf {}\n--genome-fasta {}\n\
             --read-depth 10,30\n--read-length 50\n--paired-end false\n\
             --errors false\n--bias false\n",
            path_str(&reads_dir),
            path_str(&get_test_path("small.gtf")),
            path_str(&genome),
        ),
    )
    .unwrap();

    let output = piquant(&[
        "prepare_read_dirs",
        "--params-file",
        path_str(&params_file),
        "--log-level",
        "warning",
    ]);
    assert!(output.status.success());
    assert!(
        reads_dir
            .join("10x_50b_se_no_errors_no_bias_unstranded_noise-0/run_simulation.sh")
            .exists()
    );

    // the command line overrides the file
    let output = piquant(&[
        "check_reads",
        "--params-file",
        path_str(&params_file),
        "--read-depth",
        "30",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("1 of 1 runs are incomplete"));
}
