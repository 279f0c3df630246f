mod commands;
mod helpers;
mod runs;

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use log::Level;

use commands::PiquantCommand;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "piquant";
    pub const BIN_NAME: &str = "piquant";
    pub const LOG_LEVEL: &str = "log-level";
    pub const DEFAULT_LOG_LEVEL: &str = "info";
}

fn build_parser() -> Command {
    let mut parser = Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Benchmarking of RNA-seq transcript quantification tools over simulated reads.")
        .subcommand_required(true)
        .propagate_version(true)
        .arg(
            Arg::new(consts::LOG_LEVEL)
                .long(consts::LOG_LEVEL)
                .global(true)
                .value_parser(["debug", "info", "warning", "error", "critical"])
                .default_value(consts::DEFAULT_LOG_LEVEL)
                .help("Level of messages to log"),
        );

    for command in PiquantCommand::ALL {
        parser = parser.subcommand(runs::cli::create_run_command_cli(command));
    }

    parser
        .subcommand(helpers::cli::create_reads_for_depth_cli())
        .subcommand(helpers::cli::create_read_bias_cli())
        .subcommand(helpers::cli::create_transcript_counts_cli())
        .subcommand(helpers::cli::create_unique_sequence_cli())
        .subcommand(helpers::cli::create_assemble_cli())
        .subcommand(helpers::cli::create_analyse_run_cli())
}

fn log_level(matches: &ArgMatches) -> Level {
    match matches
        .get_one::<String>(consts::LOG_LEVEL)
        .map(String::as_str)
    {
        Some("debug") => Level::Debug,
        Some("warning") => Level::Warn,
        Some("error") | Some("critical") => Level::Error,
        _ => Level::Info,
    }
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    simple_logger::init_with_level(log_level(&matches))?;

    match matches.subcommand() {
        //
        // SCRIPT HELPERS
        //
        Some((helpers::cli::READS_FOR_DEPTH_CMD, matches)) => {
            helpers::handlers::run_reads_for_depth(matches)?;
        }
        Some((helpers::cli::READ_BIAS_CMD, matches)) => {
            helpers::handlers::run_read_bias(matches)?;
        }
        Some((helpers::cli::TRANSCRIPT_COUNTS_CMD, matches)) => {
            helpers::handlers::run_transcript_counts(matches)?;
        }
        Some((helpers::cli::UNIQUE_SEQUENCE_CMD, matches)) => {
            helpers::handlers::run_unique_sequence(matches)?;
        }
        Some((helpers::cli::ASSEMBLE_CMD, matches)) => {
            helpers::handlers::run_assemble(matches)?;
        }
        Some((helpers::cli::ANALYSE_RUN_CMD, matches)) => {
            helpers::handlers::run_analyse_run(matches)?;
        }

        //
        // USER COMMANDS
        //
        Some((name, matches)) => match PiquantCommand::from_name(name) {
            Some(command) => runs::handlers::run_command(command, matches)?,
            None => unreachable!("Subcommand not found"),
        },

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
