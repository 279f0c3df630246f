use clap::{Arg, ArgAction, Command};

use piquant_options::options::ValueKind;

use crate::commands::PiquantCommand;

pub const PARAMS_FILE: &str = "params-file";

pub fn create_run_command_cli(command: PiquantCommand) -> Command {
    let mut cli = Command::new(command.name()).about(command.about()).arg(
        Arg::new(PARAMS_FILE)
            .long(PARAMS_FILE)
            .help("File of options, one '--flag value[,value...]' per line; the command line wins"),
    );

    for option in command.quant_run_options() {
        cli = cli.arg(
            Arg::new(option.name())
                .long(option.flag())
                .value_name("VALUES")
                .help(format!("{} (comma separated)", option.title())),
        );
    }

    for option in command.run_options() {
        let arg = Arg::new(option.name())
            .long(option.flag())
            .help(option.help());
        let arg = match option.kind() {
            ValueKind::Switch => arg.action(ArgAction::SetTrue),
            _ => arg,
        };
        cli = cli.arg(arg);
    }

    cli
}
