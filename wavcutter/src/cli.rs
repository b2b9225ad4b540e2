use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Cut a 24-bit WAV recording into one file per note")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("keep-existing")
                .long("keep-existing")
                .help("Keep note files left over from a previous run")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Preview the notes that would be exported without writing files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file_path")
                .value_name("FILE_PATH")
                .help("Path to the input WAV file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}
