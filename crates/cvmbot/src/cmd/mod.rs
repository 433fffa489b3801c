use std::path::Path;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join every configured VM and answer chat commands until Ctrl-C.
    Run(RunArgs),
    /// Encode fields into a protocol frame.
    Encode(EncodeArgs),
    /// Decode a protocol frame into its fields.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, config: &Path, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, config, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Override the emoji list URL from the config file.
    #[arg(long, value_name = "URL")]
    pub emojilist_url: Option<String>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Fields to encode, opcode first.
    #[arg(required = true, value_name = "FIELD")]
    pub fields: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame text, e.g. `4.chat,5.alice,2.hi;`.
    #[arg(value_name = "FRAME")]
    pub frame: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
