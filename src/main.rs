use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{config, identity, index, refs, replace, usages};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "refswap")]
#[command(version = VERSION)]
#[command(about = "Find and rewrite {fileID, guid} object references in serialized assets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every reference token in a file
    Refs(refs::RefsArgs),
    /// Resolve an object identity from an asset's .meta file
    Identity(identity::IdentityArgs),
    /// Find corpus files that reference an identity
    Usages(usages::UsagesArgs),
    /// Rewrite references from one identity to another
    Replace(replace::ReplaceArgs),
    /// Manage the persisted dependency index
    Index(index::IndexArgs),
    /// Manage global refswap configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);
    let _ = output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
