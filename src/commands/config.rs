use clap::{Args, Subcommand};
use serde::Serialize;

use refswap::defaults::{self, Defaults, RefswapConfig};

use super::CmdResult;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display configuration (merged defaults + file)
    Show {
        /// Show only built-in defaults (ignore refswap.json)
        #[arg(long)]
        builtin: bool,
    },
    /// Reset configuration to built-in defaults (deletes refswap.json)
    Reset,
    /// Show the path to refswap.json
    Path,
}

#[derive(Debug, Default, Serialize)]
pub struct ConfigOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<RefswapConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defaults: Option<Defaults>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted: Option<bool>,
}

pub fn run(args: ConfigArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show { builtin } => show(builtin),
        ConfigCommand::Reset => reset(),
        ConfigCommand::Path => path(),
    }
}

fn show(builtin: bool) -> CmdResult<ConfigOutput> {
    let output = if builtin {
        ConfigOutput {
            command: "config.show".to_string(),
            defaults: Some(defaults::builtin_defaults()),
            ..Default::default()
        }
    } else {
        ConfigOutput {
            command: "config.show".to_string(),
            config: Some(defaults::load_config()),
            ..Default::default()
        }
    };
    Ok((output, 0))
}

fn reset() -> CmdResult<ConfigOutput> {
    let deleted = defaults::reset_config()?;

    Ok((
        ConfigOutput {
            command: "config.reset".to_string(),
            defaults: Some(defaults::builtin_defaults()),
            path: Some(defaults::config_path()?),
            deleted: Some(deleted),
            ..Default::default()
        },
        0,
    ))
}

fn path() -> CmdResult<ConfigOutput> {
    Ok((
        ConfigOutput {
            command: "config.path".to_string(),
            path: Some(defaults::config_path()?),
            exists: Some(defaults::config_exists()),
            ..Default::default()
        },
        0,
    ))
}
