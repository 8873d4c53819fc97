use std::collections::BTreeSet;
use std::path::Path;

use clap::Args;
use serde::Serialize;

use refswap::local_files::{self, FileSystem};
use refswap::reference::{self, Occurrence};
use refswap::utils::validation;
use refswap::ObjectIdentity;

use super::CmdResult;

#[derive(Args)]
pub struct RefsArgs {
    /// File to list reference tokens from
    pub file: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefEntry {
    #[serde(flatten)]
    pub at: Occurrence,
    #[serde(flatten)]
    pub identity: ObjectIdentity,
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefsOutput {
    command: String,
    file: String,
    count: usize,
    references: Vec<RefEntry>,
    dependencies: BTreeSet<String>,
}

pub fn run(args: RefsArgs) -> CmdResult<RefsOutput> {
    let file = validation::require_non_empty(&args.file, "file", "File path is empty")?;
    let fs = local_files::local();
    let path = Path::new(file);
    if !fs.exists(path) {
        return Err(refswap::Error::asset_not_found(file, None));
    }
    let text = fs.read(path)?;

    let references: Vec<RefEntry> = reference::find_all(&text)
        .map(|token| RefEntry {
            at: Occurrence::at(&text, token.start()),
            identity: reference::extract_identity(&token),
            text: token.as_str().to_string(),
        })
        .collect();

    Ok((
        RefsOutput {
            command: "refs".to_string(),
            file: file.to_string(),
            count: references.len(),
            references,
            dependencies: reference::declared_dependencies(&text),
        },
        0,
    ))
}
