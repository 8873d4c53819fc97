use clap::Args;
use serde::Serialize;

use refswap::local_files;
use refswap::progress::{CancelToken, ScanControl, StatusObserver};
use refswap::rewrite::{FileRewrite, RewriteEngine};
use refswap::{BulkResult, ObjectIdentity};

use super::{CmdResult, IndexedCorpusArgs};

#[derive(Args)]
pub struct ReplaceArgs {
    /// Identity to replace, as GUID:FILE_ID
    #[arg(long)]
    pub from: String,

    /// Replacement identity, as GUID:FILE_ID
    #[arg(long)]
    pub to: String,

    /// Rewrite one corpus file
    #[arg(long, conflicts_with = "all")]
    pub file: Option<String>,

    /// Rewrite every file that uses --from
    #[arg(long)]
    pub all: bool,

    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,

    #[command(flatten)]
    pub corpus: IndexedCorpusArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceOutput {
    command: String,
    from: ObjectIdentity,
    to: ObjectIdentity,
    dry_run: bool,
    total_replacements: usize,
    files: BulkResult<FileRewrite>,
}

pub fn run(args: ReplaceArgs) -> CmdResult<ReplaceOutput> {
    let from: ObjectIdentity = args.from.parse()?;
    let to: ObjectIdentity = args.to.parse()?;

    if args.file.is_none() && !args.all {
        return Err(refswap::Error::validation_missing_argument(vec![
            "--file".to_string(),
            "--all".to_string(),
        ]));
    }

    let (corpus, index) = args.corpus.open()?;
    let fs = local_files::local();

    let files = match &args.file {
        Some(input) => {
            let location = corpus.existing_location(input, &fs)?;
            let mut engine = RewriteEngine::new(corpus, index, Box::new(fs));
            let rewrite = engine.replace(&location, &from, &to, args.write)?;

            let action = if args.write { "replace" } else { "replace (dry run)" };
            let mut bulk = BulkResult::new(action);
            bulk.record(location.as_str(), Ok(rewrite));
            bulk
        }
        None => {
            let mut engine = RewriteEngine::new(corpus, index, Box::new(fs));
            let control = ScanControl::new(CancelToken::new(), &StatusObserver);
            engine.replace_all(&from, &to, args.write, &control)?
        }
    };

    let total_replacements = files
        .results
        .iter()
        .filter_map(|outcome| outcome.result.as_ref())
        .map(|rewrite| rewrite.replacements)
        .sum();
    let exit_code = if files.has_failures() { 1 } else { 0 };

    Ok((
        ReplaceOutput {
            command: "replace".to_string(),
            from,
            to,
            dry_run: !args.write,
            total_replacements,
            files,
        },
        exit_code,
    ))
}
