use clap::Args;
use serde::Serialize;

use refswap::asset;
use refswap::local_files;
use refswap::progress::{CancelToken, ScanControl, StatusObserver};
use refswap::rewrite::{RewriteEngine, UsageReport};
use refswap::utils::validation;
use refswap::ObjectIdentity;

use super::{CmdResult, IndexedCorpusArgs};

#[derive(Args)]
pub struct UsagesArgs {
    /// Identity to look for, as GUID:FILE_ID
    #[arg(long, conflicts_with = "asset")]
    pub target: Option<String>,

    /// Asset whose .meta guid names the container (use with --file-id)
    #[arg(long, requires = "file_id")]
    pub asset: Option<String>,

    /// Local id of the object inside --asset
    #[arg(long, allow_hyphen_values = true)]
    pub file_id: Option<i64>,

    #[command(flatten)]
    pub corpus: IndexedCorpusArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagesOutput {
    command: String,
    total_files: usize,
    #[serde(flatten)]
    report: UsageReport,
}

pub fn run(args: UsagesArgs) -> CmdResult<UsagesOutput> {
    let (corpus, index) = args.corpus.open()?;
    let fs = local_files::local();

    let target = match (&args.target, &args.asset) {
        (Some(raw), _) => raw.parse::<ObjectIdentity>()?,
        (None, Some(asset_input)) => {
            let file_id = validation::require(
                args.file_id,
                "file_id",
                "--file-id is required with --asset",
            )?;
            let location = corpus.existing_location(asset_input, &fs)?;
            asset::resolve_identity(&corpus.handle(&location, &fs), file_id)?
        }
        (None, None) => {
            return Err(refswap::Error::validation_missing_argument(vec![
                "--target".to_string(),
                "--asset".to_string(),
            ]))
        }
    };

    let engine = RewriteEngine::new(corpus, index, Box::new(fs));
    let control = ScanControl::new(CancelToken::new(), &StatusObserver);
    let report = engine.find_usages(&target, &control)?;

    Ok((
        UsagesOutput {
            command: "usages".to_string(),
            total_files: report.usages.len(),
            report,
        },
        0,
    ))
}
