use clap::{Args, Subcommand};
use serde::Serialize;

use refswap::defaults;
use refswap::index::{self, IndexStatus, ReverseIndex};
use refswap::local_files;
use refswap::progress::{CancelToken, ScanControl, StatusObserver};

use super::{CmdResult, CorpusArgs};

#[derive(Args)]
pub struct IndexArgs {
    #[command(subcommand)]
    command: IndexCommand,
}

#[derive(Subcommand)]
enum IndexCommand {
    /// Scan the corpus and persist its reverse dependency index
    Build {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Compare the persisted index with the corpus on disk
    Status {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Delete the persisted index
    Clear {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum IndexOutput {
    #[serde(rename = "index.build", rename_all = "camelCase")]
    Build {
        path: String,
        built_at: String,
        files: usize,
        containers: usize,
        cancelled: bool,
    },
    #[serde(rename = "index.status", rename_all = "camelCase")]
    Status {
        fresh: bool,
        #[serde(flatten)]
        status: IndexStatus,
    },
    #[serde(rename = "index.clear", rename_all = "camelCase")]
    Clear { path: String, deleted: bool },
}

pub fn run(args: IndexArgs) -> CmdResult<IndexOutput> {
    let defaults = defaults::load_defaults();

    match args.command {
        IndexCommand::Build { corpus } => {
            let corpus = corpus.open(&defaults)?;
            let file = index::index_path(&corpus, &defaults.index);
            let token = CancelToken::new();
            let control = ScanControl::new(token.clone(), &StatusObserver);

            let built =
                ReverseIndex::build(corpus, Box::new(local_files::local()), file, &control);
            let cancelled = token.is_cancelled();
            if !cancelled {
                built.save()?;
            }

            Ok((
                IndexOutput::Build {
                    path: built.file().display().to_string(),
                    built_at: built.built_at().to_string(),
                    files: built.len(),
                    containers: built.container_count(),
                    cancelled,
                },
                0,
            ))
        }
        IndexCommand::Status { corpus } => {
            let corpus = corpus.open(&defaults)?;
            let file = index::index_path(&corpus, &defaults.index);
            let loaded = ReverseIndex::load(corpus, Box::new(local_files::local()), file)?;
            let status = loaded.status();

            Ok((
                IndexOutput::Status {
                    fresh: status.is_fresh(),
                    status,
                },
                0,
            ))
        }
        IndexCommand::Clear { corpus } => {
            let corpus = corpus.open(&defaults)?;
            let file = index::index_path(&corpus, &defaults.index);
            let deleted = ReverseIndex::clear(&file)?;

            Ok((
                IndexOutput::Clear {
                    path: file.display().to_string(),
                    deleted,
                },
                0,
            ))
        }
    }
}
