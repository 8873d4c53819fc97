use clap::Args;

use refswap::corpus::Corpus;
use refswap::defaults::{self, Defaults};
use refswap::index::{open_index, DependencyIndex, IndexMode};

pub type CmdResult<T> = refswap::Result<(T, i32)>;

/// Corpus selection shared by commands that read the corpus.
#[derive(Args, Default, Debug)]
pub struct CorpusArgs {
    /// Corpus root (default: defaults.corpus.root from refswap.json)
    #[arg(long)]
    pub root: Option<String>,
}

/// Corpus selection plus the dependency index to query it with.
#[derive(Args, Default, Debug)]
pub struct IndexedCorpusArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Dependency index: auto, scan, cache (default: defaults.index.mode)
    #[arg(long, value_name = "MODE")]
    pub index: Option<String>,
}

impl CorpusArgs {
    pub fn open(&self, defaults: &Defaults) -> refswap::Result<Corpus> {
        Corpus::open(self.root.as_deref(), &defaults.corpus)
    }
}

impl IndexedCorpusArgs {
    /// Open the corpus and the dependency index selected for it.
    pub fn open(&self) -> refswap::Result<(Corpus, Box<dyn DependencyIndex>)> {
        let defaults = defaults::load_defaults();
        let corpus = self.corpus.open(&defaults)?;
        let mode = match self.index.as_deref() {
            Some(raw) => raw.parse::<IndexMode>()?,
            None => defaults.index.mode,
        };
        let index = open_index(&corpus, &defaults.index, mode)?;
        Ok((corpus, index))
    }
}

pub mod config;
pub mod identity;
pub mod index;
pub mod refs;
pub mod replace;
pub mod usages;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (refswap::Result<serde_json::Value>, i32) {
    crate::tty::status("refswap is working...");

    match command {
        crate::Commands::Refs(args) => dispatch!(args, refs),
        crate::Commands::Identity(args) => dispatch!(args, identity),
        crate::Commands::Usages(args) => dispatch!(args, usages),
        crate::Commands::Replace(args) => dispatch!(args, replace),
        crate::Commands::Index(args) => dispatch!(args, index),
        crate::Commands::Config(args) => dispatch!(args, config),
    }
}
