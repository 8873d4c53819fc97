//! Dependency index: which corpus files reference a given container.
//!
//! The engine receives its index explicitly. `ScanIndex` is the default and needs no
//! preparation; `ReverseIndex` is built once, persisted, and answers lookups without
//! reading the corpus.

mod reverse;
mod scan;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::corpus::{ContentLocation, Corpus};
use crate::defaults::IndexConfig;
use crate::error::{Error, Result};
use crate::local_files;
use crate::progress::ScanControl;

pub use reverse::{IndexStatus, ReverseIndex, INDEX_VERSION};
pub use scan::ScanIndex;

/// "Who uses what" provider.
pub trait DependencyIndex {
    /// Short name reported alongside results.
    fn name(&self) -> &'static str;

    /// Locations of files that reference `container_id`, in a stable order.
    fn users_of(
        &self,
        container_id: &str,
        control: &ScanControl<'_>,
    ) -> Result<Vec<ContentLocation>>;

    /// Called after `location` was rewritten.
    fn refresh(&mut self, _location: &ContentLocation) -> Result<()> {
        Ok(())
    }
}

/// How to pick the index for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Persisted index when present, scanning otherwise.
    #[default]
    Auto,
    /// Always scan the corpus.
    Scan,
    /// Require the persisted index.
    Cache,
}

impl FromStr for IndexMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(IndexMode::Auto),
            "scan" => Ok(IndexMode::Scan),
            "cache" => Ok(IndexMode::Cache),
            _ => Err(Error::validation_invalid_argument(
                "index",
                format!("Unknown index mode '{}'. Use: auto, scan, cache", s),
                None,
                Some(vec![
                    "auto".to_string(),
                    "scan".to_string(),
                    "cache".to_string(),
                ]),
            )),
        }
    }
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexMode::Auto => "auto",
            IndexMode::Scan => "scan",
            IndexMode::Cache => "cache",
        })
    }
}

/// Where the persisted index for `corpus` lives.
pub fn index_path(corpus: &Corpus, config: &IndexConfig) -> PathBuf {
    corpus.root().join(&config.file)
}

/// Pick the dependency index for `corpus` according to `mode`.
pub fn open_index(
    corpus: &Corpus,
    config: &IndexConfig,
    mode: IndexMode,
) -> Result<Box<dyn DependencyIndex>> {
    let file = index_path(corpus, config);
    let fs = Box::new(local_files::local());

    match mode {
        IndexMode::Scan => Ok(Box::new(ScanIndex::new(corpus.clone(), fs))),
        IndexMode::Cache => Ok(Box::new(ReverseIndex::load(corpus.clone(), fs, file)?)),
        IndexMode::Auto => {
            if file.is_file() {
                Ok(Box::new(ReverseIndex::load(corpus.clone(), fs, file)?))
            } else {
                Ok(Box::new(ScanIndex::new(corpus.clone(), fs)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusPolicy;
    use tempfile::tempdir;

    #[test]
    fn index_mode_round_trips_through_strings() {
        for mode in [IndexMode::Auto, IndexMode::Scan, IndexMode::Cache] {
            assert_eq!(mode.to_string().parse::<IndexMode>().unwrap(), mode);
        }
        assert!("fast".parse::<IndexMode>().is_err());
    }

    #[test]
    fn auto_falls_back_to_scanning_without_index_file() {
        let dir = tempdir().unwrap();
        let corpus = Corpus::new(dir.path(), CorpusPolicy::default());
        let config = crate::defaults::builtin_defaults().index;

        let index = open_index(&corpus, &config, IndexMode::Auto).unwrap();
        assert_eq!(index.name(), "scan");

        let err = open_index(&corpus, &config, IndexMode::Cache)
            .err()
            .unwrap();
        assert_eq!(err.code.as_str(), "index.missing");
    }
}
