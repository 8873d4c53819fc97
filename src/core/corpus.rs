//! Corpus: the set of content files that may hold reference tokens.
//!
//! Files are addressed by `ContentLocation`, the path relative to the corpus root with
//! `/` separators. Enumeration follows a `CorpusPolicy` built from configuration.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::asset::AssetHandle;
use crate::defaults::CorpusConfig;
use crate::error::{Error, Result};
use crate::local_files::FileSystem;

/// Directories skipped at any depth regardless of configuration.
const ALWAYS_SKIP_DIRS: &[&str] = &[".refswap", ".svn", ".hg"];

/// Corpus-relative path of a content file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentLocation(String);

impl ContentLocation {
    pub fn new(relative: impl Into<String>) -> Self {
        Self(relative.into().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which files of the corpus are candidates for holding references.
#[derive(Debug, Clone, Default)]
pub struct CorpusPolicy {
    pub excluded_extensions: Vec<String>,
    pub skip_dirs: Vec<String>,
    pub exclude_globs: Vec<String>,
}

impl CorpusPolicy {
    pub fn from_config(config: &CorpusConfig) -> Self {
        Self {
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            skip_dirs: config.skip_dirs.clone(),
            exclude_globs: config.exclude_globs.clone(),
        }
    }

    fn skips_dir(&self, name: &str) -> bool {
        ALWAYS_SKIP_DIRS.contains(&name) || self.skip_dirs.iter().any(|d| d == name)
    }

    /// Whether a file (by corpus-relative path) belongs to the scan set.
    pub fn includes(&self, relative: &str) -> bool {
        let ext = Path::new(relative)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if self
            .excluded_extensions
            .iter()
            .any(|x| x.eq_ignore_ascii_case(ext))
        {
            return false;
        }
        !self
            .exclude_globs
            .iter()
            .any(|pattern| glob_match::glob_match(pattern, relative))
    }
}

/// A corpus root plus its enumeration policy.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    policy: CorpusPolicy,
}

impl Corpus {
    pub fn new(root: impl Into<PathBuf>, policy: CorpusPolicy) -> Self {
        Self {
            root: root.into(),
            policy,
        }
    }

    /// Open the corpus named by `root_override`, or by the configured root.
    pub fn open(root_override: Option<&str>, config: &CorpusConfig) -> Result<Self> {
        let raw = root_override.unwrap_or(&config.root);
        if raw.trim().is_empty() {
            return Err(Error::config_invalid_value(
                "defaults.corpus.root",
                None,
                "Corpus root is empty",
            ));
        }
        let expanded = shellexpand::tilde(raw).into_owned();
        let root = PathBuf::from(expanded);

        if !root.is_dir() {
            return Err(Error::validation_invalid_argument(
                "root",
                format!("Corpus root '{}' is not a directory", root.display()),
                None,
                None,
            )
            .with_hint("Pass --root or set defaults.corpus.root in refswap.json"));
        }

        Ok(Self::new(root, CorpusPolicy::from_config(config)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, location: &ContentLocation) -> PathBuf {
        self.root.join(location.as_str())
    }

    /// Location of a path under the root (absolute, or relative to the root).
    pub fn location_of(&self, path: &Path) -> Result<ContentLocation> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root).map_err(|_| {
                Error::validation_invalid_argument(
                    "path",
                    format!(
                        "'{}' is outside the corpus root '{}'",
                        path.display(),
                        self.root.display()
                    ),
                    None,
                    None,
                )
            })?
        } else {
            path
        };
        Ok(ContentLocation::new(relative.to_string_lossy()))
    }

    /// Resolve user input naming a corpus file, which must exist.
    ///
    /// Accepts a corpus-relative location, or a path (relative to the working directory
    /// or absolute) that lies under the root.
    pub fn existing_location(&self, input: &str, fs: &dyn FileSystem) -> Result<ContentLocation> {
        let direct = ContentLocation::new(input);
        if fs.exists(&self.path_of(&direct)) {
            return Ok(direct);
        }

        let as_path = Path::new(input);
        if fs.exists(as_path) {
            let absolute = as_path.canonicalize().map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("resolve {}", input)))
            })?;
            let root = self.root.canonicalize().map_err(|e| {
                Error::internal_io(e.to_string(), Some("resolve corpus root".to_string()))
            })?;
            return Corpus::new(root, CorpusPolicy::default()).location_of(&absolute);
        }

        Err(Error::asset_not_found(
            input,
            Some(self.path_of(&direct).display().to_string()),
        ))
    }

    /// Every candidate file, sorted by location.
    pub fn files(&self) -> Vec<ContentLocation> {
        let mut files = Vec::new();
        self.walk(&self.root, &mut files);
        files.sort();
        files
    }

    fn walk(&self, dir: &Path, files: &mut Vec<ContentLocation>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };

        for entry in entries.flatten() {
            // DirEntry::file_type does not follow symlinks.
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            if file_type.is_symlink() && path.is_dir() {
                continue;
            }
            if file_type.is_dir() {
                let name = entry.file_name().to_string_lossy().to_string();
                if self.policy.skips_dir(&name) {
                    continue;
                }
                self.walk(&path, files);
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                let location = ContentLocation::new(relative.to_string_lossy());
                if self.policy.includes(location.as_str()) {
                    files.push(location);
                }
            }
        }
    }

    /// Path-to-handle: load the asset handle for a location.
    pub fn handle(&self, location: &ContentLocation, fs: &dyn FileSystem) -> AssetHandle {
        AssetHandle::load(location.clone(), self.path_of(location), fs)
    }
}
