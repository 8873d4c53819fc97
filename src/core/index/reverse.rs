use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::corpus::{ContentLocation, Corpus};
use crate::error::{Error, Result};
use crate::local_files::FileSystem;
use crate::progress::ScanControl;
use crate::reference::declared_dependencies;

use super::DependencyIndex;

/// Format version of the persisted index file.
pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    digest: String,
    dependencies: BTreeSet<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexFile {
    version: u32,
    built_at: String,
    entries: BTreeMap<ContentLocation, IndexEntry>,
}

/// Freshness of a persisted index against the corpus on disk.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    pub path: String,
    pub built_at: String,
    pub tracked: usize,
    /// Tracked files whose content changed since they were indexed.
    pub stale: Vec<ContentLocation>,
    /// Tracked files that no longer exist.
    pub missing: Vec<ContentLocation>,
    /// Corpus files the index has never seen.
    pub untracked: Vec<ContentLocation>,
}

impl IndexStatus {
    pub fn is_fresh(&self) -> bool {
        self.stale.is_empty() && self.missing.is_empty() && self.untracked.is_empty()
    }
}

/// Persisted reverse dependency map: container id to the files declaring it.
///
/// Each entry records the sha256 of the content it was computed from, so `status`
/// can tell which files changed since the last build.
pub struct ReverseIndex {
    corpus: Corpus,
    fs: Box<dyn FileSystem>,
    file: PathBuf,
    built_at: String,
    entries: BTreeMap<ContentLocation, IndexEntry>,
    users: BTreeMap<String, BTreeSet<ContentLocation>>,
}

fn digest(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

fn entry_for(text: &str) -> IndexEntry {
    IndexEntry {
        digest: digest(text),
        dependencies: declared_dependencies(text),
    }
}

fn invert(
    entries: &BTreeMap<ContentLocation, IndexEntry>,
) -> BTreeMap<String, BTreeSet<ContentLocation>> {
    let mut users: BTreeMap<String, BTreeSet<ContentLocation>> = BTreeMap::new();
    for (location, entry) in entries {
        for dependency in &entry.dependencies {
            users
                .entry(dependency.clone())
                .or_default()
                .insert(location.clone());
        }
    }
    users
}

impl ReverseIndex {
    /// Read every corpus file and record its declared dependencies.
    ///
    /// Unreadable files are reported to the observer and left out. The result is not
    /// saved; call `save` once the build completes.
    pub fn build(
        corpus: Corpus,
        fs: Box<dyn FileSystem>,
        file: PathBuf,
        control: &ScanControl<'_>,
    ) -> Self {
        let files = corpus.files();
        let total = files.len();
        let mut entries = BTreeMap::new();

        for (index, location) in files.into_iter().enumerate() {
            if control.is_cancelled() {
                break;
            }
            control.observer.candidate(index, total, location.as_str());

            match fs.read(&corpus.path_of(&location)) {
                Ok(text) => {
                    entries.insert(location, entry_for(&text));
                }
                Err(err) => {
                    let skipped = Error::candidate_unreadable(location.as_str(), err.cause());
                    control.observer.skipped(location.as_str(), &skipped);
                }
            }
        }
        control
            .observer
            .finished(entries.len(), control.is_cancelled());

        let users = invert(&entries);
        Self {
            corpus,
            fs,
            file,
            built_at: chrono::Utc::now().to_rfc3339(),
            entries,
            users,
        }
    }

    /// Load a previously saved index.
    pub fn load(corpus: Corpus, fs: Box<dyn FileSystem>, file: PathBuf) -> Result<Self> {
        if !fs.exists(&file) {
            return Err(Error::index_missing(file.display().to_string()));
        }

        let content = fs.read(&file)?;
        let parsed: IndexFile = serde_json::from_str(&content).map_err(|e| {
            Error::internal_json(e.to_string(), Some(format!("parse {}", file.display())))
                .with_hint("Run 'refswap index build' to regenerate it")
        })?;

        if parsed.version != INDEX_VERSION {
            return Err(Error::index_missing(file.display().to_string())
                .with_hint(format!(
                    "Index format {} is not supported (expected {})",
                    parsed.version, INDEX_VERSION
                )));
        }

        let users = invert(&parsed.entries);
        Ok(Self {
            corpus,
            fs,
            file,
            built_at: parsed.built_at,
            entries: parsed.entries,
            users,
        })
    }

    pub fn save(&self) -> Result<()> {
        let snapshot = IndexFile {
            version: INDEX_VERSION,
            built_at: self.built_at.clone(),
            entries: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| Error::internal_json(e.to_string(), Some("serialize index".to_string())))?;
        self.fs.write(&self.file, &content)
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn built_at(&self) -> &str {
        &self.built_at
    }

    /// Number of files tracked.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct container ids referenced across the corpus.
    pub fn container_count(&self) -> usize {
        self.users.len()
    }

    /// Compare the index with the corpus as it is now.
    pub fn status(&self) -> IndexStatus {
        let current: BTreeSet<ContentLocation> = self.corpus.files().into_iter().collect();
        let mut stale = Vec::new();
        let mut missing = Vec::new();

        for (location, entry) in &self.entries {
            if !current.contains(location) {
                missing.push(location.clone());
                continue;
            }
            match self.fs.read(&self.corpus.path_of(location)) {
                Ok(text) if digest(&text) == entry.digest => {}
                _ => stale.push(location.clone()),
            }
        }

        let untracked = current
            .into_iter()
            .filter(|location| !self.entries.contains_key(location))
            .collect();

        IndexStatus {
            path: self.file.display().to_string(),
            built_at: self.built_at.clone(),
            tracked: self.entries.len(),
            stale,
            missing,
            untracked,
        }
    }

    /// Delete the index file. Returns whether one existed.
    pub fn clear(file: &Path) -> Result<bool> {
        if !file.exists() {
            return Ok(false);
        }
        std::fs::remove_file(file).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("delete {}", file.display())))
        })?;
        Ok(true)
    }
}

impl DependencyIndex for ReverseIndex {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn users_of(
        &self,
        container_id: &str,
        _control: &ScanControl<'_>,
    ) -> Result<Vec<ContentLocation>> {
        Ok(self
            .users
            .get(container_id)
            .map(|locations| locations.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn refresh(&mut self, location: &ContentLocation) -> Result<()> {
        match self.fs.read(&self.corpus.path_of(location)) {
            Ok(text) => {
                self.entries.insert(location.clone(), entry_for(&text));
            }
            Err(_) => {
                self.entries.remove(location);
            }
        }
        self.users = invert(&self.entries);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusPolicy;
    use crate::local_files::local;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (TempDir, Corpus, PathBuf) {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("door.prefab"),
            "m_Script: {fileID: 11500000, guid: scriptguid, type: 3}\n",
        )
        .unwrap();
        fs::write(
            root.join("level.unity"),
            "a: {fileID: 1, guid: scriptguid, type: 3}\nb: {fileID: 2, guid: matguid, type: 2}\n",
        )
        .unwrap();
        fs::write(root.join("notes.txt"), "{fileID: 1, guid: scriptguid, type: 3}").unwrap();

        let policy = CorpusPolicy::from_config(&crate::defaults::builtin_defaults().corpus);
        let corpus = Corpus::new(root, policy);
        let file = root.join(".refswap/index.json");
        (dir, corpus, file)
    }

    fn locations(users: Vec<ContentLocation>) -> Vec<String> {
        users.into_iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn build_inverts_declared_dependencies() {
        let (_dir, corpus, file) = setup();
        let index = ReverseIndex::build(corpus, Box::new(local()), file, &ScanControl::silent());

        assert_eq!(index.len(), 2);
        assert_eq!(index.container_count(), 2);

        let control = ScanControl::silent();
        assert_eq!(
            locations(index.users_of("scriptguid", &control).unwrap()),
            vec!["door.prefab", "level.unity"]
        );
        assert_eq!(
            locations(index.users_of("matguid", &control).unwrap()),
            vec!["level.unity"]
        );
        assert!(index.users_of("unknown", &control).unwrap().is_empty());
    }

    #[test]
    fn save_and_load_preserve_entries() {
        let (_dir, corpus, file) = setup();
        let built = ReverseIndex::build(
            corpus.clone(),
            Box::new(local()),
            file.clone(),
            &ScanControl::silent(),
        );
        built.save().unwrap();

        let loaded = ReverseIndex::load(corpus, Box::new(local()), file).unwrap();
        assert_eq!(loaded.built_at(), built.built_at());
        assert_eq!(loaded.len(), 2);
        assert!(loaded.status().is_fresh());
    }

    #[test]
    fn load_without_file_reports_missing_index() {
        let (_dir, corpus, file) = setup();
        let err = ReverseIndex::load(corpus, Box::new(local()), file)
            .err()
            .unwrap();
        assert_eq!(err.code.as_str(), "index.missing");
    }

    #[test]
    fn status_reports_stale_missing_and_untracked() {
        let (dir, corpus, file) = setup();
        let index = ReverseIndex::build(corpus, Box::new(local()), file, &ScanControl::silent());

        fs::write(dir.path().join("door.prefab"), "changed\n").unwrap();
        fs::remove_file(dir.path().join("level.unity")).unwrap();
        fs::write(dir.path().join("new.mat"), "").unwrap();

        let status = index.status();
        assert!(!status.is_fresh());
        assert_eq!(status.stale, vec![ContentLocation::new("door.prefab")]);
        assert_eq!(status.missing, vec![ContentLocation::new("level.unity")]);
        assert_eq!(status.untracked, vec![ContentLocation::new("new.mat")]);
    }

    #[test]
    fn refresh_updates_entry_and_persists() {
        let (dir, corpus, file) = setup();
        let mut index = ReverseIndex::build(
            corpus.clone(),
            Box::new(local()),
            file.clone(),
            &ScanControl::silent(),
        );

        fs::write(
            dir.path().join("door.prefab"),
            "m_Script: {fileID: 11500000, guid: otherguid, type: 3}\n",
        )
        .unwrap();
        index.refresh(&ContentLocation::new("door.prefab")).unwrap();

        let control = ScanControl::silent();
        assert_eq!(
            locations(index.users_of("scriptguid", &control).unwrap()),
            vec!["level.unity"]
        );

        let reloaded = ReverseIndex::load(corpus, Box::new(local()), file).unwrap();
        assert_eq!(
            locations(reloaded.users_of("otherguid", &control).unwrap()),
            vec!["door.prefab"]
        );
    }

    #[test]
    fn clear_removes_index_file() {
        let (_dir, corpus, file) = setup();
        ReverseIndex::build(corpus, Box::new(local()), file.clone(), &ScanControl::silent())
            .save()
            .unwrap();

        assert!(ReverseIndex::clear(&file).unwrap());
        assert!(!ReverseIndex::clear(&file).unwrap());
    }
}
