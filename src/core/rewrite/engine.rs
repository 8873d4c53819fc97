use serde::Serialize;

use crate::asset::AssetHandle;
use crate::corpus::{ContentLocation, Corpus};
use crate::error::{Error, Result};
use crate::identity::ObjectIdentity;
use crate::index::{DependencyIndex, ScanIndex};
use crate::local_files::{self, FileSystem};
use crate::output::BulkResult;
use crate::progress::ScanControl;
use crate::reference::{Occurrence, TargetedMatcher};

use super::rewrite_references;

/// A corpus file holding at least one token with the queried identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub location: ContentLocation,
    pub asset: AssetHandle,
    pub occurrences: Vec<Occurrence>,
}

/// A candidate the scan could not read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedCandidate {
    pub location: ContentLocation,
    pub code: String,
    pub error: String,
}

impl SkippedCandidate {
    fn from_error(location: ContentLocation, error: &Error) -> Self {
        Self {
            location,
            code: error.code.as_str().to_string(),
            error: error.cause(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub target: ObjectIdentity,
    /// Name of the dependency index that produced the candidates.
    pub index: String,
    pub usages: Vec<UsageRecord>,
    pub skipped: Vec<SkippedCandidate>,
    /// Candidates examined before the scan finished or was cancelled.
    pub scanned: usize,
    pub cancelled: bool,
}

/// Result of rewriting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRewrite {
    pub location: ContentLocation,
    pub replacements: usize,
    /// Whether the new content was written back.
    pub applied: bool,
    /// Set when the write succeeded but the index could not be refreshed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_error: Option<String>,
}

/// Finds and rewrites references across a corpus.
///
/// The dependency index is chosen by the caller; `with_fallback` uses a `ScanIndex`.
pub struct RewriteEngine {
    corpus: Corpus,
    index: Box<dyn DependencyIndex>,
    fs: Box<dyn FileSystem>,
}

impl RewriteEngine {
    pub fn new(
        corpus: Corpus,
        index: Box<dyn DependencyIndex>,
        fs: Box<dyn FileSystem>,
    ) -> Self {
        Self { corpus, index, fs }
    }

    /// Engine over the local filesystem that scans the corpus for every query.
    pub fn with_fallback(corpus: Corpus) -> Self {
        let index = Box::new(ScanIndex::new(corpus.clone(), Box::new(local_files::local())));
        Self::new(corpus, index, Box::new(local_files::local()))
    }

    /// Every candidate file that holds `target`, in index order.
    ///
    /// Fails only when `target` is malformed. Unreadable candidates end up in
    /// `skipped`; cancellation stops before the next candidate and keeps the records
    /// already found.
    pub fn find_usages(
        &self,
        target: &ObjectIdentity,
        control: &ScanControl<'_>,
    ) -> Result<UsageReport> {
        let matcher = TargetedMatcher::new(target)?;
        let candidates = self.index.users_of(&target.container_id, control)?;
        let total = candidates.len();

        let mut report = UsageReport {
            target: target.clone(),
            index: self.index.name().to_string(),
            usages: Vec::new(),
            skipped: Vec::new(),
            scanned: 0,
            cancelled: false,
        };

        for (index, location) in candidates.into_iter().enumerate() {
            if control.is_cancelled() {
                report.cancelled = true;
                break;
            }
            control.observer.candidate(index, total, location.as_str());
            report.scanned += 1;

            let text = match self.fs.read(&self.corpus.path_of(&location)) {
                Ok(text) => text,
                Err(err) => {
                    let error = Error::candidate_unreadable(location.as_str(), err.cause());
                    control.observer.skipped(location.as_str(), &error);
                    report
                        .skipped
                        .push(SkippedCandidate::from_error(location, &error));
                    continue;
                }
            };

            let occurrences = matcher.occurrences(&text);
            if occurrences.is_empty() {
                continue;
            }

            let asset = self.corpus.handle(&location, self.fs.as_ref());
            report.usages.push(UsageRecord {
                location,
                asset,
                occurrences,
            });
        }

        control.observer.finished(report.scanned, report.cancelled);
        Ok(report)
    }

    /// Rewrite `original` to `replacement` in one file.
    ///
    /// With `apply` unset nothing is written. A file with no matching token is left
    /// untouched. After a write the index is told to refresh the location.
    pub fn replace(
        &mut self,
        location: &ContentLocation,
        original: &ObjectIdentity,
        replacement: &ObjectIdentity,
        apply: bool,
    ) -> Result<FileRewrite> {
        let path = self.corpus.path_of(location);
        if !self.fs.exists(&path) {
            return Err(Error::asset_not_found(
                location.as_str(),
                Some(path.display().to_string()),
            ));
        }

        let text = self.fs.read(&path)?;
        let rewrite = rewrite_references(&text, original, replacement)?;

        let applied = apply && rewrite.changed();
        let mut index_error = None;
        if applied {
            self.fs.write(&path, &rewrite.content)?;
            log_status!(
                "replace",
                "{}: {} reference(s) rewritten",
                location,
                rewrite.replacements
            );
            // The file is already rewritten; a stale index is reported, not fatal.
            if let Err(err) = self.index.refresh(location) {
                log_status!(
                    "replace",
                    "{}: index refresh failed: {}",
                    location,
                    err.cause()
                );
                index_error = Some(err.cause());
            }
        }

        Ok(FileRewrite {
            location: location.clone(),
            replacements: rewrite.replacements,
            applied,
            index_error,
        })
    }

    /// Find every usage of `original` and rewrite it in each file.
    ///
    /// A file that fails is recorded in the result and the batch goes on. Unreadable
    /// candidates from the scan are recorded as failures too.
    pub fn replace_all(
        &mut self,
        original: &ObjectIdentity,
        replacement: &ObjectIdentity,
        apply: bool,
        control: &ScanControl<'_>,
    ) -> Result<BulkResult<FileRewrite>> {
        replacement.validate()?;
        let report = self.find_usages(original, control)?;

        let action = if apply { "replace" } else { "replace (dry run)" };
        let mut bulk = BulkResult::new(action);

        for skipped in &report.skipped {
            bulk.record(
                skipped.location.as_str(),
                Err(Error::candidate_unreadable(
                    skipped.location.as_str(),
                    skipped.error.as_str(),
                )),
            );
        }

        for usage in &report.usages {
            if control.is_cancelled() {
                break;
            }
            let outcome = self.replace(&usage.location, original, replacement, apply);
            bulk.record(usage.location.as_str(), outcome);
        }

        Ok(bulk)
    }
}
