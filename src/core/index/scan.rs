use crate::corpus::{ContentLocation, Corpus};
use crate::error::{Error, Result};
use crate::local_files::FileSystem;
use crate::progress::ScanControl;
use crate::reference::declared_dependencies;

use super::DependencyIndex;

/// Brute-force index: reads every corpus file on each query.
///
/// Files excluded by the corpus policy are never read. A file that cannot be read is
/// reported to the observer and left out.
pub struct ScanIndex {
    corpus: Corpus,
    fs: Box<dyn FileSystem>,
}

impl ScanIndex {
    pub fn new(corpus: Corpus, fs: Box<dyn FileSystem>) -> Self {
        Self { corpus, fs }
    }
}

impl DependencyIndex for ScanIndex {
    fn name(&self) -> &'static str {
        "scan"
    }

    fn users_of(
        &self,
        container_id: &str,
        control: &ScanControl<'_>,
    ) -> Result<Vec<ContentLocation>> {
        let files = self.corpus.files();
        let total = files.len();
        let mut users = Vec::new();

        for (index, location) in files.into_iter().enumerate() {
            if control.is_cancelled() {
                break;
            }
            control.observer.candidate(index, total, location.as_str());

            let text = match self.fs.read(&self.corpus.path_of(&location)) {
                Ok(text) => text,
                Err(err) => {
                    let skipped = Error::candidate_unreadable(location.as_str(), err.cause());
                    control.observer.skipped(location.as_str(), &skipped);
                    continue;
                }
            };

            if declared_dependencies(&text).contains(container_id) {
                users.push(location);
            }
        }

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CorpusPolicy;
    use crate::local_files::local;
    use crate::progress::{CancelToken, ScanObserver};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<String>>,
        skipped: RefCell<Vec<String>>,
        cancel_after: Option<(usize, CancelToken)>,
    }

    impl ScanObserver for Recorder {
        fn candidate(&self, index: usize, _total: usize, location: &str) {
            self.seen.borrow_mut().push(location.to_string());
            if let Some((limit, token)) = &self.cancel_after {
                if index + 1 >= *limit {
                    token.cancel();
                }
            }
        }

        fn skipped(&self, location: &str, error: &Error) {
            assert_eq!(error.code.as_str(), "scan.unreadable_candidate");
            self.skipped.borrow_mut().push(location.to_string());
        }
    }

    fn corpus_with_files(files: &[(&str, &[u8])]) -> (tempfile::TempDir, Corpus) {
        let dir = tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        let policy = CorpusPolicy::from_config(&crate::defaults::builtin_defaults().corpus);
        let corpus = Corpus::new(dir.path(), policy);
        (dir, corpus)
    }

    #[test]
    fn selects_files_referencing_container() {
        let (_dir, corpus) = corpus_with_files(&[
            ("a.prefab", b"x: {fileID: 1, guid: target, type: 3}\n"),
            ("b.prefab", b"x: {fileID: 1, guid: other, type: 3}\n"),
            ("c.mat", b"x: {fileID: 7,\n  guid: target, type: 2}\n"),
            ("d.cs", b"// {fileID: 1, guid: target, type: 3}\n"),
        ]);
        let index = ScanIndex::new(corpus, Box::new(local()));

        let users = index.users_of("target", &ScanControl::silent()).unwrap();
        let users: Vec<&str> = users.iter().map(|l| l.as_str()).collect();
        assert_eq!(users, vec!["a.prefab", "c.mat"]);
    }

    #[test]
    fn unreadable_files_are_skipped_and_reported() {
        let (_dir, corpus) = corpus_with_files(&[
            ("a.asset", &[0xff, 0xfe, 0x00]),
            ("b.asset", b"{fileID: 1, guid: target, type: 3}"),
        ]);
        let index = ScanIndex::new(corpus, Box::new(local()));
        let recorder = Recorder::default();
        let control = ScanControl::new(CancelToken::new(), &recorder);

        let users = index.users_of("target", &control).unwrap();
        assert_eq!(users, vec![ContentLocation::new("b.asset")]);
        assert_eq!(*recorder.skipped.borrow(), vec!["a.asset".to_string()]);
    }

    #[test]
    fn cancellation_stops_between_files() {
        let (_dir, corpus) = corpus_with_files(&[
            ("a.asset", b"{fileID: 1, guid: target, type: 3}"),
            ("b.asset", b"{fileID: 1, guid: target, type: 3}"),
            ("c.asset", b"{fileID: 1, guid: target, type: 3}"),
        ]);
        let index = ScanIndex::new(corpus, Box::new(local()));
        let token = CancelToken::new();
        let recorder = Recorder {
            cancel_after: Some((1, token.clone())),
            ..Default::default()
        };
        let control = ScanControl::new(token, &recorder);

        let users = index.users_of("target", &control).unwrap();
        assert_eq!(users, vec![ContentLocation::new("a.asset")]);
        assert_eq!(recorder.seen.borrow().len(), 1);
    }
}
