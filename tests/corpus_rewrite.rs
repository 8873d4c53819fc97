use std::fs;
use std::path::Path;

use refswap::corpus::{ContentLocation, Corpus, CorpusPolicy};
use refswap::defaults::{self, IndexConfig};
use refswap::index::{self, DependencyIndex, IndexMode, ReverseIndex};
use refswap::local_files;
use refswap::progress::ScanControl;
use refswap::rewrite::{self, RewriteEngine};
use refswap::ObjectIdentity;
use tempfile::TempDir;

const CONTAINER: &str = "845e14e3d06d247fb9c79560f3a335e9";

const BEHAVIOUR: &str = "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!114 &11400000
MonoBehaviour:
  m_ObjectHideFlags: 0
  m_CorrespondingSourceObject: {fileID: 0}
  m_Script: {fileID: 11500000, guid: 33c43f4fd43a4fbaa997441062753e05, type: 3}
  m_Name: Testito
  stuff: {fileID: 2941741086030567527, guid: 845e14e3d06d247fb9c79560f3a335e9, type: 3}
  stuffjoijoijfiodjfsdojfsdodfjd: {fileID: 1757496506939017585, guid: 845e14e3d06d247fb9c79560f3a335e9,
    type: 3}
  stuffjoijdoijafoidjfsdoaijfdsofjsdofjdsofjdsaofjsdofjosdjfsdojfsadjojojojoofj: {fileID: -3957278670179174112,
    guid: 845e14e3d06d247fb9c79560f3a335e9, type: 3}
";

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn single_file_corpus() -> (TempDir, Corpus) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "Data/Testito.asset", BEHAVIOUR);
    write(
        dir.path(),
        "Data/Testito.asset.meta",
        "fileFormatVersion: 2\nguid: 11112222333344445555666677778888\n",
    );
    write(
        dir.path(),
        "Scripts/Testito.cs",
        "// {fileID: 1757496506939017585, guid: 845e14e3d06d247fb9c79560f3a335e9,\n",
    );

    let policy = CorpusPolicy::from_config(&defaults::builtin_defaults().corpus);
    let corpus = Corpus::new(dir.path(), policy);
    (dir, corpus)
}

fn index_config() -> IndexConfig {
    defaults::builtin_defaults().index
}

#[test]
fn each_identity_in_the_file_finds_exactly_that_file() {
    let (_dir, corpus) = single_file_corpus();
    let engine = RewriteEngine::with_fallback(corpus);

    for local_id in [
        2941741086030567527i64,
        1757496506939017585,
        -3957278670179174112,
    ] {
        let report = engine
            .find_usages(&ObjectIdentity::new(local_id, CONTAINER), &ScanControl::silent())
            .unwrap();
        let files: Vec<&str> = report.usages.iter().map(|u| u.location.as_str()).collect();
        assert_eq!(files, vec!["Data/Testito.asset"], "local id {}", local_id);
        assert!(report.skipped.is_empty());
    }
}

#[test]
fn replacing_the_middle_token_changes_only_its_fields() {
    let (dir, corpus) = single_file_corpus();
    let mut engine = RewriteEngine::with_fallback(corpus);
    let location = ContentLocation::new("Data/Testito.asset");
    let original = ObjectIdentity::new(1757496506939017585, CONTAINER);
    let replacement = ObjectIdentity::new(9, "newtoken");

    let result = engine
        .replace(&location, &original, &replacement, true)
        .unwrap();
    assert_eq!(result.replacements, 1);
    assert!(result.applied);

    let written = fs::read_to_string(dir.path().join("Data/Testito.asset")).unwrap();
    let expected = BEHAVIOUR.replace(
        "{fileID: 1757496506939017585, guid: 845e14e3d06d247fb9c79560f3a335e9,\n",
        "{fileID: 9, guid: newtoken,\n",
    );
    assert_eq!(written, expected);
    assert_eq!(
        written,
        rewrite::replace_dependency(BEHAVIOUR, &original, &replacement).unwrap()
    );

    let after = engine
        .find_usages(&original, &ScanControl::silent())
        .unwrap();
    assert!(after.usages.is_empty());
}

#[test]
fn persisted_index_answers_lookups_and_follows_rewrites() {
    let (dir, corpus) = single_file_corpus();
    let config = index_config();
    let file = index::index_path(&corpus, &config);

    ReverseIndex::build(
        corpus.clone(),
        Box::new(local_files::local()),
        file.clone(),
        &ScanControl::silent(),
    )
    .save()
    .unwrap();
    assert!(file.is_file());

    let opened = index::open_index(&corpus, &config, IndexMode::Auto).unwrap();
    assert_eq!(opened.name(), "cache");

    let mut engine = RewriteEngine::new(corpus.clone(), opened, Box::new(local_files::local()));
    let bulk = engine
        .replace_all(
            &ObjectIdentity::new(2941741086030567527, CONTAINER),
            &ObjectIdentity::new(2, "popote"),
            true,
            &ScanControl::silent(),
        )
        .unwrap();
    assert_eq!(bulk.summary.succeeded, 1);

    let reloaded = index::open_index(&corpus, &config, IndexMode::Cache).unwrap();
    let control = ScanControl::silent();
    let users = reloaded.users_of("popote", &control).unwrap();
    assert_eq!(users, vec![ContentLocation::new("Data/Testito.asset")]);

    let status = ReverseIndex::load(corpus, Box::new(local_files::local()), file)
        .unwrap()
        .status();
    assert!(status.is_fresh(), "{:?}", status);

    let content = fs::read_to_string(dir.path().join("Data/Testito.asset")).unwrap();
    assert!(content.contains("stuff: {fileID: 2, guid: popote, type: 3}"));
}

#[test]
fn excluded_extensions_are_configurable() {
    let (dir, _) = single_file_corpus();

    let mut config = defaults::builtin_defaults().corpus;
    config.excluded_extensions.retain(|ext| ext != "cs");
    let corpus = Corpus::new(dir.path(), CorpusPolicy::from_config(&config));
    let engine = RewriteEngine::with_fallback(corpus);

    let report = engine
        .find_usages(
            &ObjectIdentity::new(1757496506939017585, CONTAINER),
            &ScanControl::silent(),
        )
        .unwrap();
    let files: Vec<&str> = report.usages.iter().map(|u| u.location.as_str()).collect();
    assert_eq!(files, vec!["Data/Testito.asset", "Scripts/Testito.cs"]);
}
