use serde::{Deserialize, Serialize};
use std::fs;

use crate::index::IndexMode;
use crate::paths;
use crate::utils::io;

/// Root configuration structure for refswap.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RefswapConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via refswap.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_corpus")]
    pub corpus: CorpusConfig,

    #[serde(default = "default_index")]
    pub index: IndexConfig,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            corpus: default_corpus(),
            index: default_index(),
        }
    }
}

/// Which files make up the corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Corpus root, relative to the working directory unless absolute. `~` is expanded.
    #[serde(default = "default_root")]
    pub root: String,

    /// Extensions (without the dot) of files that never embed references.
    #[serde(default = "default_excluded_extensions")]
    pub excluded_extensions: Vec<String>,

    /// Directory names skipped at any depth.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Glob patterns over corpus-relative paths to leave out.
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

/// Dependency index settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index file, relative to the corpus root.
    #[serde(default = "default_index_file")]
    pub file: String,

    #[serde(default)]
    pub mode: IndexMode,
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_corpus() -> CorpusConfig {
    CorpusConfig {
        root: default_root(),
        excluded_extensions: default_excluded_extensions(),
        skip_dirs: default_skip_dirs(),
        exclude_globs: Vec::new(),
    }
}

fn default_root() -> String {
    "Assets".to_string()
}

fn default_excluded_extensions() -> Vec<String> {
    ["meta", "cs", "txt", "png", "ogg"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_skip_dirs() -> Vec<String> {
    [".git", "Library", "Temp", "obj"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_index() -> IndexConfig {
    IndexConfig {
        file: default_index_file(),
        mode: IndexMode::default(),
    }
}

fn default_index_file() -> String {
    ".refswap/index.json".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If refswap.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full refswap.json config, falling back to defaults on any error.
pub fn load_config() -> RefswapConfig {
    load_config_from_file().unwrap_or_default()
}

/// Attempt to load config from refswap.json file.
fn load_config_from_file() -> crate::Result<RefswapConfig> {
    let path = paths::refswap_json()?;

    if !path.exists() {
        return Err(crate::Error::other("refswap.json not found"));
    }

    let content = io::read_file(&path, &format!("read {}", path.display()))?;

    parse_config(&content, &path.display().to_string())
}

/// Parse refswap.json content; missing keys take their built-in defaults.
pub fn parse_config(content: &str, origin: &str) -> crate::Result<RefswapConfig> {
    serde_json::from_str(content).map_err(|e| crate::Error::config_invalid_json(origin, e))
}

/// Delete refswap.json file (reset to defaults)
pub fn reset_config() -> crate::Result<bool> {
    let path = paths::refswap_json()?;

    if path.exists() {
        fs::remove_file(&path).map_err(|e| {
            crate::Error::internal_io(e.to_string(), Some(format!("delete {}", path.display())))
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Check if refswap.json file exists
pub fn config_exists() -> bool {
    paths::refswap_json()
        .map(|p| p.exists())
        .unwrap_or(false)
}

/// Get the path to refswap.json (for display purposes)
pub fn config_path() -> crate::Result<String> {
    Ok(paths::refswap_json()?.display().to_string())
}

/// Get built-in defaults (ignoring any file config)
pub fn builtin_defaults() -> Defaults {
    Defaults::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_defaults_exclude_non_reference_files() {
        let defaults = builtin_defaults();
        assert_eq!(defaults.corpus.root, "Assets");
        for ext in ["meta", "cs", "txt", "png", "ogg"] {
            assert!(defaults.corpus.excluded_extensions.iter().any(|e| e == ext));
        }
        assert_eq!(defaults.index.file, ".refswap/index.json");
        assert_eq!(defaults.index.mode, IndexMode::Auto);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = parse_config(
            r#"{"defaults": {"corpus": {"excluded_extensions": ["meta", "wav"]}}}"#,
            "test",
        )
        .unwrap();

        assert_eq!(config.defaults.corpus.excluded_extensions, vec!["meta", "wav"]);
        assert_eq!(config.defaults.corpus.root, "Assets");
        assert_eq!(config.defaults.index.mode, IndexMode::Auto);
    }

    #[test]
    fn index_mode_parses_from_config() {
        let config = parse_config(r#"{"defaults": {"index": {"mode": "scan"}}}"#, "test").unwrap();
        assert_eq!(config.defaults.index.mode, IndexMode::Scan);
    }

    #[test]
    fn invalid_config_reports_origin() {
        let err = parse_config("{ not json", "/tmp/refswap.json").unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
        assert_eq!(err.details["path"], "/tmp/refswap.json");
    }
}
