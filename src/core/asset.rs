//! Asset handles and identity resolution.
//!
//! An asset's own container id lives in the sibling `.meta` file as a top-level
//! `guid: <token>` line. The local id of an object inside the asset is not recorded
//! there, so callers supply it.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::corpus::ContentLocation;
use crate::error::{Error, Result};
use crate::identity::ObjectIdentity;
use crate::local_files::FileSystem;

/// A loaded handle to a corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHandle {
    pub location: ContentLocation,
    pub path: PathBuf,
    /// The asset's own guid, when its `.meta` file is readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

impl AssetHandle {
    pub fn load(location: ContentLocation, path: PathBuf, fs: &dyn FileSystem) -> Self {
        let guid = read_meta_guid(&path, fs);
        Self {
            location,
            path,
            guid,
        }
    }
}

fn meta_guid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^guid:[ \t]*([0-9A-Za-z]+)[ \t]*\r?$").expect("meta guid pattern compiles")
    })
}

/// Path of the `.meta` file that accompanies `asset_path`.
pub fn meta_path(asset_path: &Path) -> PathBuf {
    let mut raw = asset_path.as_os_str().to_owned();
    raw.push(".meta");
    PathBuf::from(raw)
}

/// Extract the guid from `.meta` file content.
pub fn parse_meta_guid(content: &str) -> Option<String> {
    meta_guid_pattern()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn read_meta_guid(asset_path: &Path, fs: &dyn FileSystem) -> Option<String> {
    let meta = meta_path(asset_path);
    if !fs.exists(&meta) {
        return None;
    }
    fs.read(&meta).ok().and_then(|content| parse_meta_guid(&content))
}

/// Identity of the object `local_id` inside the asset behind `handle`.
pub fn resolve_identity(handle: &AssetHandle, local_id: i64) -> Result<ObjectIdentity> {
    let guid = handle.guid.as_ref().ok_or_else(|| {
        Error::asset_meta_missing(
            handle.location.as_str(),
            Some(meta_path(&handle.path).display().to_string()),
        )
    })?;

    let identity = ObjectIdentity::new(local_id, guid.as_str());
    identity.validate()?;
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_files::local;
    use tempfile::tempdir;

    const META: &str = "fileFormatVersion: 2
guid: 845e14e3d06d247fb9c79560f3a335e9
NativeFormatImporter:
  externalObjects: {}
  mainObjectFileID: 11400000
";

    #[test]
    fn parses_top_level_guid_only() {
        assert_eq!(
            parse_meta_guid(META).as_deref(),
            Some("845e14e3d06d247fb9c79560f3a335e9")
        );
        assert_eq!(parse_meta_guid("  guid: nested\n"), None);
        assert_eq!(parse_meta_guid("fileFormatVersion: 2\n"), None);
        assert_eq!(
            parse_meta_guid("guid: abc123\r\n").as_deref(),
            Some("abc123")
        );
    }

    #[test]
    fn meta_path_appends_suffix() {
        assert_eq!(
            meta_path(Path::new("Assets/Data/item.asset")),
            PathBuf::from("Assets/Data/item.asset.meta")
        );
    }

    #[test]
    fn resolves_identity_from_meta() {
        let dir = tempdir().unwrap();
        let asset = dir.path().join("item.asset");
        std::fs::write(&asset, "").unwrap();
        std::fs::write(meta_path(&asset), META).unwrap();

        let handle = AssetHandle::load(ContentLocation::new("item.asset"), asset, &local());
        let identity = resolve_identity(&handle, 11400000).unwrap();
        assert_eq!(
            identity,
            ObjectIdentity::new(11400000, "845e14e3d06d247fb9c79560f3a335e9")
        );
    }

    #[test]
    fn missing_meta_is_reported() {
        let dir = tempdir().unwrap();
        let asset = dir.path().join("orphan.asset");
        std::fs::write(&asset, "").unwrap();

        let handle = AssetHandle::load(ContentLocation::new("orphan.asset"), asset, &local());
        assert_eq!(handle.guid, None);

        let err = resolve_identity(&handle, 1).unwrap_err();
        assert_eq!(err.code.as_str(), "asset.meta_missing");
    }
}
