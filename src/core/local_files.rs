use std::path::Path;

use crate::error::Result;
use crate::utils::io;

/// Trait for the file operations the engine needs - local disk or anything else
pub trait FileSystem {
    fn read(&self, path: &Path) -> Result<String>;
    /// Replace the file's content atomically.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

/// Local filesystem implementation
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> Result<String> {
        io::read_file(path, &format!("read {}", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        io::write_file_atomic(path, content, &format!("write {}", path.display()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Convenience function to get local filesystem
pub fn local() -> LocalFs {
    LocalFs::new()
}
