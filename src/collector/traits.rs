//! Filesystem abstraction over `/proc` access.
//!
//! The monitor never touches `std::fs` directly: it goes through the
//! `FileSystem` trait, so tests can feed synthetic procfs trees via
//! [`MockFs`](crate::collector::mock::MockFs) while the binary plugs in
//! [`RealFs`].

use std::io;
use std::path::{Path, PathBuf};

/// Read-only filesystem operations needed to sample procfs.
pub trait FileSystem {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks whether a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists the entries of a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Production implementation delegating to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(path)? {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}
