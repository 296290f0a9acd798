//! Filesystem abstraction for script loading.
//!
//! `dofile` opens relative paths against a configured root; nothing else
//! in the runtime touches the filesystem. The in-memory variant backs
//! tests and sandboxed embedders.

use std::io;
use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

/// Opens relative paths for reading, scoped to a root.
pub enum ScriptFs {
    /// The host filesystem, rooted at a directory.
    Os { root: PathBuf },
    /// An in-memory map from relative path to file contents.
    Memory(FxHashMap<String, Vec<u8>>),
}

impl ScriptFs {
    /// A host filesystem scoped to `root`.
    pub fn os(root: impl Into<PathBuf>) -> Self {
        ScriptFs::Os { root: root.into() }
    }

    /// An empty in-memory filesystem.
    pub fn memory() -> Self {
        ScriptFs::Memory(FxHashMap::default())
    }

    /// Add a file to an in-memory filesystem. No-op on `Os`.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        if let ScriptFs::Memory(files) = self {
            files.insert(path.into(), contents.into());
        }
    }

    /// Read a relative path in full.
    ///
    /// Absolute paths and `..` components are rejected: the abstraction
    /// is scoped to its root by contract.
    pub fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        if !is_safe_relative(Path::new(path)) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("path escapes the script root: {path}"),
            ));
        }
        match self {
            ScriptFs::Os { root } => std::fs::read(root.join(path)),
            ScriptFs::Memory(files) => files.get(path).cloned().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
            }),
        }
    }
}

fn is_safe_relative(path: &Path) -> bool {
    !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
