//! Where asset bytes come from.
//!
//! A reference is either a filesystem path, read as is, or a bundled resource
//! name resolved under the asset root. Parsing never depends on which one it
//! was.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct AssetSource {
    root: PathBuf,
}

impl AssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` names a file on disk rather than a bundled resource.
    ///
    /// That is the case for absolute paths that exist (but not `//` network
    /// style prefixes), drive letter paths such as `C:\...`, and paths starting
    /// with `./` or `..`.
    pub fn is_file_path(path: &str) -> bool {
        if path.starts_with('/') && !path.starts_with("//") {
            return Path::new(path).exists();
        }
        if path.len() > 2 && path.as_bytes()[1] == b':' {
            return true;
        }
        path.starts_with("./") || path.starts_with("..")
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        if Self::is_file_path(path) {
            PathBuf::from(path)
        } else {
            self.root.join(path.trim_start_matches('/'))
        }
    }

    pub fn open(&self, path: &str) -> anyhow::Result<BufReader<File>> {
        let resolved = self.resolve(path);
        let file = File::open(&resolved)
            .with_context(|| format!("Could not open {}", resolved.display()))?;
        Ok(BufReader::new(file))
    }

    pub fn read_string(&self, path: &str) -> anyhow::Result<String> {
        let resolved = self.resolve(path);
        std::fs::read_to_string(&resolved)
            .with_context(|| format!("Could not read {}", resolved.display()))
    }

    pub fn read_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        let resolved = self.resolve(path);
        std::fs::read(&resolved).with_context(|| format!("Could not read {}", resolved.display()))
    }
}

impl Default for AssetSource {
    fn default() -> Self {
        Self::new("assets")
    }
}
