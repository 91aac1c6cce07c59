use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Extension of every mirrored asset.
pub const ASSET_EXTENSION: &str = "svg";

/// Result of storing one downloaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub id: String,
    pub path: PathBuf,
}

/// Flat directory of asset files keyed by identifier.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn asset_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.{ASSET_EXTENSION}"))
    }

    pub fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| Error::store(&self.root, source))
    }

    /// Write `bytes` as the asset for `id`, replacing any previous file.
    ///
    /// `id` must name a single file directly under the root; the root itself
    /// must already exist.
    pub fn write_asset(&self, id: &str, bytes: &[u8]) -> Result<AssetRecord> {
        self.check_asset_id(id)?;
        let path = self.asset_path(id);
        replace_file(&self.root, &path, bytes)?;
        Ok(AssetRecord {
            id: id.to_string(),
            path,
        })
    }

    /// File names directly under the store root, sorted by name.
    pub fn list_assets(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|error| {
                let path = error
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.root.clone());
                Error::Store {
                    path,
                    source: error.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if is_temp_name(&name) {
                continue;
            }
            names.push(name);
        }
        Ok(names)
    }

    fn check_asset_id(&self, id: &str) -> Result<()> {
        let rejected = id == "."
            || id == ".."
            || id.contains(['/', '\\'])
            || id.chars().any(char::is_control);
        if rejected {
            return Err(Error::store(
                &self.root,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("asset identifier {id:?} is not a plain file name"),
                ),
            ));
        }
        Ok(())
    }

    pub fn read_asset(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        fs::read(&path).map_err(|source| Error::store(&path, source))
    }
}

/// Write through a sibling temp file and rename it over `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|source| Error::store(parent, source))?;
    replace_file(parent, path, bytes)
}

fn replace_file(parent: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}{TEMP_SUFFIX}"));
    fs::write(&temp_path, bytes).map_err(|source| Error::store(&temp_path, source))?;
    fs::rename(&temp_path, path).map_err(|source| Error::store(path, source))
}

const TEMP_SUFFIX: &str = ".partial";

fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(TEMP_SUFFIX)
}
