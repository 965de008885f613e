//! # Template Resources
//!
//! The registration pipeline only consumes path strings and parsed configs.
//! Where they come from is behind two traits: [`ResourceEnumerator`] lists
//! template resources and pack directories, [`ConfigLoader`] turns a config
//! path into a [`DungeonPackConfig`]. [`FsResources`] reads them from disk and
//! [`MemoryResources`] serves them from memory.

use super::{ConfigError, DungeonPackConfig};
use crate::utils;
use crate::PocketDimResult;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lists the resources registration works from.
pub trait ResourceEnumerator {
    /// Lists template resource paths directly inside a directory.
    fn list_templates(&self, directory: &Path) -> PocketDimResult<Vec<String>>;

    /// Lists the sub-directories of a directory; each one is a pack.
    fn list_pack_directories(&self, directory: &Path) -> PocketDimResult<Vec<PathBuf>>;

    /// Reads a bundle list: one template path per line, blank lines ignored.
    fn read_bundle_list(&self, list: &Path) -> PocketDimResult<Vec<String>>;
}

/// Loads pack configurations.
pub trait ConfigLoader {
    /// Loads and validates the config at `path`, telling a missing file apart
    /// from a malformed one.
    fn load_config(&self, path: &Path) -> Result<DungeonPackConfig, ConfigError>;
}

/// Splits bundle list text into trimmed, non-empty lines.
pub fn parse_bundle_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads resources from the local file system.
///
/// Directory listings are sorted by file name so registration order does not
/// depend on the platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResources;

impl FsResources {
    pub fn new() -> Self {
        Self
    }

    fn sorted_entries(directory: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(directory)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }
}

impl ResourceEnumerator for FsResources {
    fn list_templates(&self, directory: &Path) -> PocketDimResult<Vec<String>> {
        Ok(Self::sorted_entries(directory)?
            .into_iter()
            .filter(|path| path.is_file())
            .map(|path| path.to_string_lossy().into_owned())
            .filter(|path| utils::is_schematic(path))
            .collect())
    }

    fn list_pack_directories(&self, directory: &Path) -> PocketDimResult<Vec<PathBuf>> {
        Ok(Self::sorted_entries(directory)?
            .into_iter()
            .filter(|path| path.is_dir())
            .collect())
    }

    fn read_bundle_list(&self, list: &Path) -> PocketDimResult<Vec<String>> {
        Ok(parse_bundle_list(&fs::read_to_string(list)?))
    }
}

impl ConfigLoader for FsResources {
    fn load_config(&self, path: &Path) -> Result<DungeonPackConfig, ConfigError> {
        let label = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound(label.clone()),
            _ => ConfigError::Malformed {
                path: label.clone(),
                reason: e.to_string(),
            },
        })?;
        DungeonPackConfig::from_json_str(&text, &label)
    }
}

/// Serves resources from memory, for embedded packs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    templates: HashMap<PathBuf, Vec<String>>,
    directories: HashMap<PathBuf, Vec<PathBuf>>,
    bundle_lists: HashMap<PathBuf, String>,
    configs: HashMap<PathBuf, String>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds template paths listed in a directory.
    pub fn with_templates<I, S>(mut self, directory: impl Into<PathBuf>, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates
            .entry(directory.into())
            .or_default()
            .extend(templates.into_iter().map(Into::into));
        self
    }

    /// Adds a pack directory under a parent directory.
    pub fn with_pack_directory(mut self, parent: impl Into<PathBuf>, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        self.templates.entry(directory.clone()).or_default();
        self.directories
            .entry(parent.into())
            .or_default()
            .push(directory);
        self
    }

    /// Adds the raw text of a bundle list.
    pub fn with_bundle_list(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.bundle_lists.insert(path.into(), text.into());
        self
    }

    /// Adds the raw JSON text of a pack config.
    pub fn with_config(mut self, path: impl Into<PathBuf>, json: impl Into<String>) -> Self {
        self.configs.insert(path.into(), json.into());
        self
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
}

impl ResourceEnumerator for MemoryResources {
    fn list_templates(&self, directory: &Path) -> PocketDimResult<Vec<String>> {
        match self.templates.get(directory) {
            Some(templates) => Ok(templates.clone()),
            None if self.directories.contains_key(directory) => Ok(Vec::new()),
            None => Err(not_found(directory).into()),
        }
    }

    fn list_pack_directories(&self, directory: &Path) -> PocketDimResult<Vec<PathBuf>> {
        match self.directories.get(directory) {
            Some(directories) => Ok(directories.clone()),
            None if self.templates.contains_key(directory) => Ok(Vec::new()),
            None => Err(not_found(directory).into()),
        }
    }

    fn read_bundle_list(&self, list: &Path) -> PocketDimResult<Vec<String>> {
        self.bundle_lists
            .get(list)
            .map(|text| parse_bundle_list(text))
            .ok_or_else(|| not_found(list).into())
    }
}

impl ConfigLoader for MemoryResources {
    fn load_config(&self, path: &Path) -> Result<DungeonPackConfig, ConfigError> {
        let label = path.display().to_string();
        let text = self
            .configs
            .get(path)
            .ok_or_else(|| ConfigError::NotFound(label.clone()))?;
        DungeonPackConfig::from_json_str(text, &label)
    }
}
