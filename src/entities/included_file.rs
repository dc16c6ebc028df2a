//! Included files: loose data shipped next to the game.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;

use super::targets::Targets;

/// Project-relative root of all included files.
pub const DATAFILES: &str = "datafiles";

/// One file found under the data-files directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    /// Absolute location on disk.
    pub path: PathBuf,
    /// File name with extension.
    pub name: String,
    /// Directory relative to the data-files root, `""` at the top level.
    pub relative_dir: String,
}

impl DataFile {
    /// Find every regular file below `root`, sorted by path.
    pub fn discover(root: &Path) -> Result<Vec<DataFile>> {
        let root_str = root
            .to_str()
            .with_context(|| format!("Non UTF-8 data-files path: {}", root.display()))?;
        let pattern = Path::new(&glob::Pattern::escape(root_str)).join("**").join("*");

        let mut files = Vec::new();
        for entry in glob::glob(&pattern.to_string_lossy()).context("Bad data-files pattern")? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Skipping unreadable data file: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let relative_dir = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| {
                    p.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_default();
            files.push(DataFile { path, name, relative_dir });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Found {} data files in {}", files.len(), root.display());
        Ok(files)
    }

    /// Project-relative directory of this file.
    pub fn project_dir(&self) -> String {
        if self.relative_dir.is_empty() {
            DATAFILES.to_string()
        } else {
            format!("{}/{}", DATAFILES, self.relative_dir)
        }
    }

    /// Platforms a file is copied to, from its extension.
    pub fn targets(&self) -> Targets {
        let extension = Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match extension.as_deref() {
            Some("dll") => Targets::WINDOWS | Targets::XBOX,
            Some("dylib") => Targets::MACOS,
            Some("so") => Targets::UBUNTU,
            _ => Targets::ALL_INCLUDED_FILE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GMIncludedFile {
    #[serde(rename = "CopyToMask")]
    pub copy_to_mask: Targets,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "resourceVersion")]
    pub resource_version: &'static str,
    pub name: String,
    pub tags: Vec<String>,
    #[serde(rename = "resourceType")]
    pub resource_type: &'static str,
}

impl GMIncludedFile {
    pub fn from_file(file: &DataFile) -> Self {
        Self {
            copy_to_mask: file.targets(),
            file_path: file.project_dir(),
            resource_version: "1.0",
            name: file.name.clone(),
            tags: Vec::new(),
            resource_type: "GMIncludedFile",
        }
    }
}
