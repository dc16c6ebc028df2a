//! Emission: writes a finished export to disk.
//!
//! Layout under the output root:
//! - `<project>.yyp`
//! - `<dir>/<file>.yy` per resource, with its PNGs and copied payloads
//! - `datafiles/...` for included files
//!
//! Any write failure is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};
use rayon::prelude::*;

use crate::entities::included_file::DataFile;
use crate::entities::{Payload, Resource, Translated};
use crate::export::{ExportError, ExportOutput};

pub struct Emitter {
    root: PathBuf,
}

impl Emitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write the project file, every resource and every included file.
    pub fn emit(&self, output: &ExportOutput) -> Result<(), ExportError> {
        output.resources.par_iter().try_for_each(|r| self.write_resource(r))?;
        output.included.par_iter().try_for_each(|f| self.copy_included(f))?;
        let project_file = self.write_project(output)?;
        info!(
            "Wrote {} ({} resources, {} included files)",
            project_file.display(),
            output.resources.len(),
            output.included.len()
        );
        Ok(())
    }

    /// Write `<name>.yyp` and return its path.
    pub fn write_project(&self, output: &ExportOutput) -> Result<PathBuf, ExportError> {
        let path = self.root.join(output.project.file_name());
        write_file(&path, output.project.to_json()?.as_bytes())?;
        Ok(path)
    }

    pub fn write_resource(&self, resource: &Translated) -> Result<(), ExportError> {
        let dir = self.root.join(resource.directory());
        create_dir(&dir)?;

        let file = dir.join(resource.file_name());
        write_file(&file, resource.to_json()?.as_bytes())?;
        trace!("Wrote {}", file.display());

        for payload in resource.payloads() {
            match payload {
                Payload::Image { file, image } => {
                    let path = dir.join(file);
                    if let Some(parent) = path.parent() {
                        create_dir(parent)?;
                    }
                    image.save(&path).map_err(|e| write_error(&path, e))?;
                }
                Payload::Copy { file, from } => {
                    let path = dir.join(file);
                    fs::copy(&from, &path).map_err(|e| write_error(&path, e))?;
                }
            }
        }
        debug!("Emitted {}", resource.name());
        Ok(())
    }

    pub fn copy_included(&self, file: &DataFile) -> Result<(), ExportError> {
        let dir = self.root.join(file.project_dir());
        create_dir(&dir)?;
        let path = dir.join(&file.name);
        fs::copy(&file.path, &path).map_err(|e| write_error(&path, e))?;
        Ok(())
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> ExportError {
    ExportError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn create_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|e| write_error(dir, e))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    fs::write(path, bytes).map_err(|e| write_error(path, e))
}
