//! The single control point for filesystem mutation.
//!
//! Every write and delete in the workspace goes through [`FsGate`]. Its mode is
//! fixed at construction, so a dry run cannot touch the filesystem no matter which
//! rule or rewrite asks for a change.

use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{MigrateError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Apply,
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Write,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

#[derive(Debug)]
pub struct FsGate {
    mode: Mode,
    records: Vec<ChangeRecord>,
}

impl FsGate {
    pub fn new(mode: Mode) -> Self {
        Self { mode, records: Vec::new() }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == Mode::DryRun
    }

    /// Changes performed (or, in a dry run, that would have been performed), in order.
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        match self.mode {
            Mode::DryRun => info!("Would write {}", path.display()),
            Mode::Apply => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                    && !parent.exists()
                {
                    debug!("Creating directory {}", parent.display());
                    fs::create_dir_all(parent).map_err(|e| MigrateError::io(parent, e))?;
                }
                fs::write(path, contents).map_err(|e| MigrateError::io(path, e))?;
                info!("Wrote {}", path.display());
            }
        }
        self.records.push(ChangeRecord { path: path.to_path_buf(), kind: ChangeKind::Write });
        Ok(())
    }

    pub fn delete(&mut self, path: &Path) -> Result<()> {
        match self.mode {
            Mode::DryRun => info!("Would delete {}", path.display()),
            Mode::Apply => {
                fs::remove_file(path).map_err(|e| MigrateError::io(path, e))?;
                info!("Deleted {}", path.display());
            }
        }
        self.records.push(ChangeRecord { path: path.to_path_buf(), kind: ChangeKind::Delete });
        Ok(())
    }
}
