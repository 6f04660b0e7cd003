use anyhow::{Result, anyhow};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use testshape_core::Mode;

#[derive(Debug, Clone, Parser)]
#[command(name = "testshape")]
#[command(about = "Migrate workspace packages to the shared test layout", long_about = None)]
pub struct Config {
    /// Root directory of the workspace (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Report every change without modifying any file
    #[arg(long)]
    pub dry_run: bool,

    /// Only process projects whose name or folder contains one of these
    #[arg(value_name = "FILTER")]
    pub filters: Vec<String>,
}

impl Config {
    /// Initialize the config by resolving the root directory
    pub fn initialize(&mut self) -> Result<()> {
        let root = if let Some(r) = self.root.take() {
            debug!("Using provided root directory: {:?}", r);
            r.canonicalize().unwrap_or(r)
        } else {
            debug!("No root provided, searching for git root");
            testshape_core::find_git_root()?
        };
        info!("Using root directory: {}", root.display());
        self.root = Some(root);
        Ok(())
    }

    /// Get the root directory, returning an error if not initialized
    pub fn root(&self) -> Result<&PathBuf> {
        self.root
            .as_ref()
            .ok_or_else(|| anyhow!("Config not initialized - call initialize() first"))
    }

    pub fn mode(&self) -> Mode {
        if self.dry_run { Mode::DryRun } else { Mode::Apply }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_arguments() {
        let cfg = Config::parse_from(["testshape", "--root", "/ws", "--dry-run", "pkg-a", "ui"]);
        assert_eq!(cfg.root, Some(PathBuf::from("/ws")));
        assert!(cfg.dry_run);
        assert_eq!(cfg.filters, vec!["pkg-a".to_string(), "ui".to_string()]);
        assert_eq!(cfg.mode(), Mode::DryRun);

        let cfg = Config::parse_from(["testshape"]);
        assert!(cfg.filters.is_empty());
        assert_eq!(cfg.mode(), Mode::Apply);
    }

    #[test]
    fn test_initialize_with_explicit_root() {
        let temp_dir = TempDir::new().unwrap();
        let mut cfg = Config::parse_from(["testshape"]);
        cfg.root = Some(temp_dir.path().to_path_buf());
        assert!(Config::parse_from(["testshape"]).root().is_err());

        cfg.initialize().unwrap();
        assert_eq!(cfg.root().unwrap(), &temp_dir.path().canonicalize().unwrap());
    }
}
