use serde::Deserialize;
use std::{
    collections::BTreeSet,
    ops::Range,
    path::{Path, PathBuf},
};

use crate::constants::{ENTRY_POINT, SOURCE_DIR, TEST_DIR};

/// A package discovered in the workspace. `folder` is relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Project {
    pub name: String,
    pub folder: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, folder: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), folder: folder.into() }
    }

    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(&self.folder)
    }

    pub fn source_dir(&self, root: &Path) -> PathBuf {
        self.dir(root).join(SOURCE_DIR)
    }

    pub fn test_dir(&self, root: &Path) -> PathBuf {
        self.dir(root).join(TEST_DIR)
    }

    pub fn entry_point(&self, root: &Path) -> PathBuf {
        self.dir(root).join(ENTRY_POINT)
    }

    /// True when any filter token is a substring of the name or the folder.
    pub fn matches_filter(&self, filters: &[String]) -> bool {
        if filters.is_empty() {
            return true;
        }
        let folder = self.folder.to_string_lossy();
        filters.iter().any(|f| self.name.contains(f.as_str()) || folder.contains(f.as_str()))
    }
}

/// Symbol names a package's entry point is known to export.
pub type ExportSet = BTreeSet<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Static,
    Dynamic,
}

/// One entry of a named import clause: `imported as local`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportClause {
    Default(String),
    Named(Vec<ImportBinding>),
    DefaultAndNamed(String, Vec<ImportBinding>),
    Namespace(String),
    SideEffect,
}

/// A recognized import expression in a test source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub kind: ImportKind,
    /// Bound identifiers, static imports only
    pub clause: Option<ImportClause>,
    pub target: String,
    /// Byte range of `target` inside the file, excluding quotes
    pub target_span: Range<usize>,
}

/// The canonical form an import is rewritten to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportForm {
    Public,
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_paths() {
        let project = Project::new("pkgA", "packages/pkg-a");
        let root = Path::new("/ws");
        assert_eq!(project.test_dir(root), PathBuf::from("/ws/packages/pkg-a/test"));
        assert_eq!(project.entry_point(root), PathBuf::from("/ws/packages/pkg-a/src/index.ts"));
    }

    #[test]
    fn test_matches_filter() {
        let project = Project::new("@scope/core", "packages/core");
        assert!(project.matches_filter(&[]));
        assert!(project.matches_filter(&["scope".to_string()]));
        assert!(project.matches_filter(&["packages/co".to_string()]));
        assert!(!project.matches_filter(&["ui".to_string()]));
        assert!(project.matches_filter(&["ui".to_string(), "core".to_string()]));
    }
}
