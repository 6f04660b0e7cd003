//! Core engine for testshape.
//!
//! This crate provides the pieces shared by the config rules and the project walker:
//! - Indexing the symbols a package's entry point exports
//! - Rewriting test imports to the package's public name or the internal alias
//! - Scanning source text (comments, strings, object literals, lenient JSON)
//! - Gating every filesystem write behind a single dry-run switch
//! - Discovering workspace projects and collecting their test files

mod collector;
mod constants;
mod discovery;
mod error;
mod exports;
mod gate;
mod imports;
pub mod scan;
mod types;

// Re-export public API
pub use collector::collect_test_files;
pub use constants::{
    CANONICAL_EXTENSION, ENTRY_MODULE, ENTRY_POINT, INTERNAL_ALIAS, JS_TS_EXTENSIONS,
    PACKAGE_MANIFEST, SOURCE_DIR, TEST_DIR, WORKSPACE_MANIFEST,
};
pub use discovery::{discover_projects, filter_projects, find_git_root};
pub use error::{MigrateError, Result};
pub use exports::{exports_for, exports_from_source};
pub use gate::{ChangeKind, ChangeRecord, FsGate, Mode};
pub use imports::{
    FileRewrite, ImportChange, RewriteContext, choose_form, rewrite_file, rewrite_source,
    scan_imports, strip_module_extension,
};
pub use types::{
    ExportSet, ImportBinding, ImportClause, ImportForm, ImportKind, ImportStatement, Project,
};
