use anyhow::Result;
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::constants::JS_TS_EXTENSIONS;

/// Build output and installed packages under a test directory are never rewritten.
const SKIPPED_DIRS: &[&str] = &["dist", "node_modules"];

/// Collects every source-like file under a project's test directory, sorted.
///
/// `.gitignore` and `.ignore` files are not consulted; only `dist` and `node_modules` are pruned.
pub fn collect_test_files(test_dir: &Path) -> Result<Vec<PathBuf>> {
    debug!("Collecting test files under {}", test_dir.display());
    let mut files: Vec<PathBuf> = Vec::new();
    let walker = WalkBuilder::new(test_dir)
        .standard_filters(false)
        .filter_entry(|e| {
            let skipped = e.file_type().is_some_and(|t| t.is_dir())
                && e.file_name().to_str().is_some_and(|n| SKIPPED_DIRS.contains(&n));
            !skipped
        })
        .build();

    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        if let Some(ext) = p.extension().and_then(|e| e.to_str())
            && JS_TS_EXTENSIONS.contains(&ext)
        {
            trace!("Found test file: {}", p.display());
            files.push(p.to_path_buf());
        }
    }

    files.sort();
    debug!("Collected {} test files", files.len());
    Ok(files)
}
